//! Session Store / Controller (C8): binds the clock, timer, state machine,
//! and persistence adapter together, owns the single active session, and
//! translates external intents into events.

use std::sync::Arc;

use tracing::{debug, warn};

use ic_common::{Error as StoreError, Result as StoreResult, SessionId};
use ic_config::{get_preset, pick_problem, Preset, PresetName, Problem};

use crate::clock::Clock;
use crate::error::{DispatchError, EngineError};
use crate::event::EventKind;
use crate::persist::{SessionRecord, Store};
use crate::reflection::ReflectionResponses;
use crate::session::{dispatch, fold, DerivedState, Phase};
use crate::timer::{Timer, TimerEvent};

/// Debounce window for high-frequency code edits, within a
/// `[100ms, 500ms]` tolerance band.
pub const DEBOUNCE_MS: i64 = 300;

/// A persist that is due but has not yet been flushed to the store.
#[derive(Debug, Clone, Copy)]
struct PendingWrite {
    due_at_ms: i64,
}

/// The in-memory session the controller is currently driving.
struct ActiveSession {
    record: SessionRecord,
    preset: Preset,
    pending_write: Option<PendingWrite>,
}

/// Binds C2 (Timer) through C7 (Persistence Adapter); owns at most one
/// active session. `Controller` is intentionally not `Sync`: it holds no
/// internal locking, matching the engine's single-threaded cooperative
/// model (see the concurrency notes in the crate's design docs). A host
/// that needs to share it across threads wraps it in its own `Mutex`.
pub struct Controller<S: Store> {
    clock: Arc<dyn Clock>,
    store: S,
    timer: Timer,
    active: Option<ActiveSession>,
    /// Whether the host's audio recorder is available at all. Set by the
    /// host, never derived from the event log — there is no audio event in
    /// the closed vocabulary, so this cannot be a fold over `events`.
    audio_supported: bool,
    /// Whether the last recording attempt was denied microphone
    /// permission. Informational only; never blocks phase progression.
    audio_permission_denied: bool,
}

/// The two audio-capture signals tracked alongside derived state.
/// Neither ever produces a `Result::Err` — audio capture itself is an
/// external collaborator out of scope for this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFlags {
    pub audio_supported: bool,
    pub audio_permission_denied: bool,
}

impl<S: Store> Controller<S> {
    pub fn new(clock: Arc<dyn Clock>, store: S) -> Self {
        Controller {
            timer: Timer::new(clock.clone()),
            clock,
            store,
            active: None,
            audio_supported: true,
            audio_permission_denied: false,
        }
    }

    pub fn audio_flags(&self) -> AudioFlags {
        AudioFlags {
            audio_supported: self.audio_supported,
            audio_permission_denied: self.audio_permission_denied,
        }
    }

    /// Called by the host when the browser's microphone API reports
    /// support or the lack of it. Never affects session phase.
    pub fn set_audio_supported(&mut self, supported: bool) {
        self.audio_supported = supported;
    }

    /// Called by the host when a recording attempt is denied permission.
    pub fn set_audio_permission_denied(&mut self, denied: bool) {
        self.audio_permission_denied = denied;
    }

    pub fn active_state(&self) -> Option<DerivedState> {
        self.active
            .as_ref()
            .map(|a| fold(a.record.events.as_slice(), a.preset))
    }

    pub fn active_session_id(&self) -> Option<&SessionId> {
        self.active.as_ref().map(|a| &a.record.id)
    }

    pub fn active_problem(&self) -> Option<&Problem> {
        self.active.as_ref().map(|a| &a.record.problem)
    }

    // ── intents ──────────────────────────────────────────────────────

    pub fn start_session(&mut self, preset_name: PresetName) -> Result<DerivedState, EngineError> {
        let id = SessionId::new();
        let preset = get_preset(preset_name);
        let problem = pick_problem(id.as_str());
        let now = self.clock.now_ms();

        let mut record = SessionRecord {
            id: id.clone(),
            problem: problem.clone(),
            preset: preset_name,
            events: crate::event_log::EventLog::new(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let outcome = dispatch(
            &mut record.events,
            preset,
            now,
            EventKind::SessionStarted {
                problem_id: problem.id.clone(),
                preset: preset_name,
            },
        )?;
        record.updated_at = now;

        self.timer.start(preset.prep_ms as i64);
        self.active = Some(ActiveSession {
            record,
            preset,
            pending_write: None,
        });
        self.flush()?;
        debug!(session_id = %id, problem = %problem.id, preset = %preset_name, "session started");
        Ok(outcome.state)
    }

    pub fn update_invariants(&mut self, text: String) -> Result<DerivedState, EngineError> {
        self.dispatch_debounced(EventKind::PrepInvariantsChanged { text })
    }

    pub fn start_coding(&mut self) -> Result<DerivedState, EngineError> {
        let preset = self.require_active()?.preset;
        let state = self.dispatch_now(EventKind::CodingStarted)?;
        self.timer.start(preset.coding_ms as i64);
        Ok(state)
    }

    pub fn update_code(&mut self, text: String) -> Result<DerivedState, EngineError> {
        let phase = self
            .active_state()
            .ok_or(DispatchError::NoSession)?
            .phase;
        let kind = if phase == Phase::Silent {
            EventKind::CodingCodeChangedInSilent { text }
        } else {
            EventKind::CodingCodeChanged { text }
        };
        self.dispatch_debounced(kind)
    }

    pub fn request_nudge(&mut self) -> Result<DerivedState, EngineError> {
        self.dispatch_now(EventKind::NudgeRequested)
    }

    pub fn submit_solution(&mut self) -> Result<DerivedState, EngineError> {
        let state = self.dispatch_now(EventKind::CodingSolutionSubmitted)?;
        self.timer.stop();
        Ok(state)
    }

    pub fn end_silent(&mut self) -> Result<DerivedState, EngineError> {
        let state = self.dispatch_now(EventKind::SilentEnded)?;
        self.timer.stop();
        Ok(state)
    }

    pub fn continue_past_summary(&mut self) -> Result<DerivedState, EngineError> {
        self.dispatch_now(EventKind::SummaryContinued)
    }

    pub fn submit_reflection(
        &mut self,
        responses: ReflectionResponses,
    ) -> Result<DerivedState, EngineError> {
        let state = self.dispatch_now(EventKind::ReflectionSubmitted { responses })?;
        self.timer.stop();
        self.active = None;
        Ok(state)
    }

    pub fn abandon_session(&mut self) -> Result<DerivedState, EngineError> {
        let state = self.dispatch_now(EventKind::SessionAbandoned)?;
        self.timer.stop();
        self.active = None;
        Ok(state)
    }

    pub fn pause_session(&mut self) -> Result<DerivedState, EngineError> {
        let now = self.clock.now_ms();
        let state = self.dispatch_now(EventKind::SessionPaused { now })?;
        self.timer.pause();
        Ok(state)
    }

    pub fn resume_from_pause(&mut self) -> Result<DerivedState, EngineError> {
        let now = self.clock.now_ms();
        let state = self.dispatch_now(EventKind::SessionResumed { now })?;
        self.timer.resume();
        Ok(state)
    }

    /// Drive the timer. Call on the host's own cadence. Auto-emits the
    /// expiry cascade owned by the controller: `*.time_expired`
    /// is always immediately followed by the corresponding transition
    /// event, except `prep.time_expired`, which waits for the user's
    /// `coding.started`.
    pub fn tick(&mut self) -> Result<Option<DerivedState>, EngineError> {
        self.maybe_flush_due_write()?;

        let events = self.timer.tick();
        if events.is_empty() {
            return Ok(None);
        }
        if !events.contains(&TimerEvent::Expire) {
            return Ok(None);
        }

        let phase = match self.active_state() {
            Some(s) => s.phase,
            None => return Ok(None),
        };

        let state = match phase {
            Phase::Prep => self.dispatch_now(EventKind::PrepTimeExpired)?,
            Phase::Coding => {
                self.dispatch_now(EventKind::CodingTimeExpired)?;
                let state = self.dispatch_now(EventKind::CodingSilentStarted)?;
                let preset = self.require_active()?.preset;
                self.timer.start(preset.silent_ms as i64);
                state
            }
            Phase::Silent => {
                self.dispatch_now(EventKind::SilentTimeExpired)?;
                let state = self.dispatch_now(EventKind::SilentEnded)?;
                self.timer.stop();
                state
            }
            Phase::Summary | Phase::Reflection | Phase::Done => return Ok(None),
        };
        Ok(Some(state))
    }

    /// Full app-init sequence: [`Controller::restore`] followed by
    /// [`Controller::cleanup_orphan_audio`]. Separate methods remain public
    /// for hosts that want to sequence them differently (e.g. restoring
    /// before the audio subsystem is ready).
    pub fn init(&mut self) -> Result<Option<DerivedState>, EngineError> {
        let state = self.restore()?;
        self.cleanup_orphan_audio()?;
        Ok(state)
    }

    /// Restore the most recent incomplete session from storage, restart its
    /// timer from where it would be had the host never shut down, and if
    /// the restored remaining time is already ≤ 0, auto-emit the expiry
    /// cascade before returning.
    pub fn restore(&mut self) -> Result<Option<DerivedState>, EngineError> {
        let record = match self.store.get_incomplete_session()? {
            Some(r) => r,
            None => return Ok(None),
        };
        let preset = get_preset(record.preset);
        let state = fold(record.events.as_slice(), preset);
        let now = self.clock.now_ms();

        let budget_ms = match state.phase {
            Phase::Prep => preset.prep_ms as i64,
            Phase::Coding => preset.coding_ms as i64,
            Phase::Silent => preset.silent_ms as i64,
            Phase::Summary | Phase::Reflection | Phase::Done => {
                self.active = Some(ActiveSession {
                    record,
                    preset,
                    pending_write: None,
                });
                return Ok(Some(state));
            }
        };

        // A pause still open at restore time has no matching `SessionResumed`
        // to close it, so `paused_ms_in_current_phase` doesn't cover the gap
        // between the pause and now. Cap elapsed time at the pause event's
        // own persisted timestamp instead of `now`, so real downtime while
        // paused never counts against the phase budget.
        let elapsed_until = if state.paused {
            record.updated_at
        } else {
            now
        };
        let elapsed = elapsed_until - state.phase_started_at;
        let remaining = budget_ms - elapsed + state.paused_ms_in_current_phase();

        self.active = Some(ActiveSession {
            record,
            preset,
            pending_write: None,
        });

        if remaining <= 0 {
            self.timer.start_paused(budget_ms, 0);
            let final_state = match state.phase {
                Phase::Prep => self.dispatch_now(EventKind::PrepTimeExpired)?,
                Phase::Coding => {
                    self.dispatch_now(EventKind::CodingTimeExpired)?;
                    let s = self.dispatch_now(EventKind::CodingSilentStarted)?;
                    self.timer.start(preset.silent_ms as i64);
                    s
                }
                Phase::Silent => {
                    self.dispatch_now(EventKind::SilentTimeExpired)?;
                    let s = self.dispatch_now(EventKind::SilentEnded)?;
                    self.timer.stop();
                    s
                }
                Phase::Summary | Phase::Reflection | Phase::Done => unreachable!(),
            };
            let session_id = self.require_active()?.record.id.clone();
            warn!(%session_id, "session timer expired during downtime; auto-emitted cascade");
            Ok(Some(final_state))
        } else {
            self.timer.start_paused(budget_ms, remaining);
            if state.paused {
                self.timer.pause();
            } else {
                self.timer.resume();
            }
            Ok(Some(state))
        }
    }

    /// Force any pending debounced write to storage. Called automatically
    /// on phase transitions, abandon, and completion; a host should also
    /// call it explicitly on shutdown so the final edit in a debounce
    /// window is never lost.
    pub fn flush(&mut self) -> Result<(), EngineError> {
        if let Some(active) = self.active.as_mut() {
            self.store.put_session(active.record.clone())?;
            active.pending_write = None;
        }
        Ok(())
    }

    pub fn shutdown(&mut self) -> Result<(), EngineError> {
        self.flush()
    }

    /// Delete audio records with no corresponding in-progress session.
    /// Intended to run once at startup, after `restore`, so
    /// a session that restore itself just auto-completed via the expiry
    /// cascade is correctly treated as no-longer-in-progress.
    pub fn cleanup_orphan_audio(&mut self) -> Result<usize, EngineError> {
        let in_progress: std::collections::HashSet<String> = self
            .store
            .get_all_sessions()?
            .into_iter()
            .filter(|r| r.looks_in_progress())
            .map(|r| r.id.as_str().to_string())
            .collect();

        let mut removed = 0;
        for session_id in self.store.list_audio_session_ids()? {
            if !in_progress.contains(session_id.as_str()) {
                self.store.delete_audio(&session_id)?;
                removed += 1;
            }
        }
        if removed > 0 {
            debug!(removed, "cleaned up orphaned audio records");
        }
        Ok(removed)
    }

    // ── internals ────────────────────────────────────────────────────

    fn require_active(&self) -> Result<&ActiveSession, DispatchError> {
        self.active.as_ref().ok_or(DispatchError::NoSession)
    }

    fn dispatch_now(&mut self, kind: EventKind) -> Result<DerivedState, EngineError> {
        let now = self.clock.now_ms();
        let active = self.active.as_mut().ok_or(DispatchError::NoSession)?;
        let outcome = dispatch(&mut active.record.events, active.preset, now, kind)?;
        active.record.updated_at = now;
        active.pending_write = None;
        self.store.put_session(active.record.clone())?;
        Ok(outcome.state)
    }

    /// Like `dispatch_now`, but the persist is coalesced: only the latest
    /// write in a `DEBOUNCE_MS` window actually reaches storage, unless a
    /// non-debounced dispatch or an explicit `flush` intervenes first.
    fn dispatch_debounced(&mut self, kind: EventKind) -> Result<DerivedState, EngineError> {
        let now = self.clock.now_ms();
        let active = self.active.as_mut().ok_or(DispatchError::NoSession)?;
        let outcome = dispatch(&mut active.record.events, active.preset, now, kind)?;
        active.record.updated_at = now;
        active.pending_write = Some(PendingWrite {
            due_at_ms: now + DEBOUNCE_MS,
        });
        Ok(outcome.state)
    }

    fn maybe_flush_due_write(&mut self) -> Result<(), EngineError> {
        let now = self.clock.now_ms();
        let due = self
            .active
            .as_ref()
            .and_then(|a| a.pending_write)
            .map(|p| p.due_at_ms <= now)
            .unwrap_or(false);
        if due {
            self.flush()?;
        }
        Ok(())
    }
}

pub type ControllerError = EngineError;

/// Convenience alias for fallible crate-local operations that may surface
/// a storage error.
pub fn map_store_err<T>(result: StoreResult<T>) -> Result<T, StoreError> {
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::persist::MemoryStore;
    use crate::reflection::{
        ClearApproach, ProlongedStall, RecoveredFromStall, TimePressure, WouldChangeApproach,
    };

    fn controller(clock: Arc<ManualClock>) -> Controller<MemoryStore> {
        Controller::new(clock, MemoryStore::new())
    }

    #[test]
    fn start_session_enters_prep_and_starts_timer() {
        let clock = ManualClock::new(0);
        let mut ctl = controller(clock);
        let state = ctl.start_session(PresetName::Standard).unwrap();
        assert_eq!(state.phase, Phase::Prep);
    }

    #[test]
    fn full_happy_path_reaches_done() {
        let clock = ManualClock::new(0);
        let mut ctl = controller(clock.clone());
        ctl.start_session(PresetName::Standard).unwrap();
        ctl.start_coding().unwrap();
        ctl.submit_solution().unwrap();
        ctl.continue_past_summary().unwrap();
        let responses = ReflectionResponses {
            clear_approach: ClearApproach::Yes,
            prolonged_stall: ProlongedStall::No,
            recovered_from_stall: RecoveredFromStall::NotApplicable,
            time_pressure: TimePressure::Comfortable,
            would_change_approach: WouldChangeApproach::No,
        };
        let state = ctl.submit_reflection(responses).unwrap();
        assert_eq!(state.phase, Phase::Done);
        assert!(ctl.active_state().is_none());
    }

    #[test]
    fn coding_timer_expiry_cascades_into_silent() {
        let clock = ManualClock::new(0);
        let mut ctl = controller(clock.clone());
        ctl.start_session(PresetName::HighPressure).unwrap();
        ctl.start_coding().unwrap();
        clock.advance(1_500_000);
        let state = ctl.tick().unwrap().unwrap();
        assert_eq!(state.phase, Phase::Silent);
    }

    #[test]
    fn debounced_code_edit_is_flushed_on_abandon() {
        let clock = ManualClock::new(0);
        let mut ctl = controller(clock.clone());
        ctl.start_session(PresetName::Standard).unwrap();
        ctl.start_coding().unwrap();
        ctl.update_code("fn f() {}".into()).unwrap();
        // Abandon flushes immediately via dispatch_now's direct persist.
        ctl.abandon_session().unwrap();
        let stats = ctl.store.get_stats().unwrap();
        assert_eq!(stats.session_count, 1);
    }

    #[test]
    fn orphan_audio_is_removed_for_abandoned_sessions_only() {
        let clock = ManualClock::new(0);
        let mut ctl = controller(clock.clone());
        ctl.start_session(PresetName::Standard).unwrap();
        let abandoned_id = ctl.active_session_id().unwrap().clone();
        ctl.abandon_session().unwrap();

        ctl.store
            .save_audio_chunk(&abandoned_id, vec![1, 2, 3], "audio/webm")
            .unwrap();

        ctl.start_session(PresetName::Standard).unwrap();
        let in_progress_id = ctl.active_session_id().unwrap().clone();
        ctl.store
            .save_audio_chunk(&in_progress_id, vec![4, 5, 6], "audio/webm")
            .unwrap();

        let removed = ctl.cleanup_orphan_audio().unwrap();
        assert_eq!(removed, 1);
        assert!(ctl.store.get_audio(&abandoned_id).unwrap().is_none());
        assert!(ctl.store.get_audio(&in_progress_id).unwrap().is_some());
    }

    #[test]
    fn audio_flags_default_to_supported_and_not_denied() {
        let clock = ManualClock::new(0);
        let mut ctl = controller(clock);
        let flags = ctl.audio_flags();
        assert!(flags.audio_supported);
        assert!(!flags.audio_permission_denied);
        ctl.set_audio_permission_denied(true);
        assert!(ctl.audio_flags().audio_permission_denied);
    }

    #[test]
    fn restore_does_not_expire_a_session_paused_before_a_long_real_world_gap() {
        let clock = ManualClock::new(0);
        let mut ctl = controller(clock.clone());
        ctl.start_session(PresetName::Standard).unwrap();
        ctl.start_coding().unwrap();
        clock.advance(10_000);
        ctl.pause_session().unwrap();
        let id = ctl.active_session_id().unwrap().clone();
        let record = ctl.store.get_session(&id).unwrap().unwrap();

        // Simulate the host process being closed for an hour while paused,
        // then restarted: a fresh clock and a fresh controller over the same
        // persisted record, as a real restart would see.
        let restart_clock = ManualClock::new(record.updated_at + 3_600_000);
        let mut restarted = controller(restart_clock);
        restarted.store.put_session(record).unwrap();

        let state = restarted.restore().unwrap().unwrap();
        assert_eq!(state.phase, Phase::Coding);
        assert!(state.paused);
    }
}
