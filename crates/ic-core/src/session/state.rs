//! Derived state: the pure fold over an event log (C4).

use ic_config::Preset;
use serde::{Deserialize, Serialize};

use crate::event::{Event, EventKind};
use crate::reflection::ReflectionResponses;
use crate::session::phase::{Phase, Status};

/// The state derived by folding a session's event log. Never persisted
/// independently of the log itself — `fold(log) == fold(log)` always, by
/// construction (no hidden inputs besides `events` and `preset`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedState {
    pub phase: Phase,
    pub status: Status,
    pub invariants: String,
    pub code: String,

    pub nudges_used: u32,
    pub nudges_allowed: u32,
    pub nudges_remaining: u32,
    pub nudges_allowed_in_phase: bool,

    pub prep_time_used_ms: i64,
    pub prep_time_expired: bool,

    pub code_changes_in_silent: u32,
    pub code_changed_in_silent: bool,

    pub reflection: Option<ReflectionResponses>,

    pub silent_started_at: Option<i64>,
    pub total_paused_ms: i64,
    pub paused: bool,

    /// Timestamp the current phase began, used by the controller to
    /// recompute a timer's remaining time on restore.
    pub phase_started_at: i64,
    /// `total_paused_ms` as of the moment the current phase began — lets the
    /// controller isolate "pauses during this phase" without re-walking the
    /// log.
    pub paused_ms_at_phase_start: i64,
}

impl DerivedState {
    /// Pauses accumulated strictly within the current phase.
    pub fn paused_ms_in_current_phase(&self) -> i64 {
        self.total_paused_ms - self.paused_ms_at_phase_start
    }
}

/// Fold an ordered event log into derived state. Deterministic: the only
/// inputs are `events` and `preset`.
pub fn fold(events: &[Event], preset: Preset) -> DerivedState {
    let mut phase = Phase::Prep;
    let mut status = Status::Idle;
    let mut invariants = String::new();
    let mut code = String::new();
    let mut nudges_used: u32 = 0;
    let mut prep_time_used_ms: i64 = 0;
    let mut prep_time_expired = false;
    let mut code_changes_in_silent: u32 = 0;
    let mut code_changed_in_silent = false;
    let mut reflection: Option<ReflectionResponses> = None;
    let mut silent_started_at: Option<i64> = None;
    let mut total_paused_ms: i64 = 0;
    let mut paused = false;
    let mut pause_started_at: Option<i64> = None;
    let mut session_started_at: i64 = 0;
    let mut phase_started_at: i64 = 0;
    let mut paused_ms_at_phase_start: i64 = 0;

    for event in events {
        match &event.kind {
            EventKind::SessionStarted { .. } => {
                status = Status::InProgress;
                session_started_at = event.timestamp;
                phase = Phase::Prep;
                phase_started_at = event.timestamp;
                paused_ms_at_phase_start = total_paused_ms;
            }
            EventKind::PrepInvariantsChanged { text } => {
                invariants = text.clone();
            }
            EventKind::PrepTimeExpired => {
                prep_time_expired = true;
            }
            EventKind::CodingStarted => {
                prep_time_used_ms = event.timestamp - session_started_at - total_paused_ms;
                phase = Phase::Coding;
                phase_started_at = event.timestamp;
                paused_ms_at_phase_start = total_paused_ms;
            }
            EventKind::CodingCodeChanged { text } => {
                code = text.clone();
            }
            EventKind::CodingCodeChangedInSilent { text } => {
                code = text.clone();
                code_changes_in_silent += 1;
                code_changed_in_silent = true;
            }
            EventKind::NudgeRequested => {
                nudges_used += 1;
            }
            EventKind::CodingTimeExpired => {
                // No direct state change; the controller follows this with
                // coding.silent_started in a separate dispatch call.
            }
            EventKind::CodingSilentStarted => {
                phase = Phase::Silent;
                silent_started_at = Some(event.timestamp);
                phase_started_at = event.timestamp;
                paused_ms_at_phase_start = total_paused_ms;
            }
            EventKind::CodingSolutionSubmitted => {
                // Early submission: skips SILENT entirely.
                phase = Phase::Summary;
                phase_started_at = event.timestamp;
                paused_ms_at_phase_start = total_paused_ms;
            }
            EventKind::SilentTimeExpired => {}
            EventKind::SilentEnded => {
                phase = Phase::Summary;
                phase_started_at = event.timestamp;
                paused_ms_at_phase_start = total_paused_ms;
            }
            EventKind::SummaryContinued => {
                phase = Phase::Reflection;
                phase_started_at = event.timestamp;
                paused_ms_at_phase_start = total_paused_ms;
            }
            EventKind::ReflectionSubmitted { responses } => {
                reflection = Some(responses.clone());
            }
            EventKind::SessionCompleted => {
                phase = Phase::Done;
                status = Status::Completed;
                phase_started_at = event.timestamp;
                paused_ms_at_phase_start = total_paused_ms;
            }
            EventKind::SessionAbandoned => {
                status = Status::Abandoned;
            }
            EventKind::SessionPaused { .. } => {
                if !paused {
                    paused = true;
                    pause_started_at = Some(event.timestamp);
                }
            }
            EventKind::SessionResumed { .. } => {
                if paused {
                    if let Some(start) = pause_started_at {
                        total_paused_ms += event.timestamp - start;
                    }
                    paused = false;
                    pause_started_at = None;
                }
            }
        }
    }

    let nudges_allowed = preset.nudge_budget;
    let nudges_remaining = nudges_allowed.saturating_sub(nudges_used);
    let nudges_allowed_in_phase = phase == Phase::Coding;

    DerivedState {
        phase,
        status,
        invariants,
        code,
        nudges_used,
        nudges_allowed,
        nudges_remaining,
        nudges_allowed_in_phase,
        prep_time_used_ms,
        prep_time_expired,
        code_changes_in_silent,
        code_changed_in_silent,
        reflection,
        silent_started_at,
        total_paused_ms,
        paused,
        phase_started_at,
        paused_ms_at_phase_start,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use ic_config::{get_preset, PresetName};

    fn standard() -> Preset {
        get_preset(PresetName::Standard)
    }

    #[test]
    fn fold_is_deterministic() {
        let events = vec![
            Event::new(
                0,
                EventKind::SessionStarted {
                    problem_id: "two-sum".into(),
                    preset: PresetName::Standard,
                },
            ),
            Event::new(1_000, EventKind::CodingStarted),
        ];
        let a = fold(&events, standard());
        let b = fold(&events, standard());
        assert_eq!(a, b);
    }

    #[test]
    fn skip_silent_branch_leaves_silent_started_at_null() {
        let events = vec![
            Event::new(
                0,
                EventKind::SessionStarted {
                    problem_id: "two-sum".into(),
                    preset: PresetName::Standard,
                },
            ),
            Event::new(1_000, EventKind::CodingStarted),
            Event::new(2_000, EventKind::CodingSolutionSubmitted),
        ];
        let state = fold(&events, standard());
        assert_eq!(state.phase, Phase::Summary);
        assert!(state.silent_started_at.is_none());
        assert_eq!(state.code_changes_in_silent, 0);
    }

    #[test]
    fn pause_resume_accumulates_total_paused_ms() {
        let events = vec![
            Event::new(
                0,
                EventKind::SessionStarted {
                    problem_id: "two-sum".into(),
                    preset: PresetName::Standard,
                },
            ),
            Event::new(100, EventKind::SessionPaused { now: 100 }),
            Event::new(600, EventKind::SessionResumed { now: 600 }),
        ];
        let state = fold(&events, standard());
        assert_eq!(state.total_paused_ms, 500);
        assert!(!state.paused);
    }

    #[test]
    fn prep_time_used_subtracts_pauses() {
        let events = vec![
            Event::new(
                0,
                EventKind::SessionStarted {
                    problem_id: "two-sum".into(),
                    preset: PresetName::Standard,
                },
            ),
            Event::new(100, EventKind::SessionPaused { now: 100 }),
            Event::new(600, EventKind::SessionResumed { now: 600 }),
            Event::new(1_000, EventKind::CodingStarted),
        ];
        let state = fold(&events, standard());
        // total elapsed 1000ms, minus 500ms paused = 500ms of actual prep time.
        assert_eq!(state.prep_time_used_ms, 500);
    }
}
