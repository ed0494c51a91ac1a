//! Phase transition validation and event dispatch (C4).

use ic_config::Preset;

use crate::error::DispatchError;
use crate::event::{Event, EventKind};
use crate::event_log::EventLog;
use crate::session::phase::{Phase, Status};
use crate::session::state::{fold, DerivedState};

/// What happened as a result of a successful `dispatch` call: the event(s)
/// appended and the state derived after appending them.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub appended: Vec<Event>,
    pub state: DerivedState,
}

/// Check whether `kind` is a legal event given the state derived so far.
/// Returns `Ok(())` if `kind` may be appended, or the reason it cannot.
pub fn validate(state: &DerivedState, kind: &EventKind) -> Result<(), DispatchError> {
    if state.phase == Phase::Done {
        return Err(DispatchError::SessionComplete);
    }

    match kind {
        // Abandon is legal from any non-terminal phase.
        EventKind::SessionAbandoned => return Ok(()),

        EventKind::SessionPaused { .. } => {
            return if state.paused {
                Err(DispatchError::InvalidPhase)
            } else {
                Ok(())
            };
        }
        EventKind::SessionResumed { .. } => {
            return if state.paused {
                Ok(())
            } else {
                Err(DispatchError::InvalidPhase)
            };
        }
        _ => {}
    }

    match (state.phase, kind) {
        (Phase::Prep, EventKind::SessionStarted { .. }) => {
            if state.status == Status::Idle {
                Ok(())
            } else {
                Err(DispatchError::InvalidPhase)
            }
        }
        (Phase::Prep, EventKind::PrepInvariantsChanged { .. }) => Ok(()),
        (Phase::Prep, EventKind::PrepTimeExpired) => Ok(()),
        (Phase::Prep, EventKind::CodingStarted) => Ok(()),

        (Phase::Coding, EventKind::CodingCodeChanged { .. }) => Ok(()),
        (Phase::Coding, EventKind::NudgeRequested) => {
            if state.nudges_used < state.nudges_allowed {
                Ok(())
            } else {
                Err(DispatchError::NudgeBudgetExhausted)
            }
        }
        (Phase::Coding, EventKind::CodingTimeExpired) => Ok(()),
        (Phase::Coding, EventKind::CodingSilentStarted) => Ok(()),
        (Phase::Coding, EventKind::CodingSolutionSubmitted) => Ok(()),

        (Phase::Silent, EventKind::CodingCodeChangedInSilent { .. }) => Ok(()),
        (Phase::Silent, EventKind::SilentTimeExpired) => Ok(()),
        (Phase::Silent, EventKind::SilentEnded) => Ok(()),

        (Phase::Summary, EventKind::SummaryContinued) => Ok(()),

        (Phase::Reflection, EventKind::ReflectionSubmitted { responses }) => {
            if responses.is_cross_field_consistent() {
                Ok(())
            } else {
                Err(DispatchError::InvalidReflection)
            }
        }

        _ => Err(DispatchError::InvalidPhase),
    }
}

/// Validate `kind` against `log`'s current derived state and, if legal,
/// append it (plus any event the state machine synthesizes as a direct
/// consequence, per the reflection → completed rule below).
///
/// Cascades owned by the controller rather than by the
/// state machine itself — `coding.time_expired` → `coding.silent_started`,
/// `silent.time_expired` → `silent.ended` — are deliberately NOT synthesized
/// here; the controller issues those as separate `dispatch` calls.
pub fn dispatch(
    log: &mut EventLog,
    preset: Preset,
    now_ms: i64,
    kind: EventKind,
) -> Result<DispatchOutcome, DispatchError> {
    let state = fold(log.as_slice(), preset);
    validate(&state, &kind)?;

    let mut appended = Vec::new();
    let event = Event::new(now_ms, kind);
    let synthesize_completion = matches!(event.kind, EventKind::ReflectionSubmitted { .. });
    log.append(event.clone());
    appended.push(event);

    if synthesize_completion {
        let completed = Event::new(now_ms, EventKind::SessionCompleted);
        log.append(completed.clone());
        appended.push(completed);
    }

    let state = fold(log.as_slice(), preset);
    Ok(DispatchOutcome { appended, state })
}
