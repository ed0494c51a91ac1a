//! Error taxonomy for the session engine (C4/C7/C8).

use thiserror::Error;

/// Validation errors returned synchronously from `dispatch`. No state
/// change and no append happens when one of these is returned.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    #[error("event is not valid in the current phase")]
    InvalidPhase,

    #[error("nudge budget exhausted")]
    NudgeBudgetExhausted,

    #[error("reflection responses are invalid")]
    InvalidReflection,

    #[error("session is already complete")]
    SessionComplete,

    #[error("no active session")]
    NoSession,
}

impl DispatchError {
    /// Stable numeric code, independent of message wording.
    pub fn code(&self) -> &'static str {
        match self {
            DispatchError::InvalidPhase => "INVALID_PHASE",
            DispatchError::NudgeBudgetExhausted => "NUDGE_BUDGET_EXHAUSTED",
            DispatchError::InvalidReflection => "INVALID_REFLECTION",
            DispatchError::SessionComplete => "SESSION_COMPLETE",
            DispatchError::NoSession => "NO_SESSION",
        }
    }
}

/// Errors from the controller's asynchronous edges: persistence I/O.
/// Never corrupts the in-memory log — a failed persist just means storage
/// has not yet converged with memory.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Storage(#[from] ic_common::Error),

    #[error("dispatch rejected: {0}")]
    Dispatch(#[from] DispatchError),
}
