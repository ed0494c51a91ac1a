//! Runtime phase and session status.

use serde::{Deserialize, Serialize};

/// The six session phases. `Prep` is the initial phase for a new session;
/// `Done` is terminal — every event is rejected once a session reaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Prep,
    Coding,
    Silent,
    Summary,
    Reflection,
    Done,
}

/// Coarse session status, orthogonal to `Phase`: a session can be
/// `Abandoned` while its phase is still e.g. `Coding` (abandon does not
/// rewrite the phase).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Idle,
    InProgress,
    Completed,
    Abandoned,
}
