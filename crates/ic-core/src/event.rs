//! The closed event vocabulary.
//!
//! Every event that can ever be appended to a session's log is one of the
//! variants below. There is no dynamic/stringly-typed event path: the
//! dispatch table in [`crate::session::machine`] is an exhaustive match over
//! `(Phase, &EventKind)`, so adding a new event kind without wiring it into
//! the transition table is a compile error, not a silent no-op.

use ic_config::PresetName;
use serde::{Deserialize, Serialize};

use crate::reflection::ReflectionResponses;

/// One entry in a session's event log.
///
/// `timestamp` is always taken from the session's `Clock` at append time;
/// the log never rewrites it once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: i64,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    pub fn new(timestamp: i64, kind: EventKind) -> Self {
        Event { timestamp, kind }
    }

    /// The wire/log tag for this event's kind, e.g. `"coding.started"`.
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}

/// Tagged event payloads: the complete closed vocabulary a session's log
/// can ever contain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventKind {
    #[serde(rename = "session.started")]
    SessionStarted {
        #[serde(rename = "problemId")]
        problem_id: String,
        preset: PresetName,
    },

    #[serde(rename = "prep.invariants_changed")]
    PrepInvariantsChanged { text: String },

    #[serde(rename = "prep.time_expired")]
    PrepTimeExpired,

    #[serde(rename = "coding.started")]
    CodingStarted,

    #[serde(rename = "coding.code_changed")]
    CodingCodeChanged { text: String },

    #[serde(rename = "coding.code_changed_in_silent")]
    CodingCodeChangedInSilent { text: String },

    #[serde(rename = "nudge.requested")]
    NudgeRequested,

    #[serde(rename = "coding.time_expired")]
    CodingTimeExpired,

    #[serde(rename = "coding.silent_started")]
    CodingSilentStarted,

    #[serde(rename = "coding.solution_submitted")]
    CodingSolutionSubmitted,

    #[serde(rename = "silent.time_expired")]
    SilentTimeExpired,

    #[serde(rename = "silent.ended")]
    SilentEnded,

    #[serde(rename = "summary.continued")]
    SummaryContinued,

    #[serde(rename = "reflection.submitted")]
    ReflectionSubmitted { responses: ReflectionResponses },

    #[serde(rename = "session.completed")]
    SessionCompleted,

    #[serde(rename = "session.abandoned")]
    SessionAbandoned,

    #[serde(rename = "session.paused")]
    SessionPaused { now: i64 },

    #[serde(rename = "session.resumed")]
    SessionResumed { now: i64 },
}

impl EventKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            EventKind::SessionStarted { .. } => "session.started",
            EventKind::PrepInvariantsChanged { .. } => "prep.invariants_changed",
            EventKind::PrepTimeExpired => "prep.time_expired",
            EventKind::CodingStarted => "coding.started",
            EventKind::CodingCodeChanged { .. } => "coding.code_changed",
            EventKind::CodingCodeChangedInSilent { .. } => "coding.code_changed_in_silent",
            EventKind::NudgeRequested => "nudge.requested",
            EventKind::CodingTimeExpired => "coding.time_expired",
            EventKind::CodingSilentStarted => "coding.silent_started",
            EventKind::CodingSolutionSubmitted => "coding.solution_submitted",
            EventKind::SilentTimeExpired => "silent.time_expired",
            EventKind::SilentEnded => "silent.ended",
            EventKind::SummaryContinued => "summary.continued",
            EventKind::ReflectionSubmitted { .. } => "reflection.submitted",
            EventKind::SessionCompleted => "session.completed",
            EventKind::SessionAbandoned => "session.abandoned",
            EventKind::SessionPaused { .. } => "session.paused",
            EventKind::SessionResumed { .. } => "session.resumed",
        }
    }
}
