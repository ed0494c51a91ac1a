//! Typestate session lifecycle.
//!
//! Encodes the phase progression at the type level so that impossible
//! transitions are caught at compile time. Each phase is a zero-sized marker
//! type, and `TypedSession<S>` can only be advanced via methods that consume
//! the old phase and return the new one.
//!
//! # State machine
//!
//! ```text
//! Prep ──▶ Coding ──┬──▶ Silent ──▶ Summary ──▶ Reflection ──▶ Done
//!                   └───────────────────▲
//!                     (early submission: CodingSolutionSubmitted skips Silent)
//! ```
//!
//! `abandon` is available from every non-terminal phase but does not change
//! the phase type — it only flips the session's [`Status`] to `Abandoned`,
//! mirroring the event-sourced semantics in [`super::state`] where abandon
//! never rewrites `phase`.
//!
//! This is a compile-time-checked view over the same transitions that
//! [`super::machine::validate`] enforces at runtime against a deserialized
//! event log; the two are independent encodings of one rulebook, not two
//! separate rulebooks.

use std::marker::PhantomData;

use super::phase::{Phase, Status};

// ── Phase marker traits ─────────────────────────────────────────────────

/// Marker trait for session phases. Sealed to prevent external implementation.
pub trait SessionPhase: sealed::Sealed {
    /// The corresponding runtime [`Phase`] variant.
    fn runtime_phase() -> Phase;
    /// Human-readable phase name.
    fn name() -> &'static str;
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Prep {}
    impl Sealed for super::Coding {}
    impl Sealed for super::Silent {}
    impl Sealed for super::Summary {}
    impl Sealed for super::Reflection {}
    impl Sealed for super::Done {}
}

// ── Phase types ─────────────────────────────────────────────────────────

/// Invariants are being composed; the prep timer is running.
#[derive(Debug, Clone, Copy)]
pub struct Prep;

/// The candidate is writing code against the coding timer.
#[derive(Debug, Clone, Copy)]
pub struct Coding;

/// The editor is frozen except for narration; a silent countdown runs.
#[derive(Debug, Clone, Copy)]
pub struct Silent;

/// Timers are done; the candidate reviews before reflecting.
#[derive(Debug, Clone, Copy)]
pub struct Summary;

/// The fixed reflection questionnaire is outstanding.
#[derive(Debug, Clone, Copy)]
pub struct Reflection;

/// Terminal: every event is rejected from here on.
#[derive(Debug, Clone, Copy)]
pub struct Done;

impl SessionPhase for Prep {
    fn runtime_phase() -> Phase {
        Phase::Prep
    }
    fn name() -> &'static str {
        "prep"
    }
}

impl SessionPhase for Coding {
    fn runtime_phase() -> Phase {
        Phase::Coding
    }
    fn name() -> &'static str {
        "coding"
    }
}

impl SessionPhase for Silent {
    fn runtime_phase() -> Phase {
        Phase::Silent
    }
    fn name() -> &'static str {
        "silent"
    }
}

impl SessionPhase for Summary {
    fn runtime_phase() -> Phase {
        Phase::Summary
    }
    fn name() -> &'static str {
        "summary"
    }
}

impl SessionPhase for Reflection {
    fn runtime_phase() -> Phase {
        Phase::Reflection
    }
    fn name() -> &'static str {
        "reflection"
    }
}

impl SessionPhase for Done {
    fn runtime_phase() -> Phase {
        Phase::Done
    }
    fn name() -> &'static str {
        "done"
    }
}

// ── Session data ────────────────────────────────────────────────────────

/// Data carried across all phases, independent of the phase marker.
#[derive(Debug, Clone)]
pub struct SessionData {
    pub session_id: String,
    pub problem_id: String,
    pub status: Status,
}

// ── Typed session ───────────────────────────────────────────────────────

/// A session with compile-time phase tracking.
///
/// The phase `S` determines which transitions are available. Invalid
/// transitions (e.g. `Summary` → `Coding`) are compile errors, not runtime
/// checks.
#[derive(Debug)]
pub struct TypedSession<S: SessionPhase> {
    data: SessionData,
    _phase: PhantomData<S>,
}

impl<S: SessionPhase> TypedSession<S> {
    pub fn data(&self) -> &SessionData {
        &self.data
    }

    pub fn runtime_phase(&self) -> Phase {
        S::runtime_phase()
    }

    pub fn phase_name(&self) -> &'static str {
        S::name()
    }

    pub fn session_id(&self) -> &str {
        &self.data.session_id
    }

    /// Mark the session abandoned without leaving the current phase type.
    /// Matches the event-sourced model: `session.abandoned` sets status, it
    /// never rewrites `phase`.
    pub fn abandon(mut self) -> Self {
        self.data.status = Status::Abandoned;
        self
    }
}

// ── Creation ────────────────────────────────────────────────────────────

impl TypedSession<Prep> {
    pub fn new(session_id: String, problem_id: String) -> Self {
        Self {
            data: SessionData {
                session_id,
                problem_id,
                status: Status::InProgress,
            },
            _phase: PhantomData,
        }
    }

    /// Transition: Prep → Coding.
    pub fn start_coding(self) -> TypedSession<Coding> {
        TypedSession {
            data: self.data,
            _phase: PhantomData,
        }
    }
}

// ── Coding transitions ──────────────────────────────────────────────────

impl TypedSession<Coding> {
    /// Transition: Coding → Silent, on `coding.silent_started`.
    pub fn enter_silent(self) -> TypedSession<Silent> {
        TypedSession {
            data: self.data,
            _phase: PhantomData,
        }
    }

    /// Transition: Coding → Summary, on an early `coding.solution_submitted`
    /// that skips the silent phase entirely.
    pub fn submit_early(self) -> TypedSession<Summary> {
        TypedSession {
            data: self.data,
            _phase: PhantomData,
        }
    }
}

// ── Silent transitions ──────────────────────────────────────────────────

impl TypedSession<Silent> {
    /// Transition: Silent → Summary, on `silent.ended` (itself following
    /// either `silent.time_expired` or a submission during the silent
    /// phase).
    pub fn end_silent(self) -> TypedSession<Summary> {
        TypedSession {
            data: self.data,
            _phase: PhantomData,
        }
    }
}

// ── Summary transitions ─────────────────────────────────────────────────

impl TypedSession<Summary> {
    /// Transition: Summary → Reflection, on `summary.continued`.
    pub fn continue_to_reflection(self) -> TypedSession<Reflection> {
        TypedSession {
            data: self.data,
            _phase: PhantomData,
        }
    }
}

// ── Reflection transitions ──────────────────────────────────────────────

impl TypedSession<Reflection> {
    /// Transition: Reflection → Done, on a valid `reflection.submitted`
    /// (which synthesizes `session.completed`).
    pub fn complete(self) -> TypedSession<Done> {
        let mut data = self.data;
        data.status = Status::Completed;
        TypedSession {
            data,
            _phase: PhantomData,
        }
    }
}

// ── Terminal state ──────────────────────────────────────────────────────

impl TypedSession<Done> {
    pub fn final_status(&self) -> Status {
        self.data.status
    }
}

// ── Runtime dispatch over an unknown phase ──────────────────────────────

/// A session wrapped with its phase marker erased, for call sites (e.g.
/// restoring from a deserialized log) that only know the runtime [`Phase`]
/// at hand.
#[derive(Debug)]
pub enum AnyTypedSession {
    Prep(TypedSession<Prep>),
    Coding(TypedSession<Coding>),
    Silent(TypedSession<Silent>),
    Summary(TypedSession<Summary>),
    Reflection(TypedSession<Reflection>),
    Done(TypedSession<Done>),
}

impl AnyTypedSession {
    pub fn from_runtime(data: SessionData, phase: Phase) -> Self {
        match phase {
            Phase::Prep => AnyTypedSession::Prep(TypedSession {
                data,
                _phase: PhantomData,
            }),
            Phase::Coding => AnyTypedSession::Coding(TypedSession {
                data,
                _phase: PhantomData,
            }),
            Phase::Silent => AnyTypedSession::Silent(TypedSession {
                data,
                _phase: PhantomData,
            }),
            Phase::Summary => AnyTypedSession::Summary(TypedSession {
                data,
                _phase: PhantomData,
            }),
            Phase::Reflection => AnyTypedSession::Reflection(TypedSession {
                data,
                _phase: PhantomData,
            }),
            Phase::Done => AnyTypedSession::Done(TypedSession {
                data,
                _phase: PhantomData,
            }),
        }
    }

    pub fn runtime_phase(&self) -> Phase {
        match self {
            AnyTypedSession::Prep(s) => s.runtime_phase(),
            AnyTypedSession::Coding(s) => s.runtime_phase(),
            AnyTypedSession::Silent(s) => s.runtime_phase(),
            AnyTypedSession::Summary(s) => s.runtime_phase(),
            AnyTypedSession::Reflection(s) => s.runtime_phase(),
            AnyTypedSession::Done(s) => s.runtime_phase(),
        }
    }

    pub fn data(&self) -> &SessionData {
        match self {
            AnyTypedSession::Prep(s) => s.data(),
            AnyTypedSession::Coding(s) => s.data(),
            AnyTypedSession::Silent(s) => s.data(),
            AnyTypedSession::Summary(s) => s.data(),
            AnyTypedSession::Reflection(s) => s.data(),
            AnyTypedSession::Done(s) => s.data(),
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────────
