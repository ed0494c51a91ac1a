//! The session state machine (C4): phases, derived state, transition
//! validation and dispatch, plus a compile-time typestate view.

pub mod machine;
pub mod phase;
pub mod state;
pub mod typestate;

pub use machine::{dispatch, validate, DispatchOutcome};
pub use phase::{Phase, Status};
pub use state::{fold, DerivedState};
