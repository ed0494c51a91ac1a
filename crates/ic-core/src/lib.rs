//! Interview Conditioning session engine.
//!
//! Binds the clock (C1), timer (C2), event log (C3), session state machine
//! (C4), and persistence adapter (C7) into the controller (C8) a host
//! embeds to drive one local practice session at a time. See the crate's
//! design notes for the event-sourcing model this is built on: a session
//! is nothing but its ordered event log, and every other view of it —
//! phase, code, nudges remaining — is a pure fold over that log.

pub mod clock;
pub mod controller;
pub mod error;
pub mod event;
pub mod event_log;
pub mod persist;
pub mod reflection;
pub mod session;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use ic_common::SessionId;
pub use controller::{AudioFlags, Controller, DEBOUNCE_MS};
pub use error::{DispatchError, EngineError};
pub use event::{Event, EventKind};
pub use event_log::EventLog;
pub use persist::{AudioRecord, FileStore, MemoryStore, SessionRecord, Store, StoreStats};
pub use reflection::ReflectionResponses;
pub use session::{dispatch, fold, validate, DerivedState, DispatchOutcome, Phase, Status};
pub use timer::{Timer, TimerEvent};
