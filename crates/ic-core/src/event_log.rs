//! The append-only event log (C3).

use serde::{Deserialize, Serialize};

use crate::event::Event;

/// An ordered, append-only sequence of events for one session.
///
/// There is deliberately no `&mut` indexing or removal API: the only way to
/// grow a log is [`EventLog::append`], and the only way to read it is
/// [`EventLog::as_slice`]/[`EventLog::snapshot`]. This makes "the log of a
/// completed session is append-only" a property of the type, not just a
/// convention callers are trusted to honor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        EventLog { events: Vec::new() }
    }

    /// Append an event. The log does not rewrite or validate the
    /// timestamp — callers (the state machine's dispatch path) are
    /// responsible for supplying a monotonic one.
    pub fn append(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn as_slice(&self) -> &[Event] {
        &self.events
    }

    /// An owned copy of the current log contents.
    pub fn snapshot(&self) -> Vec<Event> {
        self.events.clone()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn first(&self) -> Option<&Event> {
        self.events.first()
    }

    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<Event>> for EventLog {
    fn from(events: Vec<Event>) -> Self {
        EventLog { events }
    }
}
