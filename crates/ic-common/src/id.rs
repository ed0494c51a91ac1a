//! Session identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, process-generated session identifier.
///
/// Format: `sess-<date>-<time>-<random>`
/// Example: `sess-20260726-143022-abc123`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a new session ID from the current wall-clock time.
    ///
    /// This is the only place `SessionId` touches wall-clock time directly;
    /// the event log itself always takes its timestamps from the session's
    /// `Clock`, never from here.
    pub fn new() -> Self {
        let now = chrono::Utc::now();
        let random: String = uuid::Uuid::new_v4()
            .to_string()
            .chars()
            .take(6)
            .collect();
        SessionId(format!("sess-{}-{}", now.format("%Y%m%d-%H%M%S"), random))
    }

    /// Parse an existing session ID string, rejecting anything that doesn't
    /// look like one of ours.
    pub fn parse(s: &str) -> Option<Self> {
        if s.starts_with("sess-") && s.len() > 20 {
            Some(SessionId(s.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_format() {
        let sid = SessionId::new();
        assert!(sid.0.starts_with("sess-"));
        assert!(sid.0.len() > 20);
    }

    #[test]
    fn test_parse_rejects_foreign_ids() {
        assert!(SessionId::parse("not-a-session").is_none());
        assert!(SessionId::parse("sess-short").is_none());
        assert!(SessionId::parse("sess-20260726-143022-abc123").is_some());
    }
}
