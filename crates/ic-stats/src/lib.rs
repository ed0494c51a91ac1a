//! Statistics Aggregator (C10).
//!
//! A three-number summary over every non-soft-deleted stored session:
//! total count, completed count, and the average nudge spend across
//! completed sessions. Kept as its own small crate for aggregate reporting;
//! the aggregation itself walks a handful of JSON records in memory.

use serde::{Deserialize, Serialize};
use tracing::debug;

use ic_config::get_preset;
use ic_core::{fold, EventKind, Store};

/// The aggregate summary returned by [`get_stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    #[serde(rename = "avgNudges")]
    pub avg_nudges: u32,
}

/// Walk every non-soft-deleted session in `store` and derive [`Stats`].
///
/// `completed` counts sessions whose log contains `session.completed`.
/// `avg_nudges` is the mean `nudgesUsed` across completed sessions, rounded
/// to the nearest integer; it is `0` when there are no completed sessions,
/// so the zero-session case never divides by zero.
pub fn get_stats(store: &dyn Store) -> ic_common::Result<Stats> {
    let records = store.get_all_sessions()?;
    let total = records.len();

    let mut completed = 0usize;
    let mut nudge_sum: u64 = 0;

    for record in &records {
        let is_completed = record
            .events
            .as_slice()
            .iter()
            .any(|e| matches!(e.kind, EventKind::SessionCompleted));
        if !is_completed {
            continue;
        }
        completed += 1;
        let preset = get_preset(record.preset);
        let state = fold(record.events.as_slice(), preset);
        nudge_sum += state.nudges_used as u64;
    }

    let avg_nudges = if completed == 0 {
        0
    } else {
        // Round-half-up on an integer mean: add half the divisor before
        // truncating division.
        ((nudge_sum * 2 + completed as u64) / (2 * completed as u64)) as u32
    };

    debug!(total, completed, avg_nudges, "computed session statistics");

    Ok(Stats {
        total,
        completed,
        avg_nudges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ic_config::{PresetName, Problem};
    use ic_core::{Event, EventLog, MemoryStore, SessionId};

    fn problem() -> Problem {
        Problem {
            id: "two-sum".into(),
            title: "Two Sum".into(),
            description: "desc".into(),
            difficulty: "easy".into(),
        }
    }

    fn completed_record(id: &str, nudges: u32) -> ic_core::SessionRecord {
        let mut events = EventLog::new();
        events.append(Event::new(
            0,
            EventKind::SessionStarted {
                problem_id: "two-sum".into(),
                preset: PresetName::Standard,
            },
        ));
        for i in 0..nudges {
            events.append(Event::new(100 + i as i64, EventKind::NudgeRequested));
        }
        events.append(Event::new(1_000, EventKind::SessionCompleted));
        ic_core::SessionRecord {
            id: SessionId(id.to_string()),
            problem: problem(),
            preset: PresetName::Standard,
            events,
            created_at: 0,
            updated_at: 1_000,
            deleted_at: None,
        }
    }

    fn in_progress_record(id: &str) -> ic_core::SessionRecord {
        let mut events = EventLog::new();
        events.append(Event::new(
            0,
            EventKind::SessionStarted {
                problem_id: "two-sum".into(),
                preset: PresetName::Standard,
            },
        ));
        ic_core::SessionRecord {
            id: SessionId(id.to_string()),
            problem: problem(),
            preset: PresetName::Standard,
            events,
            created_at: 0,
            updated_at: 500,
            deleted_at: None,
        }
    }

    #[test]
    fn empty_store_never_divides_by_zero() {
        let store = MemoryStore::new();
        let stats = get_stats(&store).unwrap();
        assert_eq!(stats, Stats { total: 0, completed: 0, avg_nudges: 0 });
    }

    #[test]
    fn counts_total_and_completed_separately() {
        let mut store = MemoryStore::new();
        store.put_session(completed_record("sess-a", 2)).unwrap();
        store.put_session(in_progress_record("sess-b")).unwrap();
        let stats = get_stats(&store).unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.completed, 1);
    }

    #[test]
    fn averages_nudges_across_completed_sessions_only() {
        let mut store = MemoryStore::new();
        store.put_session(completed_record("sess-a", 1)).unwrap();
        store.put_session(completed_record("sess-b", 4)).unwrap();
        store.put_session(in_progress_record("sess-c")).unwrap();
        let stats = get_stats(&store).unwrap();
        // (1 + 4) / 2 = 2.5, rounds to nearest => 3 with round-half-up.
        assert_eq!(stats.avg_nudges, 3);
    }

    #[test]
    fn soft_deleted_sessions_are_excluded() {
        let mut store = MemoryStore::new();
        let r = completed_record("sess-a", 3);
        let id = r.id.clone();
        store.put_session(r).unwrap();
        store.soft_delete_session(&id).unwrap();
        let stats = get_stats(&store).unwrap();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.completed, 0);
    }
}
