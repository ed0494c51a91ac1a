//! Problem catalog.
//!
//! The core only specifies the shape of a problem and a stable selection
//! policy; the actual catalog content (titles, prompts, difficulty) is a
//! presentation concern that belongs to the bundled problem catalog the UI
//! ships, out of scope here. The small built-in set below exists so the
//! engine and its tests have something concrete to pick from.

use serde::{Deserialize, Serialize};

/// An immutable problem record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: String,
}

/// The built-in problem catalog. A host embedding this crate may ignore it
/// entirely and supply its own via [`pick_problem_from`].
fn builtin_catalog() -> Vec<Problem> {
    vec![
        Problem {
            id: "two-sum".into(),
            title: "Two Sum".into(),
            description: "Given an array of integers and a target, return \
                the indices of the two numbers that add up to the target."
                .into(),
            difficulty: "easy".into(),
        },
        Problem {
            id: "valid-parentheses".into(),
            title: "Valid Parentheses".into(),
            description: "Given a string of brackets, determine if the \
                input is balanced and correctly nested."
                .into(),
            difficulty: "easy".into(),
        },
        Problem {
            id: "merge-intervals".into(),
            title: "Merge Intervals".into(),
            description: "Given a collection of intervals, merge all \
                overlapping intervals."
                .into(),
            difficulty: "medium".into(),
        },
        Problem {
            id: "lru-cache".into(),
            title: "LRU Cache".into(),
            description: "Design and implement a data structure for a \
                Least Recently Used cache."
                .into(),
            difficulty: "medium".into(),
        },
        Problem {
            id: "word-ladder".into(),
            title: "Word Ladder".into(),
            description: "Find the length of the shortest transformation \
                sequence from a start word to an end word."
                .into(),
            difficulty: "hard".into(),
        },
    ]
}

/// Deterministically pick a problem for a session.
///
/// Selection is a stable hash of the session id over the catalog: the same
/// session id always resolves to the same problem, and the choice does not
/// depend on wall-clock time or an injected RNG, so property tests and
/// restore-from-log replay remain reproducible.
pub fn pick_problem(session_id: &str) -> Problem {
    pick_problem_from(session_id, &builtin_catalog())
}

/// Same selection policy as [`pick_problem`], but against a caller-supplied
/// catalog (used by hosts that bundle their own problem set, and by tests).
pub fn pick_problem_from(session_id: &str, catalog: &[Problem]) -> Problem {
    assert!(!catalog.is_empty(), "problem catalog must not be empty");
    let index = (stable_hash(session_id) as usize) % catalog.len();
    catalog[index].clone()
}

fn stable_hash(s: &str) -> u64 {
    // FNV-1a: simple, dependency-free, and stable across runs/platforms,
    // which a `DefaultHasher`-based approach is not guaranteed to be.
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in s.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
