//! Interview Conditioning preset and problem registries.
//!
//! Pure lookup tables consumed by the session engine at `session.started`
//! time:
//! - [`preset`] — the three named timing/nudge presets.
//! - [`problem`] — the problem catalog and deterministic selection policy.

pub mod preset;
pub mod problem;

pub use preset::{get_preset, list_presets, Preset, PresetName};
pub use problem::{pick_problem, pick_problem_from, Problem};
