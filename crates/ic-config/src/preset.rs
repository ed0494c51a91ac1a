//! Named timing/nudge presets.
//!
//! A closed, small set of configurations — unlike the rest of this crate's
//! registries, the set of valid names is known at compile time, so lookup
//! is infallible once a `PresetName` has been parsed.

use serde::{Deserialize, Serialize};

/// The three recognized preset names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetName {
    Standard,
    HighPressure,
    NoAssistance,
}

impl PresetName {
    /// All recognized preset names, in a stable display order.
    pub const ALL: [PresetName; 3] = [
        PresetName::Standard,
        PresetName::HighPressure,
        PresetName::NoAssistance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PresetName::Standard => "standard",
            PresetName::HighPressure => "high_pressure",
            PresetName::NoAssistance => "no_assistance",
        }
    }

    /// Parse a preset name from its wire/string form. Returns `None` for
    /// anything outside the closed set.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "standard" => Some(PresetName::Standard),
            "high_pressure" => Some(PresetName::HighPressure),
            "no_assistance" => Some(PresetName::NoAssistance),
            _ => None,
        }
    }
}

impl std::fmt::Display for PresetName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable timing/nudge configuration for one preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub prep_ms: u64,
    pub coding_ms: u64,
    pub silent_ms: u64,
    pub nudge_budget: u32,
}

/// Look up the immutable config for a preset name. Infallible: the three
/// names are the whole closed set `PresetName` can represent.
pub fn get_preset(name: PresetName) -> Preset {
    match name {
        PresetName::Standard => Preset {
            prep_ms: 300_000,
            coding_ms: 2_100_000,
            silent_ms: 300_000,
            nudge_budget: 3,
        },
        PresetName::HighPressure => Preset {
            prep_ms: 180_000,
            coding_ms: 1_500_000,
            silent_ms: 180_000,
            nudge_budget: 1,
        },
        PresetName::NoAssistance => Preset {
            prep_ms: 300_000,
            coding_ms: 2_100_000,
            silent_ms: 300_000,
            nudge_budget: 0,
        },
    }
}

/// All recognized preset names, for UI listing.
pub fn list_presets() -> &'static [PresetName] {
    &PresetName::ALL
}
