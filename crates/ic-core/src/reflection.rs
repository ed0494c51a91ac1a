//! Reflection response schema.
//!
//! `serde(deny_unknown_fields)` plus required (non-`Option`) fields give the
//! "exactly these five keys" part of validation for free at deserialization
//! time; the cross-field rule between `prolonged_stall` and
//! `recovered_from_stall` still has to be checked explicitly by the state
//! machine, since serde has no notion of it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearApproach {
    Yes,
    Partially,
    No,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProlongedStall {
    Yes,
    No,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveredFromStall {
    Yes,
    Partially,
    No,
    #[serde(rename = "n/a")]
    NotApplicable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimePressure {
    Comfortable,
    Manageable,
    Overwhelming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WouldChangeApproach {
    Yes,
    No,
}

/// The fixed reflection schema: exactly these five keys, each restricted to
/// its permitted values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReflectionResponses {
    pub clear_approach: ClearApproach,
    pub prolonged_stall: ProlongedStall,
    pub recovered_from_stall: RecoveredFromStall,
    pub time_pressure: TimePressure,
    pub would_change_approach: WouldChangeApproach,
}

impl ReflectionResponses {
    /// The cross-field rule: `recoveredFromStall = n/a` iff
    /// `prolongedStall = no`.
    pub fn is_cross_field_consistent(&self) -> bool {
        match self.prolonged_stall {
            ProlongedStall::No => self.recovered_from_stall == RecoveredFromStall::NotApplicable,
            ProlongedStall::Yes => self.recovered_from_stall != RecoveredFromStall::NotApplicable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ReflectionResponses {
        ReflectionResponses {
            clear_approach: ClearApproach::Yes,
            prolonged_stall: ProlongedStall::No,
            recovered_from_stall: RecoveredFromStall::NotApplicable,
            time_pressure: TimePressure::Comfortable,
            would_change_approach: WouldChangeApproach::No,
        }
    }

    #[test]
    fn cross_field_rule_accepts_no_stall_with_na() {
        assert!(valid().is_cross_field_consistent());
    }

    #[test]
    fn cross_field_rule_rejects_no_stall_with_non_na() {
        let mut r = valid();
        r.recovered_from_stall = RecoveredFromStall::Yes;
        assert!(!r.is_cross_field_consistent());
    }

    #[test]
    fn cross_field_rule_rejects_stall_with_na() {
        let mut r = valid();
        r.prolonged_stall = ProlongedStall::Yes;
        r.recovered_from_stall = RecoveredFromStall::NotApplicable;
        assert!(!r.is_cross_field_consistent());
    }

    #[test]
    fn cross_field_rule_accepts_stall_with_partial_recovery() {
        let mut r = valid();
        r.prolonged_stall = ProlongedStall::Yes;
        r.recovered_from_stall = RecoveredFromStall::Partially;
        assert!(r.is_cross_field_consistent());
    }

    #[test]
    fn rejects_unknown_fields() {
        let json = serde_json::json!({
            "clearApproach": "yes",
            "prolongedStall": "no",
            "recoveredFromStall": "n/a",
            "timePressure": "comfortable",
            "wouldChangeApproach": "no",
            "extraField": "nope",
        });
        let parsed: Result<ReflectionResponses, _> = serde_json::from_value(json);
        assert!(parsed.is_err());
    }

    #[test]
    fn rejects_missing_fields() {
        let json = serde_json::json!({
            "clearApproach": "yes",
            "prolongedStall": "no",
        });
        let parsed: Result<ReflectionResponses, _> = serde_json::from_value(json);
        assert!(parsed.is_err());
    }

    #[test]
    fn accepts_the_full_valid_schema() {
        let json = serde_json::json!({
            "clearApproach": "yes",
            "prolongedStall": "no",
            "recoveredFromStall": "n/a",
            "timePressure": "comfortable",
            "wouldChangeApproach": "no",
        });
        let parsed: ReflectionResponses = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, valid());
    }
}
