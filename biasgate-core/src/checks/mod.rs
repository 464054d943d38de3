//! The three roster screens. Each check is independent: it receives the whole
//! roster and its own thresholds, and never sees another check's result.

pub mod age;
pub mod anomaly;
pub mod gender;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Screen that produced a result, in rejection priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiasCategory {
    Age,
    Gender,
    Anomaly,
}

impl BiasCategory {
    /// All categories, highest priority first.
    pub const PRIORITY: [BiasCategory; 3] = [Self::Age, Self::Gender, Self::Anomaly];

    /// Tag that prefixes the rejection reason.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Age => "AGE BIAS",
            Self::Gender => "GENDER BIAS",
            Self::Anomaly => "ANOMALIES DETECTED",
        }
    }

    /// Fixed severity label reported when this screen rejects a roster.
    pub fn bias_score(self) -> u8 {
        match self {
            Self::Age => 90,
            Self::Gender => 75,
            Self::Anomaly => 50,
        }
    }
}

impl fmt::Display for BiasCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Outcome of a single check. `reason` is only present on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CheckResult {
    pub fn pass() -> Self {
        Self {
            passed: true,
            reason: None,
        }
    }

    pub fn fail(category: BiasCategory, detail: impl fmt::Display) -> Self {
        Self {
            passed: false,
            reason: Some(format!("{}: {}", category.tag(), detail)),
        }
    }
}

/// Share of `part` in `whole`, as a percentage.
pub(crate) fn percent(part: usize, whole: usize) -> f64 {
    part as f64 / whole as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        let scores: Vec<u8> = BiasCategory::PRIORITY
            .iter()
            .map(|c| c.bias_score())
            .collect();
        assert_eq!(scores, vec![90, 75, 50]);
    }

    #[test]
    fn test_fail_formats_reason() {
        let result = CheckResult::fail(BiasCategory::Gender, "90.0% male, 10.0% female");
        assert!(!result.passed);
        assert_eq!(
            result.reason.as_deref(),
            Some("GENDER BIAS: 90.0% male, 10.0% female")
        );
    }

    #[test]
    fn test_pass_has_no_reason() {
        let json = serde_json::to_value(CheckResult::pass()).unwrap();
        assert_eq!(json, serde_json::json!({"passed": true}));
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(9, 10), 90.0);
        assert_eq!(percent(4, 5), 80.0);
    }
}
