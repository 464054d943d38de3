//! Response entity of `POST /check-bias`.

use crate::checks::BiasCategory;
use serde::{Deserialize, Serialize};

/// Reason reported on acceptance.
pub const ACCEPTED_REASON: &str = "All bias checks passed";

/// Severity label attached to an accepted roster.
pub const PASS_BIAS_SCORE: u8 = 10;

/// Final decision for a roster. `ml_token` is serialized as `null` on
/// rejection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub passed: bool,
    pub reason: String,
    pub ml_token: Option<String>,
    #[serde(rename = "biasScore")]
    pub bias_score: u8,
}

impl Verdict {
    pub fn accepted(token: String) -> Self {
        Self {
            passed: true,
            reason: ACCEPTED_REASON.to_string(),
            ml_token: Some(token),
            bias_score: PASS_BIAS_SCORE,
        }
    }

    pub fn rejected(category: BiasCategory, reason: String) -> Self {
        Self {
            passed: false,
            reason,
            ml_token: None,
            bias_score: category.bias_score(),
        }
    }
}
