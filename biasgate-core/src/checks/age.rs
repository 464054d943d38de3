//! Age-skew check: rejects rosters dominated by young adults.

use super::{BiasCategory, CheckResult, percent};
use crate::config::AgeCheckConfig;
use crate::roster::PatientRecord;
use tracing::info;

pub fn check_age_bias(patients: &[PatientRecord], config: &AgeCheckConfig) -> CheckResult {
    if patients.is_empty() {
        return CheckResult::pass();
    }

    let total = patients.len();
    let young = patients
        .iter()
        .filter(|p| (config.young_min..=config.young_max).contains(&p.age()))
        .count();

    let young_pct = percent(young, total);
    info!("Age check: {:.1}% young patients", young_pct);

    if young_pct > config.max_young_pct {
        return CheckResult::fail(
            BiasCategory::Age,
            format!(
                "{:.1}% patients are {}-{}",
                young_pct, config.young_min, config.young_max
            ),
        );
    }
    CheckResult::pass()
}
