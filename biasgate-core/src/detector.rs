//! `BiasDetector`: runs the three screens over a roster and turns their
//! results into a [`Verdict`].
//!
//! All three checks are evaluated before any result is inspected; the first
//! failure in [`BiasCategory::PRIORITY`] order decides the rejection. A token
//! is issued only when every check passes.

use crate::checks::{
    BiasCategory, CheckResult, age::check_age_bias, anomaly::check_anomalies,
    gender::check_gender_bias,
};
use crate::config::{AgeCheckConfig, AnomalyCheckConfig, BiasConfig, GenderCheckConfig};
use crate::error::Result;
use crate::roster::PatientRecord;
use crate::token::generate_token;
use crate::verdict::Verdict;
use biasgate_ml::{IsolationForest, OutlierDetector};
use std::sync::Arc;
use tracing::info;

/// Results of every check for one roster, in priority order.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    pub age: CheckResult,
    pub gender: CheckResult,
    pub anomaly: CheckResult,
}

impl CheckReport {
    pub fn get(&self, category: BiasCategory) -> &CheckResult {
        match category {
            BiasCategory::Age => &self.age,
            BiasCategory::Gender => &self.gender,
            BiasCategory::Anomaly => &self.anomaly,
        }
    }

    /// Highest-priority failing check, if any.
    pub fn first_failure(&self) -> Option<(BiasCategory, &CheckResult)> {
        BiasCategory::PRIORITY
            .into_iter()
            .map(|c| (c, self.get(c)))
            .find(|(_, r)| !r.passed)
    }

    pub fn all_passed(&self) -> bool {
        self.first_failure().is_none()
    }
}

/// Stateless roster screener. Holds only thresholds and the outlier model,
/// so one instance can be shared across requests.
#[derive(Clone)]
pub struct BiasDetector {
    age: AgeCheckConfig,
    gender: GenderCheckConfig,
    anomaly: AnomalyCheckConfig,
    model: Arc<dyn OutlierDetector>,
}

impl std::fmt::Debug for BiasDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BiasDetector")
            .field("age", &self.age)
            .field("gender", &self.gender)
            .field("anomaly", &self.anomaly)
            .field("model", &self.model.name())
            .finish()
    }
}

impl Default for BiasDetector {
    fn default() -> Self {
        Self::new(&BiasConfig::default())
    }
}

impl BiasDetector {
    /// Build a detector with an isolation forest configured from `config.anomaly`.
    pub fn new(config: &BiasConfig) -> Self {
        let model = Arc::new(IsolationForest::new(config.anomaly.forest_config()));
        Self::with_model(config, model)
    }

    /// Build a detector around a caller-supplied outlier model.
    pub fn with_model(config: &BiasConfig, model: Arc<dyn OutlierDetector>) -> Self {
        Self {
            age: config.age.clone(),
            gender: config.gender.clone(),
            anomaly: config.anomaly.clone(),
            model,
        }
    }

    pub fn check_age_bias(&self, patients: &[PatientRecord]) -> CheckResult {
        check_age_bias(patients, &self.age)
    }

    pub fn check_gender_bias(&self, patients: &[PatientRecord]) -> CheckResult {
        check_gender_bias(patients, &self.gender)
    }

    pub fn check_anomalies(&self, patients: &[PatientRecord]) -> Result<CheckResult> {
        check_anomalies(patients, &self.anomaly, self.model.as_ref())
    }

    /// Run every check, regardless of earlier failures.
    pub fn run_checks(&self, patients: &[PatientRecord]) -> Result<CheckReport> {
        let age = self.check_age_bias(patients);
        let gender = self.check_gender_bias(patients);
        let anomaly = self.check_anomalies(patients)?;
        Ok(CheckReport {
            age,
            gender,
            anomaly,
        })
    }

    pub fn generate_token(&self, trial_id: &str) -> String {
        generate_token(trial_id)
    }

    /// Screen `patients` and produce the verdict for `trial_id`.
    pub fn evaluate(&self, trial_id: &str, patients: &[PatientRecord]) -> Result<Verdict> {
        let report = self.run_checks(patients)?;

        if let Some((category, result)) = report.first_failure() {
            let reason = result
                .reason
                .clone()
                .unwrap_or_else(|| category.tag().to_string());
            info!(trial_id, %category, reason = %reason, "Trial rejected");
            return Ok(Verdict::rejected(category, reason));
        }

        let token = self.generate_token(trial_id);
        info!(trial_id, token = %token, "All checks passed");
        Ok(Verdict::accepted(token))
    }
}
