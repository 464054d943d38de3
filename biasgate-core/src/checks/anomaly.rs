//! Age-outlier screen backed by an [`OutlierDetector`].
//!
//! The model is fit fresh on every roster. Its contamination setting and the
//! rejection ratio are independent knobs: the model expects roughly
//! `contamination` outliers, the roster is only rejected when more than
//! `max_anomaly_ratio` of it is flagged.

use super::{BiasCategory, CheckResult, percent};
use crate::config::AnomalyCheckConfig;
use crate::error::Result;
use crate::roster::PatientRecord;
use biasgate_ml::{OutlierDetector, OutlierLabel};
use tracing::{debug, info};

/// One single-column feature row per patient: the age, defaulted to 0.
pub fn age_features(patients: &[PatientRecord]) -> Vec<Vec<f64>> {
    patients.iter().map(|p| vec![p.age()]).collect()
}

/// Per-record outlier labels for `patients`.
pub fn label_outliers(
    patients: &[PatientRecord],
    model: &dyn OutlierDetector,
) -> Result<Vec<OutlierLabel>> {
    let labels = model.fit_predict(&age_features(patients))?;
    debug!(
        model = model.name(),
        records = labels.len(),
        "Outlier labels computed"
    );
    Ok(labels)
}

pub fn check_anomalies(
    patients: &[PatientRecord],
    config: &AnomalyCheckConfig,
    model: &dyn OutlierDetector,
) -> Result<CheckResult> {
    if patients.len() < config.min_samples {
        return Ok(CheckResult::pass());
    }

    let total = patients.len();
    let anomalies = label_outliers(patients, model)?
        .into_iter()
        .filter(|l| l.is_outlier())
        .count();
    let anomaly_pct = percent(anomalies, total);
    info!("Anomaly check: {:.1}% outliers", anomaly_pct);

    if anomalies as f64 > total as f64 * config.max_anomaly_ratio {
        return Ok(CheckResult::fail(
            BiasCategory::Anomaly,
            format!("{} unusual patients ({:.1}%)", anomalies, anomaly_pct),
        ));
    }
    Ok(CheckResult::pass())
}
