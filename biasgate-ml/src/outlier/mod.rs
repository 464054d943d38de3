//! Outlier detection capability and its implementations.

mod isolation_forest;

pub use isolation_forest::{FittedForest, IsolationForest, IsolationForestConfig};

use crate::error::MlError;
use serde::{Deserialize, Serialize};

/// Label assigned to a single sample by an outlier model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlierLabel {
    Inlier,
    Outlier,
}

impl OutlierLabel {
    /// Conventional signed encoding: `+1` for inliers, `-1` for outliers.
    pub fn as_i8(self) -> i8 {
        match self {
            Self::Inlier => 1,
            Self::Outlier => -1,
        }
    }

    pub fn is_outlier(self) -> bool {
        matches!(self, Self::Outlier)
    }
}

/// An unsupervised model that is fit on a feature matrix and labels every row
/// of that same matrix.
///
/// `features` is row-major: one `Vec<f64>` per sample, all of equal width.
/// Implementations must be deterministic for a given configuration and input.
pub trait OutlierDetector: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Fit the model on `features` and return one label per row, in order.
    fn fit_predict(&self, features: &[Vec<f64>]) -> Result<Vec<OutlierLabel>, MlError>;
}

/// Check that `features` is a rectangular matrix of finite values and return
/// its width. An empty matrix has width 0.
pub(crate) fn validate_features(features: &[Vec<f64>]) -> Result<usize, MlError> {
    let Some(first) = features.first() else {
        return Ok(0);
    };
    let width = first.len();
    if width == 0 {
        return Err(MlError::invalid_input("feature rows must not be empty"));
    }
    for (i, row) in features.iter().enumerate() {
        if row.len() != width {
            return Err(MlError::invalid_input(format!(
                "row {} has {} features, expected {}",
                i,
                row.len(),
                width
            )));
        }
        if let Some(value) = row.iter().find(|v| !v.is_finite()) {
            return Err(MlError::invalid_input(format!(
                "row {} contains non-finite value {}",
                i, value
            )));
        }
    }
    Ok(width)
}
