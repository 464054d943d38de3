//! # biasgate-ml: outlier detection
//!
//! Unsupervised outlier models used by the biasgate anomaly screen. Models are
//! exposed through the [`OutlierDetector`] capability so callers can swap the
//! algorithm without touching their own orchestration.

pub mod error;
pub mod outlier;

pub use error::MlError;
pub use outlier::{
    FittedForest, IsolationForest, IsolationForestConfig, OutlierDetector, OutlierLabel,
};
