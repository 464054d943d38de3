//! # biasgate-core
//!
//! Screens clinical trial rosters for demographic bias and statistical
//! anomalies and issues an approval token when every screen passes.
//!
//! The [`BiasDetector`] runs three independent checks (age skew, gender
//! balance, age outliers) and turns them into a [`Verdict`]. The
//! [`gateway`] module serves it over HTTP.

pub mod checks;
pub mod config;
pub mod detector;
pub mod error;
pub mod gateway;
pub mod roster;
pub mod token;
pub mod verdict;

pub use checks::{BiasCategory, CheckResult};
pub use config::{BiasConfig, load_config};
pub use detector::{BiasDetector, CheckReport};
pub use error::{BiasError, ConfigError};
pub use roster::{CheckBiasRequest, PatientRecord, RosterInput, Sex};
pub use verdict::Verdict;
