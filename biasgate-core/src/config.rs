//! Configuration system for biasgate.
//!
//! Uses `figment` for layered configuration: defaults -> user file -> workspace
//! file -> explicit file -> environment. The defaults reproduce the screening
//! thresholds exactly; every layer is optional.

use crate::error::ConfigError;
use biasgate_ml::IsolationForestConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BiasConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub age: AgeCheckConfig,
    #[serde(default)]
    pub gender: GenderCheckConfig,
    #[serde(default)]
    pub anomaly: AnomalyCheckConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on (0 picks an ephemeral port).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Name reported by `GET /health`.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            service_name: default_service_name(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_service_name() -> String {
    "ML Bias Detector".to_string()
}

/// Age-skew check thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeCheckConfig {
    /// Lower bound of the "young" band, inclusive.
    #[serde(default = "default_young_min")]
    pub young_min: f64,
    /// Upper bound of the "young" band, inclusive.
    #[serde(default = "default_young_max")]
    pub young_max: f64,
    /// Rejection when the young share strictly exceeds this percentage.
    #[serde(default = "default_max_young_pct")]
    pub max_young_pct: f64,
}

impl Default for AgeCheckConfig {
    fn default() -> Self {
        Self {
            young_min: default_young_min(),
            young_max: default_young_max(),
            max_young_pct: default_max_young_pct(),
        }
    }
}

fn default_young_min() -> f64 {
    18.0
}

fn default_young_max() -> f64 {
    40.0
}

fn default_max_young_pct() -> f64 {
    80.0
}

/// Gender-balance check thresholds. The male share must stay within
/// `[min_male_pct, max_male_pct]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenderCheckConfig {
    #[serde(default = "default_min_male_pct")]
    pub min_male_pct: f64,
    #[serde(default = "default_max_male_pct")]
    pub max_male_pct: f64,
}

impl Default for GenderCheckConfig {
    fn default() -> Self {
        Self {
            min_male_pct: default_min_male_pct(),
            max_male_pct: default_max_male_pct(),
        }
    }
}

fn default_min_male_pct() -> f64 {
    20.0
}

fn default_max_male_pct() -> f64 {
    80.0
}

/// Anomaly check settings and outlier model hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyCheckConfig {
    /// Rosters smaller than this always pass.
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
    /// Rejection when flagged records strictly exceed this fraction of the roster.
    #[serde(default = "default_max_anomaly_ratio")]
    pub max_anomaly_ratio: f64,
    /// Expected outlier fraction handed to the model.
    #[serde(default = "default_contamination")]
    pub contamination: f64,
    /// Model seed; fixed so identical rosters get identical labels.
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
}

impl Default for AnomalyCheckConfig {
    fn default() -> Self {
        Self {
            min_samples: default_min_samples(),
            max_anomaly_ratio: default_max_anomaly_ratio(),
            contamination: default_contamination(),
            seed: default_seed(),
            n_estimators: default_n_estimators(),
            max_samples: default_max_samples(),
        }
    }
}

impl AnomalyCheckConfig {
    pub fn forest_config(&self) -> IsolationForestConfig {
        IsolationForestConfig {
            n_estimators: self.n_estimators,
            max_samples: self.max_samples,
            contamination: self.contamination,
            seed: self.seed,
        }
    }
}

fn default_min_samples() -> usize {
    10
}

fn default_max_anomaly_ratio() -> f64 {
    0.15
}

fn default_contamination() -> f64 {
    0.1
}

fn default_seed() -> u64 {
    42
}

fn default_n_estimators() -> usize {
    100
}

fn default_max_samples() -> usize {
    256
}

impl BiasConfig {
    /// Reject settings the checks cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.age.young_min > self.age.young_max {
            return Err(ConfigError::invalid(
                "age.young_min",
                format!(
                    "{} is above age.young_max ({})",
                    self.age.young_min, self.age.young_max
                ),
            ));
        }
        if !(0.0..=100.0).contains(&self.age.max_young_pct) {
            return Err(ConfigError::invalid(
                "age.max_young_pct",
                "must be between 0 and 100",
            ));
        }
        if self.gender.min_male_pct > self.gender.max_male_pct {
            return Err(ConfigError::invalid(
                "gender.min_male_pct",
                format!(
                    "{} is above gender.max_male_pct ({})",
                    self.gender.min_male_pct, self.gender.max_male_pct
                ),
            ));
        }
        if !(0.0..=1.0).contains(&self.anomaly.max_anomaly_ratio) {
            return Err(ConfigError::invalid(
                "anomaly.max_anomaly_ratio",
                "must be between 0 and 1",
            ));
        }
        self.anomaly
            .forest_config()
            .validate()
            .map_err(|e| ConfigError::invalid("anomaly", e.to_string()))?;
        Ok(())
    }
}

/// Path of the user-level config file, if a home directory can be resolved.
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "biasgate", "biasgate")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Path of the workspace-level config file.
pub fn workspace_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".biasgate").join("config.toml")
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with `BIASGATE_`, `__` for nesting)
/// 2. Explicit config file (`--config`)
/// 3. Workspace-local config (`.biasgate/config.toml`)
/// 4. User config (`~/.config/biasgate/config.toml`)
/// 5. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    explicit: Option<&Path>,
) -> Result<BiasConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(BiasConfig::default()));

    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(ws) = workspace {
        let ws_config = workspace_config_path(ws);
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    if let Some(path) = explicit {
        figment = figment.merge(Toml::file_exact(path));
    }

    // BIASGATE_SERVER__PORT, BIASGATE_ANOMALY__SEED, ...
    figment = figment.merge(Env::prefixed("BIASGATE_").split("__"));

    let config: BiasConfig = figment.extract().map_err(Box::new)?;
    config.validate()?;
    Ok(config)
}
