//! Error types for biasgate core.
//!
//! Uses `thiserror` for public API error types. Request-level failures are
//! collapsed into a single `MalformedRequest` kind; everything else is an
//! internal failure of the model, configuration or I/O layer.

use biasgate_ml::MlError;

/// Top-level error type for the biasgate core library.
#[derive(Debug, thiserror::Error)]
pub enum BiasError {
    #[error("Malformed request: {message}")]
    MalformedRequest { message: String },

    #[error("Outlier model error: {0}")]
    Model(#[from] MlError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BiasError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRequest {
            message: message.into(),
        }
    }

    /// Stable machine-readable code reported to HTTP clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedRequest { .. } => "MALFORMED_REQUEST",
            _ => "INTERNAL_ERROR",
        }
    }
}

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Invalid value for '{field}': {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BiasError>;
