//! Error types.
//!
//! Configuration problems surface as [`ConfigError`] at construction time.
//! Everything that can go wrong while assembling a single report is a
//! [`ReportError`]; the reporter logs those and never hands them to the host.

use thiserror::Error;

/// Errors raised while building or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("access token must be 32 alphanumeric characters")]
    InvalidAccessToken,

    #[error("configured person is missing the required `id` field")]
    MissingPersonId,

    #[error("invalid scrub pattern {pattern:?}: {source}")]
    InvalidScrubPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Errors raised while assembling one report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A host callable that is allowed to fail the report (fingerprint, title).
    #[error("{name} callback failed: {source}")]
    Callback {
        name: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ReportError {
    pub fn callback(name: &'static str, source: anyhow::Error) -> Self {
        ReportError::Callback { name, source }
    }
}
