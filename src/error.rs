//! Error types for the deployment wrapper
//!
//! `ProvisionError` is what the provisioning interface reports. It is carried
//! upward verbatim inside `AppError::Provisioning`; nothing is retried or
//! swallowed on the way.

use thiserror::Error;

/// Failures reported by a provisioning backend
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProvisionError {
    #[error("provisioning platform unreachable: {0}")]
    Unreachable(String),

    #[error("model '{0}' does not exist and could not be created")]
    ModelNotFound(String),

    #[error("malformed channel '{channel}': {reason}")]
    MalformedChannel { channel: String, reason: String },

    #[error("channel '{0}' does not exist for this charm")]
    UnknownChannel(String),

    #[error("invalid revision {0}: revision must be >= 0")]
    InvalidRevision(i64),

    #[error("revision {revision} not found in channel '{channel}'")]
    RevisionNotFound { channel: String, revision: i64 },

    #[error("not authorized: {0}")]
    Unauthorized(String),

    #[error("incompatible provider interface {found}, required {required}")]
    IncompatibleProvider { found: String, required: String },

    #[error("`{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("unexpected output from provisioning platform: {0}")]
    UnexpectedOutput(String),
}

/// Top-level error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Provisioning(#[from] ProvisionError),
}

impl AppError {
    pub fn config(msg: &str) -> Self {
        AppError::Config(msg.to_string())
    }

    /// The provisioning failure behind this error, if any
    pub fn provision_error(&self) -> Option<&ProvisionError> {
        match self {
            AppError::Provisioning(e) => Some(e),
            AppError::Config(_) => None,
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
