//! Error types for the audit runbook.

use std::io;
use std::path::PathBuf;

use pan_xapi::XapiError;
use thiserror::Error;

/// The error type for runbook operations.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The configuration is invalid.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the problem.
        message: String,
    },

    /// The configuration file could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    ConfigRead {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The configuration file could not be parsed.
    #[error("failed to parse config file {}: {source}", path.display())]
    ConfigParse {
        /// The file that could not be parsed.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// The device did not come back within the recovery budget.
    #[error("device did not recover after {attempts} reconnection attempts")]
    RecoveryTimeout {
        /// The number of attempts made.
        attempts: u32,
    },

    /// A device operation failed.
    #[error(transparent)]
    Device(#[from] XapiError),
}

/// Result type alias for runbook operations.
pub type Result<T> = std::result::Result<T, AuditError>;

impl AuditError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this is a recovery timeout.
    #[must_use]
    pub const fn is_recovery_timeout(&self) -> bool {
        matches!(self, Self::RecoveryTimeout { .. })
    }
}
