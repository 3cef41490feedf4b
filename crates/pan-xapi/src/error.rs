//! Error types for the PAN-OS XML API client.
//!
//! The taxonomy separates failures the caller may want to retry (the device
//! being unreachable while it reboots) from failures that indicate a rejected
//! request or a malformed response.

use thiserror::Error;

/// Format the optional API error code for display.
fn format_code(code: Option<u32>) -> String {
    code.map_or_else(String::new, |c| format!(" (code {c})"))
}

/// Format the optional commit job id for display.
fn format_job(job: Option<u64>) -> String {
    job.map_or_else(String::new, |j| format!(" (job {j})"))
}

/// The error type for XML API operations.
#[derive(Debug, Error)]
pub enum XapiError {
    /// The device endpoint could not be reached.
    #[error("failed to reach {host}: {reason}")]
    Connection {
        /// The host that could not be reached.
        host: String,
        /// The reason for the failure.
        reason: String,
    },

    /// The API key was rejected.
    #[error("authentication rejected by {host}: {reason}")]
    Auth {
        /// The host that rejected the credentials.
        host: String,
        /// The reason for the rejection.
        reason: String,
    },

    /// A configuration read failed or returned a malformed structure.
    #[error("configuration query at '{xpath}' failed: {reason}")]
    Query {
        /// The xpath that was queried.
        xpath: String,
        /// The reason for the failure.
        reason: String,
    },

    /// A commit was rejected or its job failed.
    #[error("commit{} failed: {reason}", format_job(*job))]
    Commit {
        /// The commit job id, if one was enqueued.
        job: Option<u64>,
        /// The reason for the failure.
        reason: String,
    },

    /// A restart operational command was rejected.
    #[error("restart of {target} rejected: {reason}")]
    Restart {
        /// What was being restarted (a service name or "system").
        target: String,
        /// The reason for the rejection.
        reason: String,
    },

    /// The device answered with an error status.
    #[error("device returned error{}: {message}", format_code(*code))]
    Device {
        /// The API error code, if present.
        code: Option<u32>,
        /// The device's error message.
        message: String,
    },

    /// The response body was not well-formed XML.
    #[error("malformed device response: {0}")]
    Xml(#[from] roxmltree::Error),

    /// An HTTP-level error that is not a connection failure.
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for XML API operations.
pub type Result<T> = std::result::Result<T, XapiError>;

impl XapiError {
    /// Create a connection error.
    pub fn connection(host: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Connection {
            host: host.into(),
            reason: reason.into(),
        }
    }

    /// Create an authentication error.
    pub fn auth(host: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Auth {
            host: host.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration query error.
    pub fn query(xpath: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Query {
            xpath: xpath.into(),
            reason: reason.into(),
        }
    }

    /// Create a commit error.
    pub fn commit(job: Option<u64>, reason: impl Into<String>) -> Self {
        Self::Commit {
            job,
            reason: reason.into(),
        }
    }

    /// Create a restart error.
    pub fn restart(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Restart {
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Create a device error.
    pub fn device(code: Option<u32>, message: impl Into<String>) -> Self {
        Self::Device {
            code,
            message: message.into(),
        }
    }

    /// Check if this is a connection-level failure.
    ///
    /// Only connection-level failures are retried by recovery polling; every
    /// other kind indicates the device is up and rejected the request.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// Check if this is an authentication failure.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }
}
