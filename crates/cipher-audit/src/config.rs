//! Runbook configuration.
//!
//! Configuration is loaded from a TOML file and may be overridden by
//! `CIPHER_AUDIT_*` environment variables. The loaded value is passed
//! explicitly into the connector; nothing is read at import time.

pub mod env;
pub mod file;

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use pan_xapi::TransportConfig;

use crate::error::{AuditError, Result};
use crate::recovery::RecoveryPolicy;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "cipher-audit.toml";

/// Default TCP/TLS connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Default commit job poll interval in seconds.
pub const DEFAULT_COMMIT_POLL_SECS: u64 = 2;

/// Default commit timeout in seconds.
pub const DEFAULT_COMMIT_TIMEOUT_SECS: u64 = 600;

/// Default grace period before the first recovery probe, in seconds.
pub const DEFAULT_RECOVERY_GRACE_SECS: u64 = 60;

/// Default interval between recovery probes, in seconds.
pub const DEFAULT_RECOVERY_POLL_SECS: u64 = 60;

/// Default bound on recovery connection attempts.
pub const DEFAULT_RECOVERY_MAX_ATTEMPTS: u32 = 30;

/// Top-level runbook configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditConfig {
    /// Device endpoint and credentials.
    #[serde(default)]
    pub device: DeviceSettings,
    /// Recovery polling policy.
    #[serde(default)]
    pub recovery: RecoverySettings,
}

/// Device endpoint settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceSettings {
    /// Device hostname or IP address.
    #[serde(default)]
    pub host: String,
    /// API key used to authenticate.
    #[serde(default)]
    pub api_key: String,
    /// Whether to verify the device's TLS certificate.
    #[serde(default)]
    pub verify_tls: bool,
    /// TCP/TLS connect timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Interval between commit job polls in seconds.
    #[serde(default = "default_commit_poll_secs")]
    pub commit_poll_secs: u64,
    /// Bound on waiting for a commit job in seconds.
    #[serde(default = "default_commit_timeout_secs")]
    pub commit_timeout_secs: u64,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            host: String::new(),
            api_key: String::new(),
            verify_tls: false,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            commit_poll_secs: DEFAULT_COMMIT_POLL_SECS,
            commit_timeout_secs: DEFAULT_COMMIT_TIMEOUT_SECS,
        }
    }
}

/// Recovery polling settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RecoverySettings {
    /// Grace period before the first probe, in seconds.
    #[serde(default = "default_recovery_grace_secs")]
    pub grace_secs: u64,
    /// Interval between probes, in seconds.
    #[serde(default = "default_recovery_poll_secs")]
    pub poll_secs: u64,
    /// Bound on connection attempts.
    #[serde(default = "default_recovery_max_attempts")]
    pub max_attempts: u32,
}

impl Default for RecoverySettings {
    fn default() -> Self {
        Self {
            grace_secs: DEFAULT_RECOVERY_GRACE_SECS,
            poll_secs: DEFAULT_RECOVERY_POLL_SECS,
            max_attempts: DEFAULT_RECOVERY_MAX_ATTEMPTS,
        }
    }
}

const fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

const fn default_commit_poll_secs() -> u64 {
    DEFAULT_COMMIT_POLL_SECS
}

const fn default_commit_timeout_secs() -> u64 {
    DEFAULT_COMMIT_TIMEOUT_SECS
}

const fn default_recovery_grace_secs() -> u64 {
    DEFAULT_RECOVERY_GRACE_SECS
}

const fn default_recovery_poll_secs() -> u64 {
    DEFAULT_RECOVERY_POLL_SECS
}

const fn default_recovery_max_attempts() -> u32 {
    DEFAULT_RECOVERY_MAX_ATTEMPTS
}

impl AuditConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        file::load(path)
    }

    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        file::load_or_default(path)
    }

    /// Apply `CIPHER_AUDIT_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        env::EnvOverrides::default().apply(self);
    }

    /// Validate that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.device.host.is_empty() {
            return Err(AuditError::config("device host is required"));
        }
        if self.device.api_key.is_empty() {
            return Err(AuditError::config("device API key is required"));
        }
        if self.recovery.max_attempts == 0 {
            return Err(AuditError::config(
                "recovery max_attempts must be at least 1",
            ));
        }
        Ok(())
    }

    /// Build the transport configuration.
    #[must_use]
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig::new()
            .with_connect_timeout(Duration::from_secs(self.device.connect_timeout_secs))
            .with_request_timeout(Duration::from_secs(self.device.request_timeout_secs))
            .with_verify_tls(self.device.verify_tls)
    }

    /// Build the recovery policy.
    #[must_use]
    pub fn recovery_policy(&self) -> RecoveryPolicy {
        RecoveryPolicy::new()
            .with_grace(Duration::from_secs(self.recovery.grace_secs))
            .with_interval(Duration::from_secs(self.recovery.poll_secs))
            .with_max_attempts(self.recovery.max_attempts)
    }

    /// Get the commit job poll interval.
    #[must_use]
    pub const fn commit_poll_interval(&self) -> Duration {
        Duration::from_secs(self.device.commit_poll_secs)
    }

    /// Get the commit timeout.
    #[must_use]
    pub const fn commit_timeout(&self) -> Duration {
        Duration::from_secs(self.device.commit_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AuditConfig::default();
        assert!(config.device.host.is_empty());
        assert!(!config.device.verify_tls);
        assert_eq!(config.device.connect_timeout_secs, 10);
        assert_eq!(config.recovery.grace_secs, 60);
        assert_eq!(config.recovery.max_attempts, 30);
    }

    #[test]
    fn validate_requires_host_and_key() {
        let mut config = AuditConfig::default();
        assert!(config.validate().is_err());
        config.device.host = "192.0.2.1".to_string();
        assert!(config.validate().is_err());
        config.device.api_key = "key".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_attempts() {
        let mut config = AuditConfig::default();
        config.device.host = "192.0.2.1".to_string();
        config.device.api_key = "key".to_string();
        config.recovery.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn recovery_policy_conversion() {
        let mut config = AuditConfig::default();
        config.recovery.grace_secs = 5;
        config.recovery.poll_secs = 7;
        config.recovery.max_attempts = 3;
        let policy = config.recovery_policy();
        assert_eq!(policy.grace, Duration::from_secs(5));
        assert_eq!(policy.interval, Duration::from_secs(7));
        assert_eq!(policy.max_attempts, 3);
    }
}
