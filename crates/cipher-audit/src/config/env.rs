//! Environment-based configuration overrides.

use crate::config::AuditConfig;

/// Environment variable prefix.
pub const DEFAULT_PREFIX: &str = "CIPHER_AUDIT";

/// Environment variable override reader.
#[derive(Debug, Clone)]
pub struct EnvOverrides {
    prefix: String,
}

impl Default for EnvOverrides {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl EnvOverrides {
    /// Create a reader with the given prefix.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Build the full environment variable name.
    fn var_name(&self, name: &str) -> String {
        format!("{}_{}", self.prefix, name.to_uppercase())
    }

    /// Get a string value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        std::env::var(self.var_name(name)).ok()
    }

    /// Get a parsed value.
    #[must_use]
    pub fn parse<T: std::str::FromStr>(&self, name: &str) -> Option<T> {
        self.get(name).and_then(|v| v.parse().ok())
    }

    /// Get a boolean value.
    #[must_use]
    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).map(|v| {
            matches!(
                v.to_lowercase().as_str(),
                "1" | "true" | "yes" | "on" | "enabled"
            )
        })
    }

    /// Apply every recognized override to `config`.
    pub fn apply(&self, config: &mut AuditConfig) {
        if let Some(host) = self.get("host") {
            config.device.host = host;
        }
        if let Some(key) = self.get("api_key") {
            config.device.api_key = key;
        }
        if let Some(verify) = self.bool("verify_tls") {
            config.device.verify_tls = verify;
        }
        if let Some(secs) = self.parse("connect_timeout_secs") {
            config.device.connect_timeout_secs = secs;
        }
        if let Some(secs) = self.parse("request_timeout_secs") {
            config.device.request_timeout_secs = secs;
        }
        if let Some(secs) = self.parse("recovery_grace_secs") {
            config.recovery.grace_secs = secs;
        }
        if let Some(secs) = self.parse("recovery_poll_secs") {
            config.recovery.poll_secs = secs;
        }
        if let Some(attempts) = self.parse("recovery_max_attempts") {
            config.recovery.max_attempts = attempts;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own prefix so parallel tests cannot interfere.

    #[test]
    fn overrides_apply_over_file_values() {
        let prefix = "CIPHER_AUDIT_TEST_A";
        // SAFETY: test-only; the variable names are unique to this test.
        unsafe {
            std::env::set_var(format!("{prefix}_HOST"), "203.0.113.9");
            std::env::set_var(format!("{prefix}_API_KEY"), "env-key");
            std::env::set_var(format!("{prefix}_VERIFY_TLS"), "true");
            std::env::set_var(format!("{prefix}_RECOVERY_MAX_ATTEMPTS"), "7");
        }

        let mut config = AuditConfig::default();
        config.device.host = "from-file".to_string();
        EnvOverrides::new(prefix).apply(&mut config);

        assert_eq!(config.device.host, "203.0.113.9");
        assert_eq!(config.device.api_key, "env-key");
        assert!(config.device.verify_tls);
        assert_eq!(config.recovery.max_attempts, 7);
    }

    #[test]
    fn unset_variables_leave_config_untouched() {
        let mut config = AuditConfig::default();
        config.device.host = "kept".to_string();
        EnvOverrides::new("CIPHER_AUDIT_TEST_B").apply(&mut config);
        assert_eq!(config.device.host, "kept");
        assert_eq!(config.recovery.max_attempts, 30);
    }

    #[test]
    fn unparseable_values_are_ignored() {
        let prefix = "CIPHER_AUDIT_TEST_C";
        // SAFETY: test-only; the variable name is unique to this test.
        unsafe {
            std::env::set_var(format!("{prefix}_RECOVERY_MAX_ATTEMPTS"), "not-a-number");
        }
        let mut config = AuditConfig::default();
        EnvOverrides::new(prefix).apply(&mut config);
        assert_eq!(config.recovery.max_attempts, 30);
    }
}
