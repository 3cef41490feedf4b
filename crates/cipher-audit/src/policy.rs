//! Cipher policy model: services, desired ciphers, and the comparator.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

/// The desired cipher policy, in the order the ciphers are applied.
pub const DESIRED_CIPHERS: [&str; 8] = [
    "aes128-cbc",
    "aes192-cbc",
    "aes256-cbc",
    "aes128-ctr",
    "aes192-ctr",
    "aes256-ctr",
    "aes128-gcm",
    "aes256-gcm",
];

/// A firewall subsystem whose SSH cipher policy is independently configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    /// The management interface.
    Mgmt,
    /// The high-availability interface.
    Ha,
}

impl Service {
    /// Every service, in processing order.
    pub const ALL: [Self; 2] = [Self::Mgmt, Self::Ha];

    /// Get the wire token used in xpaths and command fragments.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Mgmt => "mgmt",
            Self::Ha => "ha",
        }
    }

    /// Get the human-readable name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Mgmt => "management",
            Self::Ha => "high-availability",
        }
    }

    /// Get the xpath of this service's SSH cipher subtree.
    #[must_use]
    pub fn ciphers_xpath(self) -> String {
        format!(
            "/config/devices/entry[@name='localhost.localdomain']\
             /deviceconfig/system/ssh/ciphers/{}",
            self.token()
        )
    }

    /// Get the operational command fragment that restarts this service's SSH
    /// daemon.
    #[must_use]
    pub fn restart_cmd(self) -> String {
        let token = self.token();
        format!("<set><ssh><service-restart><{token}></{token}></service-restart></ssh></set>")
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// The set of ciphers currently configured on the device for one service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfiguredCiphers(BTreeSet<String>);

impl ConfiguredCiphers {
    /// Create an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Check if a cipher token is present.
    #[must_use]
    pub fn contains(&self, cipher: &str) -> bool {
        self.0.contains(cipher)
    }

    /// Get the number of configured ciphers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no ciphers are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the configured cipher tokens.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl FromIterator<String> for ConfiguredCiphers {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for ConfiguredCiphers {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(iter.into_iter().map(str::to_string).collect())
    }
}

/// Result of comparing the desired policy against a configured set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compliance {
    /// Every desired cipher is already configured.
    Satisfied,
    /// Some desired ciphers are missing.
    Missing {
        /// The missing ciphers, in policy order.
        ciphers: Vec<String>,
    },
}

impl Compliance {
    /// Check if the policy is satisfied.
    #[must_use]
    pub const fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied)
    }
}

/// Per-service remediation outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemediationStatus {
    /// The desired ciphers were already configured.
    AlreadySatisfied,
    /// The service's ciphers were changed.
    Remediated,
}

impl RemediationStatus {
    /// Check if the service was changed.
    #[must_use]
    pub const fn is_remediated(self) -> bool {
        matches!(self, Self::Remediated)
    }
}

/// The ordered list of ciphers a service must allow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherPolicy {
    ciphers: Vec<String>,
}

impl Default for CipherPolicy {
    fn default() -> Self {
        Self {
            ciphers: DESIRED_CIPHERS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl CipherPolicy {
    /// Create a policy from an ordered cipher list.
    pub fn new<I, S>(ciphers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ciphers: ciphers.into_iter().map(Into::into).collect(),
        }
    }

    /// Iterate over the desired ciphers in application order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ciphers.iter().map(String::as_str)
    }

    /// Get the number of desired ciphers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ciphers.len()
    }

    /// Check if the policy is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ciphers.is_empty()
    }

    /// Compare the policy against a configured set.
    ///
    /// Pure function: satisfied exactly when every desired cipher is present
    /// in the configured set.
    #[must_use]
    pub fn compliance(&self, configured: &ConfiguredCiphers) -> Compliance {
        let missing: Vec<String> = self
            .ciphers
            .iter()
            .filter(|c| !configured.contains(c))
            .cloned()
            .collect();
        if missing.is_empty() {
            Compliance::Satisfied
        } else {
            Compliance::Missing { ciphers: missing }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn satisfied_when_desired_is_subset() {
        let policy = CipherPolicy::new(["a", "b"]);
        let configured: ConfiguredCiphers = ["a", "b", "c"].into_iter().collect();
        assert!(policy.compliance(&configured).is_satisfied());
    }

    #[test]
    fn missing_when_desired_is_not_subset() {
        let policy = CipherPolicy::new(["a", "b"]);
        let configured: ConfiguredCiphers = ["a"].into_iter().collect();
        let Compliance::Missing { ciphers } = policy.compliance(&configured) else {
            panic!("expected missing ciphers");
        };
        assert_eq!(ciphers, vec!["b"]);
    }

    #[test]
    fn empty_configured_set_misses_everything() {
        let policy = CipherPolicy::default();
        let Compliance::Missing { ciphers } = policy.compliance(&ConfiguredCiphers::new()) else {
            panic!("expected missing ciphers");
        };
        assert_eq!(ciphers.len(), DESIRED_CIPHERS.len());
    }

    #[test]
    fn default_policy_preserves_order() {
        let policy = CipherPolicy::default();
        let ciphers: Vec<&str> = policy.iter().collect();
        assert_eq!(ciphers, DESIRED_CIPHERS);
    }

    #[test]
    fn service_tokens() {
        assert_eq!(Service::Mgmt.token(), "mgmt");
        assert_eq!(Service::Ha.token(), "ha");
        assert_eq!(Service::Mgmt.to_string(), "mgmt");
        assert_eq!(Service::Ha.label(), "high-availability");
    }

    #[test]
    fn service_xpath_targets_cipher_subtree() {
        let xpath = Service::Ha.ciphers_xpath();
        assert!(xpath.starts_with("/config/devices/entry[@name='localhost.localdomain']"));
        assert!(xpath.ends_with("/deviceconfig/system/ssh/ciphers/ha"));
    }

    #[test]
    fn service_restart_fragment() {
        assert_eq!(
            Service::Mgmt.restart_cmd(),
            "<set><ssh><service-restart><mgmt></mgmt></service-restart></ssh></set>"
        );
    }

    #[test]
    fn configured_ciphers_deduplicate() {
        let configured: ConfiguredCiphers = ["a", "a", "b"].into_iter().collect();
        assert_eq!(configured.len(), 2);
    }
}
