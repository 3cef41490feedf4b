//! Device recovery polling.
//!
//! After a service restart the device drops its management session. The
//! poll waits a grace period, then attempts reconnection at a fixed
//! interval. Only connection-level failures are retried; the device being
//! up but rejecting a request propagates immediately. The attempt budget is
//! bounded so a device that never returns fails the run instead of hanging
//! it.

use std::time::Duration;

use pan_xapi::Client;
use tracing::info;

use crate::connector::Connector;
use crate::error::{AuditError, Result};

/// Default grace period before the first probe.
pub const DEFAULT_GRACE: Duration = Duration::from_secs(60);

/// Default interval between probes.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Default bound on connection attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;

/// Bounded fixed-delay recovery policy.
#[derive(Debug, Clone)]
pub struct RecoveryPolicy {
    /// Grace period before the first probe.
    pub grace: Duration,
    /// Interval between probes.
    pub interval: Duration,
    /// Maximum connection attempts.
    pub max_attempts: u32,
}

impl Default for RecoveryPolicy {
    fn default() -> Self {
        Self {
            grace: DEFAULT_GRACE,
            interval: DEFAULT_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl RecoveryPolicy {
    /// Create a policy with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the grace period.
    #[must_use]
    pub const fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Set the probe interval.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the attempt budget.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

/// Wait for the device to come back and return a fresh session.
///
/// Given N consecutive connection failures followed by a success, exactly
/// N+1 attempts are made, with the policy interval between each. Exhausting
/// the budget yields [`AuditError::RecoveryTimeout`].
pub async fn wait_for_device<C: Connector>(
    connector: &C,
    policy: &RecoveryPolicy,
) -> Result<Client<C::Transport>> {
    info!(grace = ?policy.grace, "checking if device is up");
    tokio::time::sleep(policy.grace).await;
    let mut attempts = 0u32;
    loop {
        attempts += 1;
        info!(attempt = attempts, "connecting to the device");
        match connector.connect().await {
            Ok(client) => {
                info!("the device is back up");
                return Ok(client);
            }
            Err(err) if err.is_connection() => {
                if attempts >= policy.max_attempts {
                    return Err(AuditError::RecoveryTimeout { attempts });
                }
                info!(attempt = attempts, "the device is still down, continuing to check");
                tokio::time::sleep(policy.interval).await;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_defaults() {
        let policy = RecoveryPolicy::default();
        assert_eq!(policy.grace, Duration::from_secs(60));
        assert_eq!(policy.interval, Duration::from_secs(60));
        assert_eq!(policy.max_attempts, 30);
    }

    #[test]
    fn policy_builder() {
        let policy = RecoveryPolicy::new()
            .with_grace(Duration::from_secs(1))
            .with_interval(Duration::from_secs(2))
            .with_max_attempts(5);
        assert_eq!(policy.grace, Duration::from_secs(1));
        assert_eq!(policy.interval, Duration::from_secs(2));
        assert_eq!(policy.max_attempts, 5);
    }
}
