//! Shared helpers for integration tests.

use std::time::Duration;

use cipher_audit::{Connector, RecoveryPolicy};
use pan_xapi::{Client, MockTransport};

/// Connector that hands out sessions to a shared mock device.
pub struct MockConnector {
    transport: MockTransport,
}

impl MockConnector {
    /// Wrap a mock device.
    pub fn new(transport: MockTransport) -> Self {
        Self { transport }
    }
}

impl Connector for MockConnector {
    type Transport = MockTransport;

    async fn connect(&self) -> pan_xapi::Result<Client<MockTransport>> {
        Ok(
            Client::connect(self.transport.clone(), "mock-device", "test-key")
                .await?
                .with_commit_poll_interval(Duration::from_millis(1)),
        )
    }
}

/// Recovery policy with millisecond waits, for fast tests.
pub fn fast_recovery() -> RecoveryPolicy {
    RecoveryPolicy::new()
        .with_grace(Duration::from_millis(1))
        .with_interval(Duration::from_millis(1))
        .with_max_attempts(10)
}
