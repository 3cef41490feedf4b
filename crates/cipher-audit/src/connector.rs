//! Connection establishment.
//!
//! The device session is reacquired after every restart-triggered outage, so
//! connecting is a trait seam rather than a one-off call: the runbook and
//! the recovery poll both go through [`Connector`].

use std::time::Duration;

use pan_xapi::{Client, HttpTransport, TransportConfig, XapiTransport};

use crate::config::AuditConfig;

/// Trait for obtaining an authenticated device session.
#[allow(async_fn_in_trait)]
pub trait Connector {
    /// The transport used by produced clients.
    type Transport: XapiTransport;

    /// Open an authenticated session to the device.
    async fn connect(&self) -> pan_xapi::Result<Client<Self::Transport>>;
}

/// Connector for a real device over HTTPS.
#[derive(Debug, Clone)]
pub struct DeviceConnector {
    host: String,
    api_key: String,
    transport: TransportConfig,
    commit_poll_interval: Duration,
    commit_timeout: Duration,
}

impl DeviceConnector {
    /// Build a connector from the loaded configuration.
    #[must_use]
    pub fn new(config: &AuditConfig) -> Self {
        Self {
            host: config.device.host.clone(),
            api_key: config.device.api_key.clone(),
            transport: config.transport_config(),
            commit_poll_interval: config.commit_poll_interval(),
            commit_timeout: config.commit_timeout(),
        }
    }

    /// Get the device host this connector targets.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }
}

impl Connector for DeviceConnector {
    type Transport = HttpTransport;

    async fn connect(&self) -> pan_xapi::Result<Client<HttpTransport>> {
        let transport = HttpTransport::new(&self.host, self.transport.clone())?;
        Ok(Client::connect(transport, &self.host, &self.api_key)
            .await?
            .with_commit_poll_interval(self.commit_poll_interval)
            .with_commit_timeout(self.commit_timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connector_takes_settings_from_config() {
        let mut config = AuditConfig::default();
        config.device.host = "192.0.2.1".to_string();
        config.device.api_key = "key".to_string();
        config.device.commit_poll_secs = 5;
        let connector = DeviceConnector::new(&config);
        assert_eq!(connector.host(), "192.0.2.1");
        assert_eq!(connector.commit_poll_interval, Duration::from_secs(5));
    }
}
