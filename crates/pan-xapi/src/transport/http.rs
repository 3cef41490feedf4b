//! HTTPS transport to a real device.

use std::time::Duration;

use crate::error::{Result, XapiError};
use crate::request::XapiRequest;
use crate::transport::XapiTransport;

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for the HTTPS transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// TCP/TLS connect timeout.
    pub connect_timeout: Duration,
    /// Total per-request timeout.
    pub request_timeout: Duration,
    /// Whether to verify the device's TLS certificate.
    ///
    /// Management interfaces commonly present self-signed certificates, so
    /// verification is off by default.
    pub verify_tls: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            verify_tls: false,
        }
    }
}

impl TransportConfig {
    /// Create a new config with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set TLS certificate verification.
    #[must_use]
    pub const fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }
}

/// HTTPS transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    url: String,
    host: String,
}

impl HttpTransport {
    /// Create a transport for the device at `host`.
    pub fn new(host: impl Into<String>, config: TransportConfig) -> Result<Self> {
        let host = host.into();
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;
        Ok(Self {
            url: format!("https://{host}/api/"),
            http,
            host,
        })
    }

    /// Get the device host this transport targets.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Map a reqwest error to the transport taxonomy.
    fn classify(&self, err: reqwest::Error) -> XapiError {
        if err.is_connect() || err.is_timeout() {
            XapiError::connection(&self.host, err.to_string())
        } else {
            XapiError::Http(err)
        }
    }
}

impl XapiTransport for HttpTransport {
    async fn send(&self, request: &XapiRequest, key: &str) -> Result<String> {
        let mut params = request.params();
        params.push(("key", key));
        let response = self
            .http
            .get(&self.url)
            .query(&params)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        // Rejections arrive as an XML error response regardless of the HTTP
        // status code, so the body is returned as-is for envelope parsing.
        response.text().await.map_err(|e| self.classify(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = TransportConfig::default();
        assert_eq!(config.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert!(!config.verify_tls);
    }

    #[test]
    fn config_builder() {
        let config = TransportConfig::new()
            .with_connect_timeout(Duration::from_secs(3))
            .with_request_timeout(Duration::from_secs(20))
            .with_verify_tls(true);
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.request_timeout, Duration::from_secs(20));
        assert!(config.verify_tls);
    }

    #[test]
    fn transport_builds_api_url() {
        let transport = HttpTransport::new("192.0.2.1", TransportConfig::default()).unwrap();
        assert_eq!(transport.host(), "192.0.2.1");
        assert_eq!(transport.url, "https://192.0.2.1/api/");
    }
}
