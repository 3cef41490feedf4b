//! Transport layer for the XML management API.
//!
//! The client is generic over [`XapiTransport`] so the same request/response
//! handling drives a real device over HTTPS or an in-memory scripted device
//! in tests.

mod http;

pub use http::{HttpTransport, TransportConfig};

/// In-memory scripted device for tests.
#[cfg(any(test, feature = "mock"))]
pub mod mock;

use crate::error::Result;
use crate::request::XapiRequest;

/// Trait for API transports.
///
/// A transport submits one keyed request to the device's `/api/` endpoint
/// and returns the raw XML body. Connection-level failures (DNS, refused,
/// TLS, timeout) map to [`crate::XapiError::Connection`].
#[allow(async_fn_in_trait)]
pub trait XapiTransport {
    /// Submit `request` authenticated with `key` and return the raw body.
    async fn send(&self, request: &XapiRequest, key: &str) -> Result<String>;
}
