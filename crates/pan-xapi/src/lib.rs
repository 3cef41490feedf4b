//! pan-xapi: Typed async client for the PAN-OS XML management API
//!
//! This crate wraps the firewall's XML management API in a small typed
//! surface: configuration reads and writes at hierarchical xpaths,
//! operational commands submitted as inline XML fragments, and synchronous
//! commits that follow the enqueued job until the device reports completion.
//!
//! Transport is abstracted behind [`XapiTransport`] so the same client drives
//! a real device over HTTPS or an in-memory scripted device in tests
//! (feature: `mock`).
//!
//! # Example
//!
//! ```ignore
//! use pan_xapi::{Client, HttpTransport, TransportConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), pan_xapi::XapiError> {
//!     let transport = HttpTransport::new("192.0.2.1", TransportConfig::default())?;
//!     let client = Client::connect(transport, "192.0.2.1", "<api-key>").await?;
//!     let response = client.config_get("/config/devices").await?;
//!     println!("{:?}", response.status());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod request;
pub mod response;
pub mod transport;

pub use client::{Client, CommitOutcome, DeviceInfo};
pub use error::{Result, XapiError};
pub use request::{RequestKind, XapiRequest};
pub use response::{ResponseStatus, XapiResponse};
pub use transport::{HttpTransport, TransportConfig, XapiTransport};

#[cfg(feature = "mock")]
pub use transport::mock::MockTransport;
