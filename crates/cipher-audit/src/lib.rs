//! cipher-audit: SSH cipher audit and remediation runbook
//!
//! Audits the allowed SSH ciphers on a firewall's management and
//! high-availability interfaces against a desired policy and, where the
//! policy is not yet satisfied, remediates: sets the missing ciphers,
//! commits the configuration, restarts the affected service, and waits for
//! the device to come back. If any service needed a change, the run ends by
//! issuing a full device restart.
//!
//! The workflow is strictly sequential and single-device; no state persists
//! between runs.
//!
//! # Example
//!
//! ```ignore
//! use cipher_audit::{AuditConfig, DeviceConnector, Runbook};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), cipher_audit::AuditError> {
//!     let config = AuditConfig::load("cipher-audit.toml".as_ref())?;
//!     let connector = DeviceConnector::new(&config);
//!     let report = Runbook::new(connector)
//!         .with_recovery(config.recovery_policy())
//!         .run()
//!         .await?;
//!     println!("{:?}", report.outcome);
//!     Ok(())
//! }
//! ```

pub mod audit;
pub mod config;
pub mod connector;
pub mod error;
pub mod policy;
pub mod recovery;
pub mod remediate;
pub mod runbook;

pub use config::{AuditConfig, DEFAULT_CONFIG_PATH};
pub use connector::{Connector, DeviceConnector};
pub use error::{AuditError, Result};
pub use policy::{
    CipherPolicy, Compliance, ConfiguredCiphers, DESIRED_CIPHERS, RemediationStatus, Service,
};
pub use recovery::{RecoveryPolicy, wait_for_device};
pub use runbook::{RunOutcome, RunReport, Runbook, ServicePhase, SystemRestart};
