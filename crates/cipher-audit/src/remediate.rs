//! Applying the cipher policy: set, commit, restart.
//!
//! Steps are sequential with no rollback on partial failure; each cipher
//! insertion is independent and the device treats re-insertion of an
//! existing element as a no-op.

use pan_xapi::{Client, CommitOutcome, XapiError, XapiTransport};
use tracing::info;

use crate::policy::{CipherPolicy, Service};

/// Description attached to every commit this runbook performs.
pub const COMMIT_DESCRIPTION: &str = "SSH Ciphers Commit";

/// Set every desired cipher under the service's subtree.
///
/// Every cipher in the policy is written, including ones already configured;
/// the per-cipher accept/reject status is logged.
pub async fn apply_ciphers<T: XapiTransport>(
    client: &Client<T>,
    service: Service,
    policy: &CipherPolicy,
) -> pan_xapi::Result<()> {
    info!(service = %service, "setting ciphers");
    let xpath = service.ciphers_xpath();
    for cipher in policy.iter() {
        let element = format!("<{cipher}/>");
        let response = client.config_set(&xpath, &element).await?;
        info!(
            service = %service,
            cipher,
            status = response.status().as_str(),
            "cipher install"
        );
    }
    Ok(())
}

/// Commit the staged configuration and log the device's messages.
pub async fn commit_changes<T: XapiTransport>(
    client: &Client<T>,
) -> pan_xapi::Result<CommitOutcome> {
    let outcome = client.commit(COMMIT_DESCRIPTION).await?;
    for message in outcome.messages() {
        info!(message = %message, "commit status");
    }
    Ok(outcome)
}

/// Restart the service's SSH daemon.
///
/// The device answers with a status attribute and a human-readable result
/// message; both are logged. A rejected restart is an error.
pub async fn restart_service<T: XapiTransport>(
    client: &Client<T>,
    service: Service,
) -> pan_xapi::Result<()> {
    info!(service = %service, "restarting service");
    let response = client.op(&service.restart_cmd()).await?;
    let message = response
        .members()
        .into_iter()
        .next()
        .unwrap_or_else(|| "no result message".to_string());
    info!(
        service = %service,
        status = response.status().as_str(),
        message = %message,
        "service restart"
    );
    if response.is_success() {
        Ok(())
    } else {
        Err(XapiError::restart(service.token(), response.error_message()))
    }
}
