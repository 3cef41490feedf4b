//! Run orchestration and the per-service state machine.
//!
//! Services are processed strictly in sequence. Each walks
//! `Unchecked → Audited`, then either terminates at `Satisfied` or proceeds
//! through `Remediating → Committed → ServiceRestarted → DeviceRecovered`.
//! Once every service has reached a terminal phase, the run escalates to a
//! full device restart if anything was changed.

use std::collections::BTreeMap;

use pan_xapi::{Client, XapiError, XapiTransport};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::audit;
use crate::connector::Connector;
use crate::error::Result;
use crate::policy::{CipherPolicy, Compliance, RemediationStatus, Service};
use crate::recovery::{self, RecoveryPolicy};
use crate::remediate;

/// Operational command that restarts the whole device.
pub const SYSTEM_RESTART_CMD: &str = "<request><restart><system></system></restart></request>";

/// Per-service progress through the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServicePhase {
    /// Not yet looked at.
    Unchecked,
    /// Configured ciphers have been read.
    Audited,
    /// The desired ciphers were already configured. Terminal.
    Satisfied,
    /// Missing ciphers are being written.
    Remediating,
    /// The configuration change is committed.
    Committed,
    /// The service's SSH daemon was restarted.
    ServiceRestarted,
    /// The device came back after the restart. Terminal.
    DeviceRecovered,
}

impl ServicePhase {
    /// Check if this phase ends the service's part of the run.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Satisfied | Self::DeviceRecovered)
    }

    /// Transition to the next phase, logging the step.
    #[must_use]
    fn advance(self, next: Self, service: Service) -> Self {
        debug!(service = %service, from = ?self, to = ?next, "phase transition");
        next
    }
}

/// Overall outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunOutcome {
    /// No service needed a change.
    Done,
    /// At least one service was remediated and a device restart was issued.
    DoneWithSystemRestart,
}

/// Result of issuing the full device restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemRestart {
    /// The device acknowledged the restart.
    Issued,
    /// The restart was sent but the device dropped the connection before
    /// acknowledging; expected when it reboots immediately.
    Unconfirmed,
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Overall outcome.
    pub outcome: RunOutcome,
    /// Per-service remediation status.
    pub services: BTreeMap<Service, RemediationStatus>,
}

impl RunReport {
    /// Check if any service was changed.
    #[must_use]
    pub fn any_remediated(&self) -> bool {
        self.services.values().any(|s| s.is_remediated())
    }
}

/// The audit-and-remediate runbook.
#[derive(Debug)]
pub struct Runbook<C> {
    connector: C,
    policy: CipherPolicy,
    recovery: RecoveryPolicy,
}

impl<C: Connector> Runbook<C> {
    /// Create a runbook with the default cipher policy and recovery policy.
    #[must_use]
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            policy: CipherPolicy::default(),
            recovery: RecoveryPolicy::default(),
        }
    }

    /// Set the cipher policy.
    #[must_use]
    pub fn with_policy(mut self, policy: CipherPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the recovery policy.
    #[must_use]
    pub fn with_recovery(mut self, recovery: RecoveryPolicy) -> Self {
        self.recovery = recovery;
        self
    }

    /// Run the runbook over every service, escalating to a full device
    /// restart if anything was changed.
    pub async fn run(&self) -> Result<RunReport> {
        let mut client = self.connector.connect().await?;
        let mut services = BTreeMap::new();

        for service in Service::ALL {
            let status = self.process_service(&mut client, service).await?;
            services.insert(service, status);
        }

        let outcome = if services.values().any(|s| s.is_remediated()) {
            match restart_system(&client).await? {
                SystemRestart::Issued => info!("system restart issued"),
                SystemRestart::Unconfirmed => {
                    warn!("system restart issued but not confirmed by the device");
                }
            }
            RunOutcome::DoneWithSystemRestart
        } else {
            info!("no service needed remediation, skipping system restart");
            RunOutcome::Done
        };

        Ok(RunReport { outcome, services })
    }

    /// Drive one service to a terminal phase.
    ///
    /// On remediation the held session is replaced with the one obtained
    /// after the device recovered.
    async fn process_service(
        &self,
        client: &mut Client<C::Transport>,
        service: Service,
    ) -> Result<RemediationStatus> {
        let mut phase = ServicePhase::Unchecked;

        let configured = audit::configured_ciphers(client, service).await?;
        phase = phase.advance(ServicePhase::Audited, service);

        info!(service = %service, "comparing ciphers");
        match self.policy.compliance(&configured) {
            Compliance::Satisfied => {
                info!(service = %service, "ciphers match");
                phase = phase.advance(ServicePhase::Satisfied, service);
                debug_assert!(phase.is_terminal());
                Ok(RemediationStatus::AlreadySatisfied)
            }
            Compliance::Missing { ciphers } => {
                info!(service = %service, missing = ?ciphers, "ciphers need to be set");
                phase = phase.advance(ServicePhase::Remediating, service);

                remediate::apply_ciphers(client, service, &self.policy).await?;
                remediate::commit_changes(client).await?;
                phase = phase.advance(ServicePhase::Committed, service);

                remediate::restart_service(client, service).await?;
                phase = phase.advance(ServicePhase::ServiceRestarted, service);

                *client = recovery::wait_for_device(&self.connector, &self.recovery).await?;
                phase = phase.advance(ServicePhase::DeviceRecovered, service);
                debug_assert!(phase.is_terminal());
                Ok(RemediationStatus::Remediated)
            }
        }
    }
}

/// Issue the full device restart.
///
/// The device dropping the connection while executing its own restart is
/// expected, so a connection-level failure reports the restart as
/// unconfirmed rather than failing the run; any other rejection is a real
/// error.
pub async fn restart_system<T: XapiTransport>(client: &Client<T>) -> Result<SystemRestart> {
    info!("restarting system");
    match client.op(SYSTEM_RESTART_CMD).await {
        Ok(response) => {
            if response.is_success() {
                for member in response.members() {
                    info!(message = %member, "system restart");
                }
                Ok(SystemRestart::Issued)
            } else {
                Err(XapiError::restart("system", response.error_message()).into())
            }
        }
        Err(err) if err.is_connection() => Ok(SystemRestart::Unconfirmed),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_phases() {
        assert!(ServicePhase::Satisfied.is_terminal());
        assert!(ServicePhase::DeviceRecovered.is_terminal());
        assert!(!ServicePhase::Unchecked.is_terminal());
        assert!(!ServicePhase::Committed.is_terminal());
    }

    #[test]
    fn report_any_remediated() {
        let mut services = BTreeMap::new();
        services.insert(Service::Mgmt, RemediationStatus::AlreadySatisfied);
        services.insert(Service::Ha, RemediationStatus::AlreadySatisfied);
        let report = RunReport {
            outcome: RunOutcome::Done,
            services,
        };
        assert!(!report.any_remediated());
    }

    #[test]
    fn report_serializes_with_service_keys() {
        let mut services = BTreeMap::new();
        services.insert(Service::Mgmt, RemediationStatus::Remediated);
        let report = RunReport {
            outcome: RunOutcome::DoneWithSystemRestart,
            services,
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"mgmt\":\"remediated\""));
        assert!(json.contains("done-with-system-restart"));
    }
}
