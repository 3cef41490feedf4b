//! End-to-end runbook scenarios against the mock device.

mod common;

use cipher_audit::{AuditError, DESIRED_CIPHERS, RemediationStatus, RunOutcome, Runbook, Service};
use common::{MockConnector, fast_recovery};
use pan_xapi::{MockTransport, RequestKind, XapiRequest};

fn runbook(mock: &MockTransport) -> Runbook<MockConnector> {
    Runbook::new(MockConnector::new(mock.clone())).with_recovery(fast_recovery())
}

#[tokio::test]
async fn noop_when_both_services_already_satisfied() {
    let mock = MockTransport::new()
        .with_ciphers("mgmt", DESIRED_CIPHERS)
        .with_ciphers("ha", DESIRED_CIPHERS);

    let report = runbook(&mock).run().await.unwrap();

    assert_eq!(report.outcome, RunOutcome::Done);
    assert_eq!(
        report.services[&Service::Mgmt],
        RemediationStatus::AlreadySatisfied
    );
    assert_eq!(
        report.services[&Service::Ha],
        RemediationStatus::AlreadySatisfied
    );
    assert!(!report.any_remediated());

    // No writes, no commit, no restarts of any kind.
    assert_eq!(mock.count(RequestKind::ConfigSet), 0);
    assert_eq!(mock.count(RequestKind::Commit), 0);
    assert_eq!(mock.count_ops_containing("service-restart"), 0);
    assert_eq!(mock.count_ops_containing("<request><restart><system>"), 0);
}

#[tokio::test]
async fn remediates_only_the_lagging_service() {
    // Management is missing two ciphers; HA is fully configured.
    let mock = MockTransport::new()
        .with_ciphers("mgmt", DESIRED_CIPHERS[..6].iter().copied())
        .with_ciphers("ha", DESIRED_CIPHERS);
    // The device drops one connection after the service restart.
    mock.drop_connections_after_restart(1);

    let report = runbook(&mock).run().await.unwrap();

    assert_eq!(report.outcome, RunOutcome::DoneWithSystemRestart);
    assert_eq!(report.services[&Service::Mgmt], RemediationStatus::Remediated);
    assert_eq!(
        report.services[&Service::Ha],
        RemediationStatus::AlreadySatisfied
    );

    // Exactly one set per desired cipher, all to management, in policy
    // order, regardless of the six already configured.
    let sets: Vec<(String, String)> = mock
        .requests()
        .into_iter()
        .filter_map(|r| match r {
            XapiRequest::ConfigSet { xpath, element } => Some((xpath, element)),
            _ => None,
        })
        .collect();
    assert_eq!(sets.len(), DESIRED_CIPHERS.len());
    assert!(sets.iter().all(|(xpath, _)| xpath.ends_with("/ciphers/mgmt")));
    let elements: Vec<String> = sets.into_iter().map(|(_, element)| element).collect();
    let expected: Vec<String> = DESIRED_CIPHERS.iter().map(|c| format!("<{c}/>")).collect();
    assert_eq!(elements, expected);

    // One commit, one management service restart, no HA restart, and the
    // final full system restart.
    assert_eq!(mock.count(RequestKind::Commit), 1);
    assert_eq!(mock.count_ops_containing("<service-restart><mgmt>"), 1);
    assert_eq!(mock.count_ops_containing("<service-restart><ha>"), 0);
    assert_eq!(mock.count_ops_containing("<request><restart><system>"), 1);

    // Initial connect, one failed recovery probe, one successful probe.
    assert_eq!(mock.count_ops_containing("<show><system><info"), 3);

    // The device ended up with the full cipher set.
    assert_eq!(mock.configured("mgmt").len(), DESIRED_CIPHERS.len());
}

#[tokio::test]
async fn escalates_when_only_the_second_service_was_remediated() {
    let mock = MockTransport::new().with_ciphers("mgmt", DESIRED_CIPHERS);

    let report = runbook(&mock).run().await.unwrap();

    assert_eq!(report.outcome, RunOutcome::DoneWithSystemRestart);
    assert_eq!(report.services[&Service::Ha], RemediationStatus::Remediated);
    assert_eq!(mock.count_ops_containing("<service-restart><ha>"), 1);
    assert_eq!(mock.count_ops_containing("<request><restart><system>"), 1);
}

#[tokio::test]
async fn system_restart_dropping_the_connection_is_not_an_error() {
    let mock = MockTransport::new().with_ciphers("ha", DESIRED_CIPHERS);
    mock.drop_connection_on_system_restart();

    let report = runbook(&mock).run().await.unwrap();

    assert_eq!(report.outcome, RunOutcome::DoneWithSystemRestart);
    assert_eq!(report.services[&Service::Mgmt], RemediationStatus::Remediated);
}

#[tokio::test]
async fn rejected_credentials_abort_the_run() {
    let mock = MockTransport::new();
    mock.reject_key();

    let err = runbook(&mock).run().await.unwrap_err();

    assert!(matches!(err, AuditError::Device(ref e) if e.is_auth()));
    assert_eq!(mock.count(RequestKind::ConfigSet), 0);
}
