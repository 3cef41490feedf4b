//! In-memory scripted device for tests.
//!
//! [`MockTransport`] simulates enough of the management API to drive the
//! full remediation flow without a device: it stores per-service cipher
//! sets, applies configuration sets to them, enqueues and finishes commit
//! jobs, and answers operational commands. Every request is recorded for
//! assertion, and the device can be primed to drop connections (to exercise
//! recovery polling) or to reject credentials.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{Result, XapiError};
use crate::request::{RequestKind, XapiRequest};
use crate::transport::XapiTransport;

/// Host name the mock reports in connection errors.
pub const MOCK_HOST: &str = "mock-device";

/// Shared state of the simulated device.
#[derive(Debug)]
struct MockState {
    /// Configured ciphers per service token.
    ciphers: BTreeMap<String, Vec<String>>,
    /// Every request received, in order.
    requests: Vec<XapiRequest>,
    /// Fail this many upcoming requests with a connection error.
    fail_next: u32,
    /// Arm `fail_next` with this value whenever a service restart lands.
    down_after_restart: u32,
    /// Drop the connection when the full system restart arrives.
    drop_on_system_restart: bool,
    /// Reject every request as an invalid credential.
    reject_key: bool,
    /// Staged configuration changes waiting for a commit.
    dirty: bool,
    /// Id handed to the next commit job.
    next_job: u64,
    /// Job polls to answer with an in-progress status before finishing.
    job_pending_polls: u32,
}

impl MockState {
    fn new() -> Self {
        Self {
            ciphers: BTreeMap::new(),
            requests: Vec::new(),
            fail_next: 0,
            down_after_restart: 0,
            drop_on_system_restart: false,
            reject_key: false,
            dirty: false,
            next_job: 1,
            job_pending_polls: 0,
        }
    }
}

/// A scripted in-memory device.
#[derive(Debug, Clone)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Create a device with no ciphers configured.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the configured ciphers for a service token.
    #[must_use]
    pub fn with_ciphers<I, S>(self, service: &str, ciphers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock().ciphers.insert(
            service.to_string(),
            ciphers.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Fail the next `n` requests with a connection error.
    pub fn fail_next_requests(&self, n: u32) {
        self.lock().fail_next = n;
    }

    /// Drop `n` connections after every service restart.
    pub fn drop_connections_after_restart(&self, n: u32) {
        self.lock().down_after_restart = n;
    }

    /// Drop the connection when the full system restart arrives.
    pub fn drop_connection_on_system_restart(&self) {
        self.lock().drop_on_system_restart = true;
    }

    /// Reject every request as an invalid credential.
    pub fn reject_key(&self) {
        self.lock().reject_key = true;
    }

    /// Answer `n` job polls with an in-progress status before finishing.
    pub fn delay_commit_job(&self, polls: u32) {
        self.lock().job_pending_polls = polls;
    }

    /// Get every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<XapiRequest> {
        self.lock().requests.clone()
    }

    /// Count received requests of `kind`.
    #[must_use]
    pub fn count(&self, kind: RequestKind) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.kind() == kind)
            .count()
    }

    /// Count operational commands whose fragment contains `needle`.
    #[must_use]
    pub fn count_ops_containing(&self, needle: &str) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| matches!(r, XapiRequest::Op { cmd } if cmd.contains(needle)))
            .count()
    }

    /// Get the ciphers currently configured for a service token.
    #[must_use]
    pub fn configured(&self, service: &str) -> Vec<String> {
        self.lock().ciphers.get(service).cloned().unwrap_or_default()
    }

    fn answer(state: &mut MockState, request: &XapiRequest) -> Result<String> {
        match request {
            XapiRequest::ConfigGet { xpath } => Ok(answer_config_get(state, xpath)),
            XapiRequest::ConfigSet { xpath, element } => {
                Ok(answer_config_set(state, xpath, element))
            }
            XapiRequest::Op { cmd } => answer_op(state, cmd),
            XapiRequest::Commit { .. } => Ok(answer_commit(state)),
        }
    }
}

impl XapiTransport for MockTransport {
    async fn send(&self, request: &XapiRequest, _key: &str) -> Result<String> {
        let mut state = self.lock();
        state.requests.push(request.clone());
        if state.fail_next > 0 {
            state.fail_next -= 1;
            return Err(XapiError::connection(MOCK_HOST, "connection refused"));
        }
        if state.reject_key {
            return Ok(
                r#"<response status="error" code="403"><msg>Invalid credential</msg></response>"#
                    .to_string(),
            );
        }
        Self::answer(&mut state, request)
    }
}

/// The trailing path segment of an xpath, used as the service token.
fn last_segment(xpath: &str) -> &str {
    xpath.rsplit('/').next().unwrap_or(xpath)
}

fn answer_config_get(state: &MockState, xpath: &str) -> String {
    let service = last_segment(xpath);
    state.ciphers.get(service).map_or_else(
        || r#"<response status="success" code="7"><result/></response>"#.to_string(),
        |ciphers| {
            let entries: String = ciphers.iter().map(|c| format!("<{c}/>")).collect();
            format!(
                r#"<response status="success"><result><{service}>{entries}</{service}></result></response>"#
            )
        },
    )
}

fn answer_config_set(state: &mut MockState, xpath: &str, element: &str) -> String {
    let service = last_segment(xpath).to_string();
    let cipher = element
        .trim_start_matches('<')
        .trim_end_matches("/>")
        .to_string();
    let entry = state.ciphers.entry(service).or_default();
    if !entry.contains(&cipher) {
        entry.push(cipher);
    }
    state.dirty = true;
    r#"<response status="success" code="20"><msg>command succeeded</msg></response>"#.to_string()
}

fn answer_commit(state: &mut MockState) -> String {
    if state.dirty {
        state.dirty = false;
        let job = state.next_job;
        state.next_job += 1;
        format!(
            r#"<response status="success" code="19"><result><msg><line>Commit job enqueued with jobid {job}</line></msg><job>{job}</job></result></response>"#
        )
    } else {
        r#"<response status="success" code="19"><msg>There are no changes to commit.</msg></response>"#
            .to_string()
    }
}

fn answer_op(state: &mut MockState, cmd: &str) -> Result<String> {
    if cmd.contains("<show><system><info") {
        return Ok(concat!(
            r#"<response status="success"><result><system>"#,
            "<hostname>mock-fw</hostname>",
            "<model>PA-220</model>",
            "<serial>0123456789</serial>",
            "<sw-version>10.1.6</sw-version>",
            "</system></result></response>"
        )
        .to_string());
    }
    if cmd.contains("<service-restart>") {
        let service = cmd
            .split("<service-restart><")
            .nth(1)
            .and_then(|rest| rest.split('>').next())
            .unwrap_or("unknown")
            .to_string();
        state.fail_next = state.down_after_restart;
        return Ok(format!(
            r#"<response status="success"><result><member>Restarting {service} SSH service</member></result></response>"#
        ));
    }
    if cmd.contains("<request><restart><system>") {
        if state.drop_on_system_restart {
            return Err(XapiError::connection(MOCK_HOST, "connection reset by peer"));
        }
        return Ok(
            r#"<response status="success"><result><member>Device is restarting</member></result></response>"#
                .to_string(),
        );
    }
    if cmd.contains("<show><jobs><id>") {
        let id = cmd
            .split("<id>")
            .nth(1)
            .and_then(|rest| rest.split('<').next())
            .unwrap_or("0");
        if state.job_pending_polls > 0 {
            state.job_pending_polls -= 1;
            return Ok(format!(
                r#"<response status="success"><result><job><id>{id}</id><type>Commit</type><status>ACT</status><result>PEND</result><progress>55</progress></job></result></response>"#
            ));
        }
        return Ok(format!(
            r#"<response status="success"><result><job><id>{id}</id><type>Commit</type><status>FIN</status><result>OK</result><details><line>Configuration committed successfully</line></details><progress>100</progress></job></result></response>"#
        ));
    }
    Err(XapiError::device(
        None,
        format!("mock device does not understand op '{cmd}'"),
    ))
}
