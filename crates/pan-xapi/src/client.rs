//! Device client: connection, configuration access, operational commands,
//! and synchronous commit.

use std::fmt;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, XapiError};
use crate::request::XapiRequest;
use crate::response::XapiResponse;
use crate::transport::XapiTransport;

/// Default interval between commit job polls.
pub const DEFAULT_COMMIT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Default bound on waiting for a commit job to finish.
pub const DEFAULT_COMMIT_TIMEOUT: Duration = Duration::from_secs(600);

/// Command used to verify reachability and credentials on connect.
const SYSTEM_INFO_CMD: &str = "<show><system><info></info></system></show>";

/// Identity of the connected device, captured at connect time.
#[derive(Debug, Clone, Default)]
pub struct DeviceInfo {
    /// Device hostname.
    pub hostname: Option<String>,
    /// Hardware model.
    pub model: Option<String>,
    /// Serial number.
    pub serial: Option<String>,
    /// Software version.
    pub sw_version: Option<String>,
}

/// Outcome of a synchronous commit.
#[derive(Debug, Clone)]
pub enum CommitOutcome {
    /// A job was enqueued and finished successfully.
    Committed {
        /// The commit job id.
        job: u64,
        /// Messages reported by the device, in order.
        messages: Vec<String>,
    },
    /// The device had nothing to commit.
    NoChanges {
        /// Messages reported by the device.
        messages: Vec<String>,
    },
}

impl CommitOutcome {
    /// Get the device's commit messages.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        match self {
            Self::Committed { messages, .. } | Self::NoChanges { messages } => messages,
        }
    }

    /// Check if the commit was a no-op.
    #[must_use]
    pub const fn is_no_changes(&self) -> bool {
        matches!(self, Self::NoChanges { .. })
    }
}

/// An authenticated handle to a device.
pub struct Client<T> {
    transport: T,
    host: String,
    key: String,
    info: DeviceInfo,
    commit_poll_interval: Duration,
    commit_timeout: Duration,
}

impl<T> fmt::Debug for Client<T> {
    // The API key is deliberately left out.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("host", &self.host)
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

impl<T: XapiTransport> Client<T> {
    /// Open an authenticated session to the device.
    ///
    /// Reachability and credentials are verified by reading the device's
    /// system info; the captured identity is available via
    /// [`device_info`](Self::device_info). Fails with a connection error
    /// when the endpoint is unreachable and with an authentication error
    /// when the key is rejected.
    pub async fn connect(transport: T, host: impl Into<String>, key: impl Into<String>) -> Result<Self> {
        let mut client = Self {
            transport,
            host: host.into(),
            key: key.into(),
            info: DeviceInfo::default(),
            commit_poll_interval: DEFAULT_COMMIT_POLL_INTERVAL,
            commit_timeout: DEFAULT_COMMIT_TIMEOUT,
        };
        debug!(host = %client.host, "connecting to device");
        let response = match client.op(SYSTEM_INFO_CMD).await?.into_result() {
            Ok(response) => response,
            // The only variable on this request is the credential.
            Err(XapiError::Device { message, .. }) => {
                return Err(XapiError::auth(&client.host, message));
            }
            Err(other) => return Err(other),
        };
        client.info = DeviceInfo {
            hostname: response.first_text(&["result", "system", "hostname"]),
            model: response.first_text(&["result", "system", "model"]),
            serial: response.first_text(&["result", "system", "serial"]),
            sw_version: response.first_text(&["result", "system", "sw-version"]),
        };
        info!(
            host = %client.host,
            hostname = client.info.hostname.as_deref().unwrap_or("?"),
            model = client.info.model.as_deref().unwrap_or("?"),
            "connected to device"
        );
        Ok(client)
    }

    /// Set the interval between commit job polls.
    #[must_use]
    pub const fn with_commit_poll_interval(mut self, interval: Duration) -> Self {
        self.commit_poll_interval = interval;
        self
    }

    /// Set the bound on waiting for a commit job to finish.
    #[must_use]
    pub const fn with_commit_timeout(mut self, timeout: Duration) -> Self {
        self.commit_timeout = timeout;
        self
    }

    /// Get the device host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Get the identity captured at connect time.
    #[must_use]
    pub const fn device_info(&self) -> &DeviceInfo {
        &self.info
    }

    async fn send(&self, request: &XapiRequest) -> Result<XapiResponse> {
        let body = self.transport.send(request, &self.key).await?;
        XapiResponse::parse(&body)
    }

    /// Read the configuration subtree at `xpath`.
    ///
    /// A rejected read maps to a query error carrying the xpath.
    pub async fn config_get(&self, xpath: &str) -> Result<XapiResponse> {
        debug!(xpath, "config get");
        self.send(&XapiRequest::config_get(xpath))
            .await?
            .into_result()
            .map_err(|e| match e {
                XapiError::Device { message, .. } => XapiError::query(xpath, message),
                other => other,
            })
    }

    /// Insert `element` under the configuration node at `xpath`.
    ///
    /// The response is returned with its status attribute intact so callers
    /// can log per-element accept/reject outcomes.
    pub async fn config_set(&self, xpath: &str, element: &str) -> Result<XapiResponse> {
        debug!(xpath, element, "config set");
        self.send(&XapiRequest::config_set(xpath, element)).await
    }

    /// Execute an operational command.
    ///
    /// The response is returned with its status attribute intact; use
    /// [`XapiResponse::into_result`] when a rejection should be an error.
    pub async fn op(&self, cmd: &str) -> Result<XapiResponse> {
        debug!(cmd, "operational command");
        self.send(&XapiRequest::op(cmd)).await
    }

    /// Commit the staged configuration and block until the device reports
    /// completion.
    ///
    /// The device either answers immediately (nothing to commit) or enqueues
    /// a job, which is polled until it reaches `FIN`. Messages from both the
    /// enqueue response and the finished job are collected in order.
    pub async fn commit(&self, description: &str) -> Result<CommitOutcome> {
        info!(description, "committing configuration");
        let response = self.send(&XapiRequest::commit(description)).await?;
        if !response.is_success() {
            return Err(XapiError::commit(None, response.error_message()));
        }
        let messages = response.msg_lines();
        match response.job_id() {
            None => Ok(CommitOutcome::NoChanges { messages }),
            Some(job) => self.wait_for_job(job, messages).await,
        }
    }

    async fn wait_for_job(&self, job: u64, mut messages: Vec<String>) -> Result<CommitOutcome> {
        let started = tokio::time::Instant::now();
        loop {
            if started.elapsed() >= self.commit_timeout {
                return Err(XapiError::commit(
                    Some(job),
                    format!("job did not finish within {:?}", self.commit_timeout),
                ));
            }
            tokio::time::sleep(self.commit_poll_interval).await;
            let cmd = format!("<show><jobs><id>{job}</id></jobs></show>");
            let response = self
                .send(&XapiRequest::op(cmd))
                .await?
                .into_result()
                .map_err(|e| XapiError::commit(Some(job), e.to_string()))?;
            let status = response
                .first_text(&["result", "job", "status"])
                .unwrap_or_default();
            debug!(
                job,
                status = %status,
                progress = response.first_text(&["result", "job", "progress"]).as_deref(),
                "commit job status"
            );
            if status == "FIN" {
                let result = response
                    .first_text(&["result", "job", "result"])
                    .unwrap_or_default();
                messages.extend(response.texts(&["result", "job", "details", "line"]));
                if result == "OK" {
                    return Ok(CommitOutcome::Committed { job, messages });
                }
                let reason = if messages.is_empty() {
                    format!("job finished with result {result}")
                } else {
                    messages.join("; ")
                };
                return Err(XapiError::commit(Some(job), reason));
            }
        }
    }
}
