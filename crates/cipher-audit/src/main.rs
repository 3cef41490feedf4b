//! cipher-audit binary entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cipher_audit::{AuditConfig, AuditError, DEFAULT_CONFIG_PATH, DeviceConnector, Runbook, RunReport};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(report) => {
            let summary = serde_json::to_string(&report)
                .unwrap_or_else(|_| format!("{:?}", report.outcome));
            info!(outcome = ?report.outcome, %summary, "run complete");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "run failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<RunReport, AuditError> {
    let arg = std::env::args().nth(1);
    let mut config = match &arg {
        // An explicitly named config file must exist.
        Some(path) => AuditConfig::load(&PathBuf::from(path))?,
        None => AuditConfig::load_or_default(&PathBuf::from(DEFAULT_CONFIG_PATH))?,
    };
    config.apply_env_overrides();
    config.validate()?;

    let connector = DeviceConnector::new(&config);
    Runbook::new(connector)
        .with_recovery(config.recovery_policy())
        .run()
        .await
}
