//! dca-bot
//!
//! Scheduled, single-shot DCA buyer for GMO Coin. Meant to be fired by cron or
//! a systemd timer: each invocation reads the balance and the ask price, sizes
//! one market buy and exits.
//!
//! Exit status is `0` when the run ordered, skipped, or dry-ran, and `1` on
//! any fatal error. The log file (when `DCA_LOG_DIR` is set) is flushed on
//! every path.

mod config;
mod logging;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;

use dca_core::config::{ConfigSource, EnvSource};
use dca_core::DcaError;
use dca_exchange::GmoCoinClient;

use crate::config::BotConfig;
use crate::run::{run_once, RunOutcome};

const APP_NAME: &str = "gmocoin";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load environment
    dotenvy::dotenv().ok();

    let log_dir = EnvSource.get(logging::LOG_DIR_KEY).map(PathBuf::from);
    let guard = match logging::init(APP_NAME, log_dir.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("failed to initialize logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(file) = guard.file() {
        tracing::info!("Writing run log to {}", file.display());
    }

    let code = match execute().await {
        Ok(outcome) => {
            tracing::info!("Run finished: {}", outcome);
            ExitCode::SUCCESS
        }
        Err(e) if e.downcast_ref::<DcaError>().is_some_and(|e| !e.is_fatal()) => {
            tracing::warn!("Run skipped: {:#}", e);
            ExitCode::SUCCESS
        }
        Err(e) => {
            let transient = e.downcast_ref::<DcaError>().is_some_and(DcaError::is_transient);
            tracing::error!(transient, "Run failed: {:#}", e);
            ExitCode::FAILURE
        }
    };

    guard.finalize();
    code
}

async fn execute() -> anyhow::Result<RunOutcome> {
    let config = BotConfig::load(&EnvSource).context("loading configuration")?;
    let client = GmoCoinClient::from_config(config.exchange.clone(), config.dca.symbol.clone())?;

    let outcome = run_once(&client, &config.dca, config.dry_run).await?;
    Ok(outcome)
}
