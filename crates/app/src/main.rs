use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use pinesync_app::{execute, logging, AppContext, Cli};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load .env before clap so env-backed flags see it.
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            return Err(err).context("failed to read .env");
        }
    }

    let cli = Cli::parse();
    logging::init_tracing(cli.log_json);

    let context = AppContext::load(cli.config).context("failed to load configuration")?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown_signal_received");
            on_signal.cancel();
        }
    });

    let report_to_stderr = cli.command.report_to_stderr();
    match execute(&context, cli.command, &cancel).await {
        Ok(report) => {
            let rendered = serde_json::to_string_pretty(&report)?;
            if report_to_stderr {
                eprintln!("{rendered}");
            } else {
                println!("{rendered}");
            }
            Ok(if report.success { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Err(err) => {
            error!(error = %err, "command_failed");
            Err(err.into())
        }
    }
}
