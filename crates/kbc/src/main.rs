use std::ffi::OsString;

use anyhow::Context;
use tracing::error;

use kbc_client::KbcClientFactory;
use kbc_core::{
    bootstrap::{self, SERVICE_NAME},
    config::StartupPaths,
    domain::ExitStatus,
    lifecycle, logging,
    terminal::TerminalOptions,
};

#[tokio::main]
async fn main() {
    let code = match run().await {
        Ok(status) => status.code(),
        Err(e) => {
            logging::init(SERVICE_NAME, TerminalOptions::default());
            error!(error = %format!("{e:#}"), "Unexpected situation happened during startup");
            ExitStatus::Failure.code()
        }
    };

    // The stdin reader thread cannot be cancelled; exit without waiting for it.
    std::process::exit(code);
}

async fn run() -> anyhow::Result<ExitStatus> {
    let argv: Vec<OsString> = std::env::args_os().collect();

    // Panics inside the client surface here as a JoinError instead of unwinding main.
    let task = tokio::spawn(async move {
        let paths = StartupPaths::default();
        bootstrap::run(
            argv,
            &paths,
            KbcClientFactory,
            lifecycle::termination_signal(),
        )
        .await
    });

    task.await.context("client task aborted")
}
