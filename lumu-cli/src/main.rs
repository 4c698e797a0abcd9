//! lumu-dns -- DNS query log ranking and Lumu collector forwarding
//!
//! Exit codes follow [`CliError::exit_code`]; an interrupt exits 0.

mod cli;
mod error;
mod logging;
mod output;
mod process;

use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use lumu_dns_log::RunOutcome;

use crate::cli::Cli;
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init_tracing(&cli.log_level, cli.log_format) {
        eprintln!("Error: {e}");
        return exit_code(&e);
    }
    lumu_dns_log::metrics::describe_all();

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("interrupt received, stopping");
                signal_token.cancel();
            }
            Err(e) => tracing::warn!(error = %e, "failed to listen for interrupt signal"),
        }
    });

    let writer = OutputWriter::new(cli.output);
    match process::execute(&cli, &writer, &cancel).await {
        Ok(RunOutcome::Completed) => ExitCode::SUCCESS,
        Ok(RunOutcome::Interrupted) => {
            println!("\nExiting...");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "lumu-dns failed");
            eprintln!("Error: {e}");
            exit_code(&e)
        }
    }
}

fn exit_code(err: &CliError) -> ExitCode {
    u8::try_from(err.exit_code())
        .map(ExitCode::from)
        .unwrap_or(ExitCode::FAILURE)
}
