//! Log processing handler: config assembly, pipeline run, outcome echo

use std::path::Path;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use lumu_dns_log::{
    BatchSink, CollectorClient, DeliveryResult, DnsLogPipelineBuilder, EnvFile, PipelineConfig,
    PipelineConfigBuilder, RunOutcome, RunSummary, StatsReport,
};

use crate::cli::Cli;
use crate::error::CliError;
use crate::output::OutputWriter;

/// Process the log file named on the command line.
///
/// Returns `RunOutcome::Interrupted` without rendering a report when the
/// token is cancelled mid-run.
pub async fn execute(
    cli: &Cli,
    writer: &OutputWriter,
    cancel: &CancellationToken,
) -> Result<RunOutcome, CliError> {
    let echo = writer.is_text();
    let config = load_config(cli, echo).await?;

    if echo {
        println!("Processing file: {}", cli.filename.display());
    }

    let (summary, report) = if config.send_to_api {
        let sink = CollectorClient::new(&config.delivery)?;
        info!(endpoint = sink.endpoint(), batch_size = config.batch_size, "delivery enabled");
        drive(
            DnsLogPipelineBuilder::new().config(config).sink(sink),
            &cli.filename,
            cancel,
            echo,
        )
        .await?
    } else {
        drive(
            DnsLogPipelineBuilder::new().config(config),
            &cli.filename,
            cancel,
            echo,
        )
        .await?
    };

    info!(
        lines = summary.lines_read,
        records = summary.records_extracted,
        misses = summary.extraction_misses,
        batches = summary.delivery.batches_attempted,
        failed_batches = summary.delivery.batches_failed,
        dropped = summary.delivery.records_dropped,
        "run finished"
    );

    if summary.outcome == RunOutcome::Completed {
        writer.render(&report)?;
    }
    Ok(summary.outcome)
}

/// Build the pipeline config: defaults, then env file / environment, then flags.
async fn load_config(cli: &Cli, echo: bool) -> Result<PipelineConfig, CliError> {
    let env = EnvFile::load(&cli.env_file).await?;
    if echo && !cli.env_file.exists() {
        println!("File {} not found.", cli.env_file.display());
    }

    let mut config = PipelineConfig::default();
    config.apply_env_overrides(&env);

    let mut builder = PipelineConfigBuilder::from_config(config).send_to_api(cli.send_to_api);
    if let Some(size) = cli.batch_size {
        builder = builder.batch_size(size);
    }
    Ok(builder.build()?)
}

/// Run one pipeline to completion while a side task echoes batch outcomes.
async fn drive<S: BatchSink>(
    builder: DnsLogPipelineBuilder<S>,
    path: &Path,
    cancel: &CancellationToken,
    echo: bool,
) -> Result<(RunSummary, StatsReport), CliError> {
    let (mut pipeline, outcome_rx) = builder.build()?;
    let printer = outcome_rx.map(|rx| tokio::spawn(print_outcomes(rx, echo)));

    let result = pipeline.process_file(path, cancel).await;
    let report = pipeline.report();

    // dropping the pipeline closes the outcome channel so the printer drains and exits
    drop(pipeline);
    if let Some(printer) = printer {
        if let Err(e) = printer.await {
            tracing::warn!(error = %e, "outcome printer task failed");
        }
    }

    Ok((result?, report))
}

async fn print_outcomes(mut rx: mpsc::Receiver<DeliveryResult>, echo: bool) {
    use colored::Colorize;

    while let Some(outcome) = rx.recv().await {
        if !echo {
            continue;
        }
        let line = outcome.to_string();
        if outcome.is_ok() {
            println!("{}", line.green());
        } else {
            println!("{}", line.red());
        }
    }
}
