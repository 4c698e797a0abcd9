//! CLI argument parsing using clap derive API
//!
//! Purely declarative; no side effects or I/O.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Parse a DNS query log, rank clients and hosts, and optionally forward
/// the queries to a Lumu custom collector.
#[derive(Parser, Debug)]
#[command(name = "lumu-dns", version, about, long_about = None)]
pub struct Cli {
    /// DNS query log file to process.
    pub filename: PathBuf,

    /// Send extracted queries to the Lumu collector API in batches.
    #[arg(long)]
    pub send_to_api: bool,

    /// KEY=VALUE file with LUMU_CLIENT_KEY and COLLECTOR_ID.
    #[arg(long, default_value = ".env")]
    pub env_file: PathBuf,

    /// Override the batch size (default 500).
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Log level when RUST_LOG is not set (trace, debug, info, warn, error).
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Diagnostic log format, written to stderr.
    #[arg(long, default_value = "pretty")]
    pub log_format: LogFormat,

    /// Report output format.
    #[arg(long, default_value = "text")]
    pub output: OutputFormat,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Ranked text tables.
    Text,
    /// Machine-readable JSON.
    Json,
}

/// Supported diagnostic log formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// JSON lines.
    Json,
    /// Human-readable multi-line output.
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_filename_only() {
        let cli = Cli::try_parse_from(["lumu-dns", "queries.log"]).expect("parse succeeded");
        assert_eq!(cli.filename, PathBuf::from("queries.log"));
        assert!(!cli.send_to_api, "send_to_api should default to false");
        assert_eq!(cli.env_file, PathBuf::from(".env"));
        assert!(cli.batch_size.is_none());
        assert_eq!(cli.log_level, "warn");
        assert_eq!(cli.log_format, LogFormat::Pretty);
        assert_eq!(cli.output, OutputFormat::Text);
    }

    #[test]
    fn test_cli_parse_send_to_api() {
        let cli = Cli::try_parse_from(["lumu-dns", "queries.log", "--send-to-api"])
            .expect("parse succeeded");
        assert!(cli.send_to_api);
    }

    #[test]
    fn test_cli_parse_all_options() {
        let cli = Cli::try_parse_from([
            "lumu-dns",
            "--send-to-api",
            "--env-file",
            "/etc/lumu/collector.env",
            "--batch-size",
            "100",
            "--log-level",
            "debug",
            "--log-format",
            "json",
            "--output",
            "json",
            "queries.log",
        ])
        .expect("parse succeeded");

        assert!(cli.send_to_api);
        assert_eq!(cli.env_file, PathBuf::from("/etc/lumu/collector.env"));
        assert_eq!(cli.batch_size, Some(100));
        assert_eq!(cli.log_level, "debug");
        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(cli.output, OutputFormat::Json);
    }

    #[test]
    fn test_cli_requires_filename() {
        let result = Cli::try_parse_from(["lumu-dns", "--send-to-api"]);
        assert!(result.is_err(), "filename is required");
    }

    #[test]
    fn test_cli_rejects_unknown_output_format() {
        let result = Cli::try_parse_from(["lumu-dns", "queries.log", "--output", "xml"]);
        assert!(result.is_err(), "xml is not a supported output format");
    }

    #[test]
    fn test_cli_rejects_non_numeric_batch_size() {
        let result = Cli::try_parse_from(["lumu-dns", "queries.log", "--batch-size", "many"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_debug_assert() {
        Cli::command().debug_assert();
    }
}
