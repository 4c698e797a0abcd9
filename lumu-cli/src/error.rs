//! CLI-specific error types and exit code mapping

use lumu_dns_log::DnsLogError;

/// CLI-specific error type.
///
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The input log file does not exist.
    #[error("File {path} not found.")]
    FileNotFound { path: String },

    /// Configuration loading or validation failure (including the env file).
    #[error("configuration error: {0}")]
    Config(String),

    /// Any other pipeline failure.
    #[error("{0}")]
    Pipeline(DnsLogError),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                         |
    /// |------|---------------------------------|
    /// | 0    | Success or user interrupt       |
    /// | 1    | Input file not found / general  |
    /// | 2    | Configuration error             |
    /// | 10   | IO error                        |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Io(_) => 10,
            Self::FileNotFound { .. } | Self::Pipeline(_) | Self::JsonSerialize(_) => 1,
        }
    }
}

impl From<DnsLogError> for CliError {
    fn from(e: DnsLogError) -> Self {
        match e {
            DnsLogError::FileNotFound { path } => Self::FileNotFound { path },
            DnsLogError::Config { .. } | DnsLogError::EnvFile { .. } => {
                Self::Config(e.to_string())
            }
            other => Self::Pipeline(other),
        }
    }
}
