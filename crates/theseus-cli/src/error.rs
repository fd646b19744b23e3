use std::path::PathBuf;
use theseus::engine::error::EngineError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    TheseusCore(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse file '{path}': {source}", path = path.display())]
    FileParsing {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Process exit status: 2 for usage and configuration mistakes, 130 for an
    /// interrupted run, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Argument(_) | Self::Config(_) | Self::FileParsing { .. } => 2,
            Self::TheseusCore(EngineError::Config(_)) => 2,
            Self::TheseusCore(EngineError::Cancelled) => 130,
            _ => 1,
        }
    }
}
