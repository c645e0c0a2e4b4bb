// src/errors.rs
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors. Each one means the caller's configuration must change before
/// retrying; native-call failures never end up here.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("macOS strategy not specified")]
    MissingMacStrategy,

    #[error("Invalid macOS strategy '{0}' (expected 'jxa' or 'applescript')")]
    InvalidMacStrategy(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error accessing path '{path}': {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Argument parsing error: {0}")]
    CliArgs(#[from] clap::Error),
}

pub type AppResult<T> = Result<T, AppError>;
