// src/error.rs

use std::path::PathBuf;

use thiserror::Error;

/// Unexpected failure while fetching one coordinate. Absorbed per cell.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("lookup failed unexpectedly: {0}")]
    Unexpected(String),
}

#[derive(Debug, Error)]
pub enum GridError {
    #[error("cannot read workbook {path}: {message}")]
    Read { path: String, message: String },
    #[error("workbook {0} has no worksheet")]
    NoWorksheet(String),
    #[error("cell ({row}, {col}) is outside the xlsx address range")]
    OutOfRange { row: usize, col: usize },
    #[error("xlsx write error: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Run-level failures. Everything else is written into cells as placeholders.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input grid could not be read: {0}")]
    GridRead(#[source] GridError),
    #[error("output could not be written: {0}")]
    Persist(#[source] GridError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("HTTP client setup failed: {0}")]
    Client(#[from] reqwest::Error),
}
