//! Error types for matiks-core

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the matiks-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV decoding error that prevents reading the source at all
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Dataset file does not exist
    #[error("dataset not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// Dataset header lacks a required column
    #[error("dataset is missing required column: {0}")]
    MissingColumn(&'static str),
}

/// Result type alias for matiks-core
pub type Result<T> = std::result::Result<T, Error>;
