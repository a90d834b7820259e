use thiserror::Error;

use super::{ConfigError, OperationError, ValidationError, WorkerError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("CLI error: {source}")]
    Clap {
        #[from]
        source: clap::Error,
    },
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
    #[error("HTTP client error: {source}")]
    Reqwest {
        #[from]
        source: reqwest::Error,
    },
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Operation error: {0}")]
    Operation(#[from] OperationError),
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation<E>(error: E) -> Self
    where
        E: Into<ValidationError>,
    {
        error.into().into()
    }

    pub fn config<E>(error: E) -> Self
    where
        E: Into<ConfigError>,
    {
        error.into().into()
    }

    pub fn operation<E>(error: E) -> Self
    where
        E: Into<OperationError>,
    {
        error.into().into()
    }

    pub fn worker<E>(error: E) -> Self
    where
        E: Into<WorkerError>,
    {
        error.into().into()
    }
}
