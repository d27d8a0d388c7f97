use qae_core::QaeError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExperimentError>;

#[derive(Error, Debug)]
pub enum ExperimentError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Plot error: {0}")]
    Plot(String),

    #[error("Engine error: {0}")]
    Core(#[from] QaeError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ExperimentError {
    pub fn plot(err: impl std::fmt::Display) -> Self {
        ExperimentError::Plot(err.to_string())
    }
}
