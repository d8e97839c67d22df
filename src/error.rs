//! Error types for the water-heater population simulator.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can stop construction or a run.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or inconsistent physical/control parameters. Fatal at construction.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No environment data exists for the requested step.
    #[error("no environment data for step {step} (profile covers {available} steps)")]
    EnvironmentRange { step: usize, available: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
