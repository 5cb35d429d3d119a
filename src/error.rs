//! Error types for the enercast library.

use thiserror::Error;

/// Result type alias for energy analytics operations.
pub type Result<T> = std::result::Result<T, EnergyError>;

/// Errors that can occur during normalization, forecasting, or detection.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnergyError {
    /// Tabular input could not be parsed at all.
    #[error("unreadable tabular input: {0}")]
    InputFormat(String),

    /// Too few observations for the requested operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// A persisted table carries no recognizable energy value column.
    #[error("no recognizable energy column")]
    NoEnergyColumn,

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Model has not been trained yet.
    #[error("model must be trained before prediction")]
    TrainRequired,

    /// Reading or writing a persisted table failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// The external recommendation service failed.
    #[error("recommendation service error: {0}")]
    Advisor(String),
}
