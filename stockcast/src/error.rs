//! Error types for the stockcast engine

use demand_forecast::ForecastError;
use inventory_planner::PlanningError;
use thiserror::Error;

/// Errors surfaced by [`crate::InventoryEngine`]
#[derive(Debug, Error)]
pub enum EngineError {
    /// Forecasting or saving was requested before a model was trained or loaded
    #[error("Demand model is not trained")]
    NotTrained,

    /// A saved artifact could not be written or read back
    #[error("Persistence error: {0}")]
    PersistenceError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error(transparent)]
    Planning(#[from] PlanningError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
