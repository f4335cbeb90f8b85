//! # Demand Forecast
//!
//! Per-product daily demand forecasting for inventory planning.
//!
//! ## Features
//!
//! - Typed observations with a single, documented default table
//! - Feature derivation from raw sales rows (lags and trailing means)
//! - Regression models (bagged random forest, ridge-stabilised least squares)
//! - Pluggable multi-day forecasting strategies
//! - Training metrics (MAE, RMSE, R², MAPE and the accuracy ratio)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use demand_forecast::data::{DataLoader, ProductContext};
//! use demand_forecast::models::{DemandForecaster, ModelConfig};
//! use demand_forecast::strategy::{ForecastStrategy, NaiveRecursive};
//!
//! # fn main() -> demand_forecast::error::Result<()> {
//! // Load labelled history
//! let observations = DataLoader::from_csv("history.csv")?;
//!
//! // Train the default random forest
//! let forecaster = DemandForecaster::from_config(&ModelConfig::default())?;
//! let (model, report) = forecaster.fit(&observations)?;
//! println!("accuracy: {:.3}", report.accuracy);
//!
//! // Forecast the next week
//! let context = ProductContext {
//!     recent_sales: vec![4.0, 5.0, 3.0, 6.0, 4.0],
//!     ..Default::default()
//! };
//! let forecast = NaiveRecursive.forecast(&model, &context, 7)?;
//! println!("{:?}", forecast.values());
//! # Ok(())
//! # }
//! ```

pub mod data;
pub mod error;
pub mod features;
pub mod history;
pub mod metrics;
pub mod models;
pub mod strategy;
pub mod utils;

// Re-export commonly used types
pub use crate::data::{DataLoader, ProductContext};
pub use crate::error::ForecastError;
pub use crate::features::{FeatureVector, Observation, ObservationRecord, FEATURE_NAMES};
pub use crate::metrics::{RegressionMetrics, TrainingReport};
pub use crate::models::{
    DemandForecaster, DemandModel, ModelConfig, ModelKind, TrainedDemandModel, TrainedForecaster,
};
pub use crate::strategy::{ForecastResult, ForecastStrategy, NaiveRecursive};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
