//! # Stockcast
//!
//! `stockcast` is the decision-support engine for retail inventory. It ties
//! together the workspace crates:
//!
//! - [`demand_forecast`] for per-product daily demand
//! - [`inventory_planner`] for alerts, reorder plans and warehouse transfers
//!
//! and adds engine configuration, model persistence and tracing setup.
//!
//! ## Example
//!
//! ```no_run
//! use demand_forecast::data::ProductContext;
//! use demand_forecast::utils::{synthetic_observations, SyntheticParams};
//! use stockcast::{EngineConfig, InventoryEngine};
//!
//! # fn main() -> stockcast::Result<()> {
//! let mut engine = InventoryEngine::new(EngineConfig::default())?;
//!
//! let observations = synthetic_observations(&SyntheticParams::default())?;
//! let accuracy = engine.train_demand_forecaster(&observations)?;
//! println!("accuracy: {:.2}", accuracy);
//!
//! let context = ProductContext {
//!     recent_sales: vec![5.0, 4.0, 6.0],
//!     ..Default::default()
//! };
//! let week = engine.forecast_demand(&context, 7)?;
//! assert_eq!(week.len(), 7);
//!
//! engine.save_models("models/store_42")?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod persistence;

pub use config::EngineConfig;
pub use engine::InventoryEngine;
pub use error::{EngineError, Result};
pub use logging::init_tracing;
pub use persistence::{ArtifactKind, ModelBundle, FORMAT_VERSION};

pub use demand_forecast;
pub use inventory_planner;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
