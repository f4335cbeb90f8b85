//! # Stockcast workspace
//!
//! Umbrella crate re-exporting the workspace members:
//!
//! - [`stockcast`]: the [`InventoryEngine`] facade, configuration and persistence
//! - [`demand_forecast`]: per-product demand models and forecasting strategies
//! - [`inventory_planner`]: alerts, reorder plans and warehouse redistribution
//! - [`stock_math`]: numeric primitives shared by the above
//!
//! ## Example
//!
//! ```
//! use stockcast_workspace::{EngineConfig, InventoryEngine};
//! use stockcast_workspace::inventory_planner::alerts::SkuState;
//!
//! let engine = InventoryEngine::new(EngineConfig::default()).unwrap();
//! let alerts = engine.generate_inventory_alerts(&[SkuState::new("1", 5.0, vec![4.0; 7])]);
//! assert_eq!(alerts.items.len(), 1);
//! ```

pub use demand_forecast;
pub use inventory_planner;
pub use stock_math;
pub use stockcast;

pub use stockcast::{EngineConfig, EngineError, InventoryEngine};
