//! # Inventory Planner
//!
//! `inventory_planner` turns current stock snapshots and demand forecasts
//! into decisions: stock alerts, reorder policy and transfers between
//! warehouses.
//!
//! ## Components
//!
//! - **Alerts**: stock runway per SKU, classified as critical, low stock or overstock
//! - **Reorder**: economic order quantity, safety stock and reorder point per product
//! - **Warehouses**: clustering of warehouses into comparable logistics profiles
//! - **Redistribution**: transfer proposals between over- and underutilized
//!   warehouses of the same cluster
//!
//! Every batch operation returns a [`BatchOutcome`]. A malformed or ineligible
//! item is recorded in [`BatchOutcome::skipped`] and never aborts the batch.
//!
//! ## Usage Example
//!
//! ```no_run
//! use inventory_planner::alerts::{AlertConfig, AlertGenerator, SkuState};
//!
//! let generator = AlertGenerator::new(AlertConfig::default()).unwrap();
//! let items = vec![SkuState::new("1", 5.0, vec![4.0, 5.0, 6.0, 3.0, 2.0, 4.0, 5.0])];
//!
//! let outcome = generator.generate(&items);
//! for alert in &outcome.items {
//!     println!("{}", alert.message);
//! }
//! ```

use stock_math::MathError;
use thiserror::Error;

pub mod alerts;
pub mod batch;
pub mod redistribution;
pub mod reorder;
pub mod utils;
pub mod warehouse;

pub use alerts::{AlertConfig, AlertGenerator, AlertKind, InventoryAlert, SkuState};
pub use batch::{BatchOutcome, SkipReason, SkippedItem};
pub use redistribution::{
    RedistributionAnalysis, RedistributionConfig, RedistributionRecommender,
    RedistributionSuggestion, TransferPriority,
};
pub use reorder::{
    PlanOutcome, ProductCostState, ReorderConfig, ReorderOptimizer, ReorderPlan, Urgency,
};
pub use warehouse::{
    ClusterAssignment, ClusterConfig, FittedClusterer, SkuStock, WarehouseClusterer,
    WarehouseProfile, WarehouseSnapshot,
};

/// Errors that can occur in inventory planning
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanningError {
    /// Malformed input for a single item
    #[error("Data error: {0}")]
    DataError(String),

    /// Invalid configuration value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Math error: {0}")]
    MathError(#[from] MathError),
}

/// Result type for planning operations
pub type Result<T> = std::result::Result<T, PlanningError>;
