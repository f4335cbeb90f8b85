//! The inventory engine facade
//!
//! [`InventoryEngine`] owns the trained demand model and the most recent
//! warehouse clusterer. Every other component is stateless and built once
//! from [`EngineConfig`].

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::persistence::ModelBundle;
use demand_forecast::data::ProductContext;
use demand_forecast::features::Observation;
use demand_forecast::metrics::TrainingReport;
use demand_forecast::models::{DemandForecaster, TrainedForecaster};
use demand_forecast::strategy::{ForecastResult, ForecastStrategy, NaiveRecursive};
use inventory_planner::alerts::{AlertGenerator, InventoryAlert, SkuState};
use inventory_planner::batch::BatchOutcome;
use inventory_planner::redistribution::{RedistributionAnalysis, RedistributionRecommender};
use inventory_planner::reorder::{ProductCostState, ReorderOptimizer, ReorderPlan};
use inventory_planner::warehouse::{FittedClusterer, WarehouseClusterer, WarehouseSnapshot};
use std::path::Path;
use tracing::{info, warn};

/// Demand forecasting, alerts, reorder planning and redistribution behind
/// one owner.
///
/// Single-threaded: operations that change the owned model take `&mut self`.
#[derive(Debug)]
pub struct InventoryEngine {
    config: EngineConfig,
    forecaster: DemandForecaster,
    strategy: Box<dyn ForecastStrategy>,
    clusterer: WarehouseClusterer,
    recommender: RedistributionRecommender,
    alerts: AlertGenerator,
    reorder: ReorderOptimizer,
    model: Option<TrainedForecaster>,
    report: Option<TrainingReport>,
    fitted_clusterer: Option<FittedClusterer>,
}

impl InventoryEngine {
    /// Build an engine, failing with `ConfigurationError` on invalid settings
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            forecaster: DemandForecaster::from_config(&config.model)?,
            strategy: Box::new(NaiveRecursive),
            clusterer: WarehouseClusterer::new(config.cluster.clone())?,
            recommender: RedistributionRecommender::new(config.redistribution.clone())?,
            alerts: AlertGenerator::new(config.alerts.clone())?,
            reorder: ReorderOptimizer::new(config.reorder.clone())?,
            model: None,
            report: None,
            fitted_clusterer: None,
            config,
        })
    }

    /// Replace the multi-day forecasting strategy
    pub fn with_strategy(mut self, strategy: Box<dyn ForecastStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    pub fn model(&self) -> Option<&TrainedForecaster> {
        self.model.as_ref()
    }

    /// Report from the latest successful training in this engine
    pub fn training_report(&self) -> Option<&TrainingReport> {
        self.report.as_ref()
    }

    /// Scaler and k-means fitted by the latest redistribution analysis
    pub fn fitted_clusterer(&self) -> Option<&FittedClusterer> {
        self.fitted_clusterer.as_ref()
    }

    /// Train the demand model and return its training-set accuracy.
    ///
    /// The previous model stays in place when training fails.
    pub fn train_demand_forecaster(&mut self, observations: &[Observation]) -> Result<f64> {
        let (model, report) = self.forecaster.fit(observations)?;
        let accuracy = report.accuracy;
        self.model = Some(model);
        self.report = Some(report);
        Ok(accuracy)
    }

    /// Daily demand for `horizon` days after the context's as-of date
    pub fn forecast_demand(&self, context: &ProductContext, horizon: usize) -> Result<Vec<u32>> {
        Ok(self.forecast(context, horizon)?.into_values())
    }

    /// Like [`Self::forecast_demand`], keeping the forecast dates
    pub fn forecast(&self, context: &ProductContext, horizon: usize) -> Result<ForecastResult> {
        let model = self.model.as_ref().ok_or(EngineError::NotTrained)?;
        let result = self.strategy.forecast(model, context, horizon)?;
        info!(
            product = context.product_id.as_deref().unwrap_or("-"),
            strategy = self.strategy.name(),
            horizon,
            total = result.total(),
            "demand forecast produced"
        );
        Ok(result)
    }

    /// Cluster the warehouses and propose transfers inside each cluster.
    ///
    /// The scaler is refit on this batch only. The fitted clusterer is kept
    /// for persistence and does not influence later analyses.
    pub fn analyze_warehouse_redistribution(
        &mut self,
        warehouses: &[WarehouseSnapshot],
    ) -> Result<RedistributionAnalysis> {
        let (analysis, assignment) = self.recommender.analyze(&self.clusterer, warehouses)?;
        match assignment.fitted {
            Some(fitted) => self.fitted_clusterer = Some(fitted),
            None => warn!("no valid warehouses in batch, keeping previous clusterer"),
        }
        Ok(analysis)
    }

    /// Stock alerts sorted by confidence, most urgent first
    pub fn generate_inventory_alerts(&self, items: &[SkuState]) -> BatchOutcome<InventoryAlert> {
        self.alerts.generate(items)
    }

    /// Reorder plans for every eligible product, in input order
    pub fn optimize_reorder_quantities(
        &self,
        products: &[ProductCostState],
    ) -> BatchOutcome<ReorderPlan> {
        self.reorder.optimize(products)
    }

    /// Save the demand model, clusterer and scaler under `prefix`
    pub fn save_models<P: AsRef<Path>>(&self, prefix: P) -> Result<()> {
        let forecaster = self.model.clone().ok_or(EngineError::NotTrained)?;
        ModelBundle {
            forecaster,
            clusterer: self.fitted_clusterer.clone(),
        }
        .save(prefix)
    }

    /// Replace the owned model state with a saved bundle.
    ///
    /// On any failure the engine keeps its current state.
    pub fn load_models<P: AsRef<Path>>(&mut self, prefix: P) -> Result<()> {
        let bundle = ModelBundle::load(prefix)?;
        self.model = Some(bundle.forecaster);
        self.fitted_clusterer = bundle.clusterer;
        self.report = None;
        Ok(())
    }
}
