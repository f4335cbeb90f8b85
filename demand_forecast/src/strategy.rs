//! Multi-day forecasting strategies
//!
//! A strategy turns a trained one-step model plus a [`ProductContext`] into
//! a horizon of daily demand. Strategies are pluggable so that a true
//! multi-step model can replace [`NaiveRecursive`] without touching callers.

use crate::data::ProductContext;
use crate::error::{ForecastError, Result};
use crate::models::TrainedDemandModel;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::debug;

/// Daily demand forecast; `values[i]` is the demand for `dates[i]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    values: Vec<u32>,
    dates: Vec<NaiveDate>,
}

impl ForecastResult {
    /// Create a new forecast result
    pub fn new(values: Vec<u32>, dates: Vec<NaiveDate>, horizon: usize) -> Result<Self> {
        if values.len() != horizon || dates.len() != horizon {
            return Err(ForecastError::ValidationError(format!(
                "Forecast has {} values and {} dates, expected {}",
                values.len(),
                dates.len(),
                horizon
            )));
        }
        Ok(Self { values, dates })
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[u32] {
        &self.values
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Number of forecast days
    pub fn horizon(&self) -> usize {
        self.values.len()
    }

    /// Total demand over the horizon
    pub fn total(&self) -> u64 {
        self.values.iter().map(|&v| v as u64).sum()
    }

    pub fn into_values(self) -> Vec<u32> {
        self.values
    }
}

/// Produces a multi-day forecast from a one-step model
pub trait ForecastStrategy: Debug {
    fn name(&self) -> &str;

    /// Forecast `horizon` consecutive days after `context.anchor()`
    fn forecast(
        &self,
        model: &dyn TrainedDemandModel,
        context: &ProductContext,
        horizon: usize,
    ) -> Result<ForecastResult>;
}

/// Naive recursive forecasting.
///
/// Day `k`'s clamped prediction is fed back as day `k + 1`'s `lag_1`. Every
/// other lag and rolling feature stays at the context's last known value for
/// the whole horizon, so `lag_7`, `lag_30` and the moving averages go stale
/// after the first day. Expect growing bias for horizons beyond one day,
/// most visibly when recent demand is trending.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveRecursive;

impl ForecastStrategy for NaiveRecursive {
    fn name(&self) -> &str {
        "naive_recursive"
    }

    fn forecast(
        &self,
        model: &dyn TrainedDemandModel,
        context: &ProductContext,
        horizon: usize,
    ) -> Result<ForecastResult> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be at least one day".to_string(),
            ));
        }

        let anchor = context.anchor();
        let mut lag_1 = context.last_sales();
        let mut values = Vec::with_capacity(horizon);
        let mut dates = Vec::with_capacity(horizon);

        for day in 1..=horizon {
            let date = anchor + Duration::days(day as i64);
            let observation = context.observation_for(date, lag_1)?;
            let demand = model.predict(&observation.features())?;

            debug!(%date, demand, "recursive step");

            values.push(demand.round() as u32);
            dates.push(date);
            lag_1 = Some(demand);
        }

        ForecastResult::new(values, dates, horizon)
    }
}
