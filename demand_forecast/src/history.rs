//! Deriving observations from raw sales rows
//!
//! Sales rows are summed per product and calendar day into zero-filled
//! daily series. Lag features look back `k` days from the observed day and
//! rolling means cover the window ending the day before, so no feature ever
//! contains the label it is paired with.

use crate::data::ProductContext;
use crate::error::{ForecastError, Result};
use crate::features::ObservationRecord;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use stock_math::moving_averages::{rolling_means, trailing_mean};

/// Lag offsets, in days, used as features
pub const LAGS: [usize; 3] = [1, 7, 30];

/// Rolling windows, in days, used as features
pub const WINDOWS: [usize; 2] = [7, 30];

/// One sales row as supplied by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub product_id: String,
    pub quantity: f64,
    pub sale_date: NaiveDate,
}

/// Contiguous daily sales for one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    start: NaiveDate,
    quantities: Vec<f64>,
}

impl DailySeries {
    /// Build a series from consecutive daily quantities starting at `start`
    pub fn new(start: NaiveDate, quantities: Vec<f64>) -> Result<Self> {
        if quantities.is_empty() {
            return Err(ForecastError::DataError(
                "Daily series must contain at least one day".to_string(),
            ));
        }
        if let Some(bad) = quantities.iter().find(|q| !q.is_finite() || **q < 0.0) {
            return Err(ForecastError::DataError(format!(
                "Daily quantities must be non-negative, got {}",
                bad
            )));
        }
        Ok(Self { start, quantities })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day covered by the series
    pub fn end(&self) -> NaiveDate {
        self.date_at(self.quantities.len() - 1)
    }

    pub fn quantities(&self) -> &[f64] {
        &self.quantities
    }

    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    fn date_at(&self, index: usize) -> NaiveDate {
        self.start + Duration::days(index as i64)
    }

    /// One labelled record per day, skipping the first `warmup` days.
    ///
    /// Lags and means that reach before the start of the series are left
    /// unset, so the feature default table applies to them.
    pub fn observation_records(
        &self,
        product_id: &str,
        warmup: usize,
    ) -> Result<Vec<ObservationRecord>> {
        let q = &self.quantities;
        let ma_7 = rolling_means(q, WINDOWS[0])?;
        let ma_30 = rolling_means(q, WINDOWS[1])?;

        let lag = |i: usize, k: usize| if i >= k { Some(q[i - k]) } else { None };
        let prev = |means: &[Option<f64>], i: usize| if i >= 1 { means[i - 1] } else { None };

        Ok((warmup..q.len())
            .map(|i| ObservationRecord {
                date: Some(self.date_at(i)),
                product_id: Some(product_id.to_string()),
                lag_1: lag(i, LAGS[0]),
                lag_7: lag(i, LAGS[1]),
                lag_30: lag(i, LAGS[2]),
                ma_7: prev(&ma_7, i),
                ma_30: prev(&ma_30, i),
                actual_sales: Some(q[i]),
                ..Default::default()
            })
            .collect())
    }

    /// Forecasting context anchored at the last day of the series.
    ///
    /// Uses the same offsets as [`DailySeries::observation_records`], seen
    /// from the first forecast day.
    pub fn context(&self, product_id: &str) -> ProductContext {
        let q = &self.quantities;
        let n = q.len();
        let back = |k: usize| if n >= k { Some(q[n - k]) } else { None };
        let recent_from = n.saturating_sub(WINDOWS[0]);

        ProductContext {
            product_id: Some(product_id.to_string()),
            as_of: Some(self.end()),
            recent_sales: q[recent_from..].to_vec(),
            sales_7_days_ago: back(LAGS[1]),
            sales_30_days_ago: back(LAGS[2]),
            avg_sales_7d: trailing_mean(q, WINDOWS[0]),
            avg_sales_30d: trailing_mean(q, WINDOWS[1]),
            ..Default::default()
        }
    }
}

/// Sum sales rows into one zero-filled daily series per product
pub fn aggregate_daily(records: &[SalesRecord]) -> Result<BTreeMap<String, DailySeries>> {
    let mut per_product: BTreeMap<&str, BTreeMap<NaiveDate, f64>> = BTreeMap::new();

    for record in records {
        if !record.quantity.is_finite() || record.quantity < 0.0 {
            return Err(ForecastError::DataError(format!(
                "Sales row for {} on {} has invalid quantity {}",
                record.product_id, record.sale_date, record.quantity
            )));
        }
        *per_product
            .entry(record.product_id.as_str())
            .or_default()
            .entry(record.sale_date)
            .or_insert(0.0) += record.quantity;
    }

    let mut series = BTreeMap::new();
    for (product_id, days) in per_product {
        let (first, last) = match (days.keys().next(), days.keys().next_back()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => continue,
        };
        let span = (last - first).num_days() as usize + 1;
        let mut quantities = vec![0.0; span];
        for (date, qty) in days {
            quantities[(date - first).num_days() as usize] = qty;
        }
        series.insert(product_id.to_string(), DailySeries::new(first, quantities)?);
    }

    Ok(series)
}
