//! Observation loading and forecasting context

use crate::error::{ForecastError, Result};
use crate::features::{build_observations, Observation, ObservationRecord};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Loader for observation tables
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load observations from a CSV file with a header row.
    ///
    /// Column names follow [`ObservationRecord`]; every column except the
    /// calendar (either `date`, or `day_of_week` and `month`) may be omitted.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Observation>> {
        let file = File::open(path.as_ref())?;
        let observations = Self::from_reader(file)?;
        debug!(
            path = %path.as_ref().display(),
            rows = observations.len(),
            "loaded observations"
        );
        Ok(observations)
    }

    /// Load observations from any CSV reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Observation>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let records = csv_reader
            .deserialize::<ObservationRecord>()
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if records.is_empty() {
            return Err(ForecastError::DataError(
                "No observations found in input".to_string(),
            ));
        }

        build_observations(records)
    }

    /// Load observation records from a JSON array
    pub fn from_json(json: &str) -> Result<Vec<Observation>> {
        let records: Vec<ObservationRecord> = serde_json::from_str(json)
            .map_err(|e| ForecastError::DataError(format!("Invalid observation JSON: {}", e)))?;
        build_observations(records)
    }
}

/// Recent state of one product, used to seed a forecast.
///
/// Missing values fall back to the feature default table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductContext {
    #[serde(default)]
    pub product_id: Option<String>,
    /// Last day with known sales; the forecast starts the day after.
    /// Defaults to today (UTC).
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
    /// Most recent daily sales, oldest first; the last entry seeds `lag_1`
    #[serde(default)]
    pub recent_sales: Vec<f64>,
    #[serde(default)]
    pub sales_7_days_ago: Option<f64>,
    #[serde(default)]
    pub sales_30_days_ago: Option<f64>,
    #[serde(default)]
    pub avg_sales_7d: Option<f64>,
    #[serde(default)]
    pub avg_sales_30d: Option<f64>,
    #[serde(default)]
    pub is_holiday: Option<bool>,
    #[serde(default)]
    pub weather_score: Option<f64>,
    #[serde(default)]
    pub promotion_active: Option<bool>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub category_encoded: Option<f64>,
}

impl ProductContext {
    /// Forecast anchor date
    pub fn anchor(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Most recent known daily sales
    pub fn last_sales(&self) -> Option<f64> {
        self.recent_sales.last().copied()
    }

    /// Observation for a future `date` with the given `lag_1`.
    ///
    /// Every other lag and rolling feature is taken from the context as-is.
    pub fn observation_for(&self, date: NaiveDate, lag_1: Option<f64>) -> Result<Observation> {
        Observation::from_record(ObservationRecord {
            date: Some(date),
            product_id: self.product_id.clone(),
            lag_1,
            lag_7: self.sales_7_days_ago,
            lag_30: self.sales_30_days_ago,
            ma_7: self.avg_sales_7d,
            ma_30: self.avg_sales_30d,
            is_holiday: self.is_holiday,
            weather_score: self.weather_score,
            promotion_active: self.promotion_active,
            price: self.price,
            category_encoded: self.category_encoded,
            ..Default::default()
        })
    }
}
