//! Feature building for demand models
//!
//! A raw [`ObservationRecord`] carries every field as optional. Converting it
//! into an [`Observation`] resolves each missing field exactly once, either
//! from the calendar date or from [`FEATURE_DEFAULTS`]. The resulting
//! [`FeatureVector`] always has the column order given by [`FEATURE_NAMES`],
//! for training and inference alike.

use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// Number of model features
pub const N_FEATURES: usize = 13;

/// Column order of every feature vector
pub const FEATURE_NAMES: [&str; N_FEATURES] = [
    "day_of_week",
    "month",
    "is_weekend",
    "lag_1",
    "lag_7",
    "lag_30",
    "ma_7",
    "ma_30",
    "is_holiday",
    "weather_score",
    "promotion_active",
    "price",
    "category_encoded",
];

/// Values substituted for missing optional fields.
///
/// | field              | default |
/// |--------------------|---------|
/// | lag_1, lag_7, lag_30 | 0.0   |
/// | ma_7, ma_30        | 0.0     |
/// | is_holiday         | false   |
/// | weather_score      | 0.5     |
/// | promotion_active   | false   |
/// | price              | 0.0     |
/// | category_encoded   | 0.0     |
///
/// Calendar fields have no default: `day_of_week` and `month` come from the
/// record or its `date`, and `is_weekend` falls back to `day_of_week >= 5`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureDefaults {
    pub lag: f64,
    pub moving_average: f64,
    pub is_holiday: bool,
    pub weather_score: f64,
    pub promotion_active: bool,
    pub price: f64,
    pub category_encoded: f64,
}

pub const FEATURE_DEFAULTS: FeatureDefaults = FeatureDefaults {
    lag: 0.0,
    moving_average: 0.0,
    is_holiday: false,
    weather_score: 0.5,
    promotion_active: false,
    price: 0.0,
    category_encoded: 0.0,
};

/// One raw historical row, as read from CSV or JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub day_of_week: Option<u32>,
    #[serde(default)]
    pub month: Option<u32>,
    #[serde(default, deserialize_with = "flag")]
    pub is_weekend: Option<bool>,
    #[serde(default)]
    pub lag_1: Option<f64>,
    #[serde(default)]
    pub lag_7: Option<f64>,
    #[serde(default)]
    pub lag_30: Option<f64>,
    #[serde(default)]
    pub ma_7: Option<f64>,
    #[serde(default)]
    pub ma_30: Option<f64>,
    #[serde(default, deserialize_with = "flag")]
    pub is_holiday: Option<bool>,
    #[serde(default)]
    pub weather_score: Option<f64>,
    #[serde(default, deserialize_with = "flag")]
    pub promotion_active: Option<bool>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub category_encoded: Option<f64>,
    /// Realised sales; only required for training
    #[serde(default)]
    pub actual_sales: Option<f64>,
}

/// A fully resolved observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: Option<NaiveDate>,
    pub product_id: Option<String>,
    pub day_of_week: u32,
    pub month: u32,
    pub is_weekend: bool,
    pub lag_1: f64,
    pub lag_7: f64,
    pub lag_30: f64,
    pub ma_7: f64,
    pub ma_30: f64,
    pub is_holiday: bool,
    pub weather_score: f64,
    pub promotion_active: bool,
    pub price: f64,
    pub category_encoded: f64,
    pub actual_sales: Option<f64>,
}

/// Fixed-order numeric features for one observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; N_FEATURES]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Value of a named feature
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.0[i])
    }
}

impl Observation {
    /// Resolve a raw record against the default table
    pub fn from_record(record: ObservationRecord) -> Result<Self> {
        let day_of_week = match (record.day_of_week, record.date) {
            (Some(day), _) => day,
            (None, Some(date)) => date.weekday().num_days_from_monday(),
            (None, None) => {
                return Err(ForecastError::ConfigurationError(
                    "day_of_week is missing and there is no date to derive it from".to_string(),
                ))
            }
        };
        let month = match (record.month, record.date) {
            (Some(month), _) => month,
            (None, Some(date)) => date.month(),
            (None, None) => {
                return Err(ForecastError::ConfigurationError(
                    "month is missing and there is no date to derive it from".to_string(),
                ))
            }
        };

        if day_of_week > 6 {
            return Err(ForecastError::DataError(format!(
                "day_of_week must be in 0..=6, got {}",
                day_of_week
            )));
        }
        if !(1..=12).contains(&month) {
            return Err(ForecastError::DataError(format!(
                "month must be in 1..=12, got {}",
                month
            )));
        }

        let d = FEATURE_DEFAULTS;
        let observation = Self {
            date: record.date,
            product_id: record.product_id,
            day_of_week,
            month,
            is_weekend: record.is_weekend.unwrap_or(day_of_week >= 5),
            lag_1: record.lag_1.unwrap_or(d.lag),
            lag_7: record.lag_7.unwrap_or(d.lag),
            lag_30: record.lag_30.unwrap_or(d.lag),
            ma_7: record.ma_7.unwrap_or(d.moving_average),
            ma_30: record.ma_30.unwrap_or(d.moving_average),
            is_holiday: record.is_holiday.unwrap_or(d.is_holiday),
            weather_score: record.weather_score.unwrap_or(d.weather_score),
            promotion_active: record.promotion_active.unwrap_or(d.promotion_active),
            price: record.price.unwrap_or(d.price),
            category_encoded: record.category_encoded.unwrap_or(d.category_encoded),
            actual_sales: record.actual_sales,
        };
        observation.validate()?;
        Ok(observation)
    }

    fn validate(&self) -> Result<()> {
        let sales_like = [
            ("lag_1", self.lag_1),
            ("lag_7", self.lag_7),
            ("lag_30", self.lag_30),
            ("ma_7", self.ma_7),
            ("ma_30", self.ma_30),
        ];
        for (name, value) in sales_like {
            if !value.is_finite() || value < 0.0 {
                return Err(ForecastError::DataError(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.weather_score) {
            return Err(ForecastError::DataError(format!(
                "weather_score must be in [0, 1], got {}",
                self.weather_score
            )));
        }
        if !self.price.is_finite() || !self.category_encoded.is_finite() {
            return Err(ForecastError::DataError(
                "price and category_encoded must be finite".to_string(),
            ));
        }
        if let Some(sales) = self.actual_sales {
            if !sales.is_finite() || sales < 0.0 {
                return Err(ForecastError::DataError(format!(
                    "actual_sales must be a non-negative number, got {}",
                    sales
                )));
            }
        }
        Ok(())
    }

    /// Feature vector in [`FEATURE_NAMES`] order
    pub fn features(&self) -> FeatureVector {
        FeatureVector([
            self.day_of_week as f64,
            self.month as f64,
            bool_feature(self.is_weekend),
            self.lag_1,
            self.lag_7,
            self.lag_30,
            self.ma_7,
            self.ma_30,
            bool_feature(self.is_holiday),
            self.weather_score,
            bool_feature(self.promotion_active),
            self.price,
            self.category_encoded,
        ])
    }

    /// Training label, or a data error naming the row
    pub fn label(&self) -> Result<f64> {
        self.actual_sales.ok_or_else(|| {
            ForecastError::DataError(format!(
                "Observation for {} on {} has no actual_sales",
                self.product_id.as_deref().unwrap_or("<unknown product>"),
                self.date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "<unknown date>".to_string())
            ))
        })
    }
}

impl TryFrom<ObservationRecord> for Observation {
    type Error = ForecastError;

    fn try_from(record: ObservationRecord) -> Result<Self> {
        Observation::from_record(record)
    }
}

/// Build features for a batch of records, failing on the first bad record
pub fn build_observations(records: Vec<ObservationRecord>) -> Result<Vec<Observation>> {
    records
        .into_iter()
        .enumerate()
        .map(|(row, record)| {
            Observation::from_record(record).map_err(|e| match e {
                ForecastError::DataError(msg) => {
                    ForecastError::DataError(format!("row {}: {}", row, msg))
                }
                ForecastError::ConfigurationError(msg) => {
                    ForecastError::ConfigurationError(format!("row {}: {}", row, msg))
                }
                other => other,
            })
        })
        .collect()
}

fn bool_feature(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}

/// Accepts `true`/`false`, `0`/`1` and their string forms
fn flag<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlagValue {
        Bool(bool),
        Number(f64),
        Text(String),
    }

    let value = Option::<FlagValue>::deserialize(deserializer)?;
    Ok(match value {
        None => None,
        Some(FlagValue::Bool(b)) => Some(b),
        Some(FlagValue::Number(n)) => Some(n != 0.0),
        Some(FlagValue::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "" => None,
            "1" | "true" | "yes" | "y" => Some(true),
            "0" | "false" | "no" | "n" => Some(false),
            other => {
                return Err(serde::de::Error::custom(format!(
                    "invalid boolean flag '{}'",
                    other
                )))
            }
        },
    })
}
