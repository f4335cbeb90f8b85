//! Utility functions for the demand_forecast crate

use crate::error::{ForecastError, Result};
use crate::features::{build_observations, Observation, ObservationRecord};
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Bernoulli, Distribution, Normal, Poisson};

/// Parameters for generated demand history
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticParams {
    pub n_days: usize,
    pub start: NaiveDate,
    /// Poisson mean of daily sales and of the lag columns
    pub mean_sales: f64,
    pub holiday_rate: f64,
    pub promotion_rate: f64,
    pub seed: u64,
}

impl Default for SyntheticParams {
    fn default() -> Self {
        Self {
            n_days: 365,
            start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or(NaiveDate::MIN),
            mean_sales: 5.0,
            holiday_rate: 0.1,
            promotion_rate: 0.2,
            seed: 42,
        }
    }
}

fn distribution_error<E: std::fmt::Display>(e: E) -> ForecastError {
    ForecastError::InvalidParameter(format!("Invalid synthetic distribution: {}", e))
}

/// Generate labelled, independent daily records.
///
/// Sales and lags are Poisson, moving averages are normal around the mean,
/// and price is normal around 100. The same seed gives the same records.
pub fn synthetic_records(params: &SyntheticParams) -> Result<Vec<ObservationRecord>> {
    if params.n_days == 0 {
        return Err(ForecastError::InvalidParameter(
            "Synthetic history needs at least one day".to_string(),
        ));
    }

    let sales = Poisson::new(params.mean_sales).map_err(distribution_error)?;
    let averages = Normal::new(params.mean_sales, 1.0).map_err(distribution_error)?;
    let price = Normal::new(100.0_f64, 10.0).map_err(distribution_error)?;
    let holiday = Bernoulli::new(params.holiday_rate).map_err(distribution_error)?;
    let promotion = Bernoulli::new(params.promotion_rate).map_err(distribution_error)?;
    let mut rng = StdRng::seed_from_u64(params.seed);

    Ok((0..params.n_days)
        .map(|day| ObservationRecord {
            date: Some(params.start + Duration::days(day as i64)),
            product_id: Some("synthetic".to_string()),
            actual_sales: Some(sales.sample(&mut rng)),
            lag_1: Some(sales.sample(&mut rng)),
            lag_7: Some(sales.sample(&mut rng)),
            lag_30: Some(sales.sample(&mut rng)),
            ma_7: Some(averages.sample(&mut rng).max(0.0)),
            ma_30: Some(averages.sample(&mut rng).max(0.0)),
            is_holiday: Some(holiday.sample(&mut rng)),
            weather_score: Some(rng.gen_range(0.0..1.0)),
            promotion_active: Some(promotion.sample(&mut rng)),
            price: Some(price.sample(&mut rng).max(0.0)),
            category_encoded: Some(rng.gen_range(0..5) as f64),
            ..Default::default()
        })
        .collect())
}

/// Generated records resolved into observations
pub fn synthetic_observations(params: &SyntheticParams) -> Result<Vec<Observation>> {
    build_observations(synthetic_records(params)?)
}

/// Split a time-ordered slice into training and test parts.
///
/// The test part is the last `test_ratio` share; a ratio outside (0, 1)
/// keeps everything in the training part.
pub fn train_test_split<T: Clone>(data: &[T], test_ratio: f64) -> (Vec<T>, Vec<T>) {
    if data.is_empty() || test_ratio <= 0.0 || test_ratio >= 1.0 {
        return (data.to_vec(), Vec::new());
    }

    let test_size = (data.len() as f64 * test_ratio).round() as usize;
    let train_size = data.len() - test_size;

    (data[..train_size].to_vec(), data[train_size..].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_is_seeded() {
        let params = SyntheticParams {
            n_days: 30,
            ..Default::default()
        };
        let a = synthetic_records(&params).unwrap();
        let b = synthetic_records(&params).unwrap();
        assert_eq!(a, b);

        let other = synthetic_records(&SyntheticParams { seed: 7, ..params }).unwrap();
        assert_ne!(a, other);
    }

    #[test]
    fn test_synthetic_prices_centre_on_100() {
        let records = synthetic_records(&SyntheticParams::default()).unwrap();
        let prices: Vec<f64> = records.iter().map(|r| r.price.unwrap()).collect();
        assert!(prices.iter().all(|p| p.is_finite() && *p >= 0.0));

        let mean = prices.iter().sum::<f64>() / prices.len() as f64;
        assert!((mean - 100.0).abs() < 3.0, "mean price was {}", mean);
    }

    #[test]
    fn test_synthetic_mean() {
        let observations = synthetic_observations(&SyntheticParams::default()).unwrap();
        assert_eq!(observations.len(), 365);

        let mean = observations
            .iter()
            .map(|o| o.actual_sales.unwrap())
            .sum::<f64>()
            / 365.0;
        assert!((mean - 5.0).abs() < 0.5, "mean was {}", mean);
    }

    #[test]
    fn test_train_test_split() {
        let data: Vec<u32> = (0..10).collect();
        let (train, test) = train_test_split(&data, 0.2);
        assert_eq!(train, (0..8).collect::<Vec<_>>());
        assert_eq!(test, vec![8, 9]);

        let (all, none) = train_test_split(&data, 1.5);
        assert_eq!(all.len(), 10);
        assert!(none.is_empty());
    }

    #[test]
    fn test_bad_rate_rejected() {
        let params = SyntheticParams {
            holiday_rate: 2.0,
            ..Default::default()
        };
        assert!(matches!(
            synthetic_records(&params),
            Err(ForecastError::InvalidParameter(_))
        ));
    }
}
