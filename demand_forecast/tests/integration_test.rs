use demand_forecast::data::ProductContext;
use demand_forecast::features::build_observations;
use demand_forecast::history::DailySeries;
use demand_forecast::models::{DemandForecaster, ModelConfig, TrainedDemandModel, TrainedForecaster};
use demand_forecast::strategy::{ForecastStrategy, NaiveRecursive};
use demand_forecast::utils::{synthetic_observations, train_test_split, SyntheticParams};
use demand_forecast::RegressionMetrics;
use chrono::NaiveDate;

#[test]
fn test_year_of_synthetic_sales_forecasts_a_week() {
    let observations = synthetic_observations(&SyntheticParams::default()).unwrap();
    let (model, report) = DemandForecaster::from_config(&ModelConfig::default())
        .unwrap()
        .fit(&observations)
        .unwrap();
    assert!(report.accuracy.is_finite());

    let context = ProductContext {
        recent_sales: vec![4.0, 5.0, 3.0, 6.0, 4.0],
        sales_7_days_ago: Some(4.0),
        sales_30_days_ago: Some(5.0),
        avg_sales_7d: Some(4.5),
        avg_sales_30d: Some(4.8),
        is_holiday: Some(false),
        weather_score: Some(0.7),
        promotion_active: Some(false),
        price: Some(99.99),
        category_encoded: Some(1.0),
        ..Default::default()
    };

    let forecast = NaiveRecursive.forecast(&model, &context, 7).unwrap();
    assert_eq!(forecast.horizon(), 7);
    // Leaf values are means of Poisson(5) labels
    assert!(forecast.values().iter().all(|&v| v <= 20));
}

#[test]
fn test_holdout_evaluation() {
    let observations = synthetic_observations(&SyntheticParams {
        seed: 11,
        ..Default::default()
    })
    .unwrap();
    let (train, test) = train_test_split(&observations, 0.2);
    assert_eq!(test.len(), 73);

    let config = ModelConfig {
        n_estimators: 25,
        ..Default::default()
    };
    let (model, _) = DemandForecaster::from_config(&config).unwrap().fit(&train).unwrap();

    let predicted = model.predict_all(&test).unwrap();
    let actual: Vec<f64> = test.iter().map(|o| o.actual_sales.unwrap()).collect();
    let metrics = RegressionMetrics::evaluate(&predicted, &actual).unwrap();

    assert!(predicted.iter().all(|&p| p >= 0.0));
    assert!(metrics.mae.is_finite());
}

#[test]
fn test_sales_history_pipeline() {
    // Weekly pattern: weekends sell triple
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let quantities: Vec<f64> = (0..120)
        .map(|d| if d % 7 >= 5 { 9.0 } else { 3.0 })
        .collect();
    let series = DailySeries::new(start, quantities).unwrap();

    let observations =
        build_observations(series.observation_records("SKU-W", 30).unwrap()).unwrap();
    let (model, report) = DemandForecaster::from_config(&ModelConfig::default())
        .unwrap()
        .fit(&observations)
        .unwrap();
    assert!(report.accuracy > 0.9);

    let forecast = NaiveRecursive
        .forecast(&model, &series.context("SKU-W"), 7)
        .unwrap();
    // Every leaf is the mean of pure weekday or weekend days
    assert!(forecast.values().iter().all(|&v| (3..=9).contains(&v)));

    let persisted = serde_json::to_string(&model).unwrap();
    let restored: TrainedForecaster = serde_json::from_str(&persisted).unwrap();
    assert_eq!(restored.name(), model.name());
}
