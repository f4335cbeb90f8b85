use approx::assert_relative_eq;
use chrono::NaiveDate;
use demand_forecast::error::ForecastError;
use demand_forecast::features::{Observation, ObservationRecord, FEATURE_NAMES};
use demand_forecast::models::{
    DemandForecaster, DemandModel, LinearRegression, ModelConfig, ModelKind, RandomForest,
    RandomForestParams, TrainedDemandModel, TrainedForecaster,
};
use demand_forecast::utils::{synthetic_observations, SyntheticParams};
use rstest::rstest;

/// Observations whose label is an exact linear function of lag_1
fn linear_observations(slope: f64, intercept: f64) -> Vec<Observation> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (0..40)
        .map(|i| {
            let lag_1 = (i % 10) as f64;
            Observation::from_record(ObservationRecord {
                date: Some(start + chrono::Duration::days(i)),
                lag_1: Some(lag_1),
                actual_sales: Some((slope * lag_1 + intercept).max(0.0)),
                ..Default::default()
            })
            .unwrap()
        })
        .collect()
}

fn small_forest(seed: u64) -> RandomForest {
    RandomForest::new(RandomForestParams {
        n_estimators: 10,
        seed,
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn test_linear_recovers_relation() {
    let observations = linear_observations(2.0, 1.0);
    let model = LinearRegression::new(1e-9).unwrap().train(&observations).unwrap();

    let lag_1 = FEATURE_NAMES.iter().position(|n| *n == "lag_1").unwrap();
    assert_relative_eq!(model.coefficients()[lag_1], 2.0, epsilon = 1e-4);

    let prediction = model.predict(&observations[3].features()).unwrap();
    assert_relative_eq!(prediction, 7.0, epsilon = 1e-3);
}

#[test]
fn test_predictions_are_clamped_at_zero() {
    // sales = 20 - 2 * lag_1 stays positive on the training range
    let observations = linear_observations(-2.0, 20.0);
    let model = LinearRegression::new(1e-9).unwrap().train(&observations).unwrap();

    let far = Observation::from_record(ObservationRecord {
        date: NaiveDate::from_ymd_opt(2024, 1, 1),
        lag_1: Some(50.0),
        ..Default::default()
    })
    .unwrap();

    assert!(model.predict_raw(&far.features()).unwrap() < 0.0);
    assert_eq!(model.predict(&far.features()).unwrap(), 0.0);
}

#[test]
fn test_forest_is_deterministic_for_seed() {
    let observations = synthetic_observations(&SyntheticParams {
        n_days: 60,
        ..Default::default()
    })
    .unwrap();

    let a = small_forest(7).train(&observations).unwrap();
    let b = small_forest(7).train(&observations).unwrap();
    let c = small_forest(8).train(&observations).unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.n_trees(), 10);
    assert!(a.is_well_formed());
}

#[test]
fn test_forest_importance_is_normalised() {
    let observations = linear_observations(3.0, 0.0);
    let forecaster = DemandForecaster::RandomForest(small_forest(42));
    let (trained, _) = forecaster.fit(&observations).unwrap();

    let importance = trained.feature_importance().unwrap();
    assert_eq!(importance.len(), FEATURE_NAMES.len());
    assert_relative_eq!(importance.iter().map(|(_, v)| v).sum::<f64>(), 1.0, epsilon = 1e-9);

    let (top, _) = importance
        .iter()
        .copied()
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .unwrap();
    assert_eq!(top, "lag_1");
}

#[rstest]
#[case(ModelKind::RandomForest)]
#[case(ModelKind::Linear)]
fn test_training_reports_accuracy(#[case] kind: ModelKind) {
    let observations = synthetic_observations(&SyntheticParams::default()).unwrap();
    let config = ModelConfig {
        kind,
        n_estimators: 20,
        ..Default::default()
    };

    let (trained, report) = DemandForecaster::from_config(&config)
        .unwrap()
        .fit(&observations)
        .unwrap();

    assert_eq!(report.n_observations, 365);
    assert!(report.accuracy.is_finite());
    assert!(report.accuracy <= 1.0);
    assert!(report.metrics.rmse >= report.metrics.mae);
    assert_eq!(report.model_name, trained.name());
}

#[test]
fn test_empty_training_set_rejected() {
    let forecaster = DemandForecaster::from_config(&ModelConfig::default()).unwrap();
    assert!(matches!(forecaster.fit(&[]), Err(ForecastError::DataError(_))));
}

#[test]
fn test_missing_label_rejected() {
    let mut observations = linear_observations(1.0, 1.0);
    observations[5].actual_sales = None;

    let forecaster = DemandForecaster::RandomForest(small_forest(1));
    assert!(matches!(
        forecaster.fit(&observations),
        Err(ForecastError::DataError(_))
    ));
}

#[test]
fn test_zero_demand_history_has_undefined_accuracy() {
    let observations = linear_observations(0.0, 0.0);
    let forecaster = DemandForecaster::RandomForest(small_forest(1));
    assert!(matches!(
        forecaster.fit(&observations),
        Err(ForecastError::DataError(_))
    ));
}

#[rstest]
#[case(RandomForestParams { n_estimators: 0, ..Default::default() })]
#[case(RandomForestParams { min_samples_split: 1, ..Default::default() })]
#[case(RandomForestParams { min_samples_leaf: 0, ..Default::default() })]
fn test_invalid_forest_params(#[case] params: RandomForestParams) {
    assert!(matches!(
        RandomForest::new(params),
        Err(ForecastError::InvalidParameter(_))
    ));
}

#[test]
fn test_negative_ridge_rejected() {
    assert!(LinearRegression::new(-1.0).is_err());
}

fn split_nodes_pointing_at(value: &mut serde_json::Value, index: usize) -> usize {
    let mut changed = 0;
    for tree in value["trees"].as_array_mut().unwrap() {
        for node in tree["nodes"].as_array_mut().unwrap() {
            if node["type"] == "split" {
                node["left"] = serde_json::json!(index);
                node["right"] = serde_json::json!(index);
                changed += 1;
            }
        }
    }
    changed
}

#[test]
fn test_stored_forest_with_dangling_children_is_rejected() {
    let observations = synthetic_observations(&SyntheticParams::default()).unwrap();
    let config = ModelConfig {
        n_estimators: 5,
        ..Default::default()
    };
    let (model, _) = DemandForecaster::from_config(&config)
        .unwrap()
        .fit(&observations)
        .unwrap();
    assert!(model.validate().is_ok());

    let mut value = serde_json::to_value(&model).unwrap();
    assert!(split_nodes_pointing_at(&mut value, 9999) > 0);
    let broken: TrainedForecaster = serde_json::from_value(value).unwrap();

    assert!(matches!(
        broken.validate(),
        Err(ForecastError::ValidationError(_))
    ));
}

#[test]
fn test_stored_linear_model_with_wrong_width_is_rejected() {
    let config = ModelConfig {
        kind: ModelKind::Linear,
        ..Default::default()
    };
    let (model, _) = DemandForecaster::from_config(&config)
        .unwrap()
        .fit(&linear_observations(2.0, 1.0))
        .unwrap();
    assert!(model.validate().is_ok());

    let mut value = serde_json::to_value(&model).unwrap();
    value["fit"]["coefficients"].as_array_mut().unwrap().pop();
    let broken: TrainedForecaster = serde_json::from_value(value).unwrap();

    assert!(matches!(
        broken.validate(),
        Err(ForecastError::ValidationError(_))
    ));
}
