use approx::assert_relative_eq;
use demand_forecast::data::ProductContext;
use demand_forecast::utils::{synthetic_observations, SyntheticParams};
use demand_forecast::ForecastError;
use inventory_planner::alerts::{AlertKind, SkuState};
use inventory_planner::redistribution::TransferPriority;
use inventory_planner::reorder::ProductCostState;
use inventory_planner::warehouse::{SkuStock, WarehouseSnapshot};
use pretty_assertions::assert_eq;
use rstest::rstest;
use stockcast::{EngineConfig, EngineError, InventoryEngine};

fn small_forest() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.model.n_estimators = 20;
    config
}

fn context() -> ProductContext {
    ProductContext {
        recent_sales: vec![4.0, 5.0, 3.0, 6.0, 4.0],
        sales_7_days_ago: Some(4.0),
        sales_30_days_ago: Some(5.0),
        avg_sales_7d: Some(4.5),
        avg_sales_30d: Some(4.8),
        weather_score: Some(0.7),
        price: Some(99.99),
        category_encoded: Some(1.0),
        ..Default::default()
    }
}

fn warehouse(id: &str, capacity: f64, stock: f64) -> WarehouseSnapshot {
    WarehouseSnapshot {
        id: id.to_string(),
        name: id.to_string(),
        capacity,
        inventory: vec![SkuStock {
            sku: None,
            current_stock: stock,
            demand_forecast: vec![3.0; 7],
        }],
        distance_to_major_city: 0.0,
        shipping_cost_factor: 1.0,
    }
}

#[rstest]
#[case(1)]
#[case(7)]
#[case(30)]
fn test_trained_engine_forecasts_requested_horizon(#[case] horizon: usize) {
    let mut engine = InventoryEngine::new(small_forest()).unwrap();
    let observations = synthetic_observations(&SyntheticParams::default()).unwrap();

    let accuracy = engine.train_demand_forecaster(&observations).unwrap();
    assert!(accuracy.is_finite());
    assert!(engine.is_trained());
    assert_eq!(engine.training_report().unwrap().n_observations, 365);

    let forecast = engine.forecast_demand(&context(), horizon).unwrap();
    assert_eq!(forecast.len(), horizon);
}

#[test]
fn test_training_is_deterministic() {
    let observations = synthetic_observations(&SyntheticParams::default()).unwrap();

    let mut first = InventoryEngine::new(small_forest()).unwrap();
    let mut second = InventoryEngine::new(small_forest()).unwrap();
    let a = first.train_demand_forecaster(&observations).unwrap();
    let b = second.train_demand_forecaster(&observations).unwrap();

    assert_eq!(a, b);
    assert_eq!(first.model(), second.model());
    assert_eq!(
        first.forecast_demand(&context(), 7).unwrap(),
        second.forecast_demand(&context(), 7).unwrap()
    );
}

#[test]
fn test_failed_retrain_keeps_previous_model() {
    let mut engine = InventoryEngine::new(small_forest()).unwrap();
    let observations = synthetic_observations(&SyntheticParams {
        n_days: 90,
        ..Default::default()
    })
    .unwrap();
    engine.train_demand_forecaster(&observations).unwrap();
    let before = engine.model().cloned();

    let err = engine.train_demand_forecaster(&[]).unwrap_err();
    assert!(matches!(err, EngineError::Forecast(ForecastError::DataError(_))));
    assert_eq!(engine.model().cloned(), before);
    assert!(engine.forecast_demand(&context(), 3).is_ok());
}

#[test]
fn test_zero_horizon_is_rejected() {
    let mut engine = InventoryEngine::new(small_forest()).unwrap();
    let observations = synthetic_observations(&SyntheticParams {
        n_days: 60,
        ..Default::default()
    })
    .unwrap();
    engine.train_demand_forecaster(&observations).unwrap();

    assert!(matches!(
        engine.forecast_demand(&context(), 0),
        Err(EngineError::Forecast(ForecastError::InvalidParameter(_)))
    ));
}

#[test]
fn test_redistribution_keeps_fitted_clusterer() {
    let mut config = EngineConfig::default();
    config.cluster.n_clusters = 1;
    let mut engine = InventoryEngine::new(config).unwrap();

    let analysis = engine
        .analyze_warehouse_redistribution(&[
            warehouse("A", 10000.0, 9500.0),
            warehouse("B", 8000.0, 1600.0),
        ])
        .unwrap();

    let high: Vec<_> = analysis
        .suggestions
        .iter()
        .filter(|s| s.priority == TransferPriority::High)
        .collect();
    assert_eq!(high.len(), 1);
    assert_relative_eq!(high[0].transfer_amount, 1500.0, epsilon = 1e-6);

    let fitted = engine.fitted_clusterer().unwrap();
    assert_eq!(fitted.assign(&warehouse("C", 5000.0, 100.0)).unwrap(), 0);

    // A batch with nothing valid leaves the clusterer in place
    let empty = engine
        .analyze_warehouse_redistribution(&[warehouse("bad", 0.0, 10.0)])
        .unwrap();
    assert!(empty.suggestions.is_empty());
    assert_eq!(empty.skipped.len(), 1);
    assert!(engine.fitted_clusterer().is_some());
}

#[test]
fn test_alerts_and_reorder_without_training() {
    let engine = InventoryEngine::new(EngineConfig::default()).unwrap();

    let alerts = engine.generate_inventory_alerts(&[
        SkuState::new("2", 85.0, vec![1.0, 2.0, 1.0, 0.0, 1.0, 2.0, 1.0]).with_max_stock(35.0),
        SkuState::new("1", 5.0, vec![4.0, 5.0, 6.0, 3.0, 2.0, 4.0, 5.0]).with_max_stock(50.0),
    ]);
    let kinds: Vec<AlertKind> = alerts.items.iter().map(|a| a.kind).collect();
    assert_eq!(kinds, vec![AlertKind::Critical, AlertKind::Overstock]);

    let plans = engine.optimize_reorder_quantities(&[
        ProductCostState::new("zero", 0.0, 10.0, 50.0),
        ProductCostState::new("busy", 1200.0, 10.0, 50.0),
    ]);
    assert_eq!(plans.items.len(), 1);
    assert_eq!(plans.items[0].product_id, "busy");
    assert_eq!(plans.skipped[0].key, "zero");
}
