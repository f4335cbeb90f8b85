use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use demand_forecast::data::ProductContext;
use demand_forecast::utils::{synthetic_observations, SyntheticParams};
use inventory_planner::alerts::SkuState;
use inventory_planner::reorder::ProductCostState;
use inventory_planner::warehouse::{SkuStock, WarehouseSnapshot};
use stockcast::{init_tracing, EngineConfig, InventoryEngine};

/// End-to-end walkthrough of the inventory engine on synthetic data
#[derive(Debug, Parser)]
#[command(name = "stockcast-demo", version)]
struct Args {
    /// Seed for the synthetic sales history
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Days to forecast
    #[arg(long, default_value_t = 7)]
    horizon: usize,

    /// Days of synthetic history to train on
    #[arg(long, default_value_t = 365)]
    days: usize,

    /// Engine configuration as JSON; defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Save the trained models under this prefix
    #[arg(long)]
    save: Option<PathBuf>,
}

fn stock(current_stock: f64, forecast: &[f64]) -> SkuStock {
    SkuStock {
        sku: None,
        current_stock,
        demand_forecast: forecast.to_vec(),
    }
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    info!(seed = args.seed, horizon = args.horizon, "stockcast demo starting");

    let config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let mut engine = InventoryEngine::new(config)?;

    // Demand model on a year of synthetic daily sales
    let history = synthetic_observations(&SyntheticParams {
        n_days: args.days,
        seed: args.seed,
        ..Default::default()
    })?;
    let accuracy = engine.train_demand_forecaster(&history)?;
    println!("Demand forecaster trained with accuracy: {:.2}", accuracy);

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
    let forecast = engine.forecast_demand(&context, args.horizon)?;
    println!("\n{}-day demand forecast: {:?}", args.horizon, forecast);

    // Redistribution between two warehouses
    let warehouses = vec![
        WarehouseSnapshot {
            id: "WH-001".to_string(),
            name: "Mumbai Central".to_string(),
            capacity: 10000.0,
            inventory: vec![
                stock(50.0, &[4.0, 5.0, 6.0, 3.0, 2.0, 4.0, 5.0]),
                stock(30.0, &[2.0, 3.0, 2.0, 1.0, 2.0, 3.0, 2.0]),
            ],
            distance_to_major_city: 0.0,
            shipping_cost_factor: 1.0,
        },
        WarehouseSnapshot {
            id: "WH-002".to_string(),
            name: "Delhi NCR".to_string(),
            capacity: 8000.0,
            inventory: vec![
                stock(20.0, &[3.0, 4.0, 2.0, 3.0, 4.0, 3.0, 2.0]),
                stock(100.0, &[1.0, 2.0, 1.0, 0.0, 1.0, 2.0, 1.0]),
            ],
            distance_to_major_city: 50.0,
            shipping_cost_factor: 1.2,
        },
    ];
    let analysis = engine.analyze_warehouse_redistribution(&warehouses)?;
    println!("\nRedistribution suggestions: {}", analysis.suggestions.len());
    for s in &analysis.suggestions {
        println!(
            "- move {:.0} units {} -> {} (roi {:.0}%)",
            s.transfer_amount, s.from_name, s.to_name, s.roi
        );
    }

    // Alerts
    let items = vec![
        SkuState::new("1", 5.0, vec![4.0, 5.0, 6.0, 3.0, 2.0, 4.0, 5.0])
            .with_name("iPhone 15 Pro")
            .with_max_stock(50.0),
        SkuState::new("2", 85.0, vec![1.0, 2.0, 1.0, 0.0, 1.0, 2.0, 1.0])
            .with_name("Winter Jacket")
            .with_max_stock(35.0),
    ];
    let alerts = engine.generate_inventory_alerts(&items);
    println!("\nGenerated {} alerts", alerts.items.len());
    for alert in &alerts.items {
        println!("- {}: {}", alert.kind.to_string().to_uppercase(), alert.message);
    }

    // Reorder plans for the same products
    let products = vec![
        ProductCostState {
            name: Some("iPhone 15 Pro".to_string()),
            unit_cost: Some(999.0),
            ..ProductCostState::new("1", 29.0 * 52.0, 5.0, 50.0)
        },
        ProductCostState {
            name: Some("Winter Jacket".to_string()),
            ..ProductCostState::new("2", 8.0 * 52.0, 85.0, 35.0)
        },
    ];
    let plans = engine.optimize_reorder_quantities(&products);
    println!("\nReorder plans: {}", plans.items.len());
    for plan in &plans.items {
        println!(
            "- {}: order {:.0} at reorder point {:.1} ({:?})",
            plan.product_name.as_deref().unwrap_or(plan.product_id.as_str()),
            plan.optimal_quantity,
            plan.reorder_point,
            plan.urgency
        );
    }

    if let Some(prefix) = &args.save {
        engine
            .save_models(prefix)
            .with_context(|| format!("saving models to {}", prefix.display()))?;
        println!("\nModels saved under {}", prefix.display());
    }

    Ok(())
}
