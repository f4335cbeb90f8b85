//! Stock runway alerts
//!
//! For each SKU the runway is `current_stock / (forecast_total / window)`,
//! i.e. how many days the stock lasts at the forecast's average daily
//! demand, or `+∞` when no demand is forecast. Classification is an ordered
//! decision list where the first matching rule wins:
//!
//! 1. runway below `critical_days` → [`AlertKind::Critical`]
//! 2. runway below `low_stock_days` → [`AlertKind::LowStock`]
//! 3. forecast total below `overstock_ratio × stock` and runway above
//!    `overstock_days` → [`AlertKind::Overstock`]
//!
//! Results are sorted by confidence, highest first. The sort is stable, so
//! alerts with equal confidence keep their input order.

use crate::batch::BatchOutcome;
use crate::utils::{check_forecast, check_quantity, validate_positive, validate_range};
use crate::{PlanningError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Alert thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    pub critical_days: f64,
    pub low_stock_days: f64,
    /// Forecast total must fall below this share of stock to count as overstock
    pub overstock_ratio: f64,
    pub overstock_days: f64,
    /// Days covered by the forecast; longer forecasts are truncated
    pub forecast_window_days: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            critical_days: 3.0,
            low_stock_days: 7.0,
            overstock_ratio: 0.3,
            overstock_days: 30.0,
            forecast_window_days: 7,
        }
    }
}

impl AlertConfig {
    pub fn validate(&self) -> Result<()> {
        validate_positive(self.critical_days, "critical_days")?;
        validate_positive(self.low_stock_days, "low_stock_days")?;
        validate_positive(self.overstock_days, "overstock_days")?;
        validate_range(self.overstock_ratio, 0.0, 1.0, "overstock_ratio")?;
        if self.critical_days > self.low_stock_days {
            return Err(PlanningError::InvalidParameter(
                "critical_days must not exceed low_stock_days".to_string(),
            ));
        }
        if self.forecast_window_days == 0 {
            return Err(PlanningError::InvalidParameter(
                "forecast_window_days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Current stock and near-term forecast of one SKU
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuState {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub current_stock: f64,
    #[serde(default)]
    pub max_stock: Option<f64>,
    /// Daily demand forecast starting tomorrow; missing means no demand
    #[serde(default, alias = "demand_forecast_7d")]
    pub demand_forecast: Option<Vec<f64>>,
}

impl SkuState {
    pub fn new(id: impl Into<String>, current_stock: f64, demand_forecast: Vec<f64>) -> Self {
        Self {
            id: id.into(),
            name: None,
            current_stock,
            max_stock: None,
            demand_forecast: Some(demand_forecast),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_max_stock(mut self, max_stock: f64) -> Self {
        self.max_stock = Some(max_stock);
        self
    }

    fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Critical,
    LowStock,
    Overstock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPriority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    UrgentReorder,
    ScheduleReorder,
    PromoteOrRedistribute,
}

impl AlertKind {
    /// Fixed confidence attached to each alert kind
    pub fn confidence(self) -> f64 {
        match self {
            AlertKind::Critical => 0.95,
            AlertKind::LowStock => 0.87,
            AlertKind::Overstock => 0.82,
        }
    }

    pub fn priority(self) -> AlertPriority {
        match self {
            AlertKind::Critical => AlertPriority::High,
            AlertKind::LowStock => AlertPriority::Medium,
            AlertKind::Overstock => AlertPriority::Low,
        }
    }

    pub fn action(self) -> RecommendedAction {
        match self {
            AlertKind::Critical => RecommendedAction::UrgentReorder,
            AlertKind::LowStock => RecommendedAction::ScheduleReorder,
            AlertKind::Overstock => RecommendedAction::PromoteOrRedistribute,
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AlertKind::Critical => "critical",
            AlertKind::LowStock => "low_stock",
            AlertKind::Overstock => "overstock",
        };
        f.write_str(label)
    }
}

/// A stock alert for one SKU.
///
/// `days_remaining` may be `+∞`, which JSON output renders as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryAlert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub priority: AlertPriority,
    pub product_id: String,
    pub product_name: Option<String>,
    pub message: String,
    pub days_remaining: f64,
    /// Runway beyond the overstock threshold; overstock alerts only
    pub excess_days: Option<f64>,
    /// Stock as a percentage of `max_stock`, when a positive maximum is known
    pub stock_level_pct: Option<f64>,
    pub recommended_action: RecommendedAction,
    pub confidence: f64,
}

/// Days of stock left at the average daily demand of `forecast_total`
pub fn days_remaining(current_stock: f64, forecast_total: f64, window_days: usize) -> f64 {
    if forecast_total > 0.0 {
        current_stock / (forecast_total / window_days as f64)
    } else {
        f64::INFINITY
    }
}

/// Classifies SKU states into alerts
#[derive(Debug, Clone)]
pub struct AlertGenerator {
    config: AlertConfig,
}

impl AlertGenerator {
    pub fn new(config: AlertConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    /// Classify one SKU; `Ok(None)` means no rule fired
    pub fn classify(&self, sku: &SkuState) -> Result<Option<InventoryAlert>> {
        let forecast = sku.demand_forecast.as_deref().unwrap_or(&[]);
        check_quantity(sku.current_stock, "current_stock")?;
        check_forecast(forecast, "demand_forecast")?;
        if let Some(max_stock) = sku.max_stock {
            check_quantity(max_stock, "max_stock")?;
        }

        let c = &self.config;
        let window = &forecast[..forecast.len().min(c.forecast_window_days)];
        let total: f64 = window.iter().sum();
        let runway = days_remaining(sku.current_stock, total, c.forecast_window_days);

        let kind = if runway < c.critical_days {
            AlertKind::Critical
        } else if runway < c.low_stock_days {
            AlertKind::LowStock
        } else if total < sku.current_stock * c.overstock_ratio && runway > c.overstock_days {
            AlertKind::Overstock
        } else {
            return Ok(None);
        };

        let name = sku.display_name();
        let (message, excess_days) = match kind {
            AlertKind::Critical => (
                format!("Critical: {} will run out in {:.1} days", name, runway),
                None,
            ),
            AlertKind::LowStock => (
                format!("Low stock: {} needs reorder in {:.1} days", name, runway),
                None,
            ),
            AlertKind::Overstock => (
                format!("Overstock: {} has {:.0} days of inventory", name, runway),
                Some(runway - c.overstock_days),
            ),
        };

        Ok(Some(InventoryAlert {
            kind,
            priority: kind.priority(),
            product_id: sku.id.clone(),
            product_name: sku.name.clone(),
            message,
            days_remaining: runway,
            excess_days,
            stock_level_pct: sku
                .max_stock
                .filter(|&max| max > 0.0)
                .map(|max| sku.current_stock / max * 100.0),
            recommended_action: kind.action(),
            confidence: kind.confidence(),
        }))
    }

    /// Alerts for a batch of SKUs, sorted by confidence descending
    pub fn generate(&self, items: &[SkuState]) -> BatchOutcome<InventoryAlert> {
        let mut outcome = BatchOutcome::new();
        for sku in items {
            match self.classify(sku) {
                Ok(Some(alert)) => outcome.push(alert),
                Ok(None) => {}
                Err(err) => outcome.reject(sku.id.clone(), err),
            }
        }

        outcome
            .items
            .sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        info!(
            skus = items.len(),
            alerts = outcome.items.len(),
            skipped = outcome.skipped.len(),
            "inventory alerts generated"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn generator() -> AlertGenerator {
        AlertGenerator::new(AlertConfig::default()).unwrap()
    }

    #[test]
    fn test_runway() {
        assert_relative_eq!(days_remaining(5.0, 29.0, 7), 35.0 / 29.0);
        assert_eq!(days_remaining(5.0, 0.0, 7), f64::INFINITY);
    }

    #[test]
    fn test_rules_fire_in_order() {
        let g = generator();
        let critical = SkuState::new("c", 2.0, vec![1.0; 7]);
        let low = SkuState::new("l", 5.0, vec![1.0; 7]);
        let fine = SkuState::new("f", 10.0, vec![1.0; 7]);
        let over = SkuState::new("o", 100.0, vec![1.0; 7]);

        assert_eq!(g.classify(&critical).unwrap().unwrap().kind, AlertKind::Critical);
        assert_eq!(g.classify(&low).unwrap().unwrap().kind, AlertKind::LowStock);
        assert!(g.classify(&fine).unwrap().is_none());

        let alert = g.classify(&over).unwrap().unwrap();
        assert_eq!(alert.kind, AlertKind::Overstock);
        assert_relative_eq!(alert.excess_days.unwrap(), 70.0);
    }

    #[test]
    fn test_no_demand_is_overstock_with_infinite_runway() {
        let sku = SkuState {
            demand_forecast: None,
            ..SkuState::new("x", 10.0, vec![])
        };
        let alert = generator().classify(&sku).unwrap().unwrap();
        assert_eq!(alert.kind, AlertKind::Overstock);
        assert!(alert.days_remaining.is_infinite());
    }

    #[test]
    fn test_empty_stock_and_no_demand_is_quiet() {
        let sku = SkuState::new("x", 0.0, vec![0.0; 7]);
        assert!(generator().classify(&sku).unwrap().is_none());
    }

    #[test]
    fn test_stock_level_needs_positive_max() {
        let g = generator();
        let sku = SkuState::new("x", 5.0, vec![4.0; 7]).with_max_stock(50.0);
        assert_relative_eq!(g.classify(&sku).unwrap().unwrap().stock_level_pct.unwrap(), 10.0);

        let sku = SkuState::new("x", 5.0, vec![4.0; 7]).with_max_stock(0.0);
        assert_eq!(g.classify(&sku).unwrap().unwrap().stock_level_pct, None);
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let config = AlertConfig {
            critical_days: 10.0,
            ..Default::default()
        };
        assert!(AlertGenerator::new(config).is_err());
    }
}
