//! Reorder policy from the economic order quantity model
//!
//! A product is planned only when both its annual demand and its holding
//! cost are positive. Anything else is skipped as ineligible and produces
//! no plan.

use crate::batch::{BatchOutcome, SkipReason};
use crate::utils::check_quantity;
use crate::{PlanningError, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Days per year used to turn annual demand into daily demand
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Defaults applied to products that leave a cost field unset.
///
/// | field              | default |
/// |--------------------|---------|
/// | ordering_cost      | 50      |
/// | holding_cost       | 5       |
/// | lead_time_days     | 7       |
/// | unit_cost          | 0       |
/// | safety_stock_days  | 7       |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReorderConfig {
    /// Days of average demand kept as safety stock
    pub safety_stock_days: f64,
    pub default_ordering_cost: f64,
    pub default_holding_cost: f64,
    pub default_lead_time_days: f64,
    pub default_unit_cost: f64,
}

impl Default for ReorderConfig {
    fn default() -> Self {
        Self {
            safety_stock_days: 7.0,
            default_ordering_cost: 50.0,
            default_holding_cost: 5.0,
            default_lead_time_days: 7.0,
            default_unit_cost: 0.0,
        }
    }
}

impl ReorderConfig {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("safety_stock_days", self.safety_stock_days),
            ("default_ordering_cost", self.default_ordering_cost),
            ("default_holding_cost", self.default_holding_cost),
            ("default_lead_time_days", self.default_lead_time_days),
            ("default_unit_cost", self.default_unit_cost),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(PlanningError::InvalidParameter(format!(
                    "{} must be a non-negative number",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Demand and cost inputs for one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCostState {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub annual_demand: f64,
    /// Cost per order placed
    #[serde(default)]
    pub ordering_cost: Option<f64>,
    /// Annual holding cost per unit
    #[serde(default)]
    pub holding_cost_per_unit: Option<f64>,
    #[serde(default)]
    pub lead_time_days: Option<f64>,
    #[serde(default)]
    pub unit_cost: Option<f64>,
    pub current_stock: f64,
    pub max_stock: f64,
}

impl ProductCostState {
    pub fn new(id: impl Into<String>, annual_demand: f64, current_stock: f64, max_stock: f64) -> Self {
        Self {
            id: id.into(),
            name: None,
            annual_demand,
            ordering_cost: None,
            holding_cost_per_unit: None,
            lead_time_days: None,
            unit_cost: None,
            current_stock,
            max_stock,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    High,
    Normal,
}

/// Reorder policy for one product; quantities are not rounded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderPlan {
    pub product_id: String,
    pub product_name: Option<String>,
    pub current_stock: f64,
    pub reorder_point: f64,
    /// `max(eoq, max_stock − current_stock)`, never negative
    pub optimal_quantity: f64,
    pub eoq: f64,
    pub safety_stock: f64,
    pub lead_time_demand: f64,
    /// `optimal_quantity × unit_cost`
    pub total_cost: f64,
    pub urgency: Urgency,
}

/// Decision for one product
#[derive(Debug, Clone, PartialEq)]
pub enum PlanOutcome {
    Planned(ReorderPlan),
    /// Not eligible for EOQ planning, with the reason
    Ineligible(String),
}

/// Economic order quantity `sqrt(2 · D · S / H)`
pub fn economic_order_quantity(
    annual_demand: f64,
    ordering_cost: f64,
    holding_cost: f64,
) -> Result<f64> {
    if annual_demand < 0.0 || ordering_cost < 0.0 || holding_cost <= 0.0 {
        return Err(PlanningError::InvalidParameter(format!(
            "EOQ needs non-negative demand and ordering cost and a positive holding cost, got D={} S={} H={}",
            annual_demand, ordering_cost, holding_cost
        )));
    }
    Ok((2.0 * annual_demand * ordering_cost / holding_cost).sqrt())
}

/// Computes reorder plans
#[derive(Debug, Clone)]
pub struct ReorderOptimizer {
    config: ReorderConfig,
}

impl ReorderOptimizer {
    pub fn new(config: ReorderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ReorderConfig {
        &self.config
    }

    /// Plan one product, or fail when its data is malformed
    pub fn plan(&self, product: &ProductCostState) -> Result<PlanOutcome> {
        let c = &self.config;
        let ordering_cost = product.ordering_cost.unwrap_or(c.default_ordering_cost);
        let holding_cost = product.holding_cost_per_unit.unwrap_or(c.default_holding_cost);
        let lead_time_days = product.lead_time_days.unwrap_or(c.default_lead_time_days);
        let unit_cost = product.unit_cost.unwrap_or(c.default_unit_cost);

        check_quantity(product.current_stock, "current_stock")?;
        check_quantity(product.max_stock, "max_stock")?;
        check_quantity(ordering_cost, "ordering_cost")?;
        check_quantity(lead_time_days, "lead_time_days")?;
        check_quantity(unit_cost, "unit_cost")?;
        if !product.annual_demand.is_finite() || !holding_cost.is_finite() {
            return Err(PlanningError::DataError(
                "annual_demand and holding_cost must be finite".to_string(),
            ));
        }

        if product.annual_demand <= 0.0 {
            return Ok(PlanOutcome::Ineligible(format!(
                "annual demand {} is not positive",
                product.annual_demand
            )));
        }
        if holding_cost <= 0.0 {
            return Ok(PlanOutcome::Ineligible(format!(
                "holding cost {} is not positive",
                holding_cost
            )));
        }

        let eoq = economic_order_quantity(product.annual_demand, ordering_cost, holding_cost)?;
        let daily_demand = product.annual_demand / DAYS_PER_YEAR;
        let lead_time_demand = daily_demand * lead_time_days;
        let safety_stock = daily_demand * c.safety_stock_days;
        let reorder_point = lead_time_demand + safety_stock;

        let unclamped = eoq.max(product.max_stock - product.current_stock);
        if unclamped < 0.0 {
            warn!(
                product = %product.id,
                quantity = unclamped,
                "negative order quantity clamped to zero"
            );
        }
        let optimal_quantity = unclamped.max(0.0);

        Ok(PlanOutcome::Planned(ReorderPlan {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            current_stock: product.current_stock,
            reorder_point,
            optimal_quantity,
            eoq,
            safety_stock,
            lead_time_demand,
            total_cost: optimal_quantity * unit_cost,
            urgency: if product.current_stock <= reorder_point {
                Urgency::High
            } else {
                Urgency::Normal
            },
        }))
    }

    /// One plan per eligible product, in input order
    pub fn optimize(&self, products: &[ProductCostState]) -> BatchOutcome<ReorderPlan> {
        let mut outcome = BatchOutcome::new();
        for product in products {
            match self.plan(product) {
                Ok(PlanOutcome::Planned(plan)) => outcome.push(plan),
                Ok(PlanOutcome::Ineligible(reason)) => {
                    outcome.skip(product.id.clone(), SkipReason::Ineligible(reason))
                }
                Err(err) => outcome.reject(product.id.clone(), err),
            }
        }

        info!(
            products = products.len(),
            plans = outcome.items.len(),
            skipped = outcome.skipped.len(),
            "reorder quantities optimized"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn optimizer() -> ReorderOptimizer {
        ReorderOptimizer::new(ReorderConfig::default()).unwrap()
    }

    fn planned(product: &ProductCostState) -> ReorderPlan {
        match optimizer().plan(product).unwrap() {
            PlanOutcome::Planned(plan) => plan,
            PlanOutcome::Ineligible(reason) => panic!("unexpectedly ineligible: {}", reason),
        }
    }

    #[test]
    fn test_eoq() {
        assert_relative_eq!(economic_order_quantity(1000.0, 50.0, 5.0).unwrap(), 141.4213562, epsilon = 1e-6);
        assert!(economic_order_quantity(1000.0, 50.0, 0.0).is_err());
    }

    #[test]
    fn test_plan_with_defaults() {
        let product = ProductCostState {
            unit_cost: Some(2.0),
            ..ProductCostState::new("p", 3650.0, 100.0, 300.0)
        };
        let plan = planned(&product);

        assert_relative_eq!(plan.lead_time_demand, 70.0, epsilon = 1e-9);
        assert_relative_eq!(plan.safety_stock, 70.0, epsilon = 1e-9);
        assert_relative_eq!(plan.reorder_point, 140.0, epsilon = 1e-9);
        assert_relative_eq!(plan.eoq, (2.0f64 * 3650.0 * 50.0 / 5.0).sqrt());
        assert_relative_eq!(plan.optimal_quantity, 270.2, epsilon = 0.1);
        assert_relative_eq!(plan.total_cost, plan.optimal_quantity * 2.0);
        assert_eq!(plan.urgency, Urgency::High);
    }

    #[test]
    fn test_overfull_product_is_clamped() {
        let product = ProductCostState {
            ordering_cost: Some(0.0),
            ..ProductCostState::new("p", 365.0, 80.0, 35.0)
        };
        let plan = planned(&product);
        assert_eq!(plan.optimal_quantity, 0.0);
        assert_eq!(plan.urgency, Urgency::Normal);
    }

    #[test]
    fn test_ineligible_and_invalid_are_skipped() {
        let products = vec![
            ProductCostState::new("zero", 0.0, 5.0, 10.0),
            ProductCostState {
                holding_cost_per_unit: Some(0.0),
                ..ProductCostState::new("free", 100.0, 5.0, 10.0)
            },
            ProductCostState::new("broken", 100.0, -5.0, 10.0),
            ProductCostState::new("ok", 100.0, 5.0, 10.0),
        ];
        let outcome = optimizer().optimize(&products);

        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.items[0].product_id, "ok");
        assert_eq!(outcome.skipped.len(), 3);
        assert!(matches!(outcome.skipped[0].reason, SkipReason::Ineligible(_)));
        assert!(matches!(outcome.skipped[2].reason, SkipReason::Invalid(_)));
    }
}
