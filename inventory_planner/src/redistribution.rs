//! Transfer proposals between warehouses of the same cluster
//!
//! Within every cluster of at least two warehouses, each overutilized
//! warehouse is paired with each underutilized one (a full cross product,
//! so one warehouse can appear in several suggestions). A pair moves
//! `min(excess, available)` units, where
//!
//! - `excess = (over.utilization − target) × over.capacity`
//! - `available = (target − under.utilization) × under.capacity`
//!
//! and a suggestion is emitted only for a positive amount.

use crate::batch::SkippedItem;
use crate::utils::{validate_positive, validate_range};
use crate::warehouse::{ClusterAssignment, WarehouseClusterer, WarehouseProfile, WarehouseSnapshot};
use crate::{PlanningError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Utilization thresholds and unit economics of a transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedistributionConfig {
    /// Utilization both sides of a transfer are moved towards
    pub target_utilization: f64,
    /// Strictly below this a warehouse can receive stock
    pub underutilized_below: f64,
    /// Strictly above this a warehouse can send stock
    pub overutilized_above: f64,
    /// Senders at or above this utilization give high-priority transfers.
    /// The bound is inclusive, so a sender at exactly 0.95 is high priority.
    pub high_priority_from: f64,
    pub unit_transfer_cost: f64,
    pub unit_savings: f64,
}

impl Default for RedistributionConfig {
    fn default() -> Self {
        Self {
            target_utilization: 0.8,
            underutilized_below: 0.6,
            overutilized_above: 0.9,
            high_priority_from: 0.95,
            unit_transfer_cost: 10.0,
            unit_savings: 15.0,
        }
    }
}

impl RedistributionConfig {
    pub fn validate(&self) -> Result<()> {
        validate_range(self.target_utilization, 0.0, 1.0, "target_utilization")?;
        validate_range(self.underutilized_below, 0.0, 1.0, "underutilized_below")?;
        validate_positive(self.overutilized_above, "overutilized_above")?;
        validate_positive(self.high_priority_from, "high_priority_from")?;
        validate_positive(self.unit_transfer_cost, "unit_transfer_cost")?;
        if !self.unit_savings.is_finite() || self.unit_savings < 0.0 {
            return Err(PlanningError::InvalidParameter(
                "unit_savings must be a non-negative number".to_string(),
            ));
        }
        if !(self.underutilized_below <= self.target_utilization
            && self.target_utilization <= self.overutilized_above)
        {
            return Err(PlanningError::InvalidParameter(
                "Thresholds must satisfy underutilized_below <= target_utilization <= overutilized_above"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferPriority {
    High,
    Medium,
}

/// A proposed stock transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedistributionSuggestion {
    /// Sending warehouse id
    pub from: String,
    /// Receiving warehouse id
    pub to: String,
    pub from_name: String,
    pub to_name: String,
    pub cluster: usize,
    /// Units to move; always positive, not rounded
    pub transfer_amount: f64,
    pub priority: TransferPriority,
    pub estimated_cost: f64,
    pub estimated_savings: f64,
    /// `(savings − cost) / cost × 100`
    pub roi: f64,
}

/// Full output of a redistribution analysis
#[derive(Debug, Clone, PartialEq)]
pub struct RedistributionAnalysis {
    pub suggestions: Vec<RedistributionSuggestion>,
    /// Warehouse ids per cluster id
    pub clusters: BTreeMap<usize, Vec<String>>,
    pub profiles: Vec<WarehouseProfile>,
    /// Number of suggestions
    pub score: usize,
    pub skipped: Vec<SkippedItem>,
}

/// Pairs over- and underutilized warehouses within clusters
#[derive(Debug, Clone)]
pub struct RedistributionRecommender {
    config: RedistributionConfig,
}

impl RedistributionRecommender {
    pub fn new(config: RedistributionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RedistributionConfig {
        &self.config
    }

    /// Suggestions for one cluster's members
    pub fn suggest_within(&self, members: &[&WarehouseProfile]) -> Vec<RedistributionSuggestion> {
        if members.len() < 2 {
            return Vec::new();
        }

        let c = &self.config;
        let mut sorted = members.to_vec();
        sorted.sort_by(|a, b| a.utilization.total_cmp(&b.utilization));

        let under: Vec<&WarehouseProfile> = sorted
            .iter()
            .copied()
            .filter(|w| w.utilization < c.underutilized_below)
            .collect();
        let over: Vec<&WarehouseProfile> = sorted
            .iter()
            .copied()
            .filter(|w| w.utilization > c.overutilized_above)
            .collect();

        let mut suggestions = Vec::new();
        for sender in &over {
            for receiver in &under {
                if sender.id == receiver.id {
                    continue;
                }
                let excess = (sender.utilization - c.target_utilization) * sender.capacity;
                let available = (c.target_utilization - receiver.utilization) * receiver.capacity;
                let amount = excess.min(available);
                if amount <= 0.0 {
                    continue;
                }

                let cost = amount * c.unit_transfer_cost;
                let savings = amount * c.unit_savings;
                let priority = if sender.utilization >= c.high_priority_from {
                    TransferPriority::High
                } else {
                    TransferPriority::Medium
                };

                debug!(from = %sender.id, to = %receiver.id, amount, "transfer proposed");
                suggestions.push(RedistributionSuggestion {
                    from: sender.id.clone(),
                    to: receiver.id.clone(),
                    from_name: sender.name.clone(),
                    to_name: receiver.name.clone(),
                    cluster: sender.cluster,
                    transfer_amount: amount,
                    priority,
                    estimated_cost: cost,
                    estimated_savings: savings,
                    roi: (savings - cost) / cost * 100.0,
                });
            }
        }
        suggestions
    }

    /// Suggestions for every cluster, in ascending cluster order
    pub fn recommend(&self, assignment: &ClusterAssignment) -> Vec<RedistributionSuggestion> {
        assignment
            .groups()
            .values()
            .flat_map(|members| self.suggest_within(members))
            .collect()
    }

    /// Cluster a batch of warehouses and propose transfers
    pub fn analyze(
        &self,
        clusterer: &WarehouseClusterer,
        warehouses: &[WarehouseSnapshot],
    ) -> Result<(RedistributionAnalysis, ClusterAssignment)> {
        let assignment = clusterer.fit(warehouses)?;
        let suggestions = self.recommend(&assignment);

        info!(
            warehouses = assignment.profiles.len(),
            suggestions = suggestions.len(),
            "redistribution analysis complete"
        );

        let analysis = RedistributionAnalysis {
            score: suggestions.len(),
            suggestions,
            clusters: assignment.cluster_members(),
            profiles: assignment.profiles.clone(),
            skipped: assignment.skipped.clone(),
        };
        Ok((analysis, assignment))
    }
}
