//! Warehouse snapshots and utilization clustering
//!
//! Each warehouse is described by five features: utilization, average
//! forecast demand per SKU, distance to the nearest major city, shipping
//! cost factor and SKU count. Features are z-scored with statistics from the
//! current batch only and clustered with seeded k-means. Cluster ids are
//! therefore meaningful within one call and must not be compared across
//! calls.

use crate::batch::{BatchOutcome, SkippedItem};
use crate::utils::{check_forecast, check_quantity};
use crate::{PlanningError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use stock_math::statistics::mean;
use stock_math::{KMeans, KMeansParams, StandardScaler};
use tracing::{debug, info};

/// Number of clustering features per warehouse
pub const N_WAREHOUSE_FEATURES: usize = 5;

fn default_cost_factor() -> f64 {
    1.0
}

/// Stock of one SKU held in a warehouse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuStock {
    #[serde(default)]
    pub sku: Option<String>,
    pub current_stock: f64,
    #[serde(default, alias = "demand_forecast_7d")]
    pub demand_forecast: Vec<f64>,
}

/// Point-in-time view of a warehouse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarehouseSnapshot {
    pub id: String,
    pub name: String,
    pub capacity: f64,
    #[serde(default)]
    pub inventory: Vec<SkuStock>,
    #[serde(default)]
    pub distance_to_major_city: f64,
    #[serde(default = "default_cost_factor")]
    pub shipping_cost_factor: f64,
}

impl WarehouseSnapshot {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(PlanningError::DataError(
                "Warehouse id must not be empty".to_string(),
            ));
        }
        if !self.capacity.is_finite() || self.capacity <= 0.0 {
            return Err(PlanningError::DataError(format!(
                "Warehouse {} capacity must be positive, got {}",
                self.id, self.capacity
            )));
        }
        check_quantity(self.distance_to_major_city, "distance_to_major_city")?;
        if !self.shipping_cost_factor.is_finite() || self.shipping_cost_factor <= 0.0 {
            return Err(PlanningError::DataError(format!(
                "Warehouse {} shipping_cost_factor must be positive",
                self.id
            )));
        }
        for item in &self.inventory {
            check_quantity(item.current_stock, "current_stock")?;
            check_forecast(&item.demand_forecast, "demand_forecast")?;
        }
        Ok(())
    }

    pub fn total_inventory(&self) -> f64 {
        self.inventory.iter().map(|item| item.current_stock).sum()
    }

    /// Stock over capacity; above 1 when the warehouse is over capacity
    pub fn utilization(&self) -> f64 {
        self.total_inventory() / self.capacity
    }

    /// Mean of the per-SKU forecast totals, 0 for an empty warehouse
    pub fn avg_demand(&self) -> f64 {
        let totals: Vec<f64> = self
            .inventory
            .iter()
            .map(|item| item.demand_forecast.iter().sum())
            .collect();
        mean(&totals).unwrap_or(0.0)
    }

    /// Clustering features, in the order documented at module level
    pub fn features(&self) -> [f64; N_WAREHOUSE_FEATURES] {
        [
            self.utilization(),
            self.avg_demand(),
            self.distance_to_major_city,
            self.shipping_cost_factor,
            self.inventory.len() as f64,
        ]
    }
}

/// Per-warehouse analysis row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarehouseProfile {
    pub id: String,
    pub name: String,
    pub utilization: f64,
    pub avg_demand: f64,
    pub total_inventory: f64,
    pub capacity: f64,
    pub cluster: usize,
}

/// K-means settings for warehouse clustering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Upper bound on clusters; small batches use one per warehouse at most
    pub n_clusters: usize,
    pub max_iter: usize,
    pub n_init: usize,
    pub tolerance: f64,
    pub seed: u64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        let params = KMeansParams::default();
        Self {
            n_clusters: params.n_clusters,
            max_iter: params.max_iter,
            n_init: params.n_init,
            tolerance: params.tolerance,
            seed: params.seed,
        }
    }
}

impl ClusterConfig {
    /// K-means parameters for a batch of `n_points` warehouses
    pub fn params_for(&self, n_points: usize) -> KMeansParams {
        KMeansParams {
            n_clusters: self.n_clusters.min(n_points).max(1),
            max_iter: self.max_iter,
            n_init: self.n_init,
            tolerance: self.tolerance,
            seed: self.seed,
        }
    }

    pub fn validate(&self) -> Result<()> {
        KMeansParams {
            n_clusters: self.n_clusters,
            max_iter: self.max_iter,
            n_init: self.n_init,
            tolerance: self.tolerance,
            seed: self.seed,
        }
        .validate()?;
        Ok(())
    }
}

/// Scaler and k-means model fitted on one batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedClusterer {
    pub scaler: StandardScaler,
    pub kmeans: KMeans,
}

impl FittedClusterer {
    /// Cluster of a warehouse under this batch's statistics
    pub fn assign(&self, warehouse: &WarehouseSnapshot) -> Result<usize> {
        let scaled = self.scaler.transform(&[warehouse.features().to_vec()])?;
        Ok(self.kmeans.predict(&scaled[0])?)
    }
}

/// Result of clustering a batch of warehouses
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterAssignment {
    /// Valid warehouses in input order
    pub profiles: Vec<WarehouseProfile>,
    /// `None` when no warehouse in the batch was valid
    pub fitted: Option<FittedClusterer>,
    pub skipped: Vec<SkippedItem>,
}

impl ClusterAssignment {
    /// Warehouse ids per cluster, in input order
    pub fn cluster_members(&self) -> BTreeMap<usize, Vec<String>> {
        let mut members: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for profile in &self.profiles {
            members
                .entry(profile.cluster)
                .or_default()
                .push(profile.id.clone());
        }
        members
    }

    /// Profiles grouped by cluster, in input order
    pub fn groups(&self) -> BTreeMap<usize, Vec<&WarehouseProfile>> {
        let mut groups: BTreeMap<usize, Vec<&WarehouseProfile>> = BTreeMap::new();
        for profile in &self.profiles {
            groups.entry(profile.cluster).or_default().push(profile);
        }
        groups
    }
}

/// Groups warehouses into comparable logistics profiles
#[derive(Debug, Clone)]
pub struct WarehouseClusterer {
    config: ClusterConfig,
}

impl WarehouseClusterer {
    pub fn new(config: ClusterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Cluster a batch, refitting the scaler on it.
    ///
    /// Invalid snapshots and repeated ids are skipped; the rest are
    /// clustered.
    pub fn fit(&self, warehouses: &[WarehouseSnapshot]) -> Result<ClusterAssignment> {
        let mut seen = HashSet::new();
        let mut checked = BatchOutcome::new();

        for warehouse in warehouses {
            let check = warehouse.validate().and_then(|_| {
                if seen.insert(warehouse.id.as_str()) {
                    Ok(())
                } else {
                    Err(PlanningError::DataError(format!(
                        "Duplicate warehouse id {}",
                        warehouse.id
                    )))
                }
            });
            match check {
                Ok(()) => checked.push(warehouse),
                Err(err) => checked.reject(warehouse.id.clone(), err),
            }
        }
        let BatchOutcome {
            items: valid,
            skipped,
        } = checked;

        if valid.is_empty() {
            return Ok(ClusterAssignment {
                profiles: Vec::new(),
                fitted: None,
                skipped,
            });
        }

        let features: Vec<Vec<f64>> = valid.iter().map(|w| w.features().to_vec()).collect();
        let (scaler, scaled) = StandardScaler::fit_transform(&features)?;
        let params = self.config.params_for(scaled.len());
        let kmeans = KMeans::fit(&scaled, params)?;

        debug!(
            clusters = params.n_clusters,
            inertia = kmeans.inertia(),
            iterations = kmeans.n_iter(),
            "warehouses clustered"
        );

        let profiles: Vec<WarehouseProfile> = valid
            .iter()
            .zip(kmeans.labels())
            .map(|(w, &cluster)| WarehouseProfile {
                id: w.id.clone(),
                name: w.name.clone(),
                utilization: w.utilization(),
                avg_demand: w.avg_demand(),
                total_inventory: w.total_inventory(),
                capacity: w.capacity,
                cluster,
            })
            .collect();

        info!(
            warehouses = profiles.len(),
            clusters = params.n_clusters,
            skipped = skipped.len(),
            "warehouse clustering complete"
        );

        Ok(ClusterAssignment {
            profiles,
            fitted: Some(FittedClusterer { scaler, kmeans }),
            skipped,
        })
    }
}
