//! Engine configuration
//!
//! Every section falls back to its documented defaults when absent, so an
//! empty JSON object is a valid configuration.

use crate::error::{EngineError, Result};
use demand_forecast::models::{DemandForecaster, ModelConfig};
use inventory_planner::{AlertConfig, ClusterConfig, RedistributionConfig, ReorderConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings for every component owned by the engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub model: ModelConfig,
    pub cluster: ClusterConfig,
    pub redistribution: RedistributionConfig,
    pub alerts: AlertConfig,
    pub reorder: ReorderConfig,
}

impl EngineConfig {
    /// Check every section, reporting the first invalid one
    pub fn validate(&self) -> Result<()> {
        DemandForecaster::from_config(&self.model)
            .map_err(|e| EngineError::ConfigurationError(format!("model: {}", e)))?;

        let sections = [
            ("cluster", self.cluster.validate()),
            ("redistribution", self.redistribution.validate()),
            ("alerts", self.alerts.validate()),
            ("reorder", self.reorder.validate()),
        ];
        for (section, check) in sections {
            check.map_err(|e| EngineError::ConfigurationError(format!("{}: {}", section, e)))?;
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| EngineError::ConfigurationError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use demand_forecast::ModelKind;

    #[test]
    fn test_empty_object_gives_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = EngineConfig::from_json_str(
            r#"{"model": {"kind": "linear"}, "alerts": {"critical_days": 2.0}}"#,
        )
        .unwrap();

        assert_eq!(config.model.kind, ModelKind::Linear);
        assert_eq!(config.model.n_estimators, 100);
        assert_eq!(config.alerts.critical_days, 2.0);
        assert_eq!(config.alerts.low_stock_days, 7.0);
    }

    #[test]
    fn test_invalid_section_is_reported() {
        let err = EngineConfig::from_json_str(r#"{"cluster": {"n_clusters": 0}}"#).unwrap_err();
        match err {
            EngineError::ConfigurationError(msg) => assert!(msg.starts_with("cluster")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            EngineConfig::from_json_str("{not json"),
            Err(EngineError::ConfigurationError(_))
        ));
    }
}
