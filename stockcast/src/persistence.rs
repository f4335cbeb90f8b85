//! Saving and loading trained state
//!
//! A bundle is three JSON files sharing a caller-supplied prefix:
//!
//! - `{prefix}_demand_forecaster.json`
//! - `{prefix}_warehouse_clusterer.json`
//! - `{prefix}_scaler.json`
//!
//! Each file wraps its payload in an [`Envelope`] carrying the format version
//! and artifact kind. Files are written to a sibling `.tmp` file and renamed
//! into place. Loading checks version and kind before decoding the payload.

use crate::error::{EngineError, Result};
use chrono::{DateTime, Utc};
use demand_forecast::TrainedForecaster;
use inventory_planner::warehouse::N_WAREHOUSE_FEATURES;
use inventory_planner::FittedClusterer;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use stock_math::clustering::KMeans;
use stock_math::scaling::StandardScaler;
use tracing::{debug, info};

/// Version written into every envelope; loads of any other version fail
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    DemandForecaster,
    WarehouseClusterer,
    Scaler,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [
        ArtifactKind::DemandForecaster,
        ArtifactKind::WarehouseClusterer,
        ArtifactKind::Scaler,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::DemandForecaster => "demand_forecaster",
            ArtifactKind::WarehouseClusterer => "warehouse_clusterer",
            ArtifactKind::Scaler => "scaler",
        }
    }

    /// File path of this artifact for a bundle prefix
    pub fn path_for<P: AsRef<Path>>(&self, prefix: P) -> PathBuf {
        let mut name: OsString = prefix.as_ref().as_os_str().to_owned();
        name.push(format!("_{}.json", self.as_str()));
        PathBuf::from(name)
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// On-disk wrapper around one artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub format_version: u32,
    pub artifact: ArtifactKind,
    pub saved_at: DateTime<Utc>,
    pub payload: T,
}

fn persistence_error(path: &Path, what: impl fmt::Display) -> EngineError {
    EngineError::PersistenceError(format!("{}: {}", path.display(), what))
}

/// Write one artifact atomically
pub fn save_artifact<T: Serialize>(path: &Path, kind: ArtifactKind, payload: &T) -> Result<()> {
    let envelope = Envelope {
        format_version: FORMAT_VERSION,
        artifact: kind,
        saved_at: Utc::now(),
        payload,
    };
    let json = serde_json::to_vec_pretty(&envelope).map_err(|e| persistence_error(path, e))?;

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    fs::write(&tmp, json).map_err(|e| persistence_error(&tmp, e))?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(persistence_error(path, e));
    }
    debug!(artifact = %kind, path = %path.display(), "artifact saved");
    Ok(())
}

/// Read one artifact, checking its envelope first
pub fn load_artifact<T: DeserializeOwned>(path: &Path, kind: ArtifactKind) -> Result<T> {
    let bytes = fs::read(path).map_err(|e| persistence_error(path, e))?;
    let envelope: Envelope<serde_json::Value> =
        serde_json::from_slice(&bytes).map_err(|e| persistence_error(path, e))?;

    if envelope.format_version != FORMAT_VERSION {
        return Err(persistence_error(
            path,
            format!(
                "format version {} is not supported (expected {})",
                envelope.format_version, FORMAT_VERSION
            ),
        ));
    }
    if envelope.artifact != kind {
        return Err(persistence_error(
            path,
            format!("expected a {} artifact, found {}", kind, envelope.artifact),
        ));
    }

    serde_json::from_value(envelope.payload).map_err(|e| persistence_error(path, e))
}

/// Everything the engine persists
#[derive(Debug, Clone, PartialEq)]
pub struct ModelBundle {
    pub forecaster: TrainedForecaster,
    /// Scaler and k-means from the latest redistribution analysis, if any
    pub clusterer: Option<FittedClusterer>,
}

impl ModelBundle {
    /// Write all three artifacts. The clusterer and scaler payloads are
    /// `null` when no analysis has run yet.
    pub fn save<P: AsRef<Path>>(&self, prefix: P) -> Result<()> {
        let prefix = prefix.as_ref();
        let (kmeans, scaler) = match &self.clusterer {
            Some(fitted) => (Some(&fitted.kmeans), Some(&fitted.scaler)),
            None => (None, None),
        };

        save_artifact(
            &ArtifactKind::DemandForecaster.path_for(prefix),
            ArtifactKind::DemandForecaster,
            &self.forecaster,
        )?;
        save_artifact(
            &ArtifactKind::WarehouseClusterer.path_for(prefix),
            ArtifactKind::WarehouseClusterer,
            &kmeans,
        )?;
        save_artifact(
            &ArtifactKind::Scaler.path_for(prefix),
            ArtifactKind::Scaler,
            &scaler,
        )?;

        info!(prefix = %prefix.display(), "models saved");
        Ok(())
    }

    /// Read all three artifacts; nothing is returned unless all of them load
    pub fn load<P: AsRef<Path>>(prefix: P) -> Result<Self> {
        let prefix = prefix.as_ref();
        let forecaster_path = ArtifactKind::DemandForecaster.path_for(prefix);
        let forecaster: TrainedForecaster =
            load_artifact(&forecaster_path, ArtifactKind::DemandForecaster)?;
        forecaster
            .validate()
            .map_err(|e| persistence_error(&forecaster_path, e))?;
        let clusterer_path = ArtifactKind::WarehouseClusterer.path_for(prefix);
        let kmeans: Option<KMeans> =
            load_artifact(&clusterer_path, ArtifactKind::WarehouseClusterer)?;
        let scaler: Option<StandardScaler> = load_artifact(
            &ArtifactKind::Scaler.path_for(prefix),
            ArtifactKind::Scaler,
        )?;

        let clusterer = match (kmeans, scaler) {
            (Some(kmeans), Some(scaler)) => {
                let centroids = kmeans.centroids();
                if scaler.n_features() != N_WAREHOUSE_FEATURES
                    || centroids.is_empty()
                    || centroids.iter().any(|c| c.len() != N_WAREHOUSE_FEATURES)
                {
                    return Err(persistence_error(
                        &clusterer_path,
                        format!(
                            "clusterer and scaler must both cover {} warehouse features",
                            N_WAREHOUSE_FEATURES
                        ),
                    ));
                }
                Some(FittedClusterer { scaler, kmeans })
            }
            (None, None) => None,
            _ => {
                return Err(persistence_error(
                    &clusterer_path,
                    "clusterer and scaler must be saved together",
                ))
            }
        };

        info!(prefix = %prefix.display(), "models loaded");
        Ok(Self {
            forecaster,
            clusterer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_artifact_paths() {
        let path = ArtifactKind::Scaler.path_for("/tmp/models/v1");
        assert_eq!(path, PathBuf::from("/tmp/models/v1_scaler.json"));
        assert_eq!(
            ArtifactKind::DemandForecaster.path_for("run").to_str(),
            Some("run_demand_forecaster.json")
        );
    }

    #[test]
    fn test_envelope_round_trip_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("payload.json");

        save_artifact(&path, ArtifactKind::Scaler, &vec![1.5, 2.5]).unwrap();
        let loaded: Vec<f64> = load_artifact(&path, ArtifactKind::Scaler).unwrap();

        assert_eq!(loaded, vec![1.5, 2.5]);
        assert!(!dir.path().join("payload.json.tmp").exists());
    }

    #[test]
    fn test_wrong_kind_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("payload.json");
        save_artifact(&path, ArtifactKind::Scaler, &Some(1u32)).unwrap();

        let err = load_artifact::<Option<u32>>(&path, ArtifactKind::WarehouseClusterer).unwrap_err();
        assert!(matches!(err, EngineError::PersistenceError(msg) if msg.contains("expected a warehouse_clusterer")));
    }
}
