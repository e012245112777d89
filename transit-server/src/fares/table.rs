//! Fare table snapshots.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::FareError;

/// Snapshot shipped with the binary, used whenever no fresher table is available.
const BUNDLED_SNAPSHOT: &str = include_str!("../../data/bus_fares.json");

/// Published normal-class fare for one stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageFare {
    pub stage: u32,
    pub fare: f64,
}

/// Wire shape of a snapshot:
/// `{lastUpdated, source, normal: [{stage, fare}], expressway: {routeKey: fare}}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    last_updated: DateTime<Utc>,
    source: String,
    normal: Vec<StageFare>,
    #[serde(default)]
    expressway: BTreeMap<String, f64>,
}

/// A validated fare table.
///
/// Stages are positive and unique; fares are finite and non-negative;
/// expressway flat fares are finite and positive. Stages are kept in the
/// order the snapshot lists them (ascending in every published table).
#[derive(Debug, Clone, PartialEq)]
pub struct FareTable {
    last_updated: DateTime<Utc>,
    source: String,
    stages: Vec<StageFare>,
    expressway: BTreeMap<String, f64>,
}

impl FareTable {
    /// Build a table, checking the invariants above.
    pub fn new(
        last_updated: DateTime<Utc>,
        source: impl Into<String>,
        stages: Vec<StageFare>,
        expressway: BTreeMap<String, f64>,
    ) -> Result<Self, FareError> {
        let mut seen = HashSet::with_capacity(stages.len());
        for s in &stages {
            if s.stage == 0 {
                return Err(FareError::Invalid("stage 0 is not a valid stage".into()));
            }
            if !s.fare.is_finite() || s.fare < 0.0 {
                return Err(FareError::Invalid(format!(
                    "stage {} has invalid fare {}",
                    s.stage, s.fare
                )));
            }
            if !seen.insert(s.stage) {
                return Err(FareError::Invalid(format!("stage {} listed twice", s.stage)));
            }
        }

        for (route, fare) in &expressway {
            if !fare.is_finite() || *fare <= 0.0 {
                return Err(FareError::Invalid(format!(
                    "expressway route {route} has invalid fare {fare}"
                )));
            }
        }

        Ok(Self {
            last_updated,
            source: source.into(),
            stages,
            expressway,
        })
    }

    /// The snapshot bundled at build time.
    pub fn bundled() -> Result<Self, FareError> {
        Self::from_json(BUNDLED_SNAPSHOT)
    }

    /// Parse and validate a JSON snapshot.
    pub fn from_json(json: &str) -> Result<Self, FareError> {
        let snapshot: Snapshot = serde_json::from_str(json).map_err(|e| FareError::Json {
            message: e.to_string(),
        })?;

        Self::new(
            snapshot.last_updated,
            snapshot.source,
            snapshot.normal,
            snapshot.expressway,
        )
    }

    /// Load a JSON snapshot from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FareError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| FareError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json(&json)
    }

    /// When the snapshot was taken.
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Where the snapshot came from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn stages(&self) -> &[StageFare] {
        &self.stages
    }

    /// Published normal-class fare for exactly this stage.
    ///
    /// Stages missing from the table are not interpolated.
    pub fn base_fare(&self, stage: u32) -> Option<f64> {
        self.stages
            .iter()
            .find(|s| s.stage == stage)
            .map(|s| s.fare)
    }

    /// Expressway flat fares keyed by route (e.g. "Makumbura-Galle").
    pub fn expressway(&self) -> &BTreeMap<String, f64> {
        &self.expressway
    }
}
