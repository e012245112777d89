//! Static datasets bundled with the binary.

use serde::de::DeserializeOwned;

use crate::catalog::{BusRoute, TrainRoute};
use crate::geo::LocationPoint;

const BUS_STOPS: &str = include_str!("../data/bus_stops.json");
const TRAIN_STATIONS: &str = include_str!("../data/train_stations.json");
const BUS_ROUTES: &str = include_str!("../data/bus_routes.json");
const TRAIN_ROUTES: &str = include_str!("../data/train_routes.json");

/// Error returned when a bundled dataset fails to parse.
#[derive(Debug, thiserror::Error)]
#[error("failed to parse {dataset}: {source}")]
pub struct DatasetError {
    pub dataset: &'static str,
    #[source]
    pub source: serde_json::Error,
}

/// Named points and timetables served by the finder.
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    pub bus_stops: Vec<LocationPoint>,
    pub train_stations: Vec<LocationPoint>,
    pub bus_routes: Vec<BusRoute>,
    pub train_routes: Vec<TrainRoute>,
}

impl Datasets {
    /// Parse the datasets compiled into the binary.
    pub fn bundled() -> Result<Self, DatasetError> {
        Ok(Self {
            bus_stops: parse("bus stops", BUS_STOPS)?,
            train_stations: parse("train stations", TRAIN_STATIONS)?,
            bus_routes: parse("bus routes", BUS_ROUTES)?,
            train_routes: parse("train routes", TRAIN_ROUTES)?,
        })
    }
}

fn parse<T: DeserializeOwned>(dataset: &'static str, json: &str) -> Result<Vec<T>, DatasetError> {
    serde_json::from_str(json).map_err(|source| DatasetError { dataset, source })
}
