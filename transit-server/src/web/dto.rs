//! Data transfer objects for web requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{BusRoute, TrainRoute};
use crate::fares::{ExpresswayFare, FareDetails};
use crate::geo::Nearby;

/// Query for a nearest-point search.
#[derive(Debug, Deserialize)]
pub struct NearestRequest {
    pub lat: f64,
    pub lng: f64,

    /// Maximum results (defaults to 5)
    pub limit: Option<usize>,
}

/// A named point with its distance from the query position.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyPlace {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    pub lat: f64,
    pub lng: f64,

    /// Great-circle distance in kilometres
    pub distance_km: f64,
}

impl NearbyPlace {
    pub fn from_nearby(nearby: &Nearby<'_>) -> Self {
        let coordinates = nearby.point.coordinates();
        Self {
            name: nearby.point.name().to_string(),
            address: nearby.point.address().map(str::to_string),
            lat: coordinates.latitude(),
            lng: coordinates.longitude(),
            distance_km: nearby.distance_km,
        }
    }
}

/// Response from a nearest-point search.
#[derive(Debug, Serialize)]
pub struct NearestResponse {
    /// Closest first
    pub results: Vec<NearbyPlace>,
}

/// Fares for one stage, with the provenance of the table.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageFareResponse {
    #[serde(flatten)]
    pub fares: FareDetails,
    pub last_updated: DateTime<Utc>,
    pub source: String,
}

/// Query for a distance-based stage estimate.
#[derive(Debug, Deserialize)]
pub struct EstimateRequest {
    /// Road distance in kilometres
    pub km: f64,
}

#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    pub km: f64,
    pub stage: u32,

    /// `null` when the table has no entry for the estimated stage
    pub fares: Option<FareDetails>,
}

/// All expressway flat fares.
#[derive(Debug, Serialize)]
pub struct ExpresswayRoutesResponse {
    pub routes: Vec<ExpresswayFare>,
}

/// Query for a fare quote between two named stops.
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub origin: String,
    pub terminal: String,
}

/// Query for a bus search.
#[derive(Debug, Deserialize)]
pub struct BusSearchRequest {
    pub origin: String,
    pub destination: String,
}

#[derive(Debug, Serialize)]
pub struct BusSearchResponse {
    pub routes: Vec<BusRoute>,
}

/// Query for a train search.
///
/// Either `origin` or both `lat` and `lng` must be given; a position takes
/// precedence and resolves to the nearest station.
#[derive(Debug, Deserialize)]
pub struct TrainSearchRequest {
    pub origin: Option<String>,
    pub destination: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainSearchResponse {
    /// Station resolved from the position, for position searches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_station: Option<NearbyPlace>,

    pub routes: Vec<TrainRoute>,
}

/// Acknowledgement of a delivered contact message.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
}

/// One failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
    pub code: String,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// Per-field problems, for validation failures
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ValidationIssue>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{Coordinates, LocationPoint};

    #[test]
    fn nearby_place_from_nearby() {
        let point = LocationPoint::new(Coordinates::new(6.9344, 79.8501).unwrap(), "Colombo Fort")
            .with_address("Olcott Mawatha, Colombo 01");
        let nearby = Nearby {
            point: &point,
            distance_km: 0.25,
        };

        let place = NearbyPlace::from_nearby(&nearby);
        assert_eq!(place.name, "Colombo Fort");
        assert_eq!(place.address.as_deref(), Some("Olcott Mawatha, Colombo 01"));
        assert_eq!(place.lat, 6.9344);
        assert_eq!(place.lng, 79.8501);

        let json = serde_json::to_value(&place).unwrap();
        assert_eq!(json["distanceKm"], 0.25);
    }

    #[test]
    fn stage_response_is_flat() {
        let response = StageFareResponse {
            fares: FareDetails {
                stage: 1,
                normal: 30,
                semi_luxury: 45,
                ac: 60,
            },
            last_updated: "2025-07-01T00:00:00Z".parse().unwrap(),
            source: "test".to_string(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["stage"], 1);
        assert_eq!(json["semiLuxury"], 45);
        assert_eq!(json["ac"], 60);
        assert_eq!(json["source"], "test");
        assert_eq!(json["lastUpdated"], "2025-07-01T00:00:00Z");
    }

    #[test]
    fn error_response_omits_empty_details() {
        let json = serde_json::to_value(ErrorResponse {
            error: "nope".to_string(),
            details: Vec::new(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"error": "nope"}));
    }
}
