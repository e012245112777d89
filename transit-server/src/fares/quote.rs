//! Fare quotes between named places.

use serde::Serialize;

use crate::geo::{LocationPoint, distance_km};

use super::{FareDetails, FareTable, estimate_stage_from_distance};

/// Error returned when a quote cannot be produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuoteError {
    /// No known stop matches the given name
    #[error("unknown place: {0}")]
    UnknownPlace(String),
}

/// Expressway flat fare that overrides the AC class for a journey.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpresswayFare {
    pub route: String,
    pub fare: f64,
}

/// Estimated fares for travelling between two stops.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FareQuote {
    pub origin: LocationPoint,
    pub terminal: LocationPoint,

    /// Straight-line distance; road distance is longer
    pub distance_km: f64,

    /// Stage estimated from `distance_km`
    pub stage: u32,

    /// Stage fares, or `None` when the table has no entry for `stage`
    pub fares: Option<FareDetails>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expressway: Option<ExpresswayFare>,
}

/// Quote fares from `origin` to `terminal`.
///
/// Both names are resolved against `stops`. The great-circle distance
/// between the resolved stops is converted to a stage with
/// [`estimate_stage_from_distance`], and any expressway route mentioning
/// both names is attached as a flat-fare override.
pub fn quote(
    table: &FareTable,
    stops: &[LocationPoint],
    origin: &str,
    terminal: &str,
) -> Result<FareQuote, QuoteError> {
    let from = resolve_place(stops, origin)?;
    let to = resolve_place(stops, terminal)?;

    let distance = distance_km(from.coordinates(), to.coordinates());
    let stage = estimate_stage_from_distance(distance);

    let expressway = table
        .find_expressway(origin, terminal)
        .map(|(route, fare)| ExpresswayFare {
            route: route.to_string(),
            fare,
        });

    Ok(FareQuote {
        origin: from.clone(),
        terminal: to.clone(),
        distance_km: distance,
        stage,
        fares: table.fare_for_stage(stage),
        expressway,
    })
}

/// Resolve a typed place name to a stop.
///
/// An exact (case-insensitive) name match wins; otherwise the first stop
/// whose name contains the query.
fn resolve_place<'a>(stops: &'a [LocationPoint], name: &str) -> Result<&'a LocationPoint, QuoteError> {
    let key = name.trim().to_lowercase();
    if key.is_empty() {
        return Err(QuoteError::UnknownPlace(name.to_string()));
    }

    stops
        .iter()
        .find(|s| s.name().to_lowercase() == key)
        .or_else(|| stops.iter().find(|s| s.name().to_lowercase().contains(&key)))
        .ok_or_else(|| QuoteError::UnknownPlace(name.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;

    use super::*;
    use crate::fares::StageFare;
    use crate::geo::Coordinates;

    fn stop(lat: f64, lng: f64, name: &str) -> LocationPoint {
        LocationPoint::new(Coordinates::new(lat, lng).unwrap(), name)
    }

    fn stops() -> Vec<LocationPoint> {
        vec![
            stop(6.9368, 79.8474, "Colombo Fort Bus Stand"),
            stop(6.9297, 79.8612, "Pettah Bus Stand"),
            stop(6.8370, 79.9980, "Makumbura Multimodal Center"),
            stop(6.0535, 80.2210, "Matara Bus Stand"),
            stop(6.8941, 79.9166, "Kandy"),
            stop(7.2949, 80.6352, "Kandy Bus Stand"),
        ]
    }

    fn table() -> FareTable {
        let mut expressway = BTreeMap::new();
        expressway.insert("Makumbura-Matara".to_string(), 1300.0);

        let stages = (1..=60)
            .map(|stage| StageFare {
                stage,
                fare: 15.0 + 15.0 * stage as f64,
            })
            .collect();

        FareTable::new(Utc::now(), "test", stages, expressway).unwrap()
    }

    #[test]
    fn short_hop_is_stage_one() {
        let q = quote(&table(), &stops(), "Colombo Fort", "Pettah").unwrap();

        assert_eq!(q.origin.name(), "Colombo Fort Bus Stand");
        assert_eq!(q.terminal.name(), "Pettah Bus Stand");
        assert!(q.distance_km < 2.0);
        assert_eq!(q.stage, 1);
        assert_eq!(q.fares.unwrap().normal, 30);
        assert!(q.expressway.is_none());
    }

    #[test]
    fn expressway_override_attached() {
        let q = quote(&table(), &stops(), "Makumbura", "Matara").unwrap();

        assert_eq!(
            q.expressway,
            Some(ExpresswayFare {
                route: "Makumbura-Matara".to_string(),
                fare: 1300.0,
            })
        );
        assert_eq!(q.stage, estimate_stage_from_distance(q.distance_km));
        assert!(q.fares.is_some());
    }

    #[test]
    fn exact_name_beats_substring() {
        let q = quote(&table(), &stops(), "pettah", "KANDY").unwrap();
        assert_eq!(q.terminal.name(), "Kandy");
    }

    #[test]
    fn unknown_place_is_an_error() {
        let err = quote(&table(), &stops(), "Colombo Fort", " Atlantis ").unwrap_err();
        assert_eq!(err, QuoteError::UnknownPlace("Atlantis".to_string()));
        assert_eq!(err.to_string(), "unknown place: Atlantis");
    }

    #[test]
    fn stage_missing_from_table_gives_no_fares() {
        let sparse = FareTable::new(
            Utc::now(),
            "sparse",
            vec![StageFare { stage: 1, fare: 30.0 }],
            BTreeMap::new(),
        )
        .unwrap();

        let q = quote(&sparse, &stops(), "Makumbura", "Matara").unwrap();
        assert!(q.stage > 1);
        assert!(q.fares.is_none());
    }
}
