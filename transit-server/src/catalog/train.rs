//! Train routes and the train finder filter.

use serde::{Deserialize, Serialize};

use crate::geo::{Coordinates, LocationPoint, Nearby, nearest};

use super::{SearchQuery, SearchQueryError};

/// Kind of train service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrainServiceType {
    Intercity,
    Express,
    Commuter,
    NightMail,
}

/// Ticket prices by class in rupees. Not every train carries first class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainFare {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_class: Option<f64>,
    pub second_class: f64,
    pub third_class: f64,
}

/// A scheduled train.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainRoute {
    pub id: String,

    /// Train number (e.g. "1005")
    pub number: String,

    /// Named service (e.g. "Podi Menike")
    pub name: String,

    pub origin: String,
    pub destination: String,

    /// Railway line, e.g. "Main Line", "Coastal Line"
    pub line: String,

    /// Calling points in order
    pub stops: Vec<String>,

    pub departure_time: String,
    pub arrival_time: String,
    pub duration: String,
    pub fare: TrainFare,
    pub frequency: String,

    #[serde(rename = "type")]
    pub service_type: TrainServiceType,

    pub available_classes: Vec<String>,
}

impl TrainRoute {
    /// Index of the first stop whose name contains `key` (already lowercased).
    fn stop_index(&self, key: &str) -> Option<usize> {
        self.stops
            .iter()
            .position(|s| s.to_lowercase().contains(key))
    }

    /// Whether the train calls at `origin_key` before `destination_key`.
    fn runs_between(&self, origin_key: &str, destination_key: &str) -> bool {
        match (self.stop_index(origin_key), self.stop_index(destination_key)) {
            (Some(from), Some(to)) => from < to,
            _ => false,
        }
    }
}

/// Find trains that call at the origin and later at the destination.
///
/// Stops are matched by case-insensitive substring; the first matching
/// stop is used for each side, and the origin stop must come strictly
/// before the destination stop.
pub fn search_trains<'a>(routes: &'a [TrainRoute], query: &SearchQuery) -> Vec<&'a TrainRoute> {
    let origin = query.origin_key();
    let destination = query.destination_key();

    routes
        .iter()
        .filter(|r| r.runs_between(&origin, &destination))
        .collect()
}

/// Result of a train search starting from the traveller's position.
#[derive(Debug, Clone)]
pub struct NearbyTrainSearch<'a> {
    /// Station used as the origin
    pub station: Nearby<'a>,
    pub routes: Vec<&'a TrainRoute>,
}

/// Find trains from the station nearest to `position`.
///
/// Returns `Ok(None)` when there are no stations to choose from.
pub fn search_trains_near<'a>(
    stations: &'a [LocationPoint],
    routes: &'a [TrainRoute],
    position: Coordinates,
    destination: &str,
) -> Result<Option<NearbyTrainSearch<'a>>, SearchQueryError> {
    let Some(station) = nearest(position, stations, 1).into_iter().next() else {
        return Ok(None);
    };

    let query = SearchQuery::new(station.point.name(), destination)?;
    let routes = search_trains(routes, &query);

    Ok(Some(NearbyTrainSearch { station, routes }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn train(id: &str, stops: &[&str]) -> TrainRoute {
        TrainRoute {
            id: id.to_string(),
            number: id.to_string(),
            name: format!("Train {id}"),
            origin: stops.first().unwrap().to_string(),
            destination: stops.last().unwrap().to_string(),
            line: "Main Line".to_string(),
            stops: stops.iter().map(|s| s.to_string()).collect(),
            departure_time: "05:55".to_string(),
            arrival_time: "16:00".to_string(),
            duration: "10h 05m".to_string(),
            fare: TrainFare {
                first_class: None,
                second_class: 600.0,
                third_class: 300.0,
            },
            frequency: "Daily".to_string(),
            service_type: TrainServiceType::Express,
            available_classes: vec!["2nd".to_string(), "3rd".to_string()],
        }
    }

    fn station(lat: f64, lng: f64, name: &str) -> LocationPoint {
        LocationPoint::new(Coordinates::new(lat, lng).unwrap(), name)
    }

    fn ids(routes: &[&TrainRoute]) -> Vec<String> {
        routes.iter().map(|r| r.id.clone()).collect()
    }

    fn sample() -> Vec<TrainRoute> {
        vec![
            train("1001", &["Colombo Fort", "Ragama", "Gampaha", "Kandy"]),
            train("1002", &["Kandy", "Gampaha", "Ragama", "Colombo Fort"]),
            train("8050", &["Colombo Fort", "Mount Lavinia", "Galle", "Matara"]),
        ]
    }

    #[test]
    fn origin_must_precede_destination() {
        let routes = sample();

        let q = SearchQuery::new("Colombo Fort", "Kandy").unwrap();
        assert_eq!(ids(&search_trains(&routes, &q)), vec!["1001"]);

        let q = SearchQuery::new("Kandy", "Colombo Fort").unwrap();
        assert_eq!(ids(&search_trains(&routes, &q)), vec!["1002"]);
    }

    #[test]
    fn intermediate_stops_match() {
        let routes = sample();
        let q = SearchQuery::new("ragama", "kandy").unwrap();
        assert_eq!(ids(&search_trains(&routes, &q)), vec!["1001"]);
    }

    #[test]
    fn missing_stop_excludes_route() {
        let routes = sample();
        let q = SearchQuery::new("Colombo Fort", "Jaffna").unwrap();
        assert!(search_trains(&routes, &q).is_empty());
    }

    #[test]
    fn same_stop_for_both_sides_is_excluded() {
        let routes = sample();
        // "Fort" and "Colombo" both resolve to the first stop.
        let q = SearchQuery::new("Fort", "Colombo").unwrap();
        assert!(search_trains(&routes, &q).is_empty());
    }

    #[test]
    fn search_from_position_uses_nearest_station() {
        let routes = sample();
        let stations = vec![
            station(7.2906, 80.6326, "Kandy"),
            station(6.9344, 79.8501, "Colombo Fort"),
        ];
        let near_fort = Coordinates::new(6.935, 79.851).unwrap();

        let result = search_trains_near(&stations, &routes, near_fort, "Matara")
            .unwrap()
            .unwrap();

        assert_eq!(result.station.point.name(), "Colombo Fort");
        assert!(result.station.distance_km < 1.0);
        assert_eq!(ids(&result.routes), vec!["8050"]);
    }

    #[test]
    fn search_from_position_without_stations() {
        let routes = sample();
        let here = Coordinates::new(6.935, 79.851).unwrap();
        assert!(search_trains_near(&[], &routes, here, "Kandy").unwrap().is_none());
    }

    #[test]
    fn search_from_position_validates_destination() {
        let routes = sample();
        let stations = vec![station(6.9344, 79.8501, "Colombo Fort")];
        let here = Coordinates::new(6.935, 79.851).unwrap();
        assert!(search_trains_near(&stations, &routes, here, " ").is_err());
    }

    #[test]
    fn deserialize_bundled_shape() {
        let json = r#"{
            "id": "t-8056", "number": "8056", "name": "Ruhunu Kumari",
            "origin": "Colombo Fort", "destination": "Beliatta", "line": "Coastal Line",
            "stops": ["Colombo Fort", "Galle", "Beliatta"],
            "departureTime": "15:50", "arrivalTime": "20:30", "duration": "4h 40m",
            "fare": {"secondClass": 500, "thirdClass": 250},
            "frequency": "Daily", "type": "night-mail", "availableClasses": ["2nd", "3rd"]
        }"#;
        let route: TrainRoute = serde_json::from_str(json).unwrap();
        assert_eq!(route.service_type, TrainServiceType::NightMail);
        assert_eq!(route.fare.first_class, None);
        assert_eq!(route.fare.third_class, 250.0);
    }
}
