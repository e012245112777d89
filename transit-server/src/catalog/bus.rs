//! Bus routes and the bus finder filter.

use serde::{Deserialize, Serialize};

use super::SearchQuery;

/// Kind of bus service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusServiceType {
    Express,
    Ordinary,
    Night,
}

/// A scheduled bus route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusRoute {
    pub id: String,

    /// Route number as painted on the bus (e.g. "138", "EX-01")
    pub number: String,

    pub name: String,
    pub origin: String,
    pub destination: String,

    /// Main highway the route follows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub road: Option<String>,

    pub stops: Vec<String>,

    /// First departure, "HH:MM"
    pub departure_time: String,

    /// Arrival of the first departure, "HH:MM"
    pub arrival_time: String,

    /// Fare per person in rupees
    pub fare: f64,

    /// Human-readable headway, e.g. "every 20 mins"
    pub frequency: String,

    pub operator: String,

    #[serde(rename = "type")]
    pub service_type: BusServiceType,
}

/// Find bus routes from `query.origin` to `query.destination`.
///
/// A route matches when its origin contains the origin query and its
/// destination contains the destination query, ignoring case. Matching is
/// by substring, so "galle" also matches "Kegalle".
pub fn search_buses<'a>(routes: &'a [BusRoute], query: &SearchQuery) -> Vec<&'a BusRoute> {
    let origin = query.origin_key();
    let destination = query.destination_key();

    routes
        .iter()
        .filter(|r| {
            r.origin.to_lowercase().contains(&origin)
                && r.destination.to_lowercase().contains(&destination)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(id: &str, origin: &str, destination: &str) -> BusRoute {
        BusRoute {
            id: id.to_string(),
            number: "1".to_string(),
            name: format!("{origin}-{destination}"),
            origin: origin.to_string(),
            destination: destination.to_string(),
            road: None,
            stops: vec![origin.to_string(), destination.to_string()],
            departure_time: "06:00".to_string(),
            arrival_time: "09:30".to_string(),
            fare: 450.0,
            frequency: "every 20 mins".to_string(),
            operator: "SLTB".to_string(),
            service_type: BusServiceType::Ordinary,
        }
    }

    fn ids(routes: &[&BusRoute]) -> Vec<String> {
        routes.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn matches_case_insensitively() {
        let routes = vec![
            route("r1", "Colombo", "Kandy"),
            route("r2", "Colombo", "Galle"),
            route("r3", "Kandy", "Colombo"),
        ];

        let q = SearchQuery::new("colombo", "KANDY").unwrap();
        assert_eq!(ids(&search_buses(&routes, &q)), vec!["r1"]);
    }

    #[test]
    fn direction_matters() {
        let routes = vec![route("r1", "Colombo", "Kandy")];
        let q = SearchQuery::new("Kandy", "Colombo").unwrap();
        assert!(search_buses(&routes, &q).is_empty());
    }

    #[test]
    fn partial_names_match() {
        let routes = vec![
            route("r1", "Colombo", "Kegalle"),
            route("r2", "Colombo", "Galle"),
        ];
        let q = SearchQuery::new("Col", "galle").unwrap();
        assert_eq!(ids(&search_buses(&routes, &q)), vec!["r1", "r2"]);
    }

    #[test]
    fn deserialize_bundled_shape() {
        let json = r#"{
            "id": "r1", "number": "1", "name": "Colombo-Kandy Intercity",
            "origin": "Colombo", "destination": "Kandy", "road": "Kandy Road (A1)",
            "stops": ["Colombo Fort", "Kandy"], "departureTime": "06:00",
            "arrivalTime": "09:30", "fare": 450, "frequency": "every 20 mins",
            "operator": "Private / SLTB", "type": "express"
        }"#;
        let route: BusRoute = serde_json::from_str(json).unwrap();
        assert_eq!(route.service_type, BusServiceType::Express);
        assert_eq!(route.road.as_deref(), Some("Kandy Road (A1)"));
        assert_eq!(route.fare, 450.0);
    }
}
