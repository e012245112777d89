//! Stage fare lookup and class pricing.

use serde::Serialize;

use super::FareTable;

/// Highest stage in the NTC normal-section table.
pub const MAX_STAGE: u32 = 350;

/// Bus service class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BusClass {
    Normal,
    SemiLuxury,
    Ac,
    Expressway,
}

impl BusClass {
    /// Multiplier applied to the normal stage fare.
    ///
    /// Expressway services are priced per route, not per stage.
    pub fn multiplier(&self) -> Option<f64> {
        match self {
            BusClass::Normal => Some(1.0),
            BusClass::SemiLuxury => Some(1.5),
            BusClass::Ac => Some(2.0),
            BusClass::Expressway => None,
        }
    }

    /// Fare in whole rupees for a normal-class base fare.
    ///
    /// The multiplier is applied first and the product rounded up.
    pub fn price(&self, base_fare: f64) -> Option<u32> {
        self.multiplier().map(|m| round_up(base_fare * m))
    }
}

/// Fares for every stage-priced class at one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FareDetails {
    pub stage: u32,
    pub normal: u32,
    pub semi_luxury: u32,
    pub ac: u32,
}

impl FareTable {
    /// Fares for all stage-priced classes at `stage`.
    ///
    /// Returns `None` when the table has no entry for exactly this stage.
    pub fn fare_for_stage(&self, stage: u32) -> Option<FareDetails> {
        let base = self.base_fare(stage)?;

        Some(FareDetails {
            stage,
            normal: BusClass::Normal.price(base)?,
            semi_luxury: BusClass::SemiLuxury.price(base)?,
            ac: BusClass::Ac.price(base)?,
        })
    }

    /// Flat fare for an expressway route key such as "Makumbura-Galle".
    pub fn expressway_fare(&self, route_key: &str) -> Option<f64> {
        self.expressway().get(route_key).copied()
    }

    /// All expressway route keys, sorted.
    pub fn expressway_routes(&self) -> Vec<&str> {
        self.expressway().keys().map(String::as_str).collect()
    }

    /// Find an expressway route whose key mentions both places.
    ///
    /// Matching is case-insensitive substring on the route key; the first
    /// match in key order wins.
    pub fn find_expressway(&self, origin: &str, terminal: &str) -> Option<(&str, f64)> {
        let origin = origin.trim().to_lowercase();
        let terminal = terminal.trim().to_lowercase();
        if origin.is_empty() || terminal.is_empty() {
            return None;
        }

        self.expressway()
            .iter()
            .find(|(route, _)| {
                let route = route.to_lowercase();
                route.contains(&origin) && route.contains(&terminal)
            })
            .map(|(route, fare)| (route.as_str(), *fare))
    }
}

/// Approximate the fare stage for a road distance in kilometres.
///
/// Stage 1 covers the first 2 km and each further stage roughly 2.5 km.
/// This is a rough approximation of the NTC stage table, which is defined
/// per route section rather than by a formula; it is not an exact inverse
/// of that table. The result is clamped to `1..=MAX_STAGE`.
pub fn estimate_stage_from_distance(km: f64) -> u32 {
    if km.is_nan() || km <= 2.0 {
        return 1;
    }

    let stage = (1.0 + (km - 2.0) / 2.5).ceil();
    stage.clamp(1.0, MAX_STAGE as f64) as u32
}

/// Round a fare up to whole rupees.
fn round_up(fare: f64) -> u32 {
    // Table fares are validated finite and non-negative; `as` saturates.
    fare.ceil() as u32
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Estimated stage is always within the table's range
        #[test]
        fn estimate_in_range(km in proptest::num::f64::ANY) {
            let stage = estimate_stage_from_distance(km);
            prop_assert!((1..=MAX_STAGE).contains(&stage));
        }

        /// Longer distances never produce lower stages
        #[test]
        fn estimate_monotonic(a in 0.0f64..2000.0, b in 0.0f64..2000.0) {
            let (near, far) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(estimate_stage_from_distance(near) <= estimate_stage_from_distance(far));
        }

        /// Class fares are each rounded up independently from the base fare
        #[test]
        fn classes_rounded_independently(base in 0.0f64..5000.0) {
            let t = crate::fares::FareTable::new(
                chrono::Utc::now(),
                "prop",
                vec![crate::fares::StageFare { stage: 7, fare: base }],
                Default::default(),
            ).unwrap();
            let f = t.fare_for_stage(7).unwrap();

            prop_assert_eq!(f.normal, base.ceil() as u32);
            prop_assert_eq!(f.semi_luxury, (base * 1.5).ceil() as u32);
            prop_assert_eq!(f.ac, (base * 2.0).ceil() as u32);
            prop_assert!(f.ac >= f.semi_luxury && f.semi_luxury >= f.normal);
        }
    }
}
