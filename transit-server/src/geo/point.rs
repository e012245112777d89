//! Named locations.

use serde::{Deserialize, Serialize};

use super::{Coordinates, InvalidCoordinates};

/// A named place such as a bus stand or railway station.
///
/// Serialized as `{lat, lng, name, address?}`, the shape of the bundled
/// datasets. Deserialization validates the coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLocationPoint", into = "RawLocationPoint")]
pub struct LocationPoint {
    coordinates: Coordinates,
    name: String,
    address: Option<String>,
}

impl LocationPoint {
    /// Create a point without an address.
    pub fn new(coordinates: Coordinates, name: impl Into<String>) -> Self {
        Self {
            coordinates,
            name: name.into(),
            address: None,
        }
    }

    /// Attach a postal address or area description.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }
}

#[derive(Serialize, Deserialize)]
struct RawLocationPoint {
    lat: f64,
    lng: f64,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    address: Option<String>,
}

impl TryFrom<RawLocationPoint> for LocationPoint {
    type Error = InvalidCoordinates;

    fn try_from(raw: RawLocationPoint) -> Result<Self, Self::Error> {
        Ok(Self {
            coordinates: Coordinates::new(raw.lat, raw.lng)?,
            name: raw.name,
            address: raw.address,
        })
    }
}

impl From<LocationPoint> for RawLocationPoint {
    fn from(point: LocationPoint) -> Self {
        Self {
            lat: point.coordinates.latitude(),
            lng: point.coordinates.longitude(),
            name: point.name,
            address: point.address,
        }
    }
}
