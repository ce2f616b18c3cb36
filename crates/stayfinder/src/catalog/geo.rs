use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;
const MILES_PER_KM: f64 = 0.6213712;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Great-circle distance between two coordinates, in miles.
pub fn haversine_miles(a: Coordinates, b: Coordinates) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin() * MILES_PER_KM
}

/// A named point of interest listings are measured against.
///
/// Landmark sets are plain values handed to whoever computes distances;
/// callers may extend the defaults with a custom location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub name: String,
    pub coordinates: Coordinates,
}

impl Landmark {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            coordinates: Coordinates {
                latitude,
                longitude,
            },
        }
    }

    /// The fixed Cambridge-area landmark set the browse page measures
    /// against by default.
    pub fn cambridge_defaults() -> Vec<Landmark> {
        vec![
            Self::new("MIT Museum", 42.362379992017246, -71.0975875169152),
            Self::new("Bunker Hill Monument", 42.376488816810344, -71.06080858807873),
            Self::new("USS Constitution", 42.37270689222049, -71.05660445924268),
            Self::new("Museum of Science", 42.367945830321005, -71.07053522114052),
            Self::new(
                "Harvard Museum of Natural History",
                42.37861316322023,
                -71.11561124575104,
            ),
        ]
    }
}
