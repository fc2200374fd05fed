//! crates/alumni_map_core/src/geo.rs
//!
//! The static city-to-coordinate table. It is the only geocoding source the
//! application has: a city missing from this table is never placed on the map.

/// A WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

const fn at(lat: f64, lng: f64) -> Coordinates {
    Coordinates { lat, lng }
}

/// Keyed by the exact `"City, ST"` label.
pub static CITY_COORDINATES: &[(&str, Coordinates)] = &[
    ("San Francisco, CA", at(37.7749, -122.4194)),
    ("Chicago, IL", at(41.8781, -87.6298)),
    ("Seattle, WA", at(47.6062, -122.3321)),
    ("New York City, NY", at(40.7128, -74.0060)),
    ("New York, NY", at(40.7128, -74.0060)),
    ("Los Angeles, CA", at(34.0522, -118.2437)),
    ("Boston, MA", at(42.3601, -71.0589)),
    ("Austin, TX", at(30.2672, -97.7431)),
    ("Denver, CO", at(39.7392, -104.9903)),
    ("Portland, OR", at(45.5152, -122.6784)),
    ("Miami, FL", at(25.7617, -80.1918)),
    ("Atlanta, GA", at(33.7490, -84.3880)),
    ("Philadelphia, PA", at(39.9526, -75.1652)),
    ("Phoenix, AZ", at(33.4484, -112.0740)),
    ("San Diego, CA", at(32.7157, -117.1611)),
    ("Dallas, TX", at(32.7767, -96.7970)),
    ("Houston, TX", at(29.7604, -95.3698)),
    ("Washington, DC", at(38.9072, -77.0369)),
    ("Minneapolis, MN", at(44.9778, -93.2650)),
    ("Detroit, MI", at(42.3314, -83.0458)),
];

/// Looks up a city by its exact, case-sensitive `"City, ST"` label.
pub fn lookup_label(label: &str) -> Option<Coordinates> {
    CITY_COORDINATES
        .iter()
        .find(|(key, _)| *key == label)
        .map(|(_, coords)| *coords)
}

/// Looks up a city and state pair. Locations without a state never resolve.
pub fn lookup(city: &str, state: Option<&str>) -> Option<Coordinates> {
    let state = state?;
    lookup_label(&format!("{city}, {state}"))
}
