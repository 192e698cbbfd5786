//! Geographic point type shared by crews, service orders, and the travel oracle.

use serde::{Deserialize, Serialize};

/// A WGS84 point. Field order intentionally matches the domain convention
/// (`lat`, `lng`) used throughout the engine; wire formats that expect
/// `[lon, lat]` GeoJSON order convert explicitly at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// `[lng, lat]` pair, the order the external route-optimizer and
    /// road-network table contracts expect.
    pub fn as_lon_lat(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    /// Finite and within plausible WGS84 bounds. A data-quality gate, not a
    /// precision check.
    pub fn is_plausible(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite() && self.lat.abs() <= 90.0 && self.lng.abs() <= 180.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_lon_lat_swaps_order() {
        let c = Coordinates::new(50.0755, 14.4378);
        assert_eq!(c.as_lon_lat(), [14.4378, 50.0755]);
    }

    #[test]
    fn serializes_camel_case() {
        let c = Coordinates::new(1.0, 2.0);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, r#"{"lat":1.0,"lng":2.0}"#);
    }

    #[test]
    fn implausible_coordinates_are_rejected() {
        assert!(Coordinates::new(50.0, 14.0).is_plausible());
        assert!(!Coordinates::new(f64::NAN, 14.0).is_plausible());
        assert!(!Coordinates::new(200.0, 14.0).is_plausible());
    }
}
