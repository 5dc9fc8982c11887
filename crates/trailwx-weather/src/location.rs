//! Coordinates and great-circle distance.

use serde::{Deserialize, Serialize};

use crate::types::WeatherError;
use crate::units::Distance;

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Geographic coordinate in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting out-of-range or non-finite values.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, WeatherError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(WeatherError::NotAvailable(format!(
                "latitude out of range: {latitude}"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(WeatherError::NotAvailable(format!(
                "longitude out of range: {longitude}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Great-circle distance using the haversine formula.
    pub fn distance_to(&self, other: &Coordinate) -> Distance {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        Distance::from_meters(EARTH_RADIUS_METERS * c)
    }

    /// Format as `"lat, lon"` with the given number of decimal places.
    pub fn to_decimal_degrees(&self, precision: usize) -> String {
        format!(
            "{:.*}, {:.*}",
            precision, self.latitude, precision, self.longitude
        )
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_decimal_degrees(4))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn test_distance_same_point_is_zero() {
        let here = Coordinate::new(47.6062, -122.3321).unwrap();
        assert!(here.distance_to(&here).meters().abs() < 1e-6);
    }

    #[test]
    fn test_distance_seattle_portland() {
        let seattle = Coordinate::new(47.6062, -122.3321).unwrap();
        let portland = Coordinate::new(45.5152, -122.6784).unwrap();
        let miles = seattle.distance_to(&portland).miles();
        // ~145 miles as the crow flies
        assert!((miles - 145.0).abs() < 5.0, "got {miles}");
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Coordinate::new(40.0, -75.0).unwrap();
        let b = Coordinate::new(40.02, -75.03).unwrap();
        let ab = a.distance_to(&b).meters();
        let ba = b.distance_to(&a).meters();
        assert!((ab - ba).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(Coordinate::new(91.0, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.5).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(-90.0, 180.0).is_ok());
    }

    #[test]
    fn test_decimal_degrees_format() {
        let here = Coordinate::new(47.60621, -122.33207).unwrap();
        assert_eq!(here.to_decimal_degrees(2), "47.61, -122.33");
        assert_eq!(here.to_string(), "47.6062, -122.3321");
    }
}
