use std::fmt;

use crate::error::{Error, Result};

/// Earth's radius in meters.
const EARTH_RADIUS: f64 = 6371000.0;

/// A single GPS position sample.
///
/// Altitude is carried along for display only; lap detection works on the
/// horizontal plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoFix {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl fmt::Display for GeoFix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.6}°, {:.6}°, {:.1}m)",
            self.latitude, self.longitude, self.altitude
        )
    }
}

impl GeoFix {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }

    /// Check that latitude and longitude are finite and within geographic range.
    pub fn validate(&self) -> Result<()> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return Err(Error::NonFiniteCoordinate {
                latitude: self.latitude,
                longitude: self.longitude,
            });
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(Error::LatitudeOutOfRange(self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(Error::LongitudeOutOfRange(self.longitude));
        }
        Ok(())
    }

    /// Calculate distance to another fix using Haversine formula.
    /// Read more here: https://en.wikipedia.org/wiki/Haversine_formula
    /// Returns the distance in meters, ignoring altitude.
    /// Used as a ground-truth check on distances measured on the UTM grid.
    pub fn distance_to(&self, other: &GeoFix) -> f64 {
        let lat_from = self.latitude.to_radians();
        let lat_to = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat_from.cos() * lat_to.cos() * (delta_lon / 2.0).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS * c
    }
}
