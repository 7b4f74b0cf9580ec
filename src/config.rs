use crate::error::{Error, Result};

// ** LAP DETECTION CONFIGURATION ** //

/// Radius around the start/finish point that re-arms the lap counter (meters).
pub const DEFAULT_BASE_THRESHOLD_M: f64 = 3.0;
/// The departure radius is the base radius scaled by this factor.
pub const OUTER_THRESHOLD_FACTOR: f64 = 1.2;

// ** INPUT CONFIGURATION ** //
pub const DEFAULT_NMEA_SOURCE: &str = "/dev/serial0";

// ** UTM CONFIGURATION ** //

/// WGS-84 semi-major axis (meters)
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS-84 flattening
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
pub const UTM_SCALE_FACTOR: f64 = 0.9996;
pub const UTM_FALSE_EASTING: f64 = 500_000.0;
/// Added to northings in the southern hemisphere so they stay positive.
pub const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;
pub const UTM_MIN_LATITUDE: f64 = -80.0;
pub const UTM_MAX_LATITUDE: f64 = 84.0;

/// Hysteresis band used by the lap tracker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackerConfig {
    inner_threshold: f64,
    outer_threshold: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            inner_threshold: DEFAULT_BASE_THRESHOLD_M,
            outer_threshold: DEFAULT_BASE_THRESHOLD_M * OUTER_THRESHOLD_FACTOR,
        }
    }
}

impl TrackerConfig {
    /// Derive the band from a base radius: inner = base, outer = base * 1.2.
    pub fn new(base_threshold: f64) -> Result<Self> {
        if !base_threshold.is_finite() || base_threshold <= 0.0 {
            return Err(Error::InvalidThreshold(base_threshold));
        }

        Ok(Self {
            inner_threshold: base_threshold,
            outer_threshold: base_threshold * OUTER_THRESHOLD_FACTOR,
        })
    }

    pub fn inner_threshold(&self) -> f64 {
        self.inner_threshold
    }

    pub fn outer_threshold(&self) -> f64 {
        self.outer_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::{assert_matches, assert_ok};

    #[test]
    fn test_default_band() {
        let config = TrackerConfig::default();
        assert_eq!(config.inner_threshold(), 3.0);
        assert!((config.outer_threshold() - 3.6).abs() < 1e-12);
    }

    #[test]
    fn test_band_from_base() {
        let config = assert_ok!(TrackerConfig::new(10.0));
        assert_eq!(config.inner_threshold(), 10.0);
        assert!((config.outer_threshold() - 12.0).abs() < 1e-12);
        assert!(config.outer_threshold() > config.inner_threshold());
    }

    #[test]
    fn test_rejects_bad_thresholds() {
        assert_matches!(TrackerConfig::new(0.0), Err(Error::InvalidThreshold(_)));
        assert_matches!(TrackerConfig::new(-1.5), Err(Error::InvalidThreshold(_)));
        assert_matches!(
            TrackerConfig::new(f64::NAN),
            Err(Error::InvalidThreshold(_))
        );
        assert_matches!(
            TrackerConfig::new(f64::INFINITY),
            Err(Error::InvalidThreshold(_))
        );
    }
}
