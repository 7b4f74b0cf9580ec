//! Universal Transverse Mercator projection on the WGS-84 ellipsoid.
//!
//! Lap detection needs distances in meters between points a few meters
//! apart. A UTM grid gives a planar frame where Euclidean distance matches
//! ground distance to within the zone's scale error (at most ~0.1%).
//!
//! The zone is picked once, from the first fix of a run, and every later fix
//! is projected into that same zone so all points share one frame. A track
//! straddling a zone boundary gets slightly larger distortion on the far side,
//! which is harmless at race-track scale.
//!
//! Formulas follow Snyder, "Map Projections: A Working Manual" (USGS 1395),
//! pp. 60-64.

use std::fmt;

use crate::config::{
    UTM_FALSE_EASTING, UTM_FALSE_NORTHING_SOUTH, UTM_MAX_LATITUDE, UTM_MIN_LATITUDE,
    UTM_SCALE_FACTOR, WGS84_A, WGS84_F,
};
use crate::error::{Error, Result};
use crate::position::GeoFix;

/// Latitude band letters from 80°S, 8° each (X is stretched to 84°N).
const LATITUDE_BANDS: &[u8; 20] = b"CDEFGHJKLMNPQRSTUVWX";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
}

/// A UTM grid zone, e.g. `32U`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UtmZone {
    number: u8,
    band: char,
}

impl fmt::Display for UtmZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.number, self.band)
    }
}

impl UtmZone {
    /// Zone containing `fix`, including the Norway and Svalbard exceptions.
    pub fn for_fix(fix: &GeoFix) -> Result<Self> {
        check_coverage(fix)?;

        Ok(Self {
            number: zone_number(fix.latitude, fix.longitude),
            band: latitude_band(fix.latitude),
        })
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn band(&self) -> char {
        self.band
    }

    pub fn hemisphere(&self) -> Hemisphere {
        if self.band >= 'N' {
            Hemisphere::North
        } else {
            Hemisphere::South
        }
    }

    /// Longitude of the zone's central meridian in degrees.
    pub fn central_meridian(&self) -> f64 {
        f64::from(self.number) * 6.0 - 183.0
    }
}

fn zone_number(latitude: f64, longitude: f64) -> u8 {
    if (56.0..64.0).contains(&latitude) && (3.0..12.0).contains(&longitude) {
        return 32;
    }

    if (72.0..=84.0).contains(&latitude) && (0.0..42.0).contains(&longitude) {
        return match longitude {
            lon if lon < 9.0 => 31,
            lon if lon < 21.0 => 33,
            lon if lon < 33.0 => 35,
            _ => 37,
        };
    }

    // longitude 180 would land in a 61st zone
    let number = ((longitude + 180.0) / 6.0).floor() as u8 + 1;
    number.min(60)
}

fn latitude_band(latitude: f64) -> char {
    let index = ((latitude - UTM_MIN_LATITUDE) / 8.0).floor() as usize;
    LATITUDE_BANDS[index.min(LATITUDE_BANDS.len() - 1)] as char
}

fn check_coverage(fix: &GeoFix) -> Result<()> {
    fix.validate()?;

    if !(UTM_MIN_LATITUDE..=UTM_MAX_LATITUDE).contains(&fix.latitude) {
        return Err(Error::OutsideUtmCoverage(fix.latitude));
    }
    Ok(())
}

/// A point on the UTM grid, in meters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectedPoint {
    pub easting: f64,
    pub northing: f64,
}

impl fmt::Display for ProjectedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(E {:.2}m, N {:.2}m)", self.easting, self.northing)
    }
}

impl ProjectedPoint {
    pub fn new(easting: f64, northing: f64) -> Self {
        Self { easting, northing }
    }

    /// Planar distance to another point. No altitude term.
    pub fn distance_to(&self, other: &ProjectedPoint) -> f64 {
        (self.easting - other.easting).hypot(self.northing - other.northing)
    }
}

/// WGS-84 derived constants.
struct Ellipsoid {
    /// First eccentricity squared
    e2: f64,
    /// Second eccentricity squared
    ep2: f64,
}

const fn wgs84() -> Ellipsoid {
    let e2 = WGS84_F * (2.0 - WGS84_F);
    Ellipsoid {
        e2,
        ep2: e2 / (1.0 - e2),
    }
}

const ELLIPSOID: Ellipsoid = wgs84();

/// Projects fixes into one fixed UTM zone.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UtmProjector {
    zone: UtmZone,
}

impl UtmProjector {
    pub fn new(zone: UtmZone) -> Self {
        Self { zone }
    }

    /// Projector for the zone that `fix` falls in.
    pub fn for_fix(fix: &GeoFix) -> Result<Self> {
        Ok(Self::new(UtmZone::for_fix(fix)?))
    }

    pub fn zone(&self) -> UtmZone {
        self.zone
    }

    /// Project a fix into this projector's zone.
    ///
    /// Fails on non-finite or out-of-range coordinates and on latitudes
    /// outside UTM coverage; never returns a point for such input.
    pub fn project(&self, fix: &GeoFix) -> Result<ProjectedPoint> {
        check_coverage(fix)?;

        let Ellipsoid { e2, ep2 } = ELLIPSOID;
        let k0 = UTM_SCALE_FACTOR;

        let phi = fix.latitude.to_radians();
        let delta_lambda =
            wrap_longitude(fix.longitude - self.zone.central_meridian()).to_radians();

        let (sin_phi, cos_phi) = phi.sin_cos();
        let tan_phi = phi.tan();

        let n = WGS84_A / (1.0 - e2 * sin_phi * sin_phi).sqrt();
        let t = tan_phi * tan_phi;
        let c = ep2 * cos_phi * cos_phi;
        let a = cos_phi * delta_lambda;
        let m = meridian_arc(phi);

        let a2 = a * a;
        let a3 = a2 * a;
        let a4 = a3 * a;
        let a5 = a4 * a;
        let a6 = a5 * a;

        let easting = k0
            * n
            * (a + (1.0 - t + c) * a3 / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a5 / 120.0)
            + UTM_FALSE_EASTING;

        let mut northing = k0
            * (m + n
                * tan_phi
                * (a2 / 2.0
                    + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                    + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a6 / 720.0));

        if self.zone.hemisphere() == Hemisphere::South {
            northing += UTM_FALSE_NORTHING_SOUTH;
        }

        Ok(ProjectedPoint::new(easting, northing))
    }

    /// Inverse of [`UtmProjector::project`]. The returned fix has zero altitude.
    pub fn unproject(&self, point: &ProjectedPoint) -> GeoFix {
        let Ellipsoid { e2, ep2 } = ELLIPSOID;
        let k0 = UTM_SCALE_FACTOR;

        let x = point.easting - UTM_FALSE_EASTING;
        let y = match self.zone.hemisphere() {
            Hemisphere::North => point.northing,
            Hemisphere::South => point.northing - UTM_FALSE_NORTHING_SOUTH,
        };

        let m = y / k0;
        let mu = m / (WGS84_A * (1.0 - e2 / 4.0 - 3.0 * e2 * e2 / 64.0 - 5.0 * e2.powi(3) / 256.0));

        let sqrt_1_e2 = (1.0 - e2).sqrt();
        let e1 = (1.0 - sqrt_1_e2) / (1.0 + sqrt_1_e2);

        // footpoint latitude
        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        let (sin_phi1, cos_phi1) = phi1.sin_cos();
        let tan_phi1 = phi1.tan();
        let w = 1.0 - e2 * sin_phi1 * sin_phi1;

        let n1 = WGS84_A / w.sqrt();
        let t1 = tan_phi1 * tan_phi1;
        let c1 = ep2 * cos_phi1 * cos_phi1;
        let r1 = WGS84_A * (1.0 - e2) / w.powf(1.5);
        let d = x / (n1 * k0);

        let d2 = d * d;
        let d3 = d2 * d;
        let d4 = d3 * d;
        let d5 = d4 * d;
        let d6 = d5 * d;

        let phi = phi1
            - (n1 * tan_phi1 / r1)
                * (d2 / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d4 / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1
                        - 252.0 * ep2
                        - 3.0 * c1 * c1)
                        * d6
                        / 720.0);

        let delta_lambda = (d - (1.0 + 2.0 * t1 + c1) * d3 / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1) * d5
                / 120.0)
            / cos_phi1;

        GeoFix::new(
            phi.to_degrees(),
            wrap_longitude(self.zone.central_meridian() + delta_lambda.to_degrees()),
            0.0,
        )
    }
}

/// Wrap a longitude (or longitude difference) into -180..180 degrees.
fn wrap_longitude(degrees: f64) -> f64 {
    (degrees + 180.0).rem_euclid(360.0) - 180.0
}

/// Distance along the meridian from the equator to latitude `phi` (radians).
fn meridian_arc(phi: f64) -> f64 {
    let e2 = ELLIPSOID.e2;
    let e4 = e2 * e2;
    let e6 = e4 * e2;

    WGS84_A
        * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
            - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
            + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
            - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
}
