use std::io;

/// Errors raised while projecting fixes or feeding them through the lap counter
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to encode lap status: {0}")]
    EncodeError(#[from] serde_json::Error),

    #[error("Non-finite coordinate in fix (lat: {latitude}, lon: {longitude})")]
    NonFiniteCoordinate { latitude: f64, longitude: f64 },

    #[error("Latitude {0}° outside -90° to 90°")]
    LatitudeOutOfRange(f64),

    #[error("Longitude {0}° outside -180° to 180°")]
    LongitudeOutOfRange(f64),

    #[error("Latitude {0}° outside UTM coverage (80°S to 84°N)")]
    OutsideUtmCoverage(f64),

    #[error("Invalid threshold {0} m (must be finite and positive)")]
    InvalidThreshold(f64),
}

pub type Result<T> = std::result::Result<T, Error>;
