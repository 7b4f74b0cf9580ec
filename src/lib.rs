pub mod config;
pub mod error;
pub mod fetch;
pub mod lap_counter;
pub mod lap_tracker;
pub mod position;
pub mod utm;

// Re-export commonly used types
pub use config::TrackerConfig;
pub use error::{Error, Result};
pub use lap_counter::LapCounter;
pub use lap_tracker::{LapStatus, LapTracker};
pub use position::GeoFix;
pub use utm::{ProjectedPoint, UtmProjector, UtmZone};
