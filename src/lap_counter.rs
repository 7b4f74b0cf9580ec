use log::{debug, info};

use crate::config::TrackerConfig;
use crate::error::Result;
use crate::lap_tracker::{LapStatus, LapTracker};
use crate::position::GeoFix;
use crate::utm::{UtmProjector, UtmZone};

/// Turns raw fixes into lap statuses.
///
/// The UTM zone is taken from the first accepted fix and kept for the rest
/// of the run. A rejected fix leaves both the zone and the tracker untouched.
pub struct LapCounter {
    projector: Option<UtmProjector>,
    tracker: LapTracker,
}

impl LapCounter {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            projector: None,
            tracker: LapTracker::new(config),
        }
    }

    pub fn zone(&self) -> Option<UtmZone> {
        self.projector.map(|projector| projector.zone())
    }

    pub fn tracker(&self) -> &LapTracker {
        &self.tracker
    }

    pub fn handle_fix(&mut self, fix: &GeoFix) -> Result<LapStatus> {
        let projector = match self.projector {
            Some(projector) => projector,
            None => UtmProjector::for_fix(fix)?,
        };
        let point = projector.project(fix)?;

        if self.projector.is_none() {
            info!("Projecting into UTM zone {} (first fix {})", projector.zone(), fix);
            self.projector = Some(projector);
        }

        debug!("Fix {} -> {}", fix, point);

        Ok(self.tracker.update(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use claims::{assert_matches, assert_none, assert_ok};

    const START_LAT: f64 = 52.0705;
    const START_LON: f64 = -1.0166;
    /// Degrees of latitude per meter, close enough for test offsets.
    const DEG_PER_M: f64 = 1.0 / 111_320.0;

    fn north_of_start(meters: f64) -> GeoFix {
        GeoFix::new(START_LAT + meters * DEG_PER_M, START_LON, 150.0)
    }

    #[test]
    fn test_first_fix_sets_zone_and_start() {
        let mut counter = LapCounter::new(TrackerConfig::default());
        assert_none!(counter.zone());

        let lap = assert_ok!(counter.handle_fix(&north_of_start(0.0)));
        assert_eq!(lap.lap, 0);
        assert!(lap.on_line);
        assert_eq!(lap.distance, 0.0);

        assert_eq!(counter.zone().map(|zone| zone.to_string()).as_deref(), Some("30U"));
        assert!(counter.tracker().get_reference().is_some());
    }

    #[test]
    fn test_counts_laps_from_fixes() {
        let mut counter = LapCounter::new(TrackerConfig::default());

        let laps: Vec<(i32, bool)> = [0.0, 50.0, 200.0, 40.0, 1.0, 0.5, 60.0, 2.0]
            .into_iter()
            .map(|m| {
                let lap = assert_ok!(counter.handle_fix(&north_of_start(m)));
                (lap.lap, lap.on_line)
            })
            .collect();

        assert_eq!(
            laps,
            vec![
                (0, true),
                (1, false),
                (1, false),
                (1, false),
                (1, true),
                (1, true),
                (2, false),
                (2, true),
            ]
        );
    }

    #[test]
    fn test_distance_is_in_meters() {
        let mut counter = LapCounter::new(TrackerConfig::default());
        assert_ok!(counter.handle_fix(&north_of_start(0.0)));

        let lap = assert_ok!(counter.handle_fix(&north_of_start(100.0)));
        assert!((lap.distance - 100.0).abs() < 1.0, "{}", lap.distance);
    }

    #[test]
    fn test_rejected_first_fix_does_not_set_start() {
        let mut counter = LapCounter::new(TrackerConfig::default());

        assert_matches!(
            counter.handle_fix(&GeoFix::new(f64::NAN, START_LON, 0.0)),
            Err(Error::NonFiniteCoordinate { .. })
        );
        assert_none!(counter.zone());
        assert_none!(counter.tracker().get_reference());

        let lap = assert_ok!(counter.handle_fix(&north_of_start(20.0)));
        assert_eq!((lap.lap, lap.on_line, lap.distance), (0, true, 0.0));
    }

    #[test]
    fn test_rejected_fix_leaves_state_alone() {
        let mut counter = LapCounter::new(TrackerConfig::default());
        assert_ok!(counter.handle_fix(&north_of_start(0.0)));
        assert_ok!(counter.handle_fix(&north_of_start(10.0)));
        assert_eq!(counter.tracker().get_lap_count(), 1);

        assert_matches!(
            counter.handle_fix(&GeoFix::new(95.0, START_LON, 0.0)),
            Err(Error::LatitudeOutOfRange(_))
        );
        assert_matches!(
            counter.handle_fix(&GeoFix::new(START_LAT, f64::INFINITY, 0.0)),
            Err(Error::NonFiniteCoordinate { .. })
        );

        assert_eq!(counter.tracker().get_lap_count(), 1);
        assert!(!counter.tracker().is_near());
    }

    #[test]
    fn test_start_next_to_antimeridian() {
        let mut counter = LapCounter::new(TrackerConfig::default());

        for longitude in [179.99999, -179.99999, 179.99999, -179.99999] {
            let lap = assert_ok!(counter.handle_fix(&GeoFix::new(10.0, longitude, 0.0)));
            assert_eq!((lap.lap, lap.on_line), (0, true));
            assert!(lap.distance < 3.0, "{}", lap.distance);
        }
    }
}
