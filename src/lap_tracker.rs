use log::{debug, info};
use serde::Serialize;

use crate::config::TrackerConfig;
use crate::utm::ProjectedPoint;

/// Lap progress after one fix.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LapStatus {
    pub lap: i32,
    pub on_line: bool,
    pub distance: f32,
}

/// Counts laps by watching the distance to the start/finish point.
///
/// The start point is the first point seen. A lap is credited when the
/// vehicle leaves the outer radius after having been on the line; it has to
/// come back inside the inner radius before the next departure counts.
pub struct LapTracker {
    reference: Option<ProjectedPoint>,
    lap_count: u32,
    is_near: bool,
    inner_threshold: f64,
    outer_threshold: f64,
}

impl Default for LapTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl LapTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            reference: None,
            lap_count: 0,
            // the vehicle starts on the line
            is_near: true,
            inner_threshold: config.inner_threshold(),
            outer_threshold: config.outer_threshold(),
        }
    }

    pub fn get_reference(&self) -> Option<ProjectedPoint> {
        self.reference
    }

    pub fn get_lap_count(&self) -> u32 {
        self.lap_count
    }

    pub fn is_near(&self) -> bool {
        self.is_near
    }

    pub fn inner_threshold(&self) -> f64 {
        self.inner_threshold
    }

    pub fn outer_threshold(&self) -> f64 {
        self.outer_threshold
    }

    /// Feed the next point and get the resulting lap status.
    pub fn update(&mut self, point: ProjectedPoint) -> LapStatus {
        let reference = match self.reference {
            Some(reference) => reference,
            None => {
                info!("Set start point at {}", point);
                self.reference = Some(point);
                self.lap_count = 0;
                self.is_near = true;
                point
            }
        };

        let distance = reference.distance_to(&point);

        // NaN compares false both ways, so a bad distance never transitions
        if self.is_near && distance > self.outer_threshold {
            self.is_near = false;
            self.lap_count += 1;
            info!("Lap {} credited ({:.2}m from start)", self.lap_count, distance);
        } else if !self.is_near && distance < self.inner_threshold {
            self.is_near = true;
            debug!("Back on the line ({:.2}m from start)", distance);
        }

        LapStatus {
            lap: i32::try_from(self.lap_count).unwrap_or(i32::MAX),
            on_line: self.is_near,
            distance: distance as f32,
        }
    }
}
