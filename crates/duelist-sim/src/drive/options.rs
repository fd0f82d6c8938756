//! Reachable positions for a wave, sampled over test headings.
//!
//! Test headings are spread evenly over the half circle on each side of the
//! line to the wave origin. Each is simulated at full speed until the wave
//! arrives; the resulting factor angles bound where the defender can be.

use std::f64::consts::PI;

use duelist_core::constants::MAX_SPEED;
use duelist_core::geometry::{normalize_heading, turn_angle};
use duelist_core::types::Point;

use super::predictor::{DrivePredictor, DriveState};
use crate::waves::{EscapeRange, Wave};

/// Outcome of driving along one test heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveOption {
    pub heading: f64,
    pub factor_angle: f64,
    pub position: Point,
}

/// All test headings for one wave.
#[derive(Debug, Clone, PartialEq)]
pub struct DriveOptions {
    pub counter_clockwise: Vec<DriveOption>,
    pub clockwise: Vec<DriveOption>,
}

impl DriveOptions {
    /// Simulate `samples` headings per side from `state`.
    pub fn compute(predictor: &DrivePredictor, wave: &Wave, state: DriveState, samples: usize) -> Self {
        let samples = samples.max(1);
        let increment = PI / samples as f64;
        let in_heading = state.position.bearing_to(&wave.origin);

        let simulate = |heading: f64| {
            let end = predictor.predict_until(wave, state, heading, MAX_SPEED);
            DriveOption {
                heading,
                factor_angle: wave.factor_angle(&end.position),
                position: end.position,
            }
        };

        let counter_clockwise = (0..samples)
            .map(|i| simulate(normalize_heading(in_heading + (i as f64 + 0.5) * increment)))
            .collect();
        let clockwise = (0..samples)
            .map(|i| simulate(normalize_heading(in_heading + PI + (i as f64 + 0.5) * increment)))
            .collect();
        Self {
            counter_clockwise,
            clockwise,
        }
    }

    fn all(&self) -> impl Iterator<Item = &DriveOption> {
        self.counter_clockwise.iter().chain(self.clockwise.iter())
    }

    /// Most counter-clockwise and most clockwise reachable factor angles.
    pub fn escape_range(&self) -> EscapeRange {
        let (min, max) = self.all().fold((0.0f64, 0.0f64), |(lo, hi), o| {
            (lo.min(o.factor_angle), hi.max(o.factor_angle))
        });
        EscapeRange { ccw: min, cw: max }
    }

    /// Option whose end position lies closest to `factor_angle`.
    pub fn closest_to(&self, factor_angle: f64) -> Option<&DriveOption> {
        self.all().min_by(|a, b| {
            let da = turn_angle(factor_angle, a.factor_angle).abs();
            let db = turn_angle(factor_angle, b.factor_angle).abs();
            da.total_cmp(&db)
        })
    }
}
