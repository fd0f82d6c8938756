//! Maximum escape angles.

use duelist_core::physics::simple_escape_angle;
use duelist_core::snapshot::Snapshot;

use super::wave::{EscapeRange, Wave};
use crate::drive::options::DriveOptions;
use crate::drive::{DrivePredictor, DriveState};

/// Closed-form bound: `±asin(max_speed / projectile_speed)`.
pub fn simple_escape_range(speed: f64) -> EscapeRange {
    EscapeRange::symmetric(simple_escape_angle(speed))
}

/// Extremal factor angles reached by simulating full-speed flight along
/// `samples` headings on each side until `wave` arrives.
pub fn precise_escape_range(
    predictor: &DrivePredictor,
    wave: &Wave,
    defender: &Snapshot,
    samples: usize,
) -> EscapeRange {
    let mut state = DriveState::from(defender);
    state.tick = state.tick.max(wave.origin_tick);
    DriveOptions::compute(predictor, wave, state, samples).escape_range()
}
