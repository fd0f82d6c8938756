//! Radar sweep planning.

use std::f64::consts::TAU;

use duelist_core::constants::RADAR_FOCUS_SWEEP;
use duelist_core::geometry::turn_angle;

/// Turn request for a continuous full-circle spin. The host clamps it to
/// the radar's rate limit.
pub fn spin_turn(clockwise: bool) -> f64 {
    if clockwise {
        TAU
    } else {
        -TAU
    }
}

/// Turn that sweeps past `target_bearing` by half the focus arc, so the
/// beam crosses the target wherever it moves in the next tick.
pub fn focus_turn(radar_heading: f64, target_bearing: f64) -> f64 {
    let offset = turn_angle(radar_heading, target_bearing);
    let overshoot = RADAR_FOCUS_SWEEP / 2.0;
    if offset >= 0.0 {
        offset + overshoot
    } else {
        offset - overshoot
    }
}
