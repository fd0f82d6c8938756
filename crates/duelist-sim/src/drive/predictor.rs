//! Discrete-tick drive simulation.

use std::f64::consts::{FRAC_PI_2, PI};

use duelist_core::constants::*;
use duelist_core::geometry::{normalize_heading, turn_angle};
use duelist_core::physics::max_turn_rate;
use duelist_core::snapshot::Snapshot;
use duelist_core::types::Point;

use super::region::DriveRegion;
use crate::waves::Wave;

/// Scratch kinematic state for simulation loops. Always a copy; never
/// aliases a recorded snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveState {
    pub position: Point,
    pub heading: f64,
    pub velocity: f64,
    pub tick: u64,
}

impl From<&Snapshot> for DriveState {
    fn from(s: &Snapshot) -> Self {
        Self {
            position: s.position,
            heading: s.heading,
            velocity: s.velocity,
            tick: s.tick,
        }
    }
}

/// Final state of a prediction plus every position visited.
#[derive(Debug, Clone, PartialEq)]
pub struct DrivePrediction {
    pub state: DriveState,
    pub path: Vec<Point>,
}

/// One tick of movement toward `target_heading` at `target_speed`.
///
/// A turn wider than 90° is driven in reverse: the target heading flips by
/// 180° and the target velocity changes sign. Turning is limited by the
/// speed-dependent turn rate and applied before the velocity change;
/// speeding up is limited by the acceleration rate and slowing down by the
/// deceleration rate.
pub fn advance(state: DriveState, target_heading: f64, target_speed: f64) -> DriveState {
    let mut target_velocity = target_speed;
    let mut turn = turn_angle(state.heading, target_heading);
    if turn.abs() > FRAC_PI_2 {
        target_velocity = -target_speed;
        turn = turn_angle(state.heading, target_heading + PI);
    }

    let max_turn = max_turn_rate(state.velocity);
    let turn = turn.clamp(-max_turn, max_turn);

    let slowing = (state.velocity > 0.0 && target_velocity < state.velocity)
        || (state.velocity < 0.0 && target_velocity > state.velocity);
    let rate = if slowing { DECELERATION } else { ACCELERATION };
    let delta = (target_velocity - state.velocity).clamp(-rate, rate);

    let heading = normalize_heading(state.heading + turn);
    let velocity = (state.velocity + delta).clamp(-MAX_SPEED, MAX_SPEED);
    DriveState {
        position: state.position.project(heading, velocity),
        heading,
        velocity,
        tick: state.tick + 1,
    }
}

/// Brake from `state` until stopped. Bounded by the ticks needed to shed
/// maximum speed.
fn brake(mut state: DriveState, heading: f64) -> DriveState {
    let limit = (MAX_SPEED / DECELERATION).ceil() as u32 + 1;
    for _ in 0..limit {
        if state.velocity == 0.0 {
            break;
        }
        state = advance(state, heading, 0.0);
    }
    state
}

/// Brake until stopped or until `wave` reaches the body.
fn brake_until_hit(mut state: DriveState, heading: f64, wave: &Wave) -> DriveState {
    let limit = (MAX_SPEED / DECELERATION).ceil() as u32 + 1;
    for _ in 0..limit {
        if state.velocity == 0.0 || wave.time_until_hit(&state.position, state.tick) <= 0 {
            break;
        }
        state = advance(state, heading, 0.0);
    }
    state
}

/// Drive simulation bounded by a drive region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrivePredictor {
    region: DriveRegion,
}

impl DrivePredictor {
    pub fn new(region: DriveRegion) -> Self {
        Self { region }
    }

    pub fn region(&self) -> &DriveRegion {
        &self.region
    }

    /// Simulate toward `heading` at `speed` until `wave` reaches the body or
    /// the body comes to rest. Braking for the drive region is applied each
    /// tick. `state.tick` is treated as `from_tick`.
    pub fn predict_until(&self, wave: &Wave, state: DriveState, heading: f64, speed: f64) -> DriveState {
        self.run_until(wave, state, heading, speed, None)
    }

    /// As [`predict_until`](Self::predict_until), also returning the path.
    pub fn predict_path_until(
        &self,
        wave: &Wave,
        state: DriveState,
        heading: f64,
        speed: f64,
    ) -> DrivePrediction {
        let mut path = vec![state.position];
        let state = self.run_until(wave, state, heading, speed, Some(&mut path));
        DrivePrediction { state, path }
    }

    fn run_until(
        &self,
        wave: &Wave,
        mut state: DriveState,
        heading: f64,
        speed: f64,
        mut path: Option<&mut Vec<Point>>,
    ) -> DriveState {
        let mut adjusted = speed;
        let mut steps = 0;
        while wave.time_until_hit(&state.position, state.tick) > 0
            && (adjusted > 0.0 || state.velocity.abs() > 0.0)
            && steps < MAX_PREDICTION_TICKS
        {
            adjusted = if self.should_stop(state, heading, speed) {
                0.0
            } else {
                speed
            };
            state = advance(state, heading, adjusted);
            if let Some(path) = path.as_mut() {
                path.push(state.position);
            }
            steps += 1;
        }
        state
    }

    /// Whether braking now lands the body closer to `target_factor_angle` on
    /// `wave` than braking one tick later.
    pub fn should_stop_for_wave(
        &self,
        wave: &Wave,
        target_factor_angle: f64,
        state: DriveState,
        heading: f64,
        speed: f64,
    ) -> bool {
        let stop_now = brake_until_hit(state, heading, wave);

        let mut later = state;
        if wave.time_until_hit(&later.position, later.tick) > 0 {
            later = advance(later, heading, speed);
        }
        let stop_later = brake_until_hit(later, heading, wave);

        let now_diff = turn_angle(target_factor_angle, wave.factor_angle(&stop_now.position));
        let later_diff = turn_angle(target_factor_angle, wave.factor_angle(&stop_later.position));
        now_diff.abs() < later_diff.abs()
    }

    /// Whether the body must brake now to stay within the drive region.
    ///
    /// Inside the region: continue one tick, brake fully, and no stop is
    /// needed if that still ends inside. Otherwise look ahead at full speed,
    /// checking every few ticks: re-entering the region means no stop,
    /// crossing the wall hard limit first means stop.
    pub fn should_stop(&self, state: DriveState, heading: f64, speed: f64) -> bool {
        let mut ahead = state;
        if self.region.contains(&ahead.position) {
            ahead = brake(advance(ahead, heading, speed), heading);
            if self.region.contains(&ahead.position) {
                return false;
            }
        }
        for i in 1..=STOP_LOOKAHEAD_TICKS {
            ahead = advance(ahead, heading, MAX_SPEED);
            if i % STOP_LOOKAHEAD_STRIDE == 0 {
                if self.region.beyond_wall_limit(&ahead.position) {
                    return true;
                }
                if self.region.contains(&ahead.position) {
                    return false;
                }
            }
        }
        true
    }
}
