//! Movement strategies.

use std::f64::consts::FRAC_PI_2;

use duelist_core::commands::DriveCommand;
use duelist_core::config::AgentConfig;
use duelist_core::constants::MAX_SPEED;
use duelist_core::enums::OrbitDirection;
use duelist_core::geometry::turn_angle;
use duelist_tactics::antigravity::{AntiGravityField, FieldInput, GravityPoint};

use super::{MovementStrategy, TickView};
use crate::drive::options::DriveOptions;
use crate::drive::DriveState;
use crate::waves::Wave;

/// Drive along the anti-gravity field. Stops when nothing is left to
/// run from.
#[derive(Debug, Clone)]
pub struct AntiGravityMovement {
    field: AntiGravityField,
}

impl AntiGravityMovement {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            field: AntiGravityField::new(config.anti_gravity.clone()),
        }
    }
}

impl MovementStrategy for AntiGravityMovement {
    fn name(&self) -> &str {
        "anti-gravity"
    }

    fn begin_round(&mut self) {
        self.field.begin_round();
    }

    fn drive(&mut self, view: &TickView) -> DriveCommand {
        let points: Vec<GravityPoint> = view
            .store
            .alive_opponents()
            .into_iter()
            .filter_map(|name| view.store.latest(name))
            .map(|s| GravityPoint::new(s.name.clone(), s.position, view.stats.threat_weight(&s.name)))
            .collect();

        let input = FieldInput {
            position: view.me.position,
            velocity: view.me.velocity,
            tick: view.tick(),
            arena: view.state.arena,
            others: view.state.others,
            points: &points,
        };
        match self.field.evaluate(&input) {
            Some(out) => DriveCommand::new(out.heading, MAX_SPEED),
            None => DriveCommand::stop(),
        }
    }
}

/// Dodge the next opponent wave.
///
/// The reachable factor angles are sampled and the one farthest from
/// where the opponent most likely aimed is chosen, preferring angles
/// covered by one of our bullet shadows. The drive option ending closest
/// to that angle gives the heading, and braking is timed so the body comes
/// to rest on it. Without an incoming wave the body orbits the nearest
/// opponent.
#[derive(Debug, Clone)]
pub struct WaveSurfMovement {
    samples: usize,
    orbit: OrbitDirection,
}

impl WaveSurfMovement {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            samples: config.escape_samples,
            orbit: OrbitDirection::Clockwise,
        }
    }

    /// Safest factor angle on `wave` reachable from the current options.
    pub fn safest_factor_angle(wave: &Wave, options: &DriveOptions, predicted: f64, distance: f64, samples: usize) -> f64 {
        let range = options.escape_range();
        let steps = samples.max(1) * 2;
        let candidates = (0..=steps).map(|i| range.ccw + range.width() * i as f64 / steps as f64);

        // Shadowed first, then farthest from the predicted aim; ties keep
        // the earlier (more counter-clockwise) candidate.
        let mut best: Option<(bool, f64, f64)> = None;
        for factor in candidates {
            let point = wave
                .origin
                .project(wave.initial_defender_bearing + factor, distance);
            let shadowed = wave.shadowed(&point);
            let spread = turn_angle(predicted, factor).abs();
            let better = match best {
                None => true,
                Some((s, d, _)) => (shadowed && !s) || (shadowed == s && spread > d),
            };
            if better {
                best = Some((shadowed, spread, factor));
            }
        }
        best.map_or(0.0, |(_, _, factor)| factor)
    }

    fn orbit_nearest(&mut self, view: &TickView) -> DriveCommand {
        let Some(opponent) = view.nearest_opponent(None) else {
            return DriveCommand::stop();
        };
        let state = DriveState::from(view.me);
        let bearing = view.me.position.bearing_to(&opponent.position);
        let mut heading = bearing + self.orbit.sign() * FRAC_PI_2;
        let predictor = view.waves.predictor();
        if predictor.should_stop(state, heading, MAX_SPEED) {
            self.orbit = self.orbit.reverse();
            heading = bearing + self.orbit.sign() * FRAC_PI_2;
        }
        DriveCommand::new(heading, MAX_SPEED)
    }
}

impl MovementStrategy for WaveSurfMovement {
    fn name(&self) -> &str {
        "wave-surf"
    }

    fn begin_round(&mut self) {
        self.orbit = OrbitDirection::Clockwise;
    }

    fn drive(&mut self, view: &TickView) -> DriveCommand {
        let tick = view.tick();
        let Some(wave) = view.waves.soonest_opponent_wave(&view.me.position, tick) else {
            return self.orbit_nearest(view);
        };

        let predictor = view.waves.predictor();
        let state = DriveState::from(view.me);
        let options = DriveOptions::compute(predictor, wave, state, self.samples);
        let predicted = view.detector.predicted_factor_angle(wave, &view.aim_context());
        let distance = wave.origin.distance_to(&view.me.position);
        let target = Self::safest_factor_angle(wave, &options, predicted, distance, self.samples);

        let Some(option) = options.closest_to(target) else {
            return DriveCommand::stop();
        };
        let stop = predictor.should_stop_for_wave(wave, target, state, option.heading, MAX_SPEED)
            || predictor.should_stop(state, option.heading, MAX_SPEED);
        DriveCommand::new(option.heading, if stop { 0.0 } else { MAX_SPEED })
    }
}
