//! Anti-gravity movement field.
//!
//! Opponents, walls and a periodically renewed anchor at our own past
//! position push on the agent; the resultant force gives a heading. The
//! heading is then nudged away from any opponent's line of fire.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use duelist_core::config::AntiGravityConfig;
use duelist_core::constants::{MAX_THREAT_WEIGHT, MIN_THREAT_WEIGHT};
use duelist_core::geometry::{normalize_heading, within_axis_tolerance};
use duelist_core::types::{Arena, Point};

/// Squared anchor distance below which self-repulsion is skipped.
const MIN_ANCHOR_DISTANCE_SQ: f64 = 0.1;

/// Velocity below which the agent counts as stalled.
const STALL_VELOCITY: f64 = 0.01;

/// A force source, rebuilt every tick. Positive weight repels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GravityPoint {
    pub name: String,
    pub position: Point,
    pub weight: f64,
}

impl GravityPoint {
    pub fn new(name: impl Into<String>, position: Point, weight: f64) -> Self {
        Self {
            name: name.into(),
            position,
            weight,
        }
    }
}

/// Per-tick inputs to the field.
pub struct FieldInput<'a> {
    pub position: Point,
    pub velocity: f64,
    pub tick: u64,
    pub arena: Arena,
    /// Opponents alive according to the host.
    pub others: usize,
    pub points: &'a [GravityPoint],
}

/// Result of one field evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldOutput {
    /// Heading to drive along (radians, 0 = North, clockwise).
    pub heading: f64,
    /// Resultant displacement before the escape adjustment.
    pub force: DVec2,
    /// Escape-tolerance increments applied to the raw heading.
    pub escape_steps: u32,
    /// True when no conflict-free heading was found within the pass cap
    /// and the raw heading was kept.
    pub capped: bool,
}

/// Threat weight from the share of recent incoming hits an opponent caused.
/// With no hits recorded every opponent is treated as fully dangerous.
pub fn threat_weight(hits_from: u32, total_hits: u32) -> f64 {
    if total_hits == 0 {
        return MAX_THREAT_WEIGHT;
    }
    let fraction = hits_from as f64 / total_hits as f64;
    (MIN_THREAT_WEIGHT + (MAX_THREAT_WEIGHT - MIN_THREAT_WEIGHT) * fraction)
        .clamp(MIN_THREAT_WEIGHT, MAX_THREAT_WEIGHT)
}

/// Repulsion from one gravity point, directed away from it.
pub fn robot_force(config: &AntiGravityConfig, me: Point, point: &GravityPoint) -> DVec2 {
    let away = me.as_dvec2() - point.position.as_dvec2();
    let d2 = away.length_squared();
    if d2 <= f64::EPSILON {
        return DVec2::ZERO;
    }
    away * (config.repulse_factor * point.weight / d2.powf(config.robot_falloff))
}

/// Repulsion from all four walls, using each wall's raw distance. A body kept
/// inside the arena is at least `HALF_BODY_WIDTH` from every wall, so the floor
/// of 1 only applies to positions on or past a wall, where it keeps the push
/// finite and pointing back inside.
pub fn wall_force(config: &AntiGravityConfig, me: Point, arena: &Arena) -> DVec2 {
    let k = config.repulse_factor / config.wall_divisor;
    let push = |d: f64| k / d.max(1.0).powf(config.wall_falloff);
    DVec2::new(
        push(me.x) - push(arena.width - me.x),
        push(me.y) - push(arena.height - me.y),
    )
}

/// Heading of a displacement vector, or `None` for a zero vector.
pub fn heading_of(force: DVec2) -> Option<f64> {
    if force.length_squared() <= f64::EPSILON || !force.is_finite() {
        return None;
    }
    Some(normalize_heading(force.x.atan2(force.y)))
}

/// Rotate `heading` clockwise in `tolerance` steps until it is clear of every
/// bearing. Bearings are axes, not directions: a heading within `tolerance` of
/// a bearing or of its reverse conflicts, on either side. Gives up after
/// `max_passes` steps and returns the unmodified heading with `capped = true`.
pub fn escape_heading(heading: f64, bearings: &[f64], tolerance: f64, max_passes: u32) -> (f64, u32, bool) {
    let mut candidate = heading;
    for step in 0..=max_passes {
        let conflict = bearings
            .iter()
            .any(|b| within_axis_tolerance(candidate, *b, tolerance));
        if !conflict {
            return (normalize_heading(candidate), step, false);
        }
        candidate += tolerance;
    }
    (heading, max_passes, true)
}

/// Stateful anti-gravity field. The only state carried across ticks is the
/// self-repulsion anchor and its renewal countdown.
#[derive(Debug, Clone)]
pub struct AntiGravityField {
    config: AntiGravityConfig,
    anchor: Option<Point>,
    renew_countdown: i64,
}

impl AntiGravityField {
    pub fn new(config: AntiGravityConfig) -> Self {
        Self {
            config,
            anchor: None,
            renew_countdown: 0,
        }
    }

    pub fn config(&self) -> &AntiGravityConfig {
        &self.config
    }

    pub fn anchor(&self) -> Option<Point> {
        self.anchor
    }

    /// Forget the anchor at the start of a round.
    pub fn begin_round(&mut self) {
        self.anchor = None;
        self.renew_countdown = 0;
    }

    /// Advance the anchor countdown and return the self-repulsion force.
    fn self_force(&mut self, input: &FieldInput) -> DVec2 {
        if input.tick < self.config.start_tick {
            return DVec2::ZERO;
        }
        if self.renew_countdown == 0 {
            self.anchor = Some(input.position);
            self.renew_countdown = -1;
        } else if self.renew_countdown > 0 {
            self.renew_countdown -= 1;
        }
        if input.velocity.abs() < STALL_VELOCITY && self.renew_countdown < 0 {
            self.renew_countdown = self.config.self_repulse_cadence as i64;
        }

        let Some(anchor) = self.anchor else {
            return DVec2::ZERO;
        };
        let away = input.position.as_dvec2() - anchor.as_dvec2();
        let d2 = away.length_squared();
        if d2 < MIN_ANCHOR_DISTANCE_SQ {
            return DVec2::ZERO;
        }
        away * (self.config.repulse_factor * input.others as f64
            / d2.powf(self.config.self_repulse_falloff))
    }

    /// Evaluate the field. `None` when there is nothing to run from; the
    /// caller should stop.
    pub fn evaluate(&mut self, input: &FieldInput) -> Option<FieldOutput> {
        if input.others == 0 || input.points.is_empty() {
            return None;
        }

        let mut force = input
            .points
            .iter()
            .map(|p| robot_force(&self.config, input.position, p))
            .sum::<DVec2>();
        force += wall_force(&self.config, input.position, &input.arena);
        force += self.self_force(input);

        let raw = heading_of(force)?;
        let bearings: Vec<f64> = input
            .points
            .iter()
            .map(|p| input.position.bearing_to(&p.position))
            .collect();
        let cap = self.config.escape_passes_per_opponent * input.points.len() as u32;
        let (heading, escape_steps, capped) =
            escape_heading(raw, &bearings, self.config.escape_tolerance, cap);
        if capped {
            log::warn!(
                "anti-gravity escape search hit its cap of {cap} passes; keeping raw heading {:.1}°",
                raw.to_degrees()
            );
        }

        Some(FieldOutput {
            heading,
            force,
            escape_steps,
            capped,
        })
    }
}
