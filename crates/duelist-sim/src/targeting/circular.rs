//! Circular targeting: the target keeps turning at its observed rate.
//!
//! A turn circle is estimated from two snapshots whose headings differ by
//! at least a threshold: the normals to both headings meet at the centre.
//! The intercept is then found by sampling candidate projectile travel
//! distances and refining between the two best candidates each pass.

use std::f64::consts::FRAC_PI_2;

use duelist_core::config::AgentConfig;
use duelist_core::constants::*;
use duelist_core::enums::TargetingKind;
use duelist_core::geometry::{differ_by_less_than_fraction, turn_angle, LineEquation};
use duelist_core::snapshot::Snapshot;
use duelist_core::types::Point;

use super::{target_at_fire_tick, AimContext, HeadOnSolver, TargetingSolver};
use crate::snapshot_store::SnapshotStore;
use crate::waves::Wave;

/// Circle a turning target is following.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnCircle {
    pub center: Point,
    pub radius: f64,
    /// Signed heading change per tick; positive turns clockwise.
    pub turn_rate: f64,
}

impl TurnCircle {
    /// Position `ticks` after `start` while following the circle.
    pub fn position_after(&self, start: &Point, ticks: f64) -> Point {
        let theta = self.center.bearing_to(start) + self.turn_rate * ticks;
        self.center.project(theta, self.radius)
    }
}

/// Estimate the turn circle through `older` and `newer`. `None` when either
/// is stationary, the heading change is below `min_heading_change`, the
/// normals are parallel, or the two radius estimates disagree.
pub fn turn_circle(newer: &Snapshot, older: &Snapshot, min_heading_change: f64) -> Option<TurnCircle> {
    if newer.velocity == 0.0 || older.velocity == 0.0 || newer.tick <= older.tick {
        return None;
    }
    let turned = turn_angle(older.heading, newer.heading);
    if turned.abs() < min_heading_change {
        return None;
    }

    let normal_new = LineEquation::from_heading(&newer.position, newer.heading + FRAC_PI_2);
    let normal_old = LineEquation::from_heading(&older.position, older.heading + FRAC_PI_2);
    let center = normal_new.intersection(&normal_old)?;
    if !center.is_finite() {
        return None;
    }

    let r_new = center.distance_to(&newer.position);
    let r_old = center.distance_to(&older.position);
    if r_new <= f64::EPSILON || !differ_by_less_than_fraction(r_new, r_old, CIRCULAR_CENTER_TOLERANCE) {
        return None;
    }

    Some(TurnCircle {
        center,
        radius: r_new,
        turn_rate: turned / (newer.tick - older.tick) as f64,
    })
}

/// Solve the aim from `origin` at projectile `speed` against a target at
/// `start` on `circle`. `lapse` is how many ticks before the shot the
/// target was observed.
pub fn solve_circular(
    origin: Point,
    speed: f64,
    start: &Point,
    circle: &TurnCircle,
    lapse: f64,
    refinements: usize,
    samples: usize,
) -> Option<f64> {
    if speed <= 0.0 || samples < 2 {
        return None;
    }
    let reach = origin.distance_to(&circle.center);
    let mut lo = (reach - circle.radius).max(0.0);
    let mut hi = reach + circle.radius;
    let mut best: Option<(f64, Point)> = None;

    for _ in 0..refinements.max(1) {
        let mut scored: Vec<(f64, f64, Point)> = (0..samples)
            .map(|i| {
                let distance = lo + (hi - lo) * i as f64 / (samples - 1) as f64;
                let p = circle.position_after(start, lapse + distance / speed);
                (
                    (distance - origin.distance_to(&p)).abs(),
                    distance,
                    p,
                )
            })
            .filter(|(err, _, p)| err.is_finite() && p.is_finite())
            .collect();
        if scored.is_empty() {
            return None;
        }
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        best = Some((scored[0].1, scored[0].2));
        let second = scored.get(1).map_or(scored[0].1, |s| s.1);
        lo = scored[0].1.min(second);
        hi = scored[0].1.max(second);
    }

    let (_, point) = best?;
    if origin.distance_sq_to(&point) <= f64::EPSILON {
        return None;
    }
    Some(origin.bearing_to(&point))
}

#[derive(Debug, Clone, Copy)]
pub struct CircularSolver {
    refinements: usize,
    samples: usize,
    min_heading_change: f64,
    max_lookback: u64,
}

impl Default for CircularSolver {
    fn default() -> Self {
        Self {
            refinements: CIRCULAR_REFINEMENTS,
            samples: CIRCULAR_SAMPLES,
            min_heading_change: CIRCULAR_MIN_HEADING_CHANGE,
            max_lookback: CIRCULAR_MAX_LOOKBACK,
        }
    }
}

impl CircularSolver {
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            refinements: config.circular_refinements,
            samples: config.circular_samples,
            min_heading_change: config.circular_min_heading_change,
            max_lookback: config.circular_max_lookback,
        }
    }

    /// Turn circle from the most recent history entry, at least two ticks
    /// older than `target`, that shows enough heading change.
    pub fn find_circle(&self, target: &Snapshot, store: &SnapshotStore) -> Option<TurnCircle> {
        let oldest = target.tick.saturating_sub(self.max_lookback);
        let newest = target.tick.checked_sub(2)?;
        let history: Vec<&Snapshot> = store.history(&target.name).collect();
        history
            .iter()
            .rev()
            .filter(|s| s.tick >= oldest && s.tick <= newest)
            .find(|s| turn_angle(s.heading, target.heading).abs() >= self.min_heading_change)
            .and_then(|older| turn_circle(target, older, self.min_heading_change))
    }
}

impl TargetingSolver for CircularSolver {
    fn kind(&self) -> TargetingKind {
        TargetingKind::Circular
    }

    fn can_aim(&self, target: &Snapshot, ctx: &AimContext) -> bool {
        self.find_circle(target, ctx.store).is_some()
    }

    fn aim(&self, target: &Snapshot, me: &Snapshot, wave: &Wave, ctx: &AimContext) -> Option<f64> {
        if target.velocity == 0.0 {
            let target = target_at_fire_tick(target, wave, ctx.store)?;
            return HeadOnSolver.aim(&target, me, wave, ctx);
        }
        let circle = self.find_circle(target, ctx.store)?;
        let lapse = wave.origin_tick as f64 - target.tick as f64;
        solve_circular(
            wave.origin,
            wave.speed,
            &target.position,
            &circle,
            lapse,
            self.refinements,
            self.samples,
        )
    }
}
