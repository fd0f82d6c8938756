//! Linear targeting: the target keeps its last observed velocity vector.
//!
//! With relative position `S`, target velocity `V` and projectile speed
//! `s`, the intercept time solves `|S + V·t| = s·t`, i.e.
//! `(V·V − s²)t² + 2(S·V)t + S·S = 0`. The smallest positive root wins; no
//! positive root means the projectile can never catch the target.

use glam::DVec2;

use duelist_core::enums::TargetingKind;
use duelist_core::snapshot::Snapshot;
use duelist_core::types::{Point, Rect};

use super::{target_at_fire_tick, AimContext, TargetingSolver};
use crate::waves::Wave;

const EPSILON: f64 = 1e-9;

/// A solved intercept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearIntercept {
    /// Absolute aim heading from the shooter.
    pub aim: f64,
    /// Ticks until the projectile reaches `point`.
    pub time: f64,
    pub point: Point,
}

/// Solve the intercept of a target at `target` moving with `velocity`
/// (units per tick) by a projectile leaving `shooter` at `speed`. When
/// `bounds` is given, an intercept point outside it is pulled back onto the
/// exceeded bound and the time recomputed from the new point.
pub fn solve_linear(
    shooter: Point,
    target: Point,
    velocity: DVec2,
    speed: f64,
    bounds: Option<&Rect>,
) -> Option<LinearIntercept> {
    let s = target.as_dvec2() - shooter.as_dvec2();
    let c = s.length_squared();
    if c <= EPSILON || speed <= 0.0 {
        return None;
    }
    let a = velocity.length_squared() - speed * speed;
    let b = 2.0 * s.dot(velocity);

    let time = if a.abs() < EPSILON {
        // Target exactly as fast as the projectile.
        if b >= 0.0 {
            return None;
        }
        -c / b
    } else {
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return None;
        }
        let root = disc.sqrt();
        let t1 = (-b + root) / (2.0 * a);
        let t2 = (-b - root) / (2.0 * a);
        match (t1 > 0.0, t2 > 0.0) {
            (true, true) => t1.min(t2),
            (true, false) => t1,
            (false, true) => t2,
            (false, false) => return None,
        }
    };
    if !time.is_finite() {
        return None;
    }

    let mut point = Point::from(target.as_dvec2() + velocity * time);
    let mut time = time;
    if let Some(bounds) = bounds {
        if !bounds.contains(&point) {
            point = bounds.clamp(&point);
            time = shooter.distance_to(&point) / speed;
        }
    }
    if shooter.distance_sq_to(&point) <= EPSILON {
        return None;
    }
    Some(LinearIntercept {
        aim: shooter.bearing_to(&point),
        time,
        point,
    })
}

/// Linear solver. Velocity comes from the snapshot's extrapolation step,
/// so a change of speed or heading observed over the last tick carries
/// forward.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearSolver;

impl TargetingSolver for LinearSolver {
    fn kind(&self) -> TargetingKind {
        TargetingKind::Linear
    }

    fn can_aim(&self, _target: &Snapshot, _ctx: &AimContext) -> bool {
        true
    }

    fn aim(&self, target: &Snapshot, _me: &Snapshot, wave: &Wave, ctx: &AimContext) -> Option<f64> {
        let target = target_at_fire_tick(target, wave, ctx.store)?;
        let previous = ctx.store.previous(&target.name, target.tick);
        let (dx, dy) = target.next_shift(previous);
        let bounds = ctx.arena.bounds();
        solve_linear(
            wave.origin,
            target.position,
            DVec2::new(dx, dy),
            wave.speed,
            Some(&bounds),
        )
        .map(|i| i.aim)
    }
}
