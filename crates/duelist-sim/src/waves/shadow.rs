//! Bullet shadows: arcs of an opponent wave that one of our own projectiles
//! will sweep through, and which therefore cannot carry a live opponent
//! projectile past that point.

use duelist_core::enums::WaveState;
use duelist_core::geometry::{segment_contains, turn_angle, LineEquation};
use duelist_core::types::{Arena, Point};

use super::wave::{BulletShadow, Wave};

/// Shadow cast by `mine` (which must carry a projectile) onto `theirs`,
/// searching forward from `from_tick`. `None` when either wave has left the
/// LEADING state, the projectile leaves the arena before meeting the
/// frontier, or the geometry degenerates.
pub fn compute_shadow(mine: &Wave, theirs: &Wave, arena: &Arena, from_tick: u64) -> Option<BulletShadow> {
    if mine.state != WaveState::Leading || theirs.state != WaveState::Leading {
        return None;
    }
    mine.bullet.as_ref()?;

    // Both frontiers are bounded by the arena diagonal.
    let max_ticks = (arena.diagonal() / mine.speed.min(theirs.speed)).ceil() as u64 + 2;
    let start = from_tick.max(mine.origin_tick + 1);

    for tick in start..start + max_ticks {
        let lead = mine.bullet_position(tick)?;
        if !arena.contains(&lead) {
            return None;
        }
        let radius = theirs.traveled(tick);
        if radius <= 0.0 || theirs.origin.distance_to(&lead) > radius {
            continue;
        }

        let mut trail = mine.bullet_position(tick - 1)?;
        if radius < theirs.origin.distance_to(&trail) {
            // The frontier crossed this tick's segment: clip the trail to it.
            trail = clip_to_circle(&trail, &lead, &theirs.origin, radius)?;
        }
        return Some(shadow_between(&theirs.origin, &lead, &trail));
    }
    None
}

/// Point where the segment `trail`..`lead` meets the circle.
fn clip_to_circle(trail: &Point, lead: &Point, center: &Point, radius: f64) -> Option<Point> {
    let line = LineEquation::through(trail, lead)?;
    line.circle_intersections(center, radius)
        .into_iter()
        .find(|p| segment_contains(trail, lead, p))
}

fn shadow_between(origin: &Point, lead: &Point, trail: &Point) -> BulletShadow {
    let a = origin.bearing_to(lead);
    let b = origin.bearing_to(trail);
    if turn_angle(a, b) >= 0.0 {
        BulletShadow { ccw: a, cw: b }
    } else {
        BulletShadow { ccw: b, cw: a }
    }
}
