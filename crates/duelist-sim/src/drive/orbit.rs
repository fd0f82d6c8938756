//! Orbit direction of a defender relative to its attacker.

use duelist_core::enums::OrbitDirection;
use duelist_core::geometry::turn_angle;
use duelist_core::snapshot::Snapshot;

/// Direction `defender` is circling `attacker`. A defender heading
/// clockwise of the line to the attacker orbits counter-clockwise.
pub fn orbit_direction(defender: &Snapshot, attacker: &Snapshot) -> OrbitDirection {
    let to_center = defender.position.bearing_to(&attacker.position);
    let offset = turn_angle(to_center, defender.travel_heading());
    if offset >= 0.0 {
        OrbitDirection::CounterClockwise
    } else {
        OrbitDirection::Clockwise
    }
}
