//! A single projectile wave: an expanding circular frontier centred on the
//! firing position.

use serde::{Deserialize, Serialize};

use duelist_core::constants::HALF_BODY_WIDTH;
use duelist_core::enums::{OrbitDirection, WaveOwner, WaveState};
use duelist_core::events::WaveEvent;
use duelist_core::geometry::{normalize_heading, turn_angle};
use duelist_core::physics::{bullet_speed, clamp_power, simple_escape_angle};
use duelist_core::snapshot::Snapshot;
use duelist_core::types::Point;

use crate::drive::orbit::orbit_direction;

/// Reachable angular offsets from the initial defender bearing.
/// `ccw` is non-positive, `cw` non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EscapeRange {
    pub ccw: f64,
    pub cw: f64,
}

impl EscapeRange {
    pub fn symmetric(angle: f64) -> Self {
        Self {
            ccw: -angle.abs(),
            cw: angle.abs(),
        }
    }

    pub fn width(&self) -> f64 {
        self.cw - self.ccw
    }

    pub fn contains(&self, offset: f64) -> bool {
        offset >= self.ccw && offset <= self.cw
    }
}

/// Angular interval of a wave occluded by another projectile. Bounds are
/// absolute bearings from the wave origin; `cw` lies clockwise of `ccw`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BulletShadow {
    pub ccw: f64,
    pub cw: f64,
}

impl BulletShadow {
    pub fn covers(&self, bearing: f64) -> bool {
        turn_angle(self.ccw, bearing) >= 0.0 && turn_angle(bearing, self.cw) >= 0.0
    }

    pub fn width(&self) -> f64 {
        turn_angle(self.ccw, self.cw)
    }

    /// Centre bearing of the shadow.
    pub fn centre(&self) -> f64 {
        normalize_heading(self.ccw + self.width() / 2.0)
    }
}

/// The real or virtual projectile travelling with one of our waves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveBullet {
    /// Absolute aim heading.
    pub aim: f64,
    /// Gun that produced the aim.
    pub gun: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wave {
    pub id: u32,
    pub owner: WaveOwner,
    pub attacker: String,
    pub defender: String,
    pub origin: Point,
    pub origin_tick: u64,
    /// Attacker-to-defender distance at fire time.
    pub origin_distance: f64,
    pub power: f64,
    pub speed: f64,
    /// Bearing from origin to defender at fire time.
    pub initial_defender_bearing: f64,
    pub orbit_direction: OrbitDirection,
    pub escape: EscapeRange,
    pub state: WaveState,
    pub shadows: Vec<BulletShadow>,
    pub bullet: Option<WaveBullet>,
    pub initial_attacker: Snapshot,
    pub initial_defender: Snapshot,
    /// Set once a virtual hit has been reported for this wave.
    pub virtual_hit: bool,
}

impl Wave {
    /// Wave fired by `attacker` at `defender` on `fire_tick`, with the
    /// closed-form escape range and no projectile attached.
    pub fn new(
        id: u32,
        owner: WaveOwner,
        defender: &Snapshot,
        attacker: &Snapshot,
        power: f64,
        fire_tick: u64,
    ) -> Self {
        let power = clamp_power(power);
        let speed = bullet_speed(power);
        let origin = attacker.position;
        Self {
            id,
            owner,
            attacker: attacker.name.clone(),
            defender: defender.name.clone(),
            origin,
            origin_tick: fire_tick,
            origin_distance: origin.distance_to(&defender.position),
            power,
            speed,
            initial_defender_bearing: origin.bearing_to(&defender.position),
            orbit_direction: orbit_direction(defender, attacker),
            escape: EscapeRange::symmetric(simple_escape_angle(speed)),
            state: WaveState::Leading,
            shadows: Vec::new(),
            bullet: None,
            initial_attacker: attacker.clone(),
            initial_defender: defender.clone(),
            virtual_hit: false,
        }
    }

    /// Radius of the frontier at `tick`. Negative before the fire tick.
    pub fn traveled(&self, tick: u64) -> f64 {
        (tick as f64 - self.origin_tick as f64) * self.speed
    }

    /// Distance the frontier still has to cover before touching a body
    /// centred at `point`.
    pub fn distance_until_hit(&self, point: &Point, tick: u64) -> f64 {
        self.origin.distance_to(point) - HALF_BODY_WIDTH - self.traveled(tick)
    }

    /// Ticks until the frontier touches the near edge of a body at `point`.
    pub fn time_until_hit(&self, point: &Point, tick: u64) -> i64 {
        (self.distance_until_hit(point, tick) / self.speed).round() as i64
    }

    /// Ticks until the frontier reaches `point` itself.
    pub fn time_until_matched(&self, point: &Point, tick: u64) -> i64 {
        ((self.origin.distance_to(point) - self.traveled(tick)) / self.speed).round() as i64
    }

    /// Ticks until the frontier clears the far edge of a body at `point`.
    pub fn time_until_passed(&self, point: &Point, tick: u64) -> i64 {
        ((self.origin.distance_to(point) + HALF_BODY_WIDTH - self.traveled(tick)) / self.speed)
            .round() as i64
    }

    /// Position of the wave's projectile at `tick`, for waves that carry one.
    pub fn bullet_position(&self, tick: u64) -> Option<Point> {
        let bullet = self.bullet.as_ref()?;
        Some(self.origin.project(bullet.aim, self.traveled(tick)))
    }

    /// Angular offset of `point` from the initial defender bearing.
    pub fn factor_angle(&self, point: &Point) -> f64 {
        turn_angle(self.initial_defender_bearing, self.origin.bearing_to(point))
    }

    /// Whether any recorded shadow covers the bearing from origin to `point`.
    pub fn shadowed(&self, point: &Point) -> bool {
        let bearing = self.origin.bearing_to(point);
        self.shadows.iter().any(|s| s.covers(bearing))
    }

    /// Move through every lifecycle state the frontier has reached at
    /// `tick` given the defender's current position, returning one event per
    /// transition in order. The state never moves backwards.
    pub fn advance_lifecycle(&mut self, defender: &Point, tick: u64) -> Vec<WaveEvent> {
        let traveled = self.traveled(tick);
        let distance = self.origin.distance_to(defender);
        let (wave_id, owner) = (self.id, self.owner);
        let mut events = Vec::new();
        if self.state == WaveState::Leading && traveled >= distance - HALF_BODY_WIDTH {
            self.state = WaveState::Hit;
            events.push(WaveEvent::Hit { wave_id, owner, tick });
        }
        if self.state == WaveState::Hit && traveled >= distance {
            self.state = WaveState::Passing;
            events.push(WaveEvent::Passing { wave_id, owner, tick });
        }
        if self.state == WaveState::Passing && traveled >= distance + HALF_BODY_WIDTH {
            self.state = WaveState::Passed;
            events.push(WaveEvent::Passed { wave_id, owner, tick });
        }
        events
    }

    /// Discard once passed and traveled beyond `diagonal`.
    pub fn is_expired(&self, diagonal: f64, tick: u64) -> bool {
        self.state == WaveState::Passed && self.traveled(tick) > diagonal
    }
}
