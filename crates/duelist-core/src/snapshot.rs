//! Immutable per-tick kinematic records and their extrapolation.

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_EXTRAPOLATION_TICKS, MAX_SPEED};
use crate::geometry::{normalize_heading, turn_angle};
use crate::types::Point;

/// One entity observed at one tick. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub name: String,
    pub position: Point,
    /// Heading in radians (0 = North, clockwise).
    pub heading: f64,
    /// Signed velocity; negative means driving in reverse.
    pub velocity: f64,
    /// Distance to self at observation time (0 for self).
    pub distance: f64,
    pub energy: f64,
    pub tick: u64,
}

impl Snapshot {
    pub fn new(
        name: impl Into<String>,
        position: Point,
        heading: f64,
        velocity: f64,
        distance: f64,
        energy: f64,
        tick: u64,
    ) -> Self {
        Self {
            name: name.into(),
            position,
            heading: normalize_heading(heading),
            velocity,
            distance,
            energy,
            tick,
        }
    }

    /// Build an opponent snapshot from a relative observation made by `observer`.
    /// `bearing` is relative to the observer's heading.
    #[allow(clippy::too_many_arguments)]
    pub fn from_observation(
        observer: &Snapshot,
        name: impl Into<String>,
        bearing: f64,
        distance: f64,
        heading: f64,
        velocity: f64,
        energy: f64,
        tick: u64,
    ) -> Self {
        let absolute = observer.heading + bearing;
        let position = observer.position.project(absolute, distance);
        Self::new(name, position, heading, velocity, distance, energy, tick)
    }

    /// Heading the body is actually travelling along (reversed when backing up).
    pub fn travel_heading(&self) -> f64 {
        if self.velocity < 0.0 {
            normalize_heading(self.heading + std::f64::consts::PI)
        } else {
            self.heading
        }
    }

    /// Displacement expected over the next tick.
    ///
    /// When `previous` is the snapshot from exactly one tick earlier, its
    /// velocity and heading deltas are carried forward; velocity is clamped to
    /// the arena maximum. A negative predicted velocity moves along the
    /// reversed heading.
    pub fn next_shift(&self, previous: Option<&Snapshot>) -> (f64, f64) {
        let (mut speed, mut heading) = (self.velocity, self.heading);
        if let Some(prev) = previous.filter(|p| p.tick + 1 == self.tick) {
            speed = (self.velocity + (self.velocity - prev.velocity)).clamp(-MAX_SPEED, MAX_SPEED);
            heading = self.heading + turn_angle(prev.heading, self.heading);
        }
        if speed < 0.0 {
            heading += std::f64::consts::PI;
            speed = -speed;
        }
        (speed * heading.sin(), speed * heading.cos())
    }

    /// The snapshot one tick later under constant velocity and constant turn
    /// rate. The heading delta observed against `previous` is applied to the
    /// new heading so repeated calls keep turning.
    pub fn advance(&self, previous: Option<&Snapshot>) -> Snapshot {
        let (dx, dy) = self.next_shift(previous);
        let turn = previous
            .filter(|p| p.tick + 1 == self.tick)
            .map_or(0.0, |p| turn_angle(p.heading, self.heading));
        Snapshot {
            name: self.name.clone(),
            position: Point::new(self.position.x + dx, self.position.y + dy),
            heading: normalize_heading(self.heading + turn),
            velocity: self.velocity,
            distance: self.distance,
            energy: self.energy,
            tick: self.tick + 1,
        }
    }

    /// Extrapolate forward to `tick`. Returns a clone when `tick` is not later
    /// and `None` when the gap exceeds [`MAX_EXTRAPOLATION_TICKS`].
    pub fn extrapolate_to(&self, previous: Option<&Snapshot>, tick: u64) -> Option<Snapshot> {
        if tick.saturating_sub(self.tick) > MAX_EXTRAPOLATION_TICKS {
            return None;
        }
        let mut prev = previous.cloned();
        let mut current = self.clone();
        while current.tick < tick {
            let next = current.advance(prev.as_ref());
            prev = Some(std::mem::replace(&mut current, next));
        }
        Some(current)
    }

    /// Copy with distance recomputed relative to `observer`.
    pub fn observed_from(&self, observer: &Point) -> Snapshot {
        Snapshot {
            distance: self.position.distance_to(observer),
            ..self.clone()
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.heading.is_finite()
            && self.velocity.is_finite()
            && self.energy.is_finite()
    }
}
