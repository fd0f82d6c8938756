//! Notifications exchanged with the host engine and emitted by the wave engine.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{Arena, Point};

/// Own state reported by the host at the start of every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfState {
    pub name: String,
    pub position: Point,
    pub heading: f64,
    pub velocity: f64,
    pub energy: f64,
    pub gun_heat: f64,
    pub gun_heading: f64,
    pub radar_heading: f64,
    pub tick: u64,
    pub arena: Arena,
    /// Opponents still alive according to the host.
    pub others: usize,
}

/// A single sensor contact. `bearing` is relative to own heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanObservation {
    pub name: String,
    pub bearing: f64,
    pub distance: f64,
    pub heading: f64,
    pub velocity: f64,
    pub energy: f64,
    pub tick: u64,
}

/// A real projectile as reported by the host when it hit or vanished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedBullet {
    pub owner: String,
    pub position: Point,
    pub heading: f64,
    pub power: f64,
    pub tick: u64,
}

/// Inbound notifications from the host engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Notification {
    /// An opponent was scanned.
    Scanned(ScanObservation),
    /// One of our projectiles hit an opponent.
    BulletHit {
        bullet: ObservedBullet,
        victim: String,
        victim_energy: f64,
    },
    /// An opponent projectile hit us.
    HitByBullet { bullet: ObservedBullet },
    /// Two projectiles collided in flight.
    BulletHitBullet {
        mine: ObservedBullet,
        theirs: ObservedBullet,
    },
    /// One of our projectiles left the arena.
    BulletMissed { bullet: ObservedBullet },
    /// Body collision with another robot.
    HitRobot {
        name: String,
        energy: f64,
        tick: u64,
    },
    /// Body collision with a wall.
    HitWall { tick: u64 },
    /// A robot was destroyed.
    RobotDeath { name: String, tick: u64 },
}

/// Wave lifecycle and matching notifications, delivered in emission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WaveEvent {
    /// Frontier reached the defender (LEADING → HIT).
    Hit {
        wave_id: u32,
        owner: WaveOwner,
        tick: u64,
    },
    /// Frontier crossing the defender's centre (HIT → PASSING).
    Passing {
        wave_id: u32,
        owner: WaveOwner,
        tick: u64,
    },
    /// Frontier cleared the defender (PASSING → PASSED).
    Passed {
        wave_id: u32,
        owner: WaveOwner,
        tick: u64,
    },
    /// Wave traveled past the arena diagonal and was discarded.
    Destroyed { wave_id: u32, owner: WaveOwner },
    /// A virtual projectile would have struck the defender.
    VirtualBulletHit {
        wave_id: u32,
        gun: String,
        tick: u64,
    },
    /// A real projectile notification was matched to its wave.
    BulletMatched {
        wave_id: u32,
        owner: WaveOwner,
        hit: bool,
    },
    /// The soonest opponent wave to reach us changed.
    NextOpponentWave { wave_id: Option<u32> },
}
