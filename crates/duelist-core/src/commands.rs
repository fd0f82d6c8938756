//! Commands issued to the host engine's actuators.
//!
//! One `TickCommands` is produced per tick; absent fields leave the
//! corresponding actuator untouched.

use serde::{Deserialize, Serialize};

use crate::geometry::{normalize_heading, turn_angle};

/// Desired movement: an absolute heading and a speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriveCommand {
    pub heading: f64,
    pub speed: f64,
}

impl DriveCommand {
    pub fn new(heading: f64, speed: f64) -> Self {
        Self {
            heading: normalize_heading(heading),
            speed,
        }
    }

    pub fn stop() -> Self {
        Self {
            heading: 0.0,
            speed: 0.0,
        }
    }

    /// Body turn and signed velocity needed from `current_heading`. Turns
    /// wider than 90° drive in reverse instead.
    pub fn resolve(&self, current_heading: f64) -> (f64, f64) {
        let turn = turn_angle(current_heading, self.heading);
        if turn.abs() > std::f64::consts::FRAC_PI_2 {
            let back = normalize_heading(current_heading + std::f64::consts::PI);
            (turn_angle(back, self.heading), -self.speed)
        } else {
            (turn, self.speed)
        }
    }
}

/// Gun rotation plus an optional shot at the given power.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GunCommand {
    pub turn: f64,
    pub fire_power: Option<f64>,
}

/// Radar rotation for this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorCommand {
    pub turn: f64,
}

/// Everything the agent wants the host to do this tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickCommands {
    pub drive: Option<DriveCommand>,
    pub gun: Option<GunCommand>,
    pub sensor: Option<SensorCommand>,
}

impl TickCommands {
    pub fn is_empty(&self) -> bool {
        self.drive.is_none() && self.gun.is_none() && self.sensor.is_none()
    }
}
