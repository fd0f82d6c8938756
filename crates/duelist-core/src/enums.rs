//! Enumeration types used throughout the agent.

use serde::{Deserialize, Serialize};

/// Wave lifecycle. Ordered: a wave only ever moves to a later state.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum WaveState {
    /// Frontier has not yet reached the defender's near edge.
    #[default]
    Leading,
    /// Frontier is touching the near half of the defender's body.
    Hit,
    /// Frontier is crossing the far half of the defender's body.
    Passing,
    /// Frontier has fully cleared the defender.
    Passed,
}

/// Who fired the projectile a wave models.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaveOwner {
    /// A real projectile fired by this agent.
    #[default]
    Mine,
    /// A projectile this agent's non-firing guns would have fired.
    Virtual,
    /// A projectile inferred from an opponent's energy drop.
    Opponent,
}

/// Direction a defender orbits its attacker, seen from above.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrbitDirection {
    #[default]
    Clockwise,
    CounterClockwise,
}

impl OrbitDirection {
    /// +1 for clockwise, -1 for counter-clockwise.
    pub fn sign(self) -> f64 {
        match self {
            OrbitDirection::Clockwise => 1.0,
            OrbitDirection::CounterClockwise => -1.0,
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            OrbitDirection::Clockwise => OrbitDirection::CounterClockwise,
            OrbitDirection::CounterClockwise => OrbitDirection::Clockwise,
        }
    }
}

/// Whether a tracked entity is believed alive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Liveness {
    #[default]
    Unknown,
    Alive,
    Dead,
}

/// Which solver produced an aim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetingKind {
    HeadOn,
    Linear,
    Circular,
}

impl TargetingKind {
    pub fn label(self) -> &'static str {
        match self {
            TargetingKind::HeadOn => "head-on",
            TargetingKind::Linear => "linear",
            TargetingKind::Circular => "circular",
        }
    }
}
