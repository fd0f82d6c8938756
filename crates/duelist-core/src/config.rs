//! Agent tuning, loadable from JSON.

use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Tuning for one agent. Arena physics are fixed constants, not configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Snapshots kept per entity; older ones are evicted.
    pub history_capacity: usize,
    /// Use kinematically simulated escape angles instead of the arcsine bound.
    pub precise_escape_angles: bool,
    /// Test headings per orbit direction for precise escape angles.
    pub escape_samples: usize,
    pub match_speed_tolerance: f64,
    pub match_slack: f64,
    pub circular_refinements: usize,
    pub circular_samples: usize,
    /// Minimum heading change (radians) for a turn center estimate.
    pub circular_min_heading_change: f64,
    pub circular_max_lookback: u64,
    pub drive_region_inset: f64,
    pub wall_hard_limit: f64,
    pub anti_gravity: AntiGravityConfig,
    /// Base power for distance-scaled fire power.
    pub base_power: f64,
    /// Energy never spent on firing.
    pub min_energy_to_fire: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            precise_escape_angles: true,
            escape_samples: DEFAULT_ESCAPE_SAMPLES,
            match_speed_tolerance: WAVE_MATCH_SPEED_TOLERANCE,
            match_slack: WAVE_MATCH_SLACK,
            circular_refinements: CIRCULAR_REFINEMENTS,
            circular_samples: CIRCULAR_SAMPLES,
            circular_min_heading_change: CIRCULAR_MIN_HEADING_CHANGE,
            circular_max_lookback: CIRCULAR_MAX_LOOKBACK,
            drive_region_inset: DRIVE_REGION_INSET,
            wall_hard_limit: WALL_HARD_LIMIT,
            anti_gravity: AntiGravityConfig::default(),
            base_power: DEFAULT_BASE_POWER,
            min_energy_to_fire: MIN_ENERGY_TO_FIRE,
        }
    }
}

impl AgentConfig {
    /// Parse a (possibly partial) JSON configuration; missing fields default.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Anti-gravity field tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AntiGravityConfig {
    pub repulse_factor: f64,
    /// Exponent applied to squared opponent distance.
    pub robot_falloff: f64,
    pub wall_divisor: f64,
    /// Exponent applied to raw wall distance.
    pub wall_falloff: f64,
    pub self_repulse_falloff: f64,
    pub self_repulse_cadence: u32,
    pub start_tick: u64,
    pub escape_tolerance: f64,
    pub escape_passes_per_opponent: u32,
}

impl Default for AntiGravityConfig {
    fn default() -> Self {
        Self {
            repulse_factor: REPULSE_FACTOR,
            robot_falloff: ROBOT_FALLOFF,
            wall_divisor: WALL_FORCE_DIVISOR,
            wall_falloff: WALL_FALLOFF,
            self_repulse_falloff: SELF_REPULSE_FALLOFF,
            self_repulse_cadence: SELF_REPULSE_CADENCE,
            start_tick: ANTI_GRAVITY_START_TICK,
            escape_tolerance: ESCAPE_TOLERANCE,
            escape_passes_per_opponent: ESCAPE_PASSES_PER_OPPONENT,
        }
    }
}
