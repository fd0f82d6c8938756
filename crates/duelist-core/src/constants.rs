//! Arena physics constants and tuning parameters.

use std::f64::consts::PI;

// --- Arena ---

/// Default arena width.
pub const DEFAULT_ARENA_WIDTH: f64 = 800.0;

/// Default arena height.
pub const DEFAULT_ARENA_HEIGHT: f64 = 600.0;

/// Half the width of a robot body. Bodies are treated as squares.
pub const HALF_BODY_WIDTH: f64 = 18.0;

/// Full width of a robot body.
pub const BODY_WIDTH: f64 = 2.0 * HALF_BODY_WIDTH;

// --- Movement ---

/// Maximum absolute velocity (units per tick).
pub const MAX_SPEED: f64 = 8.0;

/// Velocity gained per tick when speeding up.
pub const ACCELERATION: f64 = 1.0;

/// Velocity shed per tick when slowing down.
pub const DECELERATION: f64 = 2.0;

/// Turn rate at zero velocity (radians per tick, 10°).
pub const BASE_TURN_RATE: f64 = 10.0 * PI / 180.0;

/// Turn rate lost per unit of absolute velocity (radians per tick, 0.75°).
pub const TURN_RATE_PER_SPEED: f64 = 0.75 * PI / 180.0;

// --- Weapons ---

/// Smallest legal fire power.
pub const MIN_FIRE_POWER: f64 = 0.1;

/// Largest legal fire power.
pub const MAX_FIRE_POWER: f64 = 3.0;

/// Projectile speed at zero power.
pub const BULLET_BASE_SPEED: f64 = 20.0;

/// Projectile speed lost per unit of power.
pub const BULLET_SPEED_PER_POWER: f64 = 3.0;

/// Gun heat dissipated per tick.
pub const GUN_COOLING_RATE: f64 = 0.1;

/// Gun heat at the start of a round.
pub const INITIAL_GUN_HEAT: f64 = 3.0;

// --- Radar ---

/// Maximum radar rotation per tick (radians, 45°).
pub const RADAR_MAX_TURN_RATE: f64 = 45.0 * PI / 180.0;

/// Total arc swept around a focused target (radians, 36°).
pub const RADAR_FOCUS_SWEEP: f64 = 36.0 * PI / 180.0;

/// Ticks without a scan after which a focus lock is abandoned.
pub const RADAR_LOCK_TIMEOUT: u64 = 3;

// --- Tracking ---

/// Default number of snapshots kept per entity.
pub const DEFAULT_HISTORY_CAPACITY: usize = 40;

/// Default escape-angle test headings per orbit direction.
pub const DEFAULT_ESCAPE_SAMPLES: usize = 30;

/// Largest gap (ticks) a snapshot is extrapolated across. Beyond it the
/// entity's position is treated as unknown.
pub const MAX_EXTRAPOLATION_TICKS: u64 = 30;

/// Projectile speed tolerance when matching an observed bullet to a wave.
pub const WAVE_MATCH_SPEED_TOLERANCE: f64 = 0.05;

/// Extra slack on the `2 × speed` positional acceptance when matching.
pub const WAVE_MATCH_SLACK: f64 = 0.1;

/// Reserved statistics key for data shared across opponents.
pub const COMMON_STATS_KEY: &str = "common";

// --- Targeting ---

/// Refinement passes of the circular intercept search.
pub const CIRCULAR_REFINEMENTS: usize = 2;

/// Candidate distances sampled per circular refinement pass.
pub const CIRCULAR_SAMPLES: usize = 6;

/// Minimum heading change (radians, 4°) between two snapshots for a turn
/// center to be estimated.
pub const CIRCULAR_MIN_HEADING_CHANGE: f64 = 4.0 * PI / 180.0;

/// Oldest history offset (ticks) searched for a turning snapshot.
pub const CIRCULAR_MAX_LOOKBACK: u64 = 30;

/// Relative tolerance used when the two center estimates are compared.
pub const CIRCULAR_CENTER_TOLERANCE: f64 = 0.1;

// --- Drive ---

/// Inset of the drive region from each wall.
pub const DRIVE_REGION_INSET: f64 = HALF_BODY_WIDTH;

/// Distance from a wall that must never be crossed while probing a stop.
pub const WALL_HARD_LIMIT: f64 = HALF_BODY_WIDTH - 3.0;

/// Ticks simulated at full speed when outside the drive region.
pub const STOP_LOOKAHEAD_TICKS: u32 = 12;

/// The stop lookahead only checks its position every this many ticks.
pub const STOP_LOOKAHEAD_STRIDE: u32 = 4;

/// Upper bound on simulated ticks in any single drive prediction.
pub const MAX_PREDICTION_TICKS: u32 = 500;

// --- Anti-gravity ---

/// Overall force scale.
pub const REPULSE_FACTOR: f64 = 100_000.0;

/// Exponent applied to squared opponent distance.
pub const ROBOT_FALLOFF: f64 = 1.5;

/// Exponent applied to raw wall distance (inverse cube).
pub const WALL_FALLOFF: f64 = 3.0;

/// Divisor applied to the repulse factor for wall forces.
pub const WALL_FORCE_DIVISOR: f64 = 6.0;

/// Exponent applied to squared distance from the self-repulsion anchor.
pub const SELF_REPULSE_FALLOFF: f64 = 2.0;

/// Ticks between renewals of the self-repulsion anchor.
pub const SELF_REPULSE_CADENCE: u32 = 5;

/// Anti-gravity is inactive before this tick.
pub const ANTI_GRAVITY_START_TICK: u64 = 10;

/// Minimum angular clearance (radians, 15°) between the chosen heading and
/// any opponent bearing.
pub const ESCAPE_TOLERANCE: f64 = 15.0 * PI / 180.0;

/// Escape adjustment passes allowed per tracked opponent.
pub const ESCAPE_PASSES_PER_OPPONENT: u32 = 24;

/// Threat weight bounds applied to normalized hit fractions.
pub const MIN_THREAT_WEIGHT: f64 = 0.25;
pub const MAX_THREAT_WEIGHT: f64 = 1.0;

// --- Fire power ---

/// Default base power for the distance-scaled selector.
pub const DEFAULT_BASE_POWER: f64 = 1.9;

/// Reference squared distance for distance-scaled power (300²).
pub const POWER_REFERENCE_DISTANCE_SQ: f64 = 90_000.0;

/// Energy never spent on firing.
pub const MIN_ENERGY_TO_FIRE: f64 = 0.5;

/// Fraction of spare energy a single shot may use.
pub const LOW_ENERGY_CONSERVATION_RATE: f64 = 1.0;

/// Requested powers at or below this are not fired.
pub const MIN_USEFUL_POWER: f64 = 0.09;
