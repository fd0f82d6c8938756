//! Concrete sensor, movement and weapon strategies.
//!
//! Each slot is a small capability trait. Strategies read the tick's
//! tracking state through a borrowed `TickView` and return commands; any
//! state they keep is their own.

pub mod movement;
pub mod sensors;
pub mod weapons;

use duelist_core::commands::{DriveCommand, GunCommand, SensorCommand};
use duelist_core::config::AgentConfig;
use duelist_core::events::SelfState;
use duelist_core::snapshot::Snapshot;
use duelist_tactics::scenarios::ScenarioContext;
use duelist_tactics::selector::{ComponentChain, StrategySet};

use crate::hit_stats::HitStats;
use crate::snapshot_store::SnapshotStore;
use crate::targeting::detector::AimDetector;
use crate::targeting::AimContext;
use crate::waves::WaveHistory;

pub use movement::{AntiGravityMovement, WaveSurfMovement};
pub use sensors::{FocusSensor, SpinningSensor};
pub use weapons::TargetingGun;

/// Immutable view of the tracking state for one tick.
pub struct TickView<'a> {
    pub state: &'a SelfState,
    /// Our own snapshot for this tick.
    pub me: &'a Snapshot,
    pub store: &'a SnapshotStore,
    pub waves: &'a WaveHistory,
    pub stats: &'a HitStats,
    pub detector: &'a AimDetector,
    pub config: &'a AgentConfig,
}

impl<'a> TickView<'a> {
    pub fn tick(&self) -> u64 {
        self.state.tick
    }

    pub fn aim_context(&self) -> AimContext<'a> {
        AimContext {
            store: self.store,
            arena: &self.state.arena,
        }
    }

    /// Latest snapshot of the closest alive opponent, ignoring contacts
    /// older than `max_age` ticks when given.
    pub fn nearest_opponent(&self, max_age: Option<u64>) -> Option<&'a Snapshot> {
        let tick = self.tick();
        self.store
            .alive_opponents()
            .into_iter()
            .filter_map(|name| self.store.latest(name))
            .filter(|s| max_age.map_or(true, |age| tick.saturating_sub(s.tick) <= age))
            .min_by(|a, b| {
                let da = self.me.position.distance_sq_to(&a.position);
                let db = self.me.position.distance_sq_to(&b.position);
                da.total_cmp(&db)
            })
    }
}

/// Sensor sweep plus the opponent chosen for engagement.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorDecision {
    pub command: SensorCommand,
    pub target: Option<String>,
}

/// A shot the weapon fires this tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ShotPlan {
    pub gun: String,
    pub aim: f64,
    pub power: f64,
    /// Aims of the non-firing solvers, tracked as virtual waves.
    pub virtual_aims: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeaponDecision {
    pub command: GunCommand,
    pub shot: Option<ShotPlan>,
}

pub trait SensorStrategy {
    fn name(&self) -> &str;

    fn begin_round(&mut self) {}

    fn sweep(&mut self, view: &TickView) -> SensorDecision;
}

pub trait MovementStrategy {
    fn name(&self) -> &str;

    fn begin_round(&mut self) {}

    fn drive(&mut self, view: &TickView) -> DriveCommand;
}

pub trait WeaponStrategy {
    fn name(&self) -> &str;

    fn begin_round(&mut self) {}

    fn engage(&mut self, view: &TickView, target: &Snapshot) -> WeaponDecision;
}

/// Strategy chain as driven by the agent engine.
pub type StrategyChain = ComponentChain<
    ScenarioContext,
    Box<dyn SensorStrategy>,
    Box<dyn MovementStrategy>,
    Box<dyn WeaponStrategy>,
>;

/// One entry's worth of strategies.
pub type StrategyTriple =
    StrategySet<Box<dyn SensorStrategy>, Box<dyn MovementStrategy>, Box<dyn WeaponStrategy>>;
