//! Targeting solvers.
//!
//! Every solver answers the same two questions for a target snapshot: can
//! it aim at all (`can_aim`), and along which absolute heading a projectile
//! leaving `wave`'s origin at `wave`'s speed meets the target (`aim`). "No
//! solution" is `None`, never NaN.

pub mod circular;
pub mod detector;
pub mod head_on;
pub mod linear;

use duelist_core::enums::TargetingKind;
use duelist_core::snapshot::Snapshot;
use duelist_core::types::Arena;

use crate::snapshot_store::SnapshotStore;
use crate::waves::Wave;

pub use circular::CircularSolver;
pub use head_on::HeadOnSolver;
pub use linear::LinearSolver;

/// Read-only state a solver may consult.
#[derive(Clone, Copy)]
pub struct AimContext<'a> {
    pub store: &'a SnapshotStore,
    pub arena: &'a Arena,
}

pub trait TargetingSolver {
    fn kind(&self) -> TargetingKind;

    /// Cheap applicability check.
    fn can_aim(&self, target: &Snapshot, ctx: &AimContext) -> bool;

    /// Absolute aim heading from the wave origin, or `None`.
    fn aim(&self, target: &Snapshot, me: &Snapshot, wave: &Wave, ctx: &AimContext) -> Option<f64>;
}

/// Target as it is expected to be at the wave's fire tick. `None` when the
/// snapshot is too old to extrapolate.
pub(crate) fn target_at_fire_tick(target: &Snapshot, wave: &Wave, store: &SnapshotStore) -> Option<Snapshot> {
    if target.tick >= wave.origin_tick {
        return Some(target.clone());
    }
    let previous = store.previous(&target.name, target.tick);
    target.extrapolate_to(previous, wave.origin_tick)
}
