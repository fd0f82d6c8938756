//! Head-on targeting: aim straight at the target's current position.

use duelist_core::enums::TargetingKind;
use duelist_core::snapshot::Snapshot;

use super::{AimContext, TargetingSolver};
use crate::waves::Wave;

#[derive(Debug, Clone, Copy, Default)]
pub struct HeadOnSolver;

impl TargetingSolver for HeadOnSolver {
    fn kind(&self) -> TargetingKind {
        TargetingKind::HeadOn
    }

    fn can_aim(&self, _target: &Snapshot, _ctx: &AimContext) -> bool {
        true
    }

    fn aim(&self, target: &Snapshot, _me: &Snapshot, wave: &Wave, _ctx: &AimContext) -> Option<f64> {
        if wave.origin.distance_sq_to(&target.position) <= f64::EPSILON {
            return None;
        }
        Some(wave.origin.bearing_to(&target.position))
    }
}
