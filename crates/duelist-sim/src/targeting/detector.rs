//! Guessing which targeting method an opponent uses.
//!
//! When an opponent projectile is matched to its wave, each of our own
//! solvers is replayed from the opponent's point of view at fire time. A
//! solver is credited when its aim lies within the defender's angular
//! half-width of the projectile's actual heading. Projectiles seen inside
//! a bullet shadow are not credited.

use std::collections::HashMap;

use duelist_core::constants::HALF_BODY_WIDTH;
use duelist_core::enums::TargetingKind;
use duelist_core::events::ObservedBullet;
use duelist_core::geometry::turn_angle;

use super::{AimContext, CircularSolver, HeadOnSolver, LinearSolver, TargetingSolver};
use crate::waves::Wave;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindScores {
    pub head_on: u32,
    pub linear: u32,
    pub circular: u32,
    pub samples: u32,
}

impl KindScores {
    fn credit(&mut self, kind: TargetingKind) {
        match kind {
            TargetingKind::HeadOn => self.head_on += 1,
            TargetingKind::Linear => self.linear += 1,
            TargetingKind::Circular => self.circular += 1,
        }
    }

    /// Best-scoring kind; head-on on ties or with no data.
    pub fn likely(&self) -> TargetingKind {
        let mut best = (TargetingKind::HeadOn, self.head_on);
        for (kind, score) in [
            (TargetingKind::Linear, self.linear),
            (TargetingKind::Circular, self.circular),
        ] {
            if score > best.1 {
                best = (kind, score);
            }
        }
        best.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct AimDetector {
    circular: CircularSolver,
    scores: HashMap<String, KindScores>,
}

impl AimDetector {
    pub fn new(circular: CircularSolver) -> Self {
        Self {
            circular,
            scores: HashMap::new(),
        }
    }

    fn solvers(&self) -> [&dyn TargetingSolver; 3] {
        [&HeadOnSolver, &LinearSolver, &self.circular]
    }

    /// Score an opponent projectile against the wave it was matched to.
    /// Returns false when the projectile was not credited.
    pub fn record(&mut self, wave: &Wave, bullet: &ObservedBullet, ctx: &AimContext) -> bool {
        if wave.shadowed(&bullet.position) {
            log::debug!("wave {} projectile inside a bullet shadow; not credited", wave.id);
            return false;
        }
        let tolerance = (HALF_BODY_WIDTH / wave.origin_distance.max(HALF_BODY_WIDTH)).atan();
        let defender = &wave.initial_defender;
        let attacker = &wave.initial_attacker;
        let matched: Vec<TargetingKind> = self
            .solvers()
            .iter()
            .filter_map(|s| {
                let aim = s.aim(defender, attacker, wave, ctx)?;
                (turn_angle(aim, bullet.heading).abs() <= tolerance).then(|| s.kind())
            })
            .collect();

        let scores = self.scores.entry(wave.attacker.clone()).or_default();
        scores.samples += 1;
        for kind in &matched {
            scores.credit(*kind);
        }
        !matched.is_empty()
    }

    pub fn scores(&self, opponent: &str) -> KindScores {
        self.scores.get(opponent).copied().unwrap_or_default()
    }

    pub fn likely_kind(&self, opponent: &str) -> TargetingKind {
        self.scores(opponent).likely()
    }

    /// Factor angle on `wave` the opponent most likely aimed at. Falls back
    /// to head-on (zero) when the likely solver has no answer.
    pub fn predicted_factor_angle(&self, wave: &Wave, ctx: &AimContext) -> f64 {
        let kind = self.likely_kind(&wave.attacker);
        self.solvers()
            .iter()
            .find(|s| s.kind() == kind)
            .and_then(|s| s.aim(&wave.initial_defender, &wave.initial_attacker, wave, ctx))
            .map_or(0.0, |aim| turn_angle(wave.initial_defender_bearing, aim))
    }
}
