//! Per-opponent shot and hit bookkeeping.
//!
//! Counts persist across rounds. Hits taken are also kept in a rolling
//! window that drives anti-gravity threat weights.

use std::collections::{BTreeMap, HashMap, VecDeque};

use duelist_core::physics::bullet_damage;
use duelist_tactics::antigravity::threat_weight;

/// Incoming hits remembered for threat weighting.
pub const THREAT_WINDOW: usize = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OpponentHits {
    pub shots_fired: u32,
    pub hits_landed: u32,
    pub hits_taken: u32,
    pub damage_dealt: f64,
    pub damage_taken: f64,
}

impl OpponentHits {
    /// Fraction of our shots at this opponent that landed.
    pub fn hit_ratio(&self) -> f64 {
        if self.shots_fired == 0 {
            0.0
        } else {
            self.hits_landed as f64 / self.shots_fired as f64
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HitStats {
    opponents: HashMap<String, OpponentHits>,
    recent_hits_taken: VecDeque<String>,
    virtual_hits: HashMap<String, u32>,
    rounds: u32,
}

impl HitStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start of a round. Counts survive; the threat window does not.
    pub fn begin_round(&mut self) {
        self.rounds += 1;
        self.recent_hits_taken.clear();
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn record_shot(&mut self, opponent: &str) {
        self.opponents.entry(opponent.to_string()).or_default().shots_fired += 1;
    }

    pub fn record_hit(&mut self, opponent: &str, power: f64) {
        let hits = self.opponents.entry(opponent.to_string()).or_default();
        hits.hits_landed += 1;
        hits.damage_dealt += bullet_damage(power);
    }

    pub fn record_hit_taken(&mut self, shooter: &str, power: f64) {
        let hits = self.opponents.entry(shooter.to_string()).or_default();
        hits.hits_taken += 1;
        hits.damage_taken += bullet_damage(power);
        if self.recent_hits_taken.len() >= THREAT_WINDOW {
            self.recent_hits_taken.pop_front();
        }
        self.recent_hits_taken.push_back(shooter.to_string());
    }

    /// A virtual projectile from `gun` would have hit.
    pub fn record_virtual_hit(&mut self, gun: &str) {
        *self.virtual_hits.entry(gun.to_string()).or_default() += 1;
    }

    pub fn virtual_hits(&self, gun: &str) -> u32 {
        self.virtual_hits.get(gun).copied().unwrap_or(0)
    }

    /// A dead opponent no longer threatens; drop it from the window.
    pub fn on_death(&mut self, opponent: &str) {
        self.recent_hits_taken.retain(|name| name != opponent);
    }

    pub fn opponent(&self, name: &str) -> OpponentHits {
        self.opponents.get(name).copied().unwrap_or_default()
    }

    /// Anti-gravity weight for `opponent` from its share of recent hits on us.
    pub fn threat_weight(&self, opponent: &str) -> f64 {
        let from = self
            .recent_hits_taken
            .iter()
            .filter(|name| name.as_str() == opponent)
            .count();
        threat_weight(from as u32, self.recent_hits_taken.len() as u32)
    }

    /// Flattened per-opponent summaries, sorted by name.
    pub fn summaries(&self) -> BTreeMap<String, String> {
        self.opponents
            .iter()
            .map(|(name, h)| {
                (
                    name.clone(),
                    format!(
                        "shots={} hits={} ratio={:.3} taken={} dealt={:.1} received={:.1}",
                        h.shots_fired,
                        h.hits_landed,
                        h.hit_ratio(),
                        h.hits_taken,
                        h.damage_dealt,
                        h.damage_taken
                    ),
                )
            })
            .collect()
    }

    /// Totals across every opponent plus virtual gun hits.
    pub fn common_summary(&self) -> String {
        let shots: u32 = self.opponents.values().map(|h| h.shots_fired).sum();
        let hits: u32 = self.opponents.values().map(|h| h.hits_landed).sum();
        let taken: u32 = self.opponents.values().map(|h| h.hits_taken).sum();
        let mut guns: Vec<_> = self.virtual_hits.iter().collect();
        guns.sort();
        let virtuals = guns
            .iter()
            .map(|(gun, n)| format!("{gun}:{n}"))
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "rounds={} shots={shots} hits={hits} taken={taken} virtual=[{virtuals}]",
            self.rounds
        )
    }
}
