//! Inferring opponent shots from energy drops.
//!
//! Opponent projectiles are invisible until they hit something, so firing
//! is inferred: when the same opponent is scanned on consecutive scans and
//! its energy has dropped by a legal fire power, it is assumed to have
//! fired on the previous tick. Energy changes we can explain (our hits,
//! its hits on us, body collisions) are folded into the expected energy
//! before the comparison.

use std::collections::HashMap;

use duelist_core::constants::{DECELERATION, MAX_FIRE_POWER, MIN_FIRE_POWER};
use duelist_core::physics::{bullet_damage, energy_gain, gun_cool_ticks};
use duelist_core::snapshot::Snapshot;

/// Slack on the fire-power bounds for float noise in reported energies.
const POWER_EPSILON: f64 = 1e-6;

/// A shot the opponent is believed to have fired.
#[derive(Debug, Clone, PartialEq)]
pub struct InferredShot {
    pub opponent: String,
    pub power: f64,
    /// Tick the projectile left the gun (one before detection).
    pub fire_tick: u64,
}

#[derive(Debug, Clone, Default)]
struct OpponentGun {
    energy: f64,
    velocity: f64,
    tick: u64,
    last_power: f64,
    last_fire_tick: Option<u64>,
}

#[derive(Debug, Clone, Default)]
pub struct GunWatcher {
    opponents: HashMap<String, OpponentGun>,
    last_scanned: Option<String>,
}

impl GunWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_round(&mut self) {
        self.opponents.clear();
        self.last_scanned = None;
    }

    /// Feed a fresh opponent snapshot. Returns the inferred shot, if any.
    pub fn on_scan(&mut self, scan: &Snapshot) -> Option<InferredShot> {
        let consecutive = self.last_scanned.as_deref() == Some(scan.name.as_str());
        self.last_scanned = Some(scan.name.clone());

        let Some(gun) = self.opponents.get_mut(&scan.name) else {
            self.opponents.insert(
                scan.name.clone(),
                OpponentGun {
                    energy: scan.energy,
                    velocity: scan.velocity,
                    tick: scan.tick,
                    ..OpponentGun::default()
                },
            );
            return None;
        };

        let drop = gun.energy - scan.energy;
        let elapsed = scan.tick.saturating_sub(gun.tick).max(1);
        // Faster speed change than the brakes allow means a wall or body hit.
        let collided = (scan.velocity - gun.velocity).abs() / elapsed as f64 > DECELERATION + POWER_EPSILON;
        let fire_tick = scan.tick.saturating_sub(1);
        let cooled = gun.last_fire_tick.map_or(true, |last| {
            fire_tick.saturating_sub(last) >= gun_cool_ticks(gun.last_power)
        });

        gun.energy = scan.energy;
        gun.velocity = scan.velocity;
        gun.tick = scan.tick;

        if !consecutive || elapsed > 1 {
            return None;
        }
        let legal = drop >= MIN_FIRE_POWER - POWER_EPSILON && drop <= MAX_FIRE_POWER + POWER_EPSILON;
        if !legal || !(cooled || collided) {
            if drop > POWER_EPSILON {
                log::debug!("{} lost {drop:.2} energy without firing", scan.name);
            }
            return None;
        }

        // A collision drain can masquerade as a shot; reuse the last known power.
        let power = if collided && gun.last_power > 0.0 {
            gun.last_power
        } else {
            drop
        };
        gun.last_power = power;
        gun.last_fire_tick = Some(fire_tick);
        log::debug!("{} fired power {power:.2} at tick {fire_tick}", scan.name);
        Some(InferredShot {
            opponent: scan.name.clone(),
            power,
            fire_tick,
        })
    }

    /// Our projectile hit `victim`; its next energy drop is not a shot.
    pub fn on_bullet_hit(&mut self, victim: &str, power: f64) {
        if let Some(gun) = self.opponents.get_mut(victim) {
            gun.energy -= bullet_damage(power);
        }
    }

    /// `shooter` hit us and regained energy.
    pub fn on_hit_by_bullet(&mut self, shooter: &str, power: f64) {
        if let Some(gun) = self.opponents.get_mut(shooter) {
            gun.energy += energy_gain(power);
        }
    }

    /// Body collision: the host reports the opponent's energy afterwards.
    pub fn on_hit_robot(&mut self, name: &str, energy: f64) {
        if let Some(gun) = self.opponents.get_mut(name) {
            gun.energy = energy;
        }
    }

    pub fn forget(&mut self, name: &str) {
        self.opponents.remove(name);
        if self.last_scanned.as_deref() == Some(name) {
            self.last_scanned = None;
        }
    }
}
