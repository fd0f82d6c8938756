//! Owner of every active wave.
//!
//! Waves are created when we fire (real and virtual) or when an opponent
//! is inferred to have fired. Each tick `update` advances their lifecycle
//! against the defenders' current positions and emits `WaveEvent`s, which
//! are delivered to subscribed listeners in registration order and also
//! queued for `drain_events`.

use std::collections::HashMap;

use duelist_core::config::AgentConfig;
use duelist_core::constants::HALF_BODY_WIDTH;
use duelist_core::enums::{Liveness, WaveOwner, WaveState};
use duelist_core::events::{ObservedBullet, WaveEvent};
use duelist_core::physics::bullet_speed;
use duelist_core::snapshot::Snapshot;
use duelist_core::types::{Arena, Point};

use super::escape::{precise_escape_range, simple_escape_range};
use super::shadow::compute_shadow;
use super::wave::{EscapeRange, Wave, WaveBullet};
use crate::drive::{DrivePredictor, DriveRegion};
use crate::snapshot_store::SnapshotStore;

/// Callback invoked for every wave event.
pub type WaveListener = Box<dyn FnMut(&WaveEvent)>;

type EscapeKey = (String, String, u64);

pub struct WaveHistory {
    arena: Arena,
    predictor: DrivePredictor,
    precise_escape: bool,
    escape_samples: usize,
    match_speed_tolerance: f64,
    match_slack: f64,
    waves: Vec<Wave>,
    next_id: u32,
    escape_cache: HashMap<EscapeKey, EscapeRange>,
    cache_tick: Option<u64>,
    next_opponent_wave: Option<u32>,
    listeners: Vec<WaveListener>,
    pending: Vec<WaveEvent>,
}

impl WaveHistory {
    pub fn new(config: &AgentConfig, arena: Arena) -> Self {
        let region = DriveRegion::new(arena, config.drive_region_inset, config.wall_hard_limit);
        Self {
            arena,
            predictor: DrivePredictor::new(region),
            precise_escape: config.precise_escape_angles,
            escape_samples: config.escape_samples,
            match_speed_tolerance: config.match_speed_tolerance,
            match_slack: config.match_slack,
            waves: Vec::new(),
            next_id: 0,
            escape_cache: HashMap::new(),
            cache_tick: None,
            next_opponent_wave: None,
            listeners: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn predictor(&self) -> &DrivePredictor {
        &self.predictor
    }

    /// Register a listener. Listeners are called in registration order.
    pub fn subscribe(&mut self, listener: WaveListener) {
        self.listeners.push(listener);
    }

    /// Take all events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<WaveEvent> {
        std::mem::take(&mut self.pending)
    }

    fn emit(&mut self, event: WaveEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
        self.pending.push(event);
    }

    /// Drop every wave at the start of a round. Listeners stay registered.
    pub fn begin_round(&mut self) {
        self.waves.clear();
        self.escape_cache.clear();
        self.cache_tick = None;
        self.next_opponent_wave = None;
        self.pending.clear();
    }

    /// Build a wave fired by `attacker` at `defender`. Opponent waves have
    /// their power floored at the legal minimum. Returns the wave id.
    pub fn create(
        &mut self,
        defender: &Snapshot,
        attacker: &Snapshot,
        power: f64,
        fire_tick: u64,
        owner: WaveOwner,
    ) -> u32 {
        let id = self.next_id;
        self.next_id += 1;

        let mut wave = Wave::new(id, owner, defender, attacker, power, fire_tick);
        wave.escape = self.escape_range(&wave, defender);
        log::debug!(
            "wave {id} ({owner:?}) {} -> {} power {:.2} at tick {fire_tick}",
            wave.attacker,
            wave.defender,
            wave.power
        );
        self.waves.push(wave);

        if owner == WaveOwner::Opponent {
            let mine: Vec<u32> = self
                .waves
                .iter()
                .filter(|w| w.owner == WaveOwner::Mine && w.bullet.is_some())
                .map(|w| w.id)
                .collect();
            for mine_id in mine {
                self.add_shadow(mine_id, id, fire_tick);
            }
        }
        id
    }

    /// Escape range for a new wave, cached per (attacker, defender, power)
    /// for the current tick.
    fn escape_range(&mut self, wave: &Wave, defender: &Snapshot) -> EscapeRange {
        if !self.precise_escape {
            return simple_escape_range(wave.speed);
        }
        let key = (wave.attacker.clone(), wave.defender.clone(), wave.power.to_bits());
        if let Some(range) = self.escape_cache.get(&key) {
            return *range;
        }
        let range = precise_escape_range(&self.predictor, wave, defender, self.escape_samples);
        self.escape_cache.insert(key, range);
        range
    }

    /// Attach the projectile fired with one of our waves. Real projectiles
    /// cast shadows on every opponent wave still leading.
    pub fn attach_bullet(&mut self, id: u32, bullet: WaveBullet, tick: u64) {
        let Some(wave) = self.waves.iter_mut().find(|w| w.id == id) else {
            return;
        };
        wave.bullet = Some(bullet);
        if wave.owner != WaveOwner::Mine {
            return;
        }
        let theirs: Vec<u32> = self
            .waves
            .iter()
            .filter(|w| w.owner == WaveOwner::Opponent && w.state == WaveState::Leading)
            .map(|w| w.id)
            .collect();
        for their_id in theirs {
            self.add_shadow(id, their_id, tick);
        }
    }

    fn add_shadow(&mut self, mine_id: u32, their_id: u32, tick: u64) {
        let shadow = match (self.get(mine_id), self.get(their_id)) {
            (Some(mine), Some(theirs)) => compute_shadow(mine, theirs, &self.arena, tick),
            _ => None,
        };
        if let (Some(shadow), Some(theirs)) = (shadow, self.get_mut(their_id)) {
            theirs.shadows.push(shadow);
        }
    }

    pub fn get(&self, id: u32) -> Option<&Wave> {
        self.waves.iter().find(|w| w.id == id)
    }

    fn get_mut(&mut self, id: u32) -> Option<&mut Wave> {
        self.waves.iter_mut().find(|w| w.id == id)
    }

    pub fn waves(&self) -> impl Iterator<Item = &Wave> {
        self.waves.iter()
    }

    pub fn waves_of(&self, owner: WaveOwner) -> impl Iterator<Item = &Wave> {
        self.waves.iter().filter(move |w| w.owner == owner)
    }

    pub fn len(&self) -> usize {
        self.waves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    pub fn remove(&mut self, id: u32) -> Option<Wave> {
        let idx = self.waves.iter().position(|w| w.id == id)?;
        Some(self.waves.remove(idx))
    }

    /// Advance every wave to `tick` against defender positions from `store`.
    pub fn update(&mut self, tick: u64, store: &SnapshotStore) {
        if self.cache_tick != Some(tick) {
            self.escape_cache.clear();
            self.cache_tick = Some(tick);
        }

        let diagonal = self.arena.diagonal();
        let mut events = Vec::new();
        let mut orphaned = Vec::new();
        for wave in &mut self.waves {
            let defender = match store.liveness(&wave.defender) {
                Liveness::Dead => None,
                _ => store.at(&wave.defender, tick, true),
            };
            let Some(defender) = defender else {
                // Nobody left to track: drop the wave once it has crossed the arena.
                if wave.traveled(tick) > diagonal {
                    orphaned.push(wave.id);
                }
                continue;
            };

            if wave.owner == WaveOwner::Virtual && !wave.virtual_hit {
                if let Some(bullet) = wave.bullet_position(tick) {
                    if (bullet.x - defender.position.x).abs() <= HALF_BODY_WIDTH
                        && (bullet.y - defender.position.y).abs() <= HALF_BODY_WIDTH
                    {
                        wave.virtual_hit = true;
                        let gun = wave.bullet.as_ref().map(|b| b.gun.clone()).unwrap_or_default();
                        events.push(WaveEvent::VirtualBulletHit {
                            wave_id: wave.id,
                            gun,
                            tick,
                        });
                    }
                }
            }

            events.extend(wave.advance_lifecycle(&defender.position, tick));
        }

        self.waves.retain(|w| {
            if w.is_expired(diagonal, tick) || orphaned.contains(&w.id) {
                events.push(WaveEvent::Destroyed {
                    wave_id: w.id,
                    owner: w.owner,
                });
                false
            } else {
                true
            }
        });

        if let Some(me) = store.self_name().and_then(|name| store.latest(name)) {
            let next = self.soonest_opponent_wave(&me.position, tick).map(|w| w.id);
            if next != self.next_opponent_wave {
                self.next_opponent_wave = next;
                events.push(WaveEvent::NextOpponentWave { wave_id: next });
            }
        }

        for event in events {
            self.emit(event);
        }
    }

    /// Opponent wave that will reach `me` first, among those still leading.
    pub fn soonest_opponent_wave(&self, me: &Point, tick: u64) -> Option<&Wave> {
        self.leading_opponent_waves()
            .min_by_key(|w| (w.time_until_hit(me, tick), w.id))
    }

    /// The id last reported through `NextOpponentWave`.
    pub fn next_opponent_wave_id(&self) -> Option<u32> {
        self.next_opponent_wave
    }

    /// Leading opponent wave due to reach `me` right after wave `id`.
    pub fn opponent_wave_after(&self, id: u32, me: &Point, tick: u64) -> Option<&Wave> {
        let reference = self.get(id)?;
        let key = (reference.time_until_hit(me, tick), reference.id);
        self.leading_opponent_waves()
            .filter(|w| (w.time_until_hit(me, tick), w.id) > key)
            .min_by_key(|w| (w.time_until_hit(me, tick), w.id))
    }

    fn leading_opponent_waves(&self) -> impl Iterator<Item = &Wave> {
        self.waves
            .iter()
            .filter(|w| w.owner == WaveOwner::Opponent && w.state == WaveState::Leading)
    }

    /// Wave of `owner` that an observed projectile belongs to.
    ///
    /// Candidates fired by the projectile's owner with a speed within
    /// tolerance are compared by the distance between the projectile and
    /// the frontier point on the line from the wave origin through it. The
    /// closest is accepted if within `2 × speed` plus slack.
    pub fn match_bullet(&self, owner: WaveOwner, bullet: &ObservedBullet) -> Option<u32> {
        let speed = bullet_speed(bullet.power);
        let best = self
            .waves
            .iter()
            .filter(|w| w.owner == owner && w.attacker == bullet.owner)
            .filter(|w| (w.speed - speed).abs() < self.match_speed_tolerance)
            .map(|w| {
                let direction = w.origin.bearing_to(&bullet.position);
                let frontier = w.origin.project(direction, w.traveled(bullet.tick));
                (w, frontier.distance_to(&bullet.position))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));

        match best {
            Some((wave, distance)) if distance <= 2.0 * wave.speed + self.match_slack => Some(wave.id),
            Some((wave, distance)) => {
                log::warn!(
                    "bullet from {} at tick {} is {distance:.1} from nearest wave {}; ignoring",
                    bullet.owner,
                    bullet.tick,
                    wave.id
                );
                None
            }
            None => {
                log::warn!(
                    "no {owner:?} wave matches bullet from {} (power {:.2}) at tick {}",
                    bullet.owner,
                    bullet.power,
                    bullet.tick
                );
                None
            }
        }
    }

    /// A real projectile hit its target. Returns the matched wave.
    pub fn on_bullet_hit(&mut self, owner: WaveOwner, bullet: &ObservedBullet) -> Option<u32> {
        let id = self.match_bullet(owner, bullet)?;
        self.emit(WaveEvent::BulletMatched {
            wave_id: id,
            owner,
            hit: true,
        });
        Some(id)
    }

    /// One of our projectiles left the arena.
    pub fn on_bullet_missed(&mut self, bullet: &ObservedBullet) -> Option<u32> {
        let id = self.match_bullet(WaveOwner::Mine, bullet)?;
        self.emit(WaveEvent::BulletMatched {
            wave_id: id,
            owner: WaveOwner::Mine,
            hit: false,
        });
        Some(id)
    }

    /// Two projectiles collided: both matched waves are removed.
    pub fn on_bullet_hit_bullet(&mut self, mine: &ObservedBullet, theirs: &ObservedBullet) {
        for (owner, bullet) in [(WaveOwner::Mine, mine), (WaveOwner::Opponent, theirs)] {
            if let Some(id) = self.match_bullet(owner, bullet) {
                self.remove(id);
                self.emit(WaveEvent::BulletMatched {
                    wave_id: id,
                    owner,
                    hit: false,
                });
            }
        }
    }
}
