//! Agent engine: the per-round context that drives one tick.
//!
//! `AgentEngine` owns the snapshot store, wave history, statistics and the
//! strategy chain. The host queues notifications as they arrive and calls
//! `tick` once per simulation tick with our own state; the engine records
//! that state, applies the queued notifications, advances the waves, runs
//! the active strategies and returns the commands. Any error raised inside
//! a tick is logged and abandons the round; later ticks return no commands
//! until the next `begin_round`.

use std::collections::{BTreeMap, VecDeque};

use duelist_core::commands::TickCommands;
use duelist_core::config::AgentConfig;
use duelist_core::constants::{COMMON_STATS_KEY, MAX_FIRE_POWER};
use duelist_core::enums::{Liveness, WaveOwner};
use duelist_core::error::{AgentError, AgentResult};
use duelist_core::events::{Notification, ScanObservation, SelfState, WaveEvent};
use duelist_core::snapshot::Snapshot;
use duelist_core::types::Arena;
use duelist_tactics::power::PowerSelector;
use duelist_tactics::scenarios::{self, ScenarioContext};

use crate::gun_watcher::GunWatcher;
use crate::hit_stats::HitStats;
use crate::snapshot_store::SnapshotStore;
use crate::strategies::{
    AntiGravityMovement, FocusSensor, ShotPlan, StrategyChain, StrategyTriple, TargetingGun,
    TickView, WaveSurfMovement,
};
use crate::targeting::detector::AimDetector;
use crate::targeting::{AimContext, CircularSolver};
use crate::waves::{WaveBullet, WaveHistory};

/// Standard chain: wave surfing in duels, heavy fire when ahead on
/// energy, and focus radar with anti-gravity and distance-scaled fire
/// otherwise.
pub fn default_chain(config: &AgentConfig) -> StrategyChain {
    let circular = CircularSolver::from_config(config);
    let mut chain = StrategyChain::new();
    chain
        .add(
            "duel",
            scenarios::duel,
            StrategyTriple::new().with_movement(Box::new(WaveSurfMovement::new(config))),
        )
        .add(
            "stronger",
            scenarios::stronger,
            StrategyTriple::new().with_weapon(Box::new(TargetingGun::with_default_solvers(
                "heavy",
                circular,
                PowerSelector::Fixed {
                    power: MAX_FIRE_POWER,
                },
            ))),
        )
        .add_default(
            StrategyTriple::new()
                .with_sensor(Box::new(FocusSensor::new()))
                .with_movement(Box::new(AntiGravityMovement::new(config)))
                .with_weapon(Box::new(TargetingGun::with_default_solvers(
                    "targeting",
                    circular,
                    PowerSelector::DistanceScaled {
                        base: config.base_power,
                    },
                ))),
        );
    chain
}

/// The agent. One instance lives for the whole battle; `begin_round`
/// resets per-round state.
pub struct AgentEngine {
    config: AgentConfig,
    arena: Arena,
    store: SnapshotStore,
    waves: WaveHistory,
    stats: HitStats,
    detector: AimDetector,
    gun_watcher: GunWatcher,
    chain: StrategyChain,
    notifications: VecDeque<Notification>,
    round: u32,
    round_active: bool,
    abandoned: bool,
}

impl AgentEngine {
    pub fn new(config: AgentConfig, arena: Arena) -> Self {
        let chain = default_chain(&config);
        Self::with_chain(config, arena, chain)
    }

    /// Engine with a caller-built strategy chain.
    pub fn with_chain(config: AgentConfig, arena: Arena, chain: StrategyChain) -> Self {
        Self {
            store: SnapshotStore::new(config.history_capacity),
            waves: WaveHistory::new(&config, arena),
            stats: HitStats::new(),
            detector: AimDetector::new(CircularSolver::from_config(&config)),
            gun_watcher: GunWatcher::new(),
            chain,
            notifications: VecDeque::new(),
            round: 0,
            round_active: false,
            abandoned: false,
            config,
            arena,
        }
    }

    /// Reset per-round state. Statistics and aim detection persist.
    pub fn begin_round(&mut self, round: u32) {
        self.round = round;
        self.round_active = true;
        self.abandoned = false;
        self.store.begin_round();
        self.waves.begin_round();
        self.stats.begin_round();
        self.gun_watcher.begin_round();
        self.notifications.clear();
        self.chain
            .for_each_mut(|s| s.begin_round(), |m| m.begin_round(), |w| w.begin_round());
        log::info!("round {round} begins");
    }

    /// Close the round and return the statistics map: one entry per
    /// opponent plus the common summary.
    pub fn end_round(&mut self) -> BTreeMap<String, String> {
        self.round_active = false;
        let mut summary = self.stats.summaries();
        for (name, line) in summary.iter_mut() {
            let scores = self.detector.scores(name);
            line.push_str(&format!(
                " aim={} samples={}",
                scores.likely().label(),
                scores.samples
            ));
        }
        summary.insert(COMMON_STATS_KEY.to_string(), self.stats.common_summary());
        log::info!("round {} ends", self.round);
        summary
    }

    /// Queue a notification for processing at the next tick boundary.
    pub fn queue_notification(&mut self, notification: Notification) {
        self.notifications.push_back(notification);
    }

    pub fn queue_notifications(&mut self, notifications: impl IntoIterator<Item = Notification>) {
        self.notifications.extend(notifications);
    }

    /// Run one tick. Never fails: an error abandons the round and yields
    /// an empty command set.
    pub fn tick(&mut self, state: &SelfState) -> TickCommands {
        if !self.round_active {
            if !self.abandoned {
                log::warn!("{}", AgentError::RoundNotStarted(state.tick));
            }
            self.notifications.clear();
            return TickCommands::default();
        }
        match self.run_tick(state) {
            Ok(commands) => commands,
            Err(err) => {
                log::error!("round {} abandoned at tick {}: {err}", self.round, state.tick);
                self.round_active = false;
                self.abandoned = true;
                self.notifications.clear();
                TickCommands::default()
            }
        }
    }

    pub fn is_round_active(&self) -> bool {
        self.round_active
    }

    /// Whether the current round was abandoned after a failed tick.
    pub fn is_abandoned(&self) -> bool {
        self.abandoned
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn waves(&self) -> &WaveHistory {
        &self.waves
    }

    /// Mutable access for subscribing wave listeners.
    pub fn waves_mut(&mut self) -> &mut WaveHistory {
        &mut self.waves
    }

    pub fn stats(&self) -> &HitStats {
        &self.stats
    }

    pub fn detector(&self) -> &AimDetector {
        &self.detector
    }

    fn run_tick(&mut self, state: &SelfState) -> AgentResult<TickCommands> {
        let tick = state.tick;
        if !state.position.is_finite() || !state.heading.is_finite() || !state.velocity.is_finite() {
            return Err(AgentError::NonFiniteState(tick));
        }
        if state.arena != self.arena {
            log::warn!("host arena {:?} differs from configured {:?}", state.arena, self.arena);
        }

        // 1. Own snapshot
        self.store.set_self_name(state.name.clone());
        let me = Snapshot::new(
            state.name.clone(),
            state.position,
            state.heading,
            state.velocity,
            0.0,
            state.energy,
            tick,
        );
        self.store.record(me.clone())?;

        // 2. Notifications
        while let Some(notification) = self.notifications.pop_front() {
            self.handle_notification(&me, notification);
        }

        // 3. Wave lifecycle
        self.waves.update(tick, &self.store);
        for event in self.waves.drain_events() {
            self.handle_wave_event(&event);
        }

        // 4. Strategy selection
        let scenario = ScenarioContext {
            tick,
            others: state.others,
            my_energy: state.energy,
            max_opponent_energy: self
                .store
                .alive_opponents()
                .into_iter()
                .filter_map(|name| self.store.latest(name))
                .map(|s| s.energy)
                .reduce(f64::max),
        };
        let slots = self.chain.resolve(&scenario);
        log::debug!("tick {tick}: slots {slots:?}");

        // 5. Strategies
        let view = TickView {
            state,
            me: &me,
            store: &self.store,
            waves: &self.waves,
            stats: &self.stats,
            detector: &self.detector,
            config: &self.config,
        };
        let mut commands = TickCommands::default();
        let mut target = None;
        if let Some(sensor) = self.chain.sensor_mut(slots.sensor) {
            let decision = sensor.sweep(&view);
            commands.sensor = Some(decision.command);
            target = decision.target;
        }
        if let Some(movement) = self.chain.movement_mut(slots.movement) {
            commands.drive = Some(movement.drive(&view));
        }
        let target = target.and_then(|name| self.store.latest(&name).cloned());
        let mut fired = None;
        if let (Some(weapon), Some(target)) = (self.chain.weapon_mut(slots.weapon), target.as_ref()) {
            let decision = weapon.engage(&view, target);
            commands.gun = Some(decision.command);
            fired = decision.shot;
        }

        // 6. Waves for our own shots
        if let (Some(shot), Some(target)) = (fired, target) {
            self.record_shot(&me, &target, shot, tick);
        }
        Ok(commands)
    }

    fn record_shot(&mut self, me: &Snapshot, target: &Snapshot, shot: ShotPlan, tick: u64) {
        let id = self.waves.create(target, me, shot.power, tick, WaveOwner::Mine);
        self.waves.attach_bullet(
            id,
            WaveBullet {
                aim: shot.aim,
                gun: shot.gun,
            },
            tick,
        );
        for (gun, aim) in shot.virtual_aims {
            let id = self.waves.create(target, me, shot.power, tick, WaveOwner::Virtual);
            self.waves.attach_bullet(id, WaveBullet { aim, gun }, tick);
        }
        self.stats.record_shot(&target.name);
    }

    fn handle_notification(&mut self, me: &Snapshot, notification: Notification) {
        match notification {
            Notification::Scanned(scan) => self.handle_scan(me, &scan),
            Notification::BulletHit {
                bullet,
                victim,
                victim_energy,
            } => {
                self.waves.on_bullet_hit(WaveOwner::Mine, &bullet);
                self.stats.record_hit(&victim, bullet.power);
                self.gun_watcher.on_bullet_hit(&victim, bullet.power);
                log::debug!("hit {victim} for power {:.2}; {victim_energy:.1} left", bullet.power);
            }
            Notification::HitByBullet { bullet } => {
                if let Some(id) = self.waves.on_bullet_hit(WaveOwner::Opponent, &bullet) {
                    if let Some(wave) = self.waves.get(id) {
                        let ctx = AimContext {
                            store: &self.store,
                            arena: &self.arena,
                        };
                        self.detector.record(wave, &bullet, &ctx);
                    }
                }
                self.stats.record_hit_taken(&bullet.owner, bullet.power);
                self.gun_watcher.on_hit_by_bullet(&bullet.owner, bullet.power);
            }
            Notification::BulletHitBullet { mine, theirs } => {
                self.waves.on_bullet_hit_bullet(&mine, &theirs);
            }
            Notification::BulletMissed { bullet } => {
                self.waves.on_bullet_missed(&bullet);
            }
            Notification::HitRobot { name, energy, .. } => {
                self.gun_watcher.on_hit_robot(&name, energy);
            }
            Notification::HitWall { tick } => {
                log::debug!("hit a wall at tick {tick}");
            }
            Notification::RobotDeath { name, tick } => {
                log::debug!("{name} destroyed at tick {tick}");
                self.store.mark_dead(&name);
                self.stats.on_death(&name);
                self.gun_watcher.forget(&name);
            }
        }
    }

    /// Record a scan and create an opponent wave if it reveals a shot.
    /// Scans the store rejects are dropped.
    fn handle_scan(&mut self, me: &Snapshot, scan: &ScanObservation) {
        let observed = Snapshot::from_observation(
            me,
            scan.name.clone(),
            scan.bearing,
            scan.distance,
            scan.heading,
            scan.velocity,
            scan.energy,
            scan.tick,
        );
        if self.store.liveness(&scan.name) == Liveness::Dead {
            log::warn!("scan of dead robot {} at tick {}; ignored", scan.name, scan.tick);
            return;
        }
        if let Err(err) = self.store.record(observed.clone()) {
            log::warn!("dropping scan: {err}");
            return;
        }

        let Some(shot) = self.gun_watcher.on_scan(&observed) else {
            return;
        };
        // Attacker as it was when firing; us as we were when it aimed.
        let attacker = self
            .store
            .at(&shot.opponent, shot.fire_tick, false)
            .unwrap_or_else(|| observed.clone());
        let defender = self
            .store
            .at(&me.name, shot.fire_tick.saturating_sub(1), false)
            .unwrap_or_else(|| me.clone());
        self.waves
            .create(&defender, &attacker, shot.power, shot.fire_tick, WaveOwner::Opponent);
    }

    fn handle_wave_event(&mut self, event: &WaveEvent) {
        if let WaveEvent::VirtualBulletHit { gun, .. } = event {
            self.stats.record_virtual_hit(gun);
        }
    }
}
