//! Weapon strategies.
//!
//! A `TargetingGun` pairs an ordered list of targeting solvers with a
//! power selector. One tick before the gun is cool it aims with the first
//! solver that has a solution and schedules the shot; on the scheduled
//! tick it fires if the gun is cool and roughly on target. The other
//! solvers' aims ride along as virtual waves so their accuracy can be
//! compared.

use duelist_core::commands::GunCommand;
use duelist_core::constants::{GUN_COOLING_RATE, HALF_BODY_WIDTH};
use duelist_core::enums::WaveOwner;
use duelist_core::geometry::turn_angle;
use duelist_core::snapshot::Snapshot;
use duelist_tactics::power::{PowerRequest, PowerSelector};

use super::{ShotPlan, TickView, WeaponDecision, WeaponStrategy};
use crate::targeting::{CircularSolver, HeadOnSolver, LinearSolver, TargetingSolver};
use crate::waves::Wave;

#[derive(Debug, Clone, PartialEq)]
struct PendingShot {
    tick: u64,
    aim: f64,
    power: f64,
    gun: String,
    virtual_aims: Vec<(String, f64)>,
}

pub struct TargetingGun {
    name: String,
    solvers: Vec<Box<dyn TargetingSolver>>,
    power: PowerSelector,
    pending: Option<PendingShot>,
}

impl TargetingGun {
    pub fn new(name: impl Into<String>, solvers: Vec<Box<dyn TargetingSolver>>, power: PowerSelector) -> Self {
        Self {
            name: name.into(),
            solvers,
            power,
            pending: None,
        }
    }

    /// Circular, then linear, then head-on.
    pub fn with_default_solvers(name: impl Into<String>, circular: CircularSolver, power: PowerSelector) -> Self {
        Self::new(
            name,
            vec![Box::new(circular), Box::new(LinearSolver), Box::new(HeadOnSolver)],
            power,
        )
    }

    fn plan(&self, view: &TickView, target: &Snapshot) -> Option<PendingShot> {
        let power = self.power.fire_power(&PowerRequest {
            distance: view.me.position.distance_to(&target.position),
            others: view.state.others,
            my_energy: view.state.energy,
            target_energy: target.energy,
            min_energy_to_fire: view.config.min_energy_to_fire,
        })?;

        let fire_tick = view.tick() + 1;
        let previous = view.store.previous(&view.me.name, view.me.tick);
        let shooter = view.me.advance(previous);
        let trial = Wave::new(u32::MAX, WaveOwner::Mine, target, &shooter, power, fire_tick);
        let ctx = view.aim_context();

        let mut chosen: Option<(String, f64)> = None;
        let mut virtual_aims = Vec::new();
        for solver in &self.solvers {
            if !solver.can_aim(target, &ctx) {
                continue;
            }
            let Some(aim) = solver.aim(target, &shooter, &trial, &ctx) else {
                continue;
            };
            let label = solver.kind().label().to_string();
            if chosen.is_none() {
                chosen = Some((label, aim));
            } else {
                virtual_aims.push((label, aim));
            }
        }
        let (gun, aim) = chosen?;
        Some(PendingShot {
            tick: fire_tick,
            aim,
            power,
            gun,
            virtual_aims,
        })
    }
}

impl WeaponStrategy for TargetingGun {
    fn name(&self) -> &str {
        &self.name
    }

    fn begin_round(&mut self) {
        self.pending = None;
    }

    fn engage(&mut self, view: &TickView, target: &Snapshot) -> WeaponDecision {
        let state = view.state;
        let tick = view.tick();
        let mut shot = None;

        if let Some(pending) = self.pending.take() {
            let distance = view.me.position.distance_to(&target.position).max(HALF_BODY_WIDTH);
            let tolerance = (HALF_BODY_WIDTH / distance).atan();
            let on_target = turn_angle(state.gun_heading, pending.aim).abs() <= tolerance;
            if pending.tick == tick && state.gun_heat <= 0.0 && on_target {
                shot = Some(ShotPlan {
                    gun: pending.gun,
                    aim: pending.aim,
                    power: pending.power,
                    virtual_aims: pending.virtual_aims,
                });
            } else if pending.tick == tick {
                log::debug!("{}: scheduled shot at tick {tick} dropped", self.name);
            }
        }

        // Cool by the next tick: aim now, fire then.
        let heat_next_tick = state.gun_heat - GUN_COOLING_RATE;
        if shot.is_none() && heat_next_tick <= 0.0 {
            self.pending = self.plan(view, target);
        }

        let aim = match &self.pending {
            Some(pending) => pending.aim,
            None => view.me.position.bearing_to(&target.position),
        };
        WeaponDecision {
            command: GunCommand {
                turn: turn_angle(state.gun_heading, aim),
                fire_power: shot.as_ref().map(|s| s.power),
            },
            shot,
        }
    }
}
