//! Radar strategies.

use duelist_core::commands::SensorCommand;
use duelist_core::constants::RADAR_LOCK_TIMEOUT;
use duelist_tactics::radar::{focus_turn, spin_turn};

use super::{SensorDecision, SensorStrategy, TickView};

/// Continuous spin; engages whichever opponent is closest.
#[derive(Debug, Clone)]
pub struct SpinningSensor {
    clockwise: bool,
}

impl SpinningSensor {
    pub fn new(clockwise: bool) -> Self {
        Self { clockwise }
    }
}

impl Default for SpinningSensor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl SensorStrategy for SpinningSensor {
    fn name(&self) -> &str {
        "spinning"
    }

    fn sweep(&mut self, view: &TickView) -> SensorDecision {
        SensorDecision {
            command: SensorCommand {
                turn: spin_turn(self.clockwise),
            },
            target: view.nearest_opponent(None).map(|s| s.name.clone()),
        }
    }
}

/// Locks onto one opponent, sweeping just past its predicted bearing every
/// tick. Falls back to spinning while the lock is stale.
#[derive(Debug, Clone, Default)]
pub struct FocusSensor {
    locked: Option<String>,
}

impl FocusSensor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn locked(&self) -> Option<&str> {
        self.locked.as_deref()
    }
}

impl SensorStrategy for FocusSensor {
    fn name(&self) -> &str {
        "focus"
    }

    fn begin_round(&mut self) {
        self.locked = None;
    }

    fn sweep(&mut self, view: &TickView) -> SensorDecision {
        let tick = view.tick();
        let fresh = |name: &str| {
            view.store.alive_opponents().contains(&name)
                && view
                    .store
                    .latest(name)
                    .is_some_and(|s| tick.saturating_sub(s.tick) <= RADAR_LOCK_TIMEOUT)
        };

        let keep = self.locked.as_deref().is_some_and(|name| fresh(name));
        if !keep {
            let next = view
                .nearest_opponent(Some(RADAR_LOCK_TIMEOUT))
                .map(|s| s.name.clone());
            if next != self.locked {
                log::debug!("radar lock {:?} -> {:?}", self.locked, next);
            }
            self.locked = next;
        }

        let Some(predicted) = self
            .locked
            .as_deref()
            .and_then(|name| view.store.at(name, tick + 1, true))
        else {
            return SensorDecision {
                command: SensorCommand { turn: spin_turn(true) },
                target: None,
            };
        };

        let bearing = view.me.position.bearing_to(&predicted.position);
        SensorDecision {
            command: SensorCommand {
                turn: focus_turn(view.state.radar_heading, bearing),
            },
            target: self.locked.clone(),
        }
    }
}
