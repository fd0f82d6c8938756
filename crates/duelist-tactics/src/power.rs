//! Fire power selection.

use serde::{Deserialize, Serialize};

use duelist_core::constants::*;
use duelist_core::physics::{clamp_power, power_to_kill};

/// How a weapon picks its fire power before energy adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PowerSelector {
    /// Always the same power.
    Fixed { power: f64 },
    /// Heavier shots up close and in crowded arenas.
    DistanceScaled { base: f64 },
}

impl Default for PowerSelector {
    fn default() -> Self {
        PowerSelector::DistanceScaled {
            base: DEFAULT_BASE_POWER,
        }
    }
}

/// Facts needed to settle on a fire power.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerRequest {
    pub distance: f64,
    pub others: usize,
    pub my_energy: f64,
    pub target_energy: f64,
    pub min_energy_to_fire: f64,
}

impl PowerSelector {
    /// Power before any energy-based adjustment.
    pub fn requested(&self, distance: f64, others: usize) -> f64 {
        match *self {
            PowerSelector::Fixed { power } => power,
            PowerSelector::DistanceScaled { base } => {
                let d2 = (distance * distance).max(1.0);
                (base * POWER_REFERENCE_DISTANCE_SQ / d2 * (9.0 + others as f64) / 10.0)
                    .min(MAX_FIRE_POWER)
            }
        }
    }

    /// Final power, capped by spare energy and by what the target needs to
    /// die. `None` when the shot is not worth firing.
    pub fn fire_power(&self, req: &PowerRequest) -> Option<f64> {
        let spare = (req.my_energy - req.min_energy_to_fire) * LOW_ENERGY_CONSERVATION_RATE;
        let power = self
            .requested(req.distance, req.others)
            .min(spare)
            .min(power_to_kill(req.target_energy));
        if power > MIN_USEFUL_POWER && power < req.my_energy {
            Some(clamp_power(power))
        } else {
            None
        }
    }
}
