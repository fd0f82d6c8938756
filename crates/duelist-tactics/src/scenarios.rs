//! Scenario predicates used to order strategy entries.

/// Facts a scenario predicate may inspect.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScenarioContext {
    pub tick: u64,
    /// Opponents still alive.
    pub others: usize,
    pub my_energy: f64,
    /// Highest energy among tracked opponents, if any are tracked.
    pub max_opponent_energy: Option<f64>,
}

/// Exactly one opponent remains.
pub fn duel(ctx: &ScenarioContext) -> bool {
    ctx.others == 1
}

/// We have at least as much energy as every tracked opponent.
pub fn stronger(ctx: &ScenarioContext) -> bool {
    ctx.max_opponent_energy.is_some_and(|max| ctx.my_energy >= max)
}

/// More than one opponent remains.
pub fn melee(ctx: &ScenarioContext) -> bool {
    ctx.others > 1
}

pub fn always(_: &ScenarioContext) -> bool {
    true
}
