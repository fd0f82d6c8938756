//! Tracking and prediction for the duelist agent.
//!
//! Owns the stateful parts: the snapshot store, the wave engine, the
//! targeting solvers, the kinematic drive predictor, opponent-fire
//! inference, hit statistics and the concrete strategies, all driven once
//! per tick by `AgentEngine`.

pub mod drive;
pub mod engine;
pub mod gun_watcher;
pub mod hit_stats;
pub mod snapshot_store;
pub mod strategies;
pub mod targeting;
pub mod waves;

pub use duelist_core as core;
pub use engine::AgentEngine;

#[cfg(test)]
mod tests;
