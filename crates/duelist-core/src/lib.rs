//! Core types and definitions for the duelist agent.
//!
//! This crate defines the vocabulary shared across all other crates:
//! geometry, arena physics, snapshots, observations, commands, events,
//! configuration and constants. It holds no runtime state.

pub mod commands;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod geometry;
pub mod physics;
pub mod snapshot;
pub mod types;
