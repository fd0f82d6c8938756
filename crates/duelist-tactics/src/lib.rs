//! Decision logic for the duelist agent.
//!
//! Pure functions and small state machines over plain data: the
//! anti-gravity field, the strategy selector, scenario predicates,
//! fire-power selection and radar sweep planning. No dependency on the
//! tracking state itself; callers hand in the values they need.

pub mod antigravity;
pub mod power;
pub mod radar;
pub mod scenarios;
pub mod selector;

pub use duelist_core as core;
