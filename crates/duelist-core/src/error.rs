//! Boundary error type. Geometric solvers never produce these; they
//! return `Option` instead.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AgentError {
    #[error("invalid observation of `{name}`: {reason}")]
    InvalidObservation { name: String, reason: &'static str },
    #[error("non-finite own state at tick {0}")]
    NonFiniteState(u64),
    #[error("tick {0} received before the round began")]
    RoundNotStarted(u64),
}

pub type AgentResult<T> = Result<T, AgentError>;
