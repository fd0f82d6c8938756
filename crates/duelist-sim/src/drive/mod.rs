//! Kinematic drive prediction.
//!
//! Step-by-step simulation of a body under the arena's turn-rate and
//! acceleration limits, used to answer "where can I be when this wave
//! arrives" and "do I need to brake now".

pub mod options;
pub mod orbit;
pub mod predictor;
pub mod region;

pub use predictor::{advance, DrivePrediction, DrivePredictor, DriveState};
pub use region::DriveRegion;
