//! Wave engine: projectile frontiers, their lifecycle, matching of real
//! projectiles to waves, bullet shadows and escape angles.

pub mod escape;
pub mod history;
pub mod shadow;
pub mod wave;

pub use history::{WaveHistory, WaveListener};
pub use wave::{BulletShadow, EscapeRange, Wave, WaveBullet};
