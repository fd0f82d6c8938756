//! Fixed arena physics: projectile speeds, turn rates, damage and heat.

use crate::constants::*;

/// Energy lost by each robot in a body collision.
pub const RAM_DAMAGE: f64 = 0.6;

/// Projectile speed for a given fire power.
pub fn bullet_speed(power: f64) -> f64 {
    BULLET_BASE_SPEED - BULLET_SPEED_PER_POWER * power
}

/// Fire power that produces a given projectile speed.
pub fn power_for_speed(speed: f64) -> f64 {
    (BULLET_BASE_SPEED - speed) / BULLET_SPEED_PER_POWER
}

/// Clamp a requested power into the legal firing range.
pub fn clamp_power(power: f64) -> f64 {
    power.clamp(MIN_FIRE_POWER, MAX_FIRE_POWER)
}

/// Maximum turn per tick (radians) at the given velocity.
pub fn max_turn_rate(velocity: f64) -> f64 {
    BASE_TURN_RATE - TURN_RATE_PER_SPEED * velocity.abs().min(MAX_SPEED)
}

/// Gun heat generated by firing at the given power.
pub fn gun_heat(power: f64) -> f64 {
    1.0 + power / 5.0
}

/// Ticks until a gun fired at `power` can fire again.
pub fn gun_cool_ticks(power: f64) -> u64 {
    (gun_heat(power) / GUN_COOLING_RATE - 1e-9).ceil() as u64
}

/// Damage dealt by a projectile of the given power.
pub fn bullet_damage(power: f64) -> f64 {
    let bonus = if power > 1.0 { 2.0 * (power - 1.0) } else { 0.0 };
    4.0 * power + bonus
}

/// Energy returned to the shooter when its projectile hits.
pub fn energy_gain(power: f64) -> f64 {
    3.0 * power
}

/// Energy lost on hitting a wall at the given velocity.
pub fn wall_damage(velocity: f64) -> f64 {
    (velocity.abs() * 0.5 - 1.0).max(0.0)
}

/// Smallest power whose damage is at least `energy`, clamped to legal range.
pub fn power_to_kill(energy: f64) -> f64 {
    let power = if energy <= 4.0 {
        energy / 4.0
    } else {
        (energy + 2.0) / 6.0
    };
    clamp_power(power)
}

/// Simple maximum escape angle for a projectile speed: `asin(max_speed / speed)`.
pub fn simple_escape_angle(speed: f64) -> f64 {
    (MAX_SPEED / speed).clamp(-1.0, 1.0).asin()
}
