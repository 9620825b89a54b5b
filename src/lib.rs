//! Void Drift - A top-down asteroid survival game
//!
//! Core modules:
//! - `sim`: Simulation core (entities, physics, spawning, combat, progression)
//! - `settings`: Session configuration (dev mode, start level, sandbox)
//! - `tuning`: Data-driven game balance
//! - `error`: Errors surfaced to the host

pub mod error;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{SimError, SimResult};
pub use settings::SimConfig;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
///
/// One tick is one unit of time; speeds are pixels per tick.
pub mod consts {
    /// Ship geometry and handling
    pub const SHIP_RADIUS: f32 = 14.0;
    pub const SHIP_TURN_RATE: f32 = 0.075; // radians per tick
    pub const SHIP_THRUST: f32 = 0.18;
    pub const SHIP_FRICTION: f32 = 0.985;
    pub const SHIP_MAX_SPEED: f32 = 6.0;
    pub const SHIP_BASE_HULL: f32 = 100.0;

    /// Collision against the ship triangle uses a shrunken asteroid circle
    pub const SHIP_HIT_SHRINK: f32 = 0.85;
    pub const SMALL_IMPACT_DAMAGE: f32 = 5.0;
    pub const IMPACT_DAMAGE_PER_SIZE: f32 = 10.0;
    pub const KNOCKBACK_IMPULSE: f32 = 5.0;
    /// Invulnerability after taking a hit (ms)
    pub const HIT_INVULN_MS: f64 = 600.0;
    /// Invulnerability after a shield absorbs a lethal hit (ms)
    pub const SHIELD_INVULN_MS: f64 = 2000.0;
    /// Base shield recharge interval (ticks)
    pub const SHIELD_RECHARGE_TICKS: u32 = 60 * 30;

    /// Bullets
    pub const BULLET_SPEED: f32 = 11.0;
    pub const BULLET_LIFE: f32 = 48.0;
    pub const BULLET_DAMAGE: f32 = 10.0;
    pub const BULLET_RADIUS: f32 = 2.0;
    pub const FIRE_INTERVAL_TICKS: f32 = 14.0;
    /// Fire interval floor no matter how many fire-rate upgrades stack
    pub const MIN_FIRE_INTERVAL: f32 = 3.0;
    /// Angle between multishot barrels (radians)
    pub const MULTISHOT_SPREAD: f32 = 0.14;
    pub const RICOCHET_RANGE: f32 = 260.0;
    pub const TRAIL_LENGTH: usize = 6;

    /// Drones
    pub const DRONE_ORBIT_RADIUS: f32 = 42.0;
    pub const DRONE_ORBIT_SPEED: f32 = 0.04;
    pub const DRONE_FIRE_INTERVAL: f32 = 40.0;
    pub const DRONE_RANGE: f32 = 320.0;
    pub const DRONE_DAMAGE: f32 = 6.0;

    /// Asteroids by size category (index = size - 1)
    pub const ASTEROID_RADIUS: [f32; 4] = [14.0, 26.0, 42.0, 64.0];
    pub const ASTEROID_HP: [f32; 4] = [20.0, 60.0, 150.0, 420.0];
    pub const ASTEROID_SPEED: [f32; 4] = [2.2, 1.6, 1.1, 0.7];
    /// Hp grows by this fraction per level above 1
    pub const HP_PER_LEVEL: f32 = 0.08;
    pub const ASTEROID_VERTICES: usize = 11;
    pub const HIT_FLASH_TICKS: u32 = 6;
    pub const SEPARATION_SPEED: f32 = 0.9;
    pub const SCORE_PER_SIZE: f32 = 10.0;

    /// Flybys despawn once this far outside the bounds
    pub const FLYBY_DESPAWN_BUFFER: f32 = 220.0;
    pub const COMET_SPEED: f32 = 6.5;
    pub const FROST_SPEED: f32 = 3.0;
    pub const BEHEMOTH_SPEED: f32 = 0.8;
    pub const FROST_AURA_RADIUS: f32 = 150.0;
    pub const FROST_AURA_DAMAGE: f32 = 0.06;
    pub const FROST_SLOW_FACTOR: f32 = 0.5;

    /// Swarm clouds
    pub const SWARM_HOMING: f32 = 0.03;
    pub const SWARM_MAX_SPEED: f32 = 2.4;
    pub const SWARM_SPREAD: f32 = 34.0;

    /// Orbs
    pub const ORB_RADIUS: f32 = 6.0;
    pub const ORB_LIFE: u32 = 60 * 15;
    pub const ORB_FRICTION: f32 = 0.95;
    pub const PICKUP_RANGE: f32 = 90.0;
    pub const MAGNET_PULL: f32 = 0.6;
    pub const ORB_MAX_SPEED: f32 = 9.0;
    pub const HULL_ORB_AMOUNT: f32 = 15.0;
    /// Hull fraction at which a hull drop is swapped for a big XP orb
    pub const HULL_NEAR_FULL: f32 = 0.9;
    pub const BIG_XP_FACTOR: f32 = 3.0;

    /// Progression
    pub const XP_TARGET_START: f32 = 100.0;
    pub const XP_TARGET_SCALE: f32 = 1.3;
    pub const XP_TARGET_STEP: f32 = 40.0;

    /// Sandbox
    pub const SANDBOX_TARGETS: usize = 5;
    pub const SANDBOX_TARGET_HP: f32 = 1.0e6;

    /// Cosmetics
    pub const MAX_PARTICLES: usize = 600;
    pub const PARTICLE_LIFE: f32 = 30.0;
    pub const TEXT_LIFE: f32 = 45.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit vector pointing along `angle`
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Rotate a local-space point by `angle`
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

/// Wrap a position around the play area, re-entering offset by `radius`
///
/// Zero-sized bounds leave the position untouched.
pub fn wrap_position(pos: Vec2, radius: f32, bounds: Vec2) -> Vec2 {
    if bounds.x <= 0.0 || bounds.y <= 0.0 {
        return pos;
    }
    let mut p = pos;
    if p.x < -radius {
        p.x = bounds.x + radius;
    } else if p.x > bounds.x + radius {
        p.x = -radius;
    }
    if p.y < -radius {
        p.y = bounds.y + radius;
    } else if p.y > bounds.y + radius {
        p.y = -radius;
    }
    p
}

/// Like `wrap_position`, but an axis only wraps while moving further out
///
/// Bodies spawned off-screen and heading in are left alone until they have
/// crossed into the play area.
pub fn wrap_outgoing(pos: Vec2, vel: Vec2, radius: f32, bounds: Vec2) -> Vec2 {
    if bounds.x <= 0.0 || bounds.y <= 0.0 {
        return pos;
    }
    let mut p = pos;
    if p.x < -radius && vel.x <= 0.0 {
        p.x = bounds.x + radius;
    } else if p.x > bounds.x + radius && vel.x >= 0.0 {
        p.x = -radius;
    }
    if p.y < -radius && vel.y <= 0.0 {
        p.y = bounds.y + radius;
    } else if p.y > bounds.y + radius && vel.y >= 0.0 {
        p.y = -radius;
    }
    p
}

/// True if `pos` is further than `buffer` outside the play area
pub fn outside_bounds(pos: Vec2, bounds: Vec2, buffer: f32) -> bool {
    pos.x < -buffer || pos.y < -buffer || pos.x > bounds.x + buffer || pos.y > bounds.y + buffer
}
