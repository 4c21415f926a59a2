//! Space Shooter - a top-down arena shooter simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, anomaly, frame step)
//! - `snapshot`: Read-only view of the session for an external renderer
//! - `settings`: Arena size, seed and host run options

pub mod settings;
pub mod sim;
pub mod snapshot;

pub use settings::Settings;
pub use snapshot::Snapshot;

/// Game rule constants. All rates are per tick (60 ticks per second).
pub mod consts {
    /// Nominal tick rate the rule timings are tuned for
    pub const TICKS_PER_SECOND: u32 = 60;

    /// Default logical arena size
    pub const ARENA_WIDTH: f32 = 1280.0;
    pub const ARENA_HEIGHT: f32 = 960.0;

    /// Ship handling
    pub const ROTATE_SPEED: f32 = 0.06; // radians per tick
    pub const ACCEL: f32 = 0.2;
    pub const FRICTION: f32 = 0.01;
    pub const MAX_SPEED: f32 = 20.0;

    /// Ship hull (kite), relative to the ship center before rotation
    pub const SHIP_HEIGHT: f32 = 75.0;
    pub const SHIP_WIDTH: f32 = 30.0;
    /// Distance from ship center to the gun tip
    pub const SHIP_GUN_LENGTH: f32 = 40.0;
    /// Pickup reach: ship radius + powerup radius
    pub const PICKUP_RADIUS: f32 = 20.0 + 12.0;

    /// Bullets
    pub const BULLET_SPEED: f32 = 10.0;
    pub const BULLET_RADIUS: f32 = 4.0;
    /// Ticks between shots
    pub const FIRE_COOLDOWN: u32 = 10;
    /// Cooldown armed when a run is reset
    pub const RESET_FIRE_COOLDOWN: u32 = 15;

    /// Enemies
    pub const ENEMY_SPEED: f32 = 3.0;
    pub const ENEMY_LARGE_RADIUS: f32 = 40.0;
    pub const ENEMY_MEDIUM_RADIUS: f32 = 20.0;
    pub const ENEMY_SMALL_RADIUS: f32 = 10.0;
    pub const SPAWN_CHANCE: f64 = 1.0 / 60.0;
    pub const INVINCIBLE_ENEMY_CHANCE: f64 = 0.05;
    /// Ticks an enemy flashes after a hit before it despawns
    pub const HIT_FLASH_TICKS: u32 = 6;
    /// Max position jitter for split children while enemies are frozen
    pub const FROZEN_SPLIT_JITTER: f32 = 4.0;
    /// Stand-in distance for exactly coincident enemy centers
    pub const MIN_SEPARATION: f32 = 0.1;

    /// Powerups
    pub const POWERUP_DROP_CHANCE: f32 = 0.10;
    pub const SHIELD_TICKS: u32 = 300;
    pub const FREEZE_TICKS: u32 = 300;
    pub const INVINCIBLE_BULLETS_TICKS: u32 = 300;
    pub const MAX_BOMBS: u32 = 2;
    /// Full-screen flash after a bomb
    pub const BOMB_FLASH_TICKS: u32 = 20;

    /// Anomaly
    pub const ANOMALY_INCOMING_TICKS: u32 = 180;
    pub const ANOMALY_FADE_TICKS: u32 = 300;
    pub const ANOMALY_FADE_STEP_TICKS: u32 = 5;
    pub const ANOMALY_ALPHA_STEP: u8 = 3;
    pub const ANOMALY_ALPHA_MAX: u8 = 150;
    pub const ANOMALY_ALPHA_LOW: u8 = 10;
    pub const ANOMALY_FLASH_TICKS: u32 = 60;
    pub const ANOMALY_FLICKER_PERIOD: u32 = 15;
    pub const ANOMALY_SAFE_RADIUS: f32 = 150.0;
    /// Score at which the first anomaly triggers
    pub const ANOMALY_FIRST_SCORE: u64 = 10;
    /// Score distance between later anomaly triggers
    pub const ANOMALY_REARM_SCORE: u64 = 1000;
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

/// Direction vector for a heading (0 = up, clockwise positive, +y down)
#[inline]
pub fn heading_vector(angle: f32) -> glam::Vec2 {
    glam::Vec2::new(angle.sin(), -angle.cos())
}
