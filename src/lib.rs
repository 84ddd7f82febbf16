//! Neon Survivors - simulation core for a top-down arena shooter
//!
//! Core modules:
//! - `sim`: Simulation (entities, combat, progression, frame orchestration)
//! - `settings`: Player-facing configuration (quality, control mode, viewport)
//! - `error`: Errors returned by lifecycle calls
//!
//! Rendering, audio, and input capture live outside this crate. They feed a
//! [`sim::TickInput`] in and read [`sim::Snapshot`]s and [`sim::GameEvent`]s out.

pub mod error;
pub mod settings;
pub mod sim;

pub use error::SimError;
pub use settings::{ControlMode, QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Longest frame delta the simulation will integrate in one call
    pub const MAX_FRAME_DT: f32 = 0.05;

    /// Square world, origin at top-left
    pub const WORLD_SIZE: f32 = 4000.0;

    /// Player defaults
    pub const PLAYER_SPEED: f32 = 220.0;
    pub const PLAYER_SIZE: f32 = 16.0;
    pub const PLAYER_MAX_HP: f32 = 100.0;
    pub const PLAYER_LIVES: u32 = 5;
    pub const PLAYER_MARGIN: f32 = 20.0;
    pub const INVULN_TIME: f32 = 1.5;
    pub const RESPAWN_INVULN_TIME: f32 = 2.0;
    pub const SHIELD_BLOCK_INVULN: f32 = 0.5;
    pub const SHIELD_RECHARGE_TIME: f32 = 8.0;
    /// Shield capacity while the shield buff runs
    pub const BUFF_SHIELD_CHARGES: u32 = 3;
    pub const HIT_KNOCKBACK: f32 = 40.0;

    /// Dash
    pub const DASH_SPEED: f32 = 700.0;
    pub const DASH_DURATION: f32 = 0.15;
    pub const DASH_COOLDOWN: f32 = 1.5;
    pub const DASH_INVULN: f32 = 0.2;

    /// Enemies
    pub const MAX_ENEMIES: usize = 80;
    pub const ENEMY_MARGIN: f32 = 10.0;
    pub const SPAWN_MARGIN: f32 = 50.0;
    pub const SPAWN_DIST_MIN: f32 = 500.0;
    pub const SPAWN_DIST_MAX: f32 = 800.0;
    pub const ELITE_SIZE_MULT: f32 = 2.0;
    pub const ELITE_HP_MULT: f32 = 5.0;
    pub const ELITE_SCORE_MULT: u64 = 5;

    /// Bullets
    pub const MUZZLE_OFFSET: f32 = 22.0;
    pub const PIERCE_ALL: u32 = 999;
    pub const CRIT_MULT: f32 = 3.0;
    pub const HOMING_RANGE: f32 = 300.0;
    pub const HOMING_TURN_RATE: f32 = 5.0;
    pub const BULLET_KNOCKBACK: f32 = 4.0;
    pub const MULTISHOT_SPACING: f32 = 0.18;

    /// Explosions
    pub const EXPLOSION_RADIUS: f32 = 160.0;
    pub const EXPLOSION_DAMAGE: f32 = 2.0;

    /// Gems and XP
    pub const GEM_MAGNET_RANGE: f32 = 120.0;
    pub const GEM_COLLECT_RANGE: f32 = 25.0;
    pub const GEM_PULL: f32 = 400.0;
    pub const GEM_LIFETIME: f32 = 30.0;
    pub const GEM_SCORE_MULT: u64 = 5;
    pub const XP_START: u32 = 10;
    /// Requirement growth factor 1.3, kept as a ratio so floor() is exact
    pub const XP_GROWTH_NUM: u32 = 13;
    pub const XP_GROWTH_DEN: u32 = 10;
    pub const XP_GROWTH_ADD: u32 = 10;

    /// Combo
    pub const COMBO_WINDOW: f32 = 2.0;
    pub const COMBO_BONUS_MIN: u32 = 3;
    pub const COMBO_BONUS_PER_KILL: u64 = 2;

    /// Ultimate
    pub const ULT_MAX: f32 = 100.0;
    pub const ULT_DAMAGE: f32 = 50.0;
    pub const ULT_SCORE_DIVISOR: f32 = 5.0;

    /// Weapon pickups
    pub const PICKUP_DROP_CHANCE: f64 = 0.04;
    pub const PICKUP_GROUND_CAP: usize = 3;
    pub const PICKUP_LIFETIME: f32 = 15.0;
    pub const PICKUP_RADIUS: f32 = 14.0;

    /// Spawner
    pub const SPAWN_WARNING_LEAD: f32 = 0.8;
    pub const SPAWN_RATE_GROWTH: f32 = 0.01;
    pub const MAX_BURST: u32 = 3;
    pub const BURST_STEP_SECS: f32 = 60.0;
    pub const ELITE_INTERVAL: f32 = 20.0;
    pub const ELITE_CHANCE: f64 = 0.5;
    pub const WAVE_DURATION: f32 = 30.0;

    /// Visual feedback
    pub const MAX_DAMAGE_NUMBERS: usize = 40;
    pub const DAMAGE_NUMBER_LIFE: f32 = 0.8;
    pub const DAMAGE_NUMBER_RISE: f32 = 40.0;
    pub const CAMERA_LERP: f32 = 0.1;
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

/// Smallest signed rotation that takes `from` onto `to`
#[inline]
pub fn angle_delta(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

/// Angle of the vector pointing from `a` to `b`
#[inline]
pub fn angle_between(a: Vec2, b: Vec2) -> f32 {
    let d = b - a;
    d.y.atan2(d.x)
}

/// Unit vector for an angle
#[inline]
pub fn unit(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Clamp a position to the world square, keeping `margin` from every edge
#[inline]
pub fn clamp_to_world(pos: Vec2, margin: f32) -> Vec2 {
    let lo = Vec2::splat(margin);
    let hi = Vec2::splat(consts::WORLD_SIZE - margin);
    pos.clamp(lo, hi)
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Format seconds as mm:ss
pub fn format_time(secs: f32) -> String {
    let total = secs.max(0.0) as u32;
    format!("{:02}:{:02}", total / 60, total % 60)
}
