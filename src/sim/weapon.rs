//! Weapon definitions
//!
//! Every weapon, base or pickup, is one fully populated [`WeaponDef`]
//! selected by [`WeaponKind`]. There are no optional fields to forget.

use serde::{Deserialize, Serialize};

use super::events::SoundCue;

/// Weapon identity (rendering/audio dispatch)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    Pistol,
    Shotgun,
    Smg,
    Laser,
    Rocket,
    Seeker,
}

/// Full weapon definition
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeaponDef {
    pub kind: WeaponKind,
    pub name: &'static str,
    /// Seconds between shots
    pub fire_rate: f32,
    pub bullet_speed: f32,
    pub damage: f32,
    /// Total fan angle (radians)
    pub spread: f32,
    pub count: u32,
    /// Bullet lifetime (seconds)
    pub lifetime: f32,
    pub bullet_size: f32,
    pub pierce: bool,
    pub explosive: bool,
    pub homing: bool,
    /// Power-up duration when carried by a pickup (seconds)
    pub duration: f32,
}

impl WeaponDef {
    pub const PISTOL: WeaponDef = WeaponDef {
        kind: WeaponKind::Pistol,
        name: "Pistol",
        fire_rate: 0.25,
        bullet_speed: 600.0,
        damage: 1.0,
        spread: 0.0,
        count: 1,
        lifetime: 1.2,
        bullet_size: 3.5,
        pierce: false,
        explosive: false,
        homing: false,
        duration: 0.0,
    };

    pub const SHOTGUN: WeaponDef = WeaponDef {
        kind: WeaponKind::Shotgun,
        name: "Shotgun",
        fire_rate: 0.6,
        bullet_speed: 500.0,
        damage: 1.0,
        spread: 0.35,
        count: 6,
        lifetime: 0.5,
        bullet_size: 2.5,
        pierce: false,
        explosive: false,
        homing: false,
        duration: 12.0,
    };

    pub const SMG: WeaponDef = WeaponDef {
        kind: WeaponKind::Smg,
        name: "SMG",
        fire_rate: 0.08,
        bullet_speed: 550.0,
        damage: 0.5,
        spread: 0.12,
        count: 1,
        lifetime: 0.8,
        bullet_size: 2.5,
        pierce: false,
        explosive: false,
        homing: false,
        duration: 12.0,
    };

    pub const LASER: WeaponDef = WeaponDef {
        kind: WeaponKind::Laser,
        name: "Laser Rifle",
        fire_rate: 0.35,
        bullet_speed: 1200.0,
        damage: 2.0,
        spread: 0.0,
        count: 1,
        lifetime: 0.8,
        bullet_size: 2.0,
        pierce: true,
        explosive: false,
        homing: false,
        duration: 10.0,
    };

    pub const ROCKET: WeaponDef = WeaponDef {
        kind: WeaponKind::Rocket,
        name: "Rocket",
        fire_rate: 0.9,
        bullet_speed: 350.0,
        damage: 3.0,
        spread: 0.0,
        count: 1,
        lifetime: 1.8,
        bullet_size: 5.0,
        pierce: false,
        explosive: true,
        homing: false,
        duration: 10.0,
    };

    pub const SEEKER: WeaponDef = WeaponDef {
        kind: WeaponKind::Seeker,
        name: "Seeker",
        fire_rate: 0.3,
        bullet_speed: 420.0,
        damage: 1.5,
        spread: 0.4,
        count: 2,
        lifetime: 1.6,
        bullet_size: 3.0,
        pierce: false,
        explosive: false,
        homing: true,
        duration: 12.0,
    };

    /// Weapons a pickup can carry
    pub const PICKUP_POOL: [WeaponDef; 5] = [
        Self::SHOTGUN,
        Self::SMG,
        Self::LASER,
        Self::ROCKET,
        Self::SEEKER,
    ];

    /// Sound played when this weapon fires
    pub fn fire_cue(&self) -> SoundCue {
        SoundCue::Fire(self.kind)
    }
}

/// A weapon pickup lying on the ground
#[derive(Debug, Clone, Serialize)]
pub struct WeaponPickup {
    pub id: u32,
    pub pos: glam::Vec2,
    pub weapon: WeaponDef,
    /// Seconds until it disappears
    pub life: f32,
    pub bob_phase: f32,
}

/// The current weapon override; at most one exists
#[derive(Debug, Clone, Serialize)]
pub struct ActivePowerup {
    pub weapon: WeaponDef,
    /// Seconds remaining
    pub timer: f32,
    pub max_timer: f32,
}

impl ActivePowerup {
    pub fn new(weapon: WeaponDef) -> Self {
        Self {
            weapon,
            timer: weapon.duration,
            max_timer: weapon.duration,
        }
    }
}
