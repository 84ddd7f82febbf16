//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Fixed update order within a tick
//! - Removal during iteration by reverse index or mark-and-compact
//! - No rendering or platform dependencies

pub mod buffs;
pub mod combat;
pub mod driver;
pub mod effects;
pub mod enemy;
pub mod events;
pub mod player;
pub mod progression;
pub mod snapshot;
pub mod spawner;
pub mod state;
pub mod tick;
pub mod weapon;

pub use buffs::{ActiveBuff, BuffKind};
pub use combat::KillSource;
pub use driver::FrameDriver;
pub use enemy::EnemyKind;
pub use events::{GameEvent, RunSummary, SoundCue};
pub use progression::UpgradeId;
pub use snapshot::Snapshot;
pub use spawner::Spawner;
pub use state::{
    Bullet, Combo, DamageNumber, Enemy, GamePhase, GameState, Gem, Particle, Player, PlayerStats,
    SpawnWarning,
};
pub use tick::{TickInput, tick};
pub use weapon::{ActivePowerup, WeaponDef, WeaponKind, WeaponPickup};
