//! Discrete notifications emitted during a tick
//!
//! The presentation layer drains these once per frame and turns them into
//! banners, sounds and screens.

use serde::Serialize;

use super::buffs::BuffKind;
use super::enemy::EnemyKind;
use super::progression::UpgradeId;
use super::weapon::WeaponKind;

/// Sound effect requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SoundCue {
    Fire(WeaponKind),
    Hit,
    Kill,
    Gem,
    Powerup,
    Hurt,
    Dash,
    Explode,
    Ultimate,
    GameOver,
}

/// Final stats for the game-over screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub score: u64,
    pub kills: u32,
    pub gems: u32,
    pub level: u32,
    pub best_combo: u32,
    pub wave: u32,
    pub elapsed: f32,
}

impl RunSummary {
    /// Elapsed time as mm:ss
    pub fn time_label(&self) -> String {
        crate::format_time(self.elapsed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    Sound(SoundCue),
    /// Short banner text ("Level 4!", "Rocket!", ...)
    Banner(String),
    /// Simulation paused until one of `choices` is selected
    LevelUpAvailable { level: u32, choices: Vec<UpgradeId> },
    UpgradeApplied(UpgradeId),
    WeaponAcquired { name: &'static str },
    WeaponExpired { name: &'static str },
    BuffActivated { kind: BuffKind },
    BuffExpired { kind: BuffKind },
    EnemyKilled { kind: EnemyKind, elite: bool },
    ShieldBlocked,
    PlayerHit { damage: f32 },
    LifeLost { lives_left: u32 },
    UltimateReady,
    UltimateFired { hits: usize },
    EliteBurst,
    WaveAdvanced { wave: u32 },
    GameOver(RunSummary),
}
