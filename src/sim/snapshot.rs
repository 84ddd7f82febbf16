//! Read-only frame snapshot for presentation layers
//!
//! Renderers and HUDs consume this instead of reaching into `GameState`.
//! Everything is plain data and serializes with serde.

use glam::Vec2;
use serde::Serialize;

use super::buffs::BuffKind;
use super::enemy::EnemyKind;
use super::progression::UpgradeId;
use super::state::{GamePhase, GameState};
use super::weapon::{WeaponDef, WeaponKind};
use crate::consts::*;

/// Gems fade during their last few seconds
const GEM_FADE_SECS: f32 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudStats {
    pub hp: f32,
    pub max_hp: f32,
    pub shield: u32,
    pub shield_max: u32,
    pub xp: u32,
    pub xp_next: u32,
    pub level: u32,
    pub ult_charge: f32,
    pub ult_max: f32,
    pub score: u64,
    pub gems: u32,
    pub kills: u32,
    pub lives: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub angle: f32,
    pub size: f32,
    pub dashing: bool,
    pub invulnerable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnemyView {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub size: f32,
    pub color: u32,
    /// Remaining hp as a fraction of max
    pub hp_frac: f32,
    pub flashing: bool,
    pub dashing: bool,
    pub elite: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulletView {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub weapon: WeaponKind,
    pub crit: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GemView {
    pub pos: Vec2,
    pub color: u32,
    pub bob_phase: f32,
    pub sparkle: f32,
    /// 1.0 until the fade window, then down to 0.0
    pub alpha: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticleView {
    pub pos: Vec2,
    pub color: u32,
    pub size: f32,
    pub alpha: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct LabelView {
    pub pos: Vec2,
    pub text: String,
    pub color: u32,
    pub alpha: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PickupView {
    pub pos: Vec2,
    pub weapon: WeaponKind,
    pub name: &'static str,
    pub bob_phase: f32,
    pub life: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct WarningView {
    pub pos: Vec2,
    pub kind: EnemyKind,
    pub elite: bool,
    /// 0.0 when issued, 1.0 when the enemy appears
    pub progress: f32,
}

/// Weapon in hand plus remaining power-up time, if any
#[derive(Debug, Clone, Serialize)]
pub struct WeaponView {
    pub weapon: WeaponDef,
    pub timer: Option<f32>,
    pub max_timer: Option<f32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuffView {
    pub kind: BuffKind,
    pub name: &'static str,
    pub timer: f32,
    pub max_timer: f32,
}

/// Everything a presentation layer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub elapsed: f32,
    pub wave: u32,
    pub combo: u32,
    pub best_combo: u32,
    pub hud: HudStats,
    pub player: PlayerView,
    pub weapon: WeaponView,
    pub buffs: Vec<BuffView>,
    pub enemies: Vec<EnemyView>,
    pub bullets: Vec<BulletView>,
    pub gems: Vec<GemView>,
    pub particles: Vec<ParticleView>,
    pub damage_numbers: Vec<LabelView>,
    pub pickups: Vec<PickupView>,
    pub warnings: Vec<WarningView>,
    pub upgrade_choices: Vec<UpgradeId>,
    pub camera: Vec2,
    pub screen_shake: f32,
}

impl Snapshot {
    pub fn capture(state: &GameState) -> Self {
        let p = &state.player;
        Self {
            phase: state.phase,
            elapsed: state.elapsed,
            wave: state.wave,
            combo: state.combo.count,
            best_combo: state.combo.best,
            hud: HudStats {
                hp: p.hp,
                max_hp: p.max_hp,
                shield: p.shield,
                shield_max: p.shield_max,
                xp: p.xp,
                xp_next: p.xp_next,
                level: p.level,
                ult_charge: p.ult_charge,
                ult_max: p.ult_max,
                score: p.score,
                gems: p.gems,
                kills: p.kills,
                lives: p.lives,
            },
            player: PlayerView {
                pos: p.pos,
                angle: p.angle,
                size: p.size,
                dashing: p.is_dashing(),
                invulnerable: p.is_invulnerable(),
            },
            weapon: WeaponView {
                weapon: state.current_weapon(),
                timer: state.powerup.as_ref().map(|a| a.timer),
                max_timer: state.powerup.as_ref().map(|a| a.max_timer),
            },
            buffs: state
                .buffs
                .iter()
                .map(|b| BuffView {
                    kind: b.kind,
                    name: b.kind.def().name,
                    timer: b.timer,
                    max_timer: b.max_timer,
                })
                .collect(),
            enemies: state
                .live_enemies()
                .map(|e| EnemyView {
                    id: e.id,
                    kind: e.kind,
                    pos: e.pos,
                    size: e.size,
                    color: e.kind.def().color,
                    hp_frac: (e.hp / e.max_hp).clamp(0.0, 1.0),
                    flashing: e.flash_timer > 0.0,
                    dashing: e.is_dashing(),
                    elite: e.elite,
                })
                .collect(),
            bullets: state
                .bullets
                .iter()
                .map(|b| BulletView {
                    pos: b.pos,
                    vel: b.vel,
                    radius: b.radius,
                    weapon: b.weapon,
                    crit: b.crit,
                })
                .collect(),
            gems: state
                .gems
                .iter()
                .map(|g| GemView {
                    pos: g.pos,
                    color: g.color(),
                    bob_phase: g.bob_phase,
                    sparkle: g.sparkle,
                    alpha: (g.life / GEM_FADE_SECS).clamp(0.0, 1.0),
                })
                .collect(),
            particles: state
                .particles
                .iter()
                .map(|pt| ParticleView {
                    pos: pt.pos,
                    color: pt.color,
                    size: pt.size,
                    alpha: (pt.life / pt.max_life).clamp(0.0, 1.0),
                })
                .collect(),
            damage_numbers: state
                .damage_numbers
                .iter()
                .map(|d| LabelView {
                    pos: d.pos,
                    text: d.text.clone(),
                    color: d.color,
                    alpha: (d.life / d.max_life).clamp(0.0, 1.0),
                })
                .collect(),
            pickups: state
                .pickups
                .iter()
                .map(|pk| PickupView {
                    pos: pk.pos,
                    weapon: pk.weapon.kind,
                    name: pk.weapon.name,
                    bob_phase: pk.bob_phase,
                    life: pk.life,
                })
                .collect(),
            warnings: state
                .warnings
                .iter()
                .map(|w| WarningView {
                    pos: w.pos,
                    kind: w.kind,
                    elite: w.elite,
                    progress: ((state.elapsed - w.created_at) / SPAWN_WARNING_LEAD).clamp(0.0, 1.0),
                })
                .collect(),
            upgrade_choices: state.upgrade_choices.clone(),
            camera: state.camera,
            screen_shake: state.screen_shake,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::enemy::spawn_enemy;
    use crate::sim::state::Gem;

    #[test]
    fn test_capture_reflects_state() {
        let mut state = GameState::new(4, Settings::default());
        state.start_run();
        state.player.score = 120;
        spawn_enemy(&mut state, EnemyKind::Dasher, Vec2::splat(300.0), true);
        let snap = Snapshot::capture(&state);
        assert_eq!(snap.phase, GamePhase::Playing);
        assert_eq!(snap.hud.score, 120);
        assert_eq!(snap.hud.lives, PLAYER_LIVES);
        assert_eq!(snap.enemies.len(), 1);
        assert!(snap.enemies[0].elite);
        assert_eq!(snap.weapon.weapon.kind, WeaponKind::Pistol);
        assert!(snap.weapon.timer.is_none());
    }

    #[test]
    fn test_active_buffs_listed() {
        let mut state = GameState::new(4, Settings::default());
        state.start_run();
        crate::sim::buffs::activate_buff(&mut state, BuffKind::RapidFire);
        let snap = Snapshot::capture(&state);
        assert_eq!(snap.buffs.len(), 1);
        assert_eq!(snap.buffs[0].name, "Rapid Fire");
        assert_eq!(snap.buffs[0].timer, snap.buffs[0].max_timer);
    }

    #[test]
    fn test_gem_fades_near_expiry() {
        let mut state = GameState::new(4, Settings::default());
        state.gems.push(Gem {
            id: 1,
            pos: Vec2::ZERO,
            kind: 1,
            life: 2.5,
            bob_phase: 0.0,
            sparkle: 0.0,
        });
        let snap = Snapshot::capture(&state);
        assert!((snap.gems[0].alpha - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut state = GameState::new(4, Settings::default());
        state.start_run();
        let json = Snapshot::capture(&state).to_json().unwrap();
        assert!(json.contains("\"phase\":\"Playing\""));
    }
}
