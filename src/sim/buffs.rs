//! Timed stat buffs earned at gem-count milestones
//!
//! Buffs sit on top of upgrade stats as extra factors, so expiry never
//! undoes an upgrade. One entry per kind; a second grant refreshes it.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::effects::spawn_particles;
use super::events::{GameEvent, SoundCue};
use super::state::GameState;
use super::weapon::WeaponDef;

pub const SPEED_BUFF_MULT: f32 = 1.4;
pub const RAPID_FIRE_MULT: f32 = 2.0;
/// Extra side shots for single-shot weapons
pub const MULTI_SHOT_EXTRA: u32 = 2;
/// Gems for the first repeat, and between repeats after it
pub const REPEAT_EVERY_GEMS: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuffKind {
    Speed,
    RapidFire,
    MultiShot,
    Shield,
}

#[derive(Debug, Clone, Copy)]
pub struct BuffDef {
    pub name: &'static str,
    /// Gem count that grants it
    pub gems: u32,
    pub duration: f32,
    pub color: u32,
}

impl BuffKind {
    pub const ALL: [BuffKind; 4] = [
        BuffKind::Speed,
        BuffKind::RapidFire,
        BuffKind::MultiShot,
        BuffKind::Shield,
    ];

    pub fn def(self) -> BuffDef {
        match self {
            BuffKind::Speed => BuffDef {
                name: "Speed Boost",
                gems: 25,
                duration: 12.0,
                color: 0x00ff88,
            },
            BuffKind::RapidFire => BuffDef {
                name: "Rapid Fire",
                gems: 50,
                duration: 12.0,
                color: 0xff6600,
            },
            BuffKind::MultiShot => BuffDef {
                name: "Multi-Shot",
                gems: 100,
                duration: 15.0,
                color: 0xaa66ff,
            },
            BuffKind::Shield => BuffDef {
                name: "Shield",
                gems: 150,
                duration: 20.0,
                color: 0x00aaff,
            },
        }
    }
}

/// Which milestone paid out a buff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BuffSource {
    Milestone(BuffKind),
    /// N-th repeat past `REPEAT_EVERY_GEMS`, starting at 0
    Repeat(u32),
}

#[derive(Debug, Clone, Serialize)]
pub struct ActiveBuff {
    pub kind: BuffKind,
    pub timer: f32,
    pub max_timer: f32,
}

pub fn buff_active(state: &GameState, kind: BuffKind) -> bool {
    state.buffs.iter().any(|b| b.kind == kind)
}

/// Movement speed factor from buffs
pub fn speed_factor(state: &GameState) -> f32 {
    if buff_active(state, BuffKind::Speed) { SPEED_BUFF_MULT } else { 1.0 }
}

/// Fire rate factor from buffs
pub fn fire_rate_factor(state: &GameState) -> f32 {
    if buff_active(state, BuffKind::RapidFire) { RAPID_FIRE_MULT } else { 1.0 }
}

/// Projectiles added to each volley of `weapon`
pub fn bonus_shots(state: &GameState, weapon: &WeaponDef) -> u32 {
    if weapon.count == 1 && buff_active(state, BuffKind::MultiShot) {
        MULTI_SHOT_EXTRA
    } else {
        0
    }
}

/// Pay out every milestone the current gem count has reached
pub fn check_gem_milestones(state: &mut GameState) {
    let gems = state.player.gems;
    for kind in BuffKind::ALL {
        let source = BuffSource::Milestone(kind);
        if gems >= kind.def().gems && !state.buff_claims.contains(&source) {
            state.buff_claims.push(source);
            activate_buff(state, kind);
        }
    }

    if gems >= REPEAT_EVERY_GEMS {
        let source = BuffSource::Repeat(gems / REPEAT_EVERY_GEMS - 1);
        if !state.buff_claims.contains(&source) {
            state.buff_claims.push(source);
            let kind = BuffKind::ALL[state.rng.random_range(0..BuffKind::ALL.len())];
            activate_buff(state, kind);
        }
    }
}

/// Start `kind`, or refresh it if it is already running
pub fn activate_buff(state: &mut GameState, kind: BuffKind) {
    let def = kind.def();
    match state.buffs.iter_mut().find(|b| b.kind == kind) {
        Some(b) => {
            b.timer = b.timer.max(def.duration);
            b.max_timer = b.max_timer.max(def.duration);
        }
        None => state.buffs.push(ActiveBuff {
            kind,
            timer: def.duration,
            max_timer: def.duration,
        }),
    }

    if kind == BuffKind::Shield {
        let p = &mut state.player;
        p.shield_boost = true;
        p.refresh_shield_cap();
        p.shield = p.shield_max;
    }

    log::debug!("Buff {} at {} gems", def.name, state.player.gems);
    let pos = state.player.pos;
    spawn_particles(state, pos, def.color, 20, 200.0, 0.6);
    state.sound(SoundCue::Powerup);
    state.emit(GameEvent::Banner(format!("{}!", def.name)));
    state.emit(GameEvent::BuffActivated { kind });
}

/// Count buffs down and drop expired ones
pub fn update_buffs(state: &mut GameState, dt: f32) {
    let mut i = state.buffs.len();
    while i > 0 {
        i -= 1;
        state.buffs[i].timer -= dt;
        if state.buffs[i].timer > 0.0 {
            continue;
        }
        let kind = state.buffs.remove(i).kind;
        if kind == BuffKind::Shield {
            state.player.shield_boost = false;
            state.player.refresh_shield_cap();
        }
        state.emit(GameEvent::BuffExpired { kind });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    fn playing_state() -> GameState {
        let mut state = GameState::new(13, Settings::default());
        state.start_run();
        state
    }

    #[test]
    fn test_milestones_pay_out_once() {
        let mut state = playing_state();
        state.player.gems = 24;
        check_gem_milestones(&mut state);
        assert!(state.buffs.is_empty());

        state.player.gems = 60;
        check_gem_milestones(&mut state);
        assert!(buff_active(&state, BuffKind::Speed));
        assert!(buff_active(&state, BuffKind::RapidFire));
        assert_eq!(state.buffs.len(), 2);

        update_buffs(&mut state, 20.0);
        assert!(state.buffs.is_empty());
        check_gem_milestones(&mut state);
        assert!(state.buffs.is_empty());
    }

    #[test]
    fn test_repeat_every_200_gems() {
        let mut state = playing_state();
        state.player.gems = 199;
        check_gem_milestones(&mut state);
        let before = state.buff_claims.len();
        state.player.gems = 205;
        check_gem_milestones(&mut state);
        assert!(state.buff_claims.contains(&BuffSource::Repeat(0)));
        assert_eq!(state.buff_claims.len(), before + 1);
        state.player.gems = 399;
        check_gem_milestones(&mut state);
        assert_eq!(state.buff_claims.len(), before + 1);
        state.player.gems = 400;
        check_gem_milestones(&mut state);
        assert!(state.buff_claims.contains(&BuffSource::Repeat(1)));
    }

    #[test]
    fn test_factors_apply_only_while_active() {
        let mut state = playing_state();
        assert_eq!(speed_factor(&state), 1.0);
        activate_buff(&mut state, BuffKind::Speed);
        activate_buff(&mut state, BuffKind::RapidFire);
        activate_buff(&mut state, BuffKind::MultiShot);
        assert_eq!(speed_factor(&state), SPEED_BUFF_MULT);
        assert_eq!(fire_rate_factor(&state), RAPID_FIRE_MULT);
        assert_eq!(bonus_shots(&state, &WeaponDef::PISTOL), MULTI_SHOT_EXTRA);
        assert_eq!(bonus_shots(&state, &WeaponDef::SHOTGUN), 0);

        update_buffs(&mut state, 12.5);
        assert_eq!(speed_factor(&state), 1.0);
        assert_eq!(fire_rate_factor(&state), 1.0);
        assert!(buff_active(&state, BuffKind::MultiShot));
        assert!(state.events.contains(&GameEvent::BuffExpired { kind: BuffKind::Speed }));
    }

    #[test]
    fn test_regrant_refreshes_instead_of_stacking() {
        let mut state = playing_state();
        activate_buff(&mut state, BuffKind::Speed);
        update_buffs(&mut state, 10.0);
        activate_buff(&mut state, BuffKind::Speed);
        assert_eq!(state.buffs.len(), 1);
        assert_eq!(state.buffs[0].timer, BuffKind::Speed.def().duration);
    }

    #[test]
    fn test_shield_buff_fills_then_reverts_to_slots() {
        let mut state = playing_state();
        state.player.stats.shield_slots = 1;
        state.player.refresh_shield_cap();
        activate_buff(&mut state, BuffKind::Shield);
        assert_eq!(state.player.shield, 3);
        assert_eq!(state.player.shield_max, 3);

        update_buffs(&mut state, 21.0);
        assert_eq!(state.player.shield_max, 1);
        assert_eq!(state.player.shield, 1);
    }
}
