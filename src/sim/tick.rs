//! Per-frame simulation tick
//!
//! Core game loop that advances the run in a fixed order: player, bullets,
//! enemies, gems, pickups, spawner, then timers and cosmetics.

use super::buffs::update_buffs;
use super::combat::update_bullets;
use super::effects::{update_camera, update_particles};
use super::enemy::update_enemies;
use super::player::update_player;
use super::progression::{self, UpgradeId, update_gems, update_pickups, update_powerup};
use super::spawner::update_spawner;
use super::state::{GamePhase, GameState};
use crate::consts::*;
use crate::error::SimError;

/// Input intent for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement intent, each axis in [-1, 1]
    pub move_x: f32,
    pub move_y: f32,
    /// Fire held
    pub fire: bool,
    /// Dash pressed (one-shot)
    pub dash: bool,
    /// Pointer aim angle in radians
    pub aim_angle: f32,
}

/// Advance the game state by `dt` seconds (clamped)
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if state.phase != GamePhase::Playing {
        return;
    }
    let dt = dt.clamp(0.0, MAX_FRAME_DT);
    state.elapsed += dt;

    update_player(state, input, dt);
    update_bullets(state, dt);
    update_enemies(state, dt);
    if state.phase == GamePhase::GameOver {
        return;
    }

    update_gems(state, dt);
    if state.phase == GamePhase::AwaitingUpgrade {
        return;
    }

    update_pickups(state, dt);
    update_spawner(state, dt);
    state.combo.decay(dt);
    update_powerup(state, dt);
    update_buffs(state, dt);
    update_particles(state, dt);
    update_camera(state);

    enforce_player_bounds(state);
}

/// Last-line guard for the hp and shield ranges
fn enforce_player_bounds(state: &mut GameState) {
    let p = &mut state.player;
    if !(0.0..=p.max_hp).contains(&p.hp) {
        log::warn!("Player hp {} out of range, clamping", p.hp);
        p.hp = p.hp.clamp(0.0, p.max_hp);
    }
    if p.shield > p.shield_max {
        log::warn!("Player shield {} above max {}, clamping", p.shield, p.shield_max);
        p.shield = p.shield_max;
    }
}

impl GameState {
    /// Resolve the pending level-up and resume when none remain
    pub fn select_upgrade(&mut self, id: UpgradeId) -> Result<(), SimError> {
        progression::select_upgrade(self, id)
    }

    /// Fire the ultimate; returns how many enemies it hit
    pub fn trigger_ultimate(&mut self) -> Result<usize, SimError> {
        progression::trigger_ultimate(self)
    }
}
