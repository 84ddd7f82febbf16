//! Player controller: movement, dash, aim, fire timer, regen and shield

use glam::Vec2;

use super::buffs::{fire_rate_factor, speed_factor};
use super::combat::fire_bullet;
use super::effects::spawn_particles;
use super::events::SoundCue;
use super::state::GameState;
use super::tick::TickInput;
use crate::consts::*;
use crate::settings::ControlMode;
use crate::{angle_between, clamp_to_world, unit};

/// Movement intent as a unit vector, or zero when idle
pub fn movement_intent(input: &TickInput) -> Vec2 {
    let v = Vec2::new(input.move_x, input.move_y);
    let len = v.length();
    let len = if len > 0.0 { len } else { 1.0 };
    v / len
}

pub fn update_player(state: &mut GameState, input: &TickInput, dt: f32) {
    update_regen(state, dt);
    update_shield(state, dt);

    let move_dir = movement_intent(input);
    let p = &mut state.player;
    p.move_dir = move_dir;

    if p.dash_cooldown > 0.0 {
        p.dash_cooldown = (p.dash_cooldown - dt).max(0.0);
    }
    if input.dash && move_dir != Vec2::ZERO && p.dash_cooldown <= 0.0 && !p.is_dashing() {
        start_dash(state, move_dir);
    }

    let speed_buff = speed_factor(state);
    let p = &mut state.player;
    let vel = if p.is_dashing() {
        p.dash_timer -= dt;
        unit(p.dash_angle) * DASH_SPEED
    } else {
        move_dir * PLAYER_SPEED * p.stats.speed_mult * speed_buff
    };
    p.pos = clamp_to_world(p.pos + vel * dt, PLAYER_MARGIN);

    state.player.angle = aim_angle(state, input);

    let p = &mut state.player;
    if p.invuln_timer > 0.0 {
        p.invuln_timer = (p.invuln_timer - dt).max(0.0);
    }

    p.fire_timer -= dt;
    if input.fire && p.fire_timer <= 0.0 {
        let weapon = state.current_weapon();
        let rate = state.player.stats.fire_rate_mult * fire_rate_factor(state);
        state.player.fire_timer = weapon.fire_rate / rate;
        fire_bullet(state);
    }
}

fn start_dash(state: &mut GameState, dir: Vec2) {
    let p = &mut state.player;
    p.dash_angle = dir.y.atan2(dir.x);
    p.dash_timer = DASH_DURATION;
    p.dash_cooldown = DASH_COOLDOWN * p.stats.dash_cooldown_mult;
    p.grant_invuln(DASH_INVULN);
    let pos = p.pos;
    spawn_particles(state, pos, 0x00ffff, 8, 120.0, 0.3);
    state.sound(SoundCue::Dash);
}

/// Heal `regen` hp each time a full second accumulates
fn update_regen(state: &mut GameState, dt: f32) {
    let p = &mut state.player;
    if p.stats.regen <= 0.0 {
        return;
    }
    p.regen_timer += dt;
    if p.regen_timer >= 1.0 {
        p.regen_timer -= 1.0;
        let amount = p.stats.regen;
        p.heal(amount);
    }
}

/// Regain one charge after an idle stretch without being hit
fn update_shield(state: &mut GameState, dt: f32) {
    let p = &mut state.player;
    if p.shield >= p.shield_max {
        p.shield = p.shield_max;
        return;
    }
    p.shield_timer += dt;
    if p.shield_timer >= SHIELD_RECHARGE_TIME {
        p.shield_timer = 0.0;
        p.shield += 1;
    }
}

/// Facing for this tick according to the control mode
fn aim_angle(state: &GameState, input: &TickInput) -> f32 {
    let p = &state.player;
    match state.settings.control_mode {
        ControlMode::Pointer => input.aim_angle,
        ControlMode::AutoAim => {
            let nearest = state
                .live_enemies()
                .min_by(|a, b| a.pos.distance_squared(p.pos).total_cmp(&b.pos.distance_squared(p.pos)));
            if let Some(enemy) = nearest {
                angle_between(p.pos, enemy.pos)
            } else if p.move_dir != Vec2::ZERO {
                p.move_dir.y.atan2(p.move_dir.x)
            } else {
                p.angle
            }
        }
    }
}
