//! Particles, damage numbers, camera and screen shake
//!
//! Visual feedback only; nothing here feeds back into gameplay.

use glam::Vec2;
use rand::Rng;

use super::state::{DamageNumber, GameState, Particle};
use crate::consts::*;
use crate::{lerp, unit};

/// Burst of `count` particles radiating from `pos`; dropped once the cap is hit
pub fn spawn_particles(state: &mut GameState, pos: Vec2, color: u32, count: u32, speed: f32, life: f32) {
    let cap = state.settings.max_particles();
    for _ in 0..count {
        if state.particles.len() >= cap {
            break;
        }
        let a = state.rng.random_range(0.0..std::f32::consts::TAU);
        let s = state.rng.random_range(speed * 0.3..=speed);
        let l = state.rng.random_range(life * 0.5..=life);
        let size = state.rng.random_range(2.0..5.0);
        state.particles.push(Particle {
            pos,
            vel: unit(a) * s,
            color,
            life: l,
            max_life: life,
            size,
        });
    }
}

/// Floating label; evicts the oldest when full
pub fn spawn_damage_number(state: &mut GameState, pos: Vec2, text: String, color: u32) {
    if state.damage_numbers.len() >= MAX_DAMAGE_NUMBERS {
        state.damage_numbers.pop_front();
    }
    state.damage_numbers.push_back(DamageNumber {
        pos,
        text,
        color,
        life: DAMAGE_NUMBER_LIFE,
        max_life: DAMAGE_NUMBER_LIFE,
    });
}

/// Format a damage value: whole numbers without decimals
pub fn damage_label(amount: f32) -> String {
    if amount.fract().abs() < 1e-3 {
        format!("{}", amount.round() as i64)
    } else {
        format!("{:.1}", amount)
    }
}

pub fn update_particles(state: &mut GameState, dt: f32) {
    for p in state.particles.iter_mut() {
        p.pos += p.vel * dt;
        p.vel *= 0.96;
        p.life -= dt;
    }
    state.particles.retain(|p| p.life > 0.0);

    for d in state.damage_numbers.iter_mut() {
        d.pos.y -= DAMAGE_NUMBER_RISE * dt;
        d.life -= dt;
    }
    state.damage_numbers.retain(|d| d.life > 0.0);
}

/// Ease the camera toward the player and decay shake
pub fn update_camera(state: &mut GameState) {
    let target = state.player.pos;
    state.camera = Vec2::new(
        lerp(state.camera.x, target.x, CAMERA_LERP),
        lerp(state.camera.y, target.y, CAMERA_LERP),
    );
    if state.screen_shake > 0.0 {
        state.screen_shake *= 0.85;
        if state.screen_shake < 0.5 {
            state.screen_shake = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{QualityPreset, Settings};

    #[test]
    fn test_particle_cap() {
        let mut state = GameState::new(3, Settings::from_preset(QualityPreset::Low));
        spawn_particles(&mut state, Vec2::ZERO, 0xffffff, 500, 100.0, 1.0);
        assert_eq!(state.particles.len(), 100);
    }

    #[test]
    fn test_damage_numbers_evict_oldest() {
        let mut state = GameState::new(3, Settings::default());
        for i in 0..MAX_DAMAGE_NUMBERS + 5 {
            spawn_damage_number(&mut state, Vec2::ZERO, i.to_string(), 0xffffff);
        }
        assert_eq!(state.damage_numbers.len(), MAX_DAMAGE_NUMBERS);
        assert_eq!(state.damage_numbers.front().map(|d| d.text.as_str()), Some("5"));
    }

    #[test]
    fn test_particles_expire() {
        let mut state = GameState::new(3, Settings::default());
        spawn_particles(&mut state, Vec2::ZERO, 0xffffff, 10, 100.0, 0.3);
        spawn_damage_number(&mut state, Vec2::ZERO, "1".into(), 0xffffff);
        update_particles(&mut state, 1.0);
        assert!(state.particles.is_empty());
        assert!(state.damage_numbers.is_empty());
    }

    #[test]
    fn test_damage_label() {
        assert_eq!(damage_label(3.0), "3");
        assert_eq!(damage_label(1.5), "1.5");
    }

    #[test]
    fn test_shake_decays_to_zero() {
        let mut state = GameState::new(3, Settings::default());
        state.shake(10.0);
        for _ in 0..40 {
            update_camera(&mut state);
        }
        assert_eq!(state.screen_shake, 0.0);
    }
}
