//! Weapon fire and bullet-vs-enemy resolution
//!
//! Kills never remove an enemy from the registry directly. They clear
//! `Enemy::alive`, every loop skips dead entries, and the pass ends with a
//! compaction. Splitter children appended mid-pass sit past the captured
//! loop bound and are not visited until the next pass.

use std::cmp::Ordering;

use glam::Vec2;
use rand::Rng;

use super::buffs::bonus_shots;
use super::effects::{damage_label, spawn_damage_number, spawn_particles};
use super::enemy::{DeathHook, EnemyKind, spawn_enemy};
use super::events::{GameEvent, SoundCue};
use super::progression::{grant_ult_charge, maybe_drop_pickup, register_combo_kill};
use super::state::{Bullet, GameState, Gem};
use crate::consts::*;
use crate::{angle_between, angle_delta, unit};

const HIT_COLOR: u32 = 0xffffff;
const CRIT_COLOR: u32 = 0xffdd00;
const BLAST_COLOR: u32 = 0xff8800;

/// What dealt the killing blow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillSource {
    Bullet,
    Explosion,
    /// Ultimate kills do not feed the ultimate charge
    Ultimate,
}

/// Emit one volley from the current weapon along the player's aim
pub fn fire_bullet(state: &mut GameState) {
    let weapon = state.current_weapon();
    let extra = bonus_shots(state, &weapon);
    let stats = &state.player.stats;
    let count = weapon.count + stats.bonus_projectiles + extra;
    let pierce = if weapon.pierce { PIERCE_ALL } else { stats.bonus_pierce };
    let mut damage = weapon.damage * stats.damage_mult;
    let crit_chance = stats.crit_chance;
    let base = state.player.angle;
    let origin = state.player.pos;

    let crit = crit_chance > 0.0 && state.rng.random::<f32>() < crit_chance;
    if crit {
        damage *= CRIT_MULT;
    }

    // Weapons without their own spread still fan extra projectiles
    let spread = if weapon.spread == 0.0 && count > 1 {
        MULTISHOT_SPACING * (count - 1) as f32
    } else {
        weapon.spread
    };

    for i in 0..count {
        let mut a = base;
        if count > 1 {
            a = base - spread / 2.0 + spread / (count - 1) as f32 * i as f32;
            if weapon.spread > 0.0 {
                a += state.rng.random_range(-0.03..0.03);
            }
        } else if spread > 0.0 {
            a += state.rng.random_range(-spread..spread);
        }

        let id = state.next_entity_id();
        let dir = unit(a);
        state.bullets.push(Bullet {
            id,
            pos: origin + dir * MUZZLE_OFFSET,
            vel: dir * weapon.bullet_speed,
            life: weapon.lifetime,
            damage,
            radius: weapon.bullet_size,
            pierce,
            explosive: weapon.explosive,
            homing: weapon.homing,
            weapon: weapon.kind,
            hits: Vec::new(),
            crit,
        });
    }
    state.sound(weapon.fire_cue());
}

/// Move bullets, expire them, and resolve hits
pub fn update_bullets(state: &mut GameState, dt: f32) {
    let mut i = state.bullets.len();
    while i > 0 {
        i -= 1;
        if state.bullets[i].homing {
            steer_homing(state, i, dt);
        }

        let b = &mut state.bullets[i];
        b.pos += b.vel * dt;
        b.life -= dt;
        if b.life <= 0.0 || b.out_of_world() {
            let b = state.bullets.remove(i);
            if b.explosive {
                explode(state, b.pos, b.damage);
            }
            continue;
        }

        if resolve_hits(state, i) {
            state.bullets.remove(i);
        }
    }
    state.compact_enemies();
}

/// Test bullet `bi` against every live enemy; returns true when it is spent
fn resolve_hits(state: &mut GameState, bi: usize) -> bool {
    for j in (0..state.enemies.len()).rev() {
        let enemy = &state.enemies[j];
        let bullet = &state.bullets[bi];
        if !enemy.alive || bullet.has_hit(enemy.id) {
            continue;
        }
        if bullet.pos.distance(enemy.pos) >= enemy.size + bullet.radius {
            continue;
        }

        let (enemy_id, enemy_color) = (enemy.id, enemy.kind.def().color);
        let (bpos, bvel, damage, crit, explosive) =
            (bullet.pos, bullet.vel, bullet.damage, bullet.crit, bullet.explosive);

        let enemy = &mut state.enemies[j];
        enemy.hp -= damage;
        enemy.flash_timer = 0.1;
        enemy.pos += bvel.normalize_or_zero() * BULLET_KNOCKBACK;
        let (label_pos, dead) = (enemy.pos - Vec2::new(0.0, enemy.size), enemy.hp <= 0.0);

        spawn_particles(state, bpos, enemy_color, 4, 100.0, 0.3);
        let color = if crit { CRIT_COLOR } else { HIT_COLOR };
        spawn_damage_number(state, label_pos, damage_label(damage), color);
        state.sound(SoundCue::Hit);

        if dead {
            kill_enemy(state, j, KillSource::Bullet);
        }
        if explosive {
            explode(state, bpos, damage);
        }

        let bullet = &mut state.bullets[bi];
        if (bullet.hits.len() as u32) < bullet.pierce {
            bullet.hits.push(enemy_id);
        } else {
            return true;
        }
    }
    false
}

/// Turn a homing bullet toward the nearest enemy it has not hit yet
fn steer_homing(state: &mut GameState, bi: usize, dt: f32) {
    let bullet = &state.bullets[bi];
    let target = state
        .enemies
        .iter()
        .filter(|e| e.alive && !bullet.has_hit(e.id))
        .map(|e| (e.pos, e.pos.distance_squared(bullet.pos)))
        .filter(|(_, d2)| *d2 <= HOMING_RANGE * HOMING_RANGE)
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
        .map(|(pos, _)| pos);
    let Some(target) = target else {
        return;
    };

    let speed = bullet.vel.length();
    let heading = bullet.vel.y.atan2(bullet.vel.x);
    let max_turn = HOMING_TURN_RATE * dt;
    let turn = angle_delta(heading, angle_between(bullet.pos, target)).clamp(-max_turn, max_turn);
    state.bullets[bi].vel = unit(heading + turn) * speed;
}

/// Area damage around `pos`. Returns the number of enemies caught.
pub fn explode(state: &mut GameState, pos: Vec2, bullet_damage: f32) -> usize {
    state.sound(SoundCue::Explode);
    spawn_particles(state, pos, 0xff4400, 20, 250.0, 0.5);
    spawn_particles(state, pos, 0xffcc00, 10, 180.0, 0.4);
    state.shake(10.0);

    let radius = EXPLOSION_RADIUS * state.player.stats.blast_radius_mult;
    let damage = EXPLOSION_DAMAGE.max(bullet_damage);
    let mut caught = 0;
    for j in (0..state.enemies.len()).rev() {
        let enemy = &mut state.enemies[j];
        if !enemy.alive || enemy.pos.distance(pos) >= radius {
            continue;
        }
        enemy.hp -= damage;
        enemy.flash_timer = 0.15;
        caught += 1;
        let (label_pos, dead) = (enemy.pos - Vec2::new(0.0, enemy.size), enemy.hp <= 0.0);
        spawn_damage_number(state, label_pos, damage_label(damage), BLAST_COLOR);
        if dead {
            kill_enemy(state, j, KillSource::Explosion);
        }
    }
    caught
}

/// Award everything an enemy death grants, then mark it dead.
///
/// Safe to call on an already-dead enemy: it does nothing.
pub fn kill_enemy(state: &mut GameState, idx: usize, source: KillSource) {
    let enemy = &mut state.enemies[idx];
    if !enemy.alive {
        return;
    }
    enemy.alive = false;
    let (kind, pos, elite, score) = (enemy.kind, enemy.pos, enemy.elite, enemy.score_value());
    let def = kind.def();

    state.player.score += score;
    state.player.kills += 1;
    spawn_particles(state, pos, def.color, 12, 180.0, 0.5);
    state.shake(4.0);
    state.sound(SoundCue::Kill);
    state.emit(GameEvent::EnemyKilled { kind, elite });

    let gem_id = state.next_entity_id();
    let jitter = Vec2::new(
        state.rng.random_range(-10.0..10.0),
        state.rng.random_range(-10.0..10.0),
    );
    let bob_phase = state.rng.random_range(0.0..std::f32::consts::TAU);
    state.gems.push(Gem {
        id: gem_id,
        pos: pos + jitter,
        kind: def.gem_kind,
        life: GEM_LIFETIME,
        bob_phase,
        sparkle: 0.0,
    });

    register_combo_kill(state);
    if source != KillSource::Ultimate {
        grant_ult_charge(state, score);
    }
    maybe_drop_pickup(state, pos);

    if let DeathHook::Split { count } = def.on_death {
        for _ in 0..count {
            let offset = Vec2::new(
                state.rng.random_range(-30.0..30.0),
                state.rng.random_range(-30.0..30.0),
            );
            spawn_enemy(state, EnemyKind::Chaser, pos + offset, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::state::Enemy;
    use crate::sim::weapon::{ActivePowerup, WeaponDef, WeaponKind};
    use approx::assert_relative_eq;

    fn playing_state() -> GameState {
        let mut state = GameState::new(11, Settings::default());
        state.start_run();
        state
    }

    fn place_enemy(state: &mut GameState, kind: EnemyKind, pos: Vec2) -> u32 {
        let id = state.next_entity_id();
        state.enemies.push(Enemy::new(id, kind, pos, false, 5.0));
        id
    }

    fn bullet_at(state: &mut GameState, pos: Vec2, vel: Vec2, pierce: u32) -> u32 {
        let id = state.next_entity_id();
        state.bullets.push(Bullet {
            id,
            pos,
            vel,
            life: 1.0,
            damage: 1.0,
            radius: 3.0,
            pierce,
            explosive: false,
            homing: false,
            weapon: WeaponKind::Pistol,
            hits: Vec::new(),
            crit: false,
        });
        id
    }

    #[test]
    fn test_fire_fans_bonus_projectiles_symmetrically() {
        let mut state = playing_state();
        state.player.stats.bonus_projectiles = 2;
        state.player.angle = 0.5;
        fire_bullet(&mut state);
        assert_eq!(state.bullets.len(), 3);
        let angles: Vec<f32> = state.bullets.iter().map(|b| b.vel.y.atan2(b.vel.x)).collect();
        assert_relative_eq!(angles[0], 0.5 - MULTISHOT_SPACING, epsilon = 1e-4);
        assert_relative_eq!(angles[1], 0.5, epsilon = 1e-4);
        assert_relative_eq!(angles[2], 0.5 + MULTISHOT_SPACING, epsilon = 1e-4);
    }

    #[test]
    fn test_multi_shot_buff_widens_single_shot_weapons() {
        use crate::sim::buffs::{BuffKind, MULTI_SHOT_EXTRA, activate_buff};
        let mut state = playing_state();
        activate_buff(&mut state, BuffKind::MultiShot);
        fire_bullet(&mut state);
        assert_eq!(state.bullets.len(), 1 + MULTI_SHOT_EXTRA as usize);

        state.bullets.clear();
        state.powerup = Some(ActivePowerup::new(WeaponDef::SHOTGUN));
        fire_bullet(&mut state);
        assert_eq!(state.bullets.len(), WeaponDef::SHOTGUN.count as usize);
    }

    #[test]
    fn test_fire_applies_damage_mult_and_crit() {
        let mut state = playing_state();
        state.player.stats.damage_mult = 2.0;
        state.player.stats.crit_chance = 1.0;
        fire_bullet(&mut state);
        let b = &state.bullets[0];
        assert!(b.crit);
        assert_relative_eq!(b.damage, WeaponDef::PISTOL.damage * 2.0 * CRIT_MULT);
    }

    #[test]
    fn test_fire_uses_active_powerup() {
        let mut state = playing_state();
        state.powerup = Some(ActivePowerup::new(WeaponDef::LASER));
        state.player.stats.bonus_pierce = 1;
        fire_bullet(&mut state);
        assert_eq!(state.bullets.len(), 1);
        assert_eq!(state.bullets[0].weapon, WeaponKind::Laser);
        assert_eq!(state.bullets[0].pierce, PIERCE_ALL);

        state.bullets.clear();
        state.powerup = Some(ActivePowerup::new(WeaponDef::SHOTGUN));
        fire_bullet(&mut state);
        assert_eq!(state.bullets.len(), WeaponDef::SHOTGUN.count as usize);
        assert!(state.bullets.iter().all(|b| b.pierce == 1));
    }

    #[test]
    fn test_non_piercing_bullet_hits_one_enemy() {
        let mut state = playing_state();
        let pos = Vec2::new(1000.0, 1000.0);
        place_enemy(&mut state, EnemyKind::Tank, pos);
        place_enemy(&mut state, EnemyKind::Tank, pos);
        bullet_at(&mut state, pos, Vec2::new(1.0, 0.0), 0);
        update_bullets(&mut state, 0.0);
        assert!(state.bullets.is_empty());
        let damaged = state.enemies.iter().filter(|e| e.hp < e.max_hp).count();
        assert_eq!(damaged, 1);
    }

    #[test]
    fn test_pierce_budget_allows_extra_hits() {
        let mut state = playing_state();
        let pos = Vec2::new(1000.0, 1000.0);
        for _ in 0..3 {
            place_enemy(&mut state, EnemyKind::Tank, pos);
        }
        bullet_at(&mut state, pos, Vec2::new(1.0, 0.0), 1);
        update_bullets(&mut state, 0.0);
        assert!(state.bullets.is_empty());
        let damaged = state.enemies.iter().filter(|e| e.hp < e.max_hp).count();
        assert_eq!(damaged, 2);
    }

    #[test]
    fn test_piercing_bullet_damages_each_enemy_once() {
        let mut state = playing_state();
        let pos = Vec2::new(1000.0, 1000.0);
        let eid = place_enemy(&mut state, EnemyKind::Tank, pos);
        bullet_at(&mut state, pos - Vec2::new(2.0, 0.0), Vec2::new(10.0, 0.0), PIERCE_ALL);
        for _ in 0..5 {
            update_bullets(&mut state, 0.01);
        }
        assert_eq!(state.bullets.len(), 1);
        assert_eq!(state.bullets[0].hits, vec![eid]);
        assert_relative_eq!(state.enemies[0].hp, 4.0);
    }

    #[test]
    fn test_explosive_bullet_detonates_at_world_edge() {
        let mut state = playing_state();
        let edge = Vec2::new(WORLD_SIZE - 1.0, 1000.0);
        place_enemy(&mut state, EnemyKind::Tank, edge - Vec2::new(60.0, 0.0));
        bullet_at(&mut state, edge, Vec2::new(600.0, 0.0), 0);
        state.bullets[0].explosive = true;
        state.bullets[0].damage = 3.0;
        update_bullets(&mut state, 0.05);
        assert!(state.bullets.is_empty());
        assert_relative_eq!(state.enemies[0].hp, 2.0);
        assert!(state.events.contains(&GameEvent::Sound(SoundCue::Explode)));
    }

    #[test]
    fn test_expired_explosive_detonates() {
        let mut state = playing_state();
        let pos = Vec2::new(1000.0, 1000.0);
        place_enemy(&mut state, EnemyKind::Tank, pos + Vec2::new(100.0, 0.0));
        bullet_at(&mut state, pos, Vec2::ZERO, 0);
        state.bullets[0].explosive = true;
        state.bullets[0].life = 0.01;
        update_bullets(&mut state, 0.02);
        assert!(state.bullets.is_empty());
        assert_relative_eq!(state.enemies[0].hp, 5.0 - EXPLOSION_DAMAGE);
    }

    #[test]
    fn test_piercing_explosive_detonates_on_every_hit() {
        let mut state = playing_state();
        let pos = Vec2::new(1000.0, 1000.0);
        place_enemy(&mut state, EnemyKind::Tank, pos);
        place_enemy(&mut state, EnemyKind::Tank, pos + Vec2::new(500.0, 0.0));
        bullet_at(&mut state, pos, Vec2::new(500.0, 0.0), PIERCE_ALL);
        state.bullets[0].explosive = true;
        state.bullets[0].life = 5.0;
        update_bullets(&mut state, 0.0);
        update_bullets(&mut state, 1.0);
        let blasts = state
            .events
            .iter()
            .filter(|e| **e == GameEvent::Sound(SoundCue::Explode))
            .count();
        assert_eq!(blasts, 2);
        assert_eq!(state.bullets.len(), 1);
    }

    #[test]
    fn test_explosion_scales_with_blast_mult() {
        let mut state = playing_state();
        let pos = Vec2::new(1000.0, 1000.0);
        place_enemy(&mut state, EnemyKind::Tank, pos + Vec2::new(200.0, 0.0));
        assert_eq!(explode(&mut state, pos, 1.0), 0);
        state.player.stats.blast_radius_mult = 1.5;
        assert_eq!(explode(&mut state, pos, 1.0), 1);
    }

    #[test]
    fn test_splitter_death_spawns_two_chasers() {
        let mut state = playing_state();
        let pos = Vec2::new(100.0, 100.0);
        let sid = place_enemy(&mut state, EnemyKind::Splitter, pos);
        kill_enemy(&mut state, 0, KillSource::Bullet);
        state.compact_enemies();
        assert!(state.enemies.iter().all(|e| e.id != sid));
        assert_eq!(state.enemies.len(), 2);
        for e in &state.enemies {
            assert_eq!(e.kind, EnemyKind::Chaser);
            assert!(e.pos.distance(pos) < 45.0);
        }
        assert_eq!(state.gems.len(), 1);
        assert_eq!(state.player.score, 30);
    }

    #[test]
    fn test_kill_twice_is_noop() {
        let mut state = playing_state();
        place_enemy(&mut state, EnemyKind::Chaser, Vec2::splat(500.0));
        kill_enemy(&mut state, 0, KillSource::Bullet);
        kill_enemy(&mut state, 0, KillSource::Explosion);
        assert_eq!(state.player.kills, 1);
        assert_eq!(state.gems.len(), 1);
    }

    #[test]
    fn test_bullet_kill_mid_pass_then_explosion_skips_corpse() {
        let mut state = playing_state();
        let pos = Vec2::new(1000.0, 1000.0);
        place_enemy(&mut state, EnemyKind::Chaser, pos);
        bullet_at(&mut state, pos, Vec2::new(1.0, 0.0), 0);
        state.bullets[0].explosive = true;
        update_bullets(&mut state, 0.0);
        assert_eq!(state.player.kills, 1);
        assert!(state.enemies.is_empty());
    }

    #[test]
    fn test_homing_turns_toward_target_with_limit() {
        let mut state = playing_state();
        let pos = Vec2::new(1000.0, 1000.0);
        place_enemy(&mut state, EnemyKind::Tank, pos + Vec2::new(0.0, 200.0));
        bullet_at(&mut state, pos, Vec2::new(400.0, 0.0), 0);
        state.bullets[0].homing = true;
        let dt = 0.1;
        update_bullets(&mut state, dt);
        let heading = state.bullets[0].vel.y.atan2(state.bullets[0].vel.x);
        assert_relative_eq!(heading, HOMING_TURN_RATE * dt, epsilon = 1e-4);
        assert_relative_eq!(state.bullets[0].vel.length(), 400.0, epsilon = 1e-2);
    }
}
