//! Enemy kinds, behavior table, AI and contact damage

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::effects::{damage_label, spawn_damage_number, spawn_particles};
use super::events::{GameEvent, RunSummary, SoundCue};
use super::state::{Enemy, GamePhase, GameState};
use crate::consts::*;
use crate::{angle_between, clamp_to_world, unit};

/// Closed set of enemy kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Chaser,
    Dasher,
    Tank,
    Splitter,
}

/// How an enemy moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    /// Straight at the player
    Chase,
    /// Chase, then periodically burst toward the player
    DashCharge,
}

/// What happens when an enemy dies (beyond the common rewards)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathHook {
    None,
    /// Split into `count` chasers
    Split { count: u32 },
}

/// Per-kind behavior and balance
#[derive(Debug, Clone, Copy)]
pub struct EnemyDef {
    pub hp: f32,
    pub speed: f32,
    pub size: f32,
    pub color: u32,
    /// Contact damage dealt to the player
    pub damage: f32,
    pub score: u64,
    pub gem_kind: u8,
    pub movement: Movement,
    pub on_death: DeathHook,
}

/// Dasher tuning
pub const DASH_TRIGGER_RANGE: f32 = 300.0;
pub const DASH_BURST_SPEED: f32 = 400.0;
pub const DASH_BURST_TIME: f32 = 0.25;

impl EnemyKind {
    pub const ALL: [EnemyKind; 4] = [
        EnemyKind::Chaser,
        EnemyKind::Dasher,
        EnemyKind::Tank,
        EnemyKind::Splitter,
    ];

    pub fn def(self) -> EnemyDef {
        match self {
            EnemyKind::Chaser => EnemyDef {
                hp: 1.0,
                speed: 100.0,
                size: 14.0,
                color: 0xff4455,
                damage: 12.0,
                score: 10,
                gem_kind: 0,
                movement: Movement::Chase,
                on_death: DeathHook::None,
            },
            EnemyKind::Dasher => EnemyDef {
                hp: 1.0,
                speed: 70.0,
                size: 12.0,
                color: 0xff8800,
                damage: 15.0,
                score: 20,
                gem_kind: 1,
                movement: Movement::DashCharge,
                on_death: DeathHook::None,
            },
            EnemyKind::Tank => EnemyDef {
                hp: 5.0,
                speed: 55.0,
                size: 22.0,
                color: 0xaa44ff,
                damage: 25.0,
                score: 50,
                gem_kind: 2,
                movement: Movement::Chase,
                on_death: DeathHook::None,
            },
            EnemyKind::Splitter => EnemyDef {
                hp: 2.0,
                speed: 90.0,
                size: 16.0,
                color: 0x44dd66,
                damage: 10.0,
                score: 30,
                gem_kind: 3,
                movement: Movement::Chase,
                on_death: DeathHook::Split { count: 2 },
            },
        }
    }

    /// Seconds of run time before this kind can spawn
    pub fn unlock_time(self) -> f32 {
        match self {
            EnemyKind::Chaser => 0.0,
            EnemyKind::Dasher => 30.0,
            EnemyKind::Tank => 60.0,
            EnemyKind::Splitter => 90.0,
        }
    }
}

impl Enemy {
    pub fn new(id: u32, kind: EnemyKind, pos: Vec2, elite: bool, initial_dash_cooldown: f32) -> Self {
        let def = kind.def();
        let (hp, size) = if elite {
            (def.hp * ELITE_HP_MULT, def.size * ELITE_SIZE_MULT)
        } else {
            (def.hp, def.size)
        };
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            hp,
            max_hp: hp,
            size,
            dash_timer: 0.0,
            dash_cooldown: initial_dash_cooldown,
            flash_timer: 0.0,
            elite,
            alive: true,
        }
    }

    /// Score awarded on death
    pub fn score_value(&self) -> u64 {
        let base = self.kind.def().score;
        if self.elite { base * ELITE_SCORE_MULT } else { base }
    }

    /// Advance movement for one tick
    pub fn step(&mut self, target: Vec2, dt: f32, rng: &mut impl Rng) {
        let def = self.kind.def();
        let a = angle_between(self.pos, target);
        match def.movement {
            Movement::Chase => {
                self.vel = unit(a) * def.speed;
            }
            Movement::DashCharge => {
                if self.is_dashing() {
                    self.dash_timer -= dt;
                } else {
                    self.dash_cooldown -= dt;
                    if self.dash_cooldown <= 0.0 && self.pos.distance(target) < DASH_TRIGGER_RANGE {
                        // Velocity is locked for the whole burst
                        self.dash_timer = DASH_BURST_TIME;
                        self.dash_cooldown = rng.random_range(2.0..4.0);
                        self.vel = unit(a) * DASH_BURST_SPEED;
                    } else {
                        self.vel = unit(a) * def.speed;
                    }
                }
            }
        }
        self.pos = clamp_to_world(self.pos + self.vel * dt, ENEMY_MARGIN);
        if self.flash_timer > 0.0 {
            self.flash_timer -= dt;
        }
    }
}

/// Queue-free spawn at a fixed position. Silently dropped at the enemy cap.
pub fn spawn_enemy(state: &mut GameState, kind: EnemyKind, pos: Vec2, elite: bool) -> Option<u32> {
    if state.live_enemy_count() >= MAX_ENEMIES {
        log::debug!("Enemy cap reached, dropping {:?} spawn", kind);
        return None;
    }
    let id = state.next_entity_id();
    let cooldown = state.rng.random_range(1.0..3.0);
    let pos = clamp_to_world(pos, SPAWN_MARGIN);
    state.enemies.push(Enemy::new(id, kind, pos, elite, cooldown));
    Some(id)
}

/// Move every enemy and resolve contact damage against the player
pub fn update_enemies(state: &mut GameState, dt: f32) {
    let player_pos = state.player.pos;
    for i in 0..state.enemies.len() {
        if !state.enemies[i].alive {
            continue;
        }
        let enemy = &mut state.enemies[i];
        enemy.step(player_pos, dt, &mut state.rng);

        let (pos, size, damage) = (enemy.pos, enemy.size, enemy.kind.def().damage);
        if state.player.is_invulnerable() || pos.distance(state.player.pos) >= size + state.player.size {
            continue;
        }
        resolve_contact(state, pos, damage);
        if state.phase == GamePhase::GameOver {
            return;
        }
    }
}

/// An enemy at `enemy_pos` touched the player
fn resolve_contact(state: &mut GameState, enemy_pos: Vec2, damage: f32) {
    let player_pos = state.player.pos;

    if state.player.shield > 0 {
        let p = &mut state.player;
        p.shield -= 1;
        p.shield_timer = 0.0;
        p.grant_invuln(SHIELD_BLOCK_INVULN);
        spawn_particles(state, player_pos, 0x00aaff, 8, 150.0, 0.4);
        spawn_damage_number(state, player_pos - Vec2::new(0.0, 20.0), "BLOCKED".to_string(), 0x00aaff);
        state.emit(GameEvent::ShieldBlocked);
        return;
    }

    let p = &mut state.player;
    p.take_damage(damage);
    p.shield_timer = 0.0;
    p.grant_invuln(INVULN_TIME + p.stats.invuln_bonus);
    let knock = unit(angle_between(enemy_pos, p.pos)) * HIT_KNOCKBACK;
    p.pos = clamp_to_world(p.pos + knock, PLAYER_MARGIN);

    spawn_particles(state, player_pos, 0xff3366, 10, 150.0, 0.4);
    spawn_damage_number(
        state,
        player_pos - Vec2::new(0.0, 20.0),
        damage_label(damage),
        0xff3366,
    );
    state.shake(8.0);
    state.sound(SoundCue::Hurt);
    state.emit(GameEvent::PlayerHit { damage });

    if state.player.hp > 0.0 {
        return;
    }

    state.player.lives = state.player.lives.saturating_sub(1);
    if state.player.lives == 0 {
        game_over(state);
        return;
    }
    let p = &mut state.player;
    p.hp = p.max_hp;
    p.grant_invuln(RESPAWN_INVULN_TIME + p.stats.invuln_bonus);
    let lives_left = p.lives;
    let pos = p.pos;
    spawn_particles(state, pos, 0xff3366, 20, 200.0, 0.6);
    log::info!("Life lost, {} remaining", lives_left);
    state.emit(GameEvent::LifeLost { lives_left });
}

fn game_over(state: &mut GameState) {
    state.phase = GamePhase::GameOver;
    let p = &state.player;
    let summary = RunSummary {
        score: p.score,
        kills: p.kills,
        gems: p.gems,
        level: p.level,
        best_combo: state.combo.best,
        wave: state.wave,
        elapsed: state.elapsed,
    };
    log::info!(
        "Game over: score {} kills {} wave {} time {}",
        summary.score,
        summary.kills,
        summary.wave,
        summary.time_label()
    );
    state.sound(SoundCue::GameOver);
    state.emit(GameEvent::GameOver(summary));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn playing_state() -> GameState {
        let mut state = GameState::new(42, Settings::default());
        state.start_run();
        state
    }

    #[test]
    fn test_chaser_moves_toward_target() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut e = Enemy::new(1, EnemyKind::Chaser, Vec2::new(100.0, 100.0), false, 1.0);
        let target = Vec2::new(500.0, 100.0);
        let before = e.pos.distance(target);
        e.step(target, 0.1, &mut rng);
        assert!((before - e.pos.distance(target) - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_dasher_bursts_when_ready_and_in_range() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut e = Enemy::new(1, EnemyKind::Dasher, Vec2::new(1000.0, 1000.0), false, 0.05);
        let target = Vec2::new(1200.0, 1000.0);
        e.step(target, 0.1, &mut rng);
        assert!(e.is_dashing());
        assert!((e.vel.length() - DASH_BURST_SPEED).abs() < 1e-3);
        assert!(e.dash_cooldown >= 2.0 && e.dash_cooldown < 4.0);

        // Burst direction stays locked even if the target moves
        let locked = e.vel;
        e.step(Vec2::new(1000.0, 1500.0), 0.1, &mut rng);
        assert_eq!(e.vel, locked);

        e.step(target, 0.1, &mut rng);
        e.step(target, 0.1, &mut rng);
        assert!(!e.is_dashing());
        e.step(target, 0.1, &mut rng);
        assert!((e.vel.length() - EnemyKind::Dasher.def().speed).abs() < 1e-3);
    }

    #[test]
    fn test_dasher_waits_out_of_range() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut e = Enemy::new(1, EnemyKind::Dasher, Vec2::new(1000.0, 1000.0), false, 0.0);
        e.step(Vec2::new(2000.0, 1000.0), 0.1, &mut rng);
        assert!(!e.is_dashing());
    }

    #[test]
    fn test_enemy_clamped_to_world() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut e = Enemy::new(1, EnemyKind::Chaser, Vec2::new(5.0, 5.0), false, 1.0);
        e.step(Vec2::new(-100.0, -100.0), 0.5, &mut rng);
        assert_eq!(e.pos, Vec2::splat(ENEMY_MARGIN));
    }

    #[test]
    fn test_elite_multiplies_hp_and_size() {
        let e = Enemy::new(1, EnemyKind::Tank, Vec2::ZERO, true, 1.0);
        assert_eq!(e.hp, 25.0);
        assert_eq!(e.size, 44.0);
        assert_eq!(e.score_value(), 250);
    }

    #[test]
    fn test_contact_damage_and_knockback() {
        let mut state = playing_state();
        let ppos = state.player.pos;
        spawn_enemy(&mut state, EnemyKind::Tank, ppos + Vec2::new(10.0, 0.0), false);
        update_enemies(&mut state, 0.0);
        assert_eq!(state.player.hp, PLAYER_MAX_HP - 25.0);
        assert!(state.player.is_invulnerable());
        assert!(state.player.pos.x < ppos.x);

        // Invulnerable: no further damage
        update_enemies(&mut state, 0.0);
        assert_eq!(state.player.hp, PLAYER_MAX_HP - 25.0);
    }

    #[test]
    fn test_shield_blocks_contact() {
        let mut state = playing_state();
        state.player.shield = 1;
        state.player.shield_max = 1;
        let ppos = state.player.pos;
        spawn_enemy(&mut state, EnemyKind::Chaser, ppos, false);
        update_enemies(&mut state, 0.0);
        assert_eq!(state.player.hp, PLAYER_MAX_HP);
        assert_eq!(state.player.shield, 0);
        assert!(state.drain_events().contains(&GameEvent::ShieldBlocked));
    }

    #[test]
    fn test_lethal_hit_costs_a_life_and_heals() {
        let mut state = playing_state();
        state.player.hp = 5.0;
        let ppos = state.player.pos;
        spawn_enemy(&mut state, EnemyKind::Chaser, ppos, false);
        update_enemies(&mut state, 0.0);
        assert_eq!(state.player.lives, PLAYER_LIVES - 1);
        assert_eq!(state.player.hp, state.player.max_hp);
        assert!(state.player.invuln_timer >= RESPAWN_INVULN_TIME);
    }

    #[test]
    fn test_respawn_invuln_includes_upgrade_bonus() {
        let mut state = playing_state();
        state.player.hp = 5.0;
        state.player.stats.invuln_bonus = 1.0;
        let ppos = state.player.pos;
        spawn_enemy(&mut state, EnemyKind::Chaser, ppos, false);
        update_enemies(&mut state, 0.0);
        assert_eq!(state.player.lives, PLAYER_LIVES - 1);
        assert!(state.player.invuln_timer >= RESPAWN_INVULN_TIME + 1.0);
    }

    #[test]
    fn test_contact_restarts_shield_recharge() {
        use crate::sim::player::update_player;
        use crate::sim::tick::TickInput;
        let idle = TickInput::default();

        // A block spends the charge and restarts the idle clock
        let mut state = playing_state();
        state.player.shield = 1;
        state.player.shield_max = 1;
        state.player.shield_timer = 7.9;
        let ppos = state.player.pos;
        spawn_enemy(&mut state, EnemyKind::Chaser, ppos, false);
        update_enemies(&mut state, 0.0);
        assert_eq!(state.player.shield, 0);
        assert_eq!(state.player.shield_timer, 0.0);
        update_player(&mut state, &idle, 7.9);
        assert_eq!(state.player.shield, 0);
        update_player(&mut state, &idle, 0.2);
        assert_eq!(state.player.shield, 1);

        // So does a hit taken with no charge left
        let mut state = playing_state();
        state.player.shield = 0;
        state.player.shield_max = 1;
        state.player.shield_timer = 7.9;
        let ppos = state.player.pos;
        spawn_enemy(&mut state, EnemyKind::Chaser, ppos, false);
        update_enemies(&mut state, 0.0);
        assert!(state.player.hp < PLAYER_MAX_HP);
        assert_eq!(state.player.shield_timer, 0.0);
        update_player(&mut state, &idle, 7.9);
        assert_eq!(state.player.shield, 0);
        update_player(&mut state, &idle, 0.2);
        assert_eq!(state.player.shield, 1);
    }

    #[test]
    fn test_last_life_ends_run() {
        let mut state = playing_state();
        state.player.hp = 5.0;
        state.player.lives = 1;
        let ppos = state.player.pos;
        spawn_enemy(&mut state, EnemyKind::Chaser, ppos, false);
        update_enemies(&mut state, 0.0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.player.hp, 0.0);
        assert!(
            state
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::GameOver(_)))
        );
    }

    #[test]
    fn test_spawn_respects_cap() {
        let mut state = playing_state();
        for _ in 0..MAX_ENEMIES {
            assert!(spawn_enemy(&mut state, EnemyKind::Chaser, Vec2::splat(300.0), false).is_some());
        }
        assert!(spawn_enemy(&mut state, EnemyKind::Chaser, Vec2::splat(300.0), false).is_none());
        assert_eq!(state.enemies.len(), MAX_ENEMIES);
    }
}
