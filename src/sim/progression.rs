//! Progression: gems and XP, level-up upgrades, combo, ultimate, weapon pickups

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::buffs::check_gem_milestones;
use super::combat::{KillSource, kill_enemy};
use super::effects::{damage_label, spawn_damage_number, spawn_particles};
use super::events::{GameEvent, SoundCue};
use super::state::{GamePhase, GameState, Player};
use super::weapon::{ActivePowerup, WeaponDef, WeaponPickup};
use crate::consts::*;
use crate::error::SimError;
use crate::{angle_between, unit};

/// Number of options offered per level-up
pub const UPGRADE_CHOICES: usize = 3;

const MAX_BONUS_PIERCE: u32 = 3;
const MAX_BONUS_PROJECTILES: u32 = 4;
const MAX_CRIT_CHANCE: f32 = 0.5;
const MAX_SHIELD: u32 = 3;

/// Level-up upgrades; each maps to exactly one stat mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeId {
    Damage,
    FireRate,
    MoveSpeed,
    MaxHp,
    MultiShot,
    Pierce,
    Magnet,
    Crit,
    Regen,
    Shield,
    BlastRadius,
    DashCooldown,
    Invuln,
    UltCharge,
}

impl UpgradeId {
    pub const ALL: [UpgradeId; 14] = [
        UpgradeId::Damage,
        UpgradeId::FireRate,
        UpgradeId::MoveSpeed,
        UpgradeId::MaxHp,
        UpgradeId::MultiShot,
        UpgradeId::Pierce,
        UpgradeId::Magnet,
        UpgradeId::Crit,
        UpgradeId::Regen,
        UpgradeId::Shield,
        UpgradeId::BlastRadius,
        UpgradeId::DashCooldown,
        UpgradeId::Invuln,
        UpgradeId::UltCharge,
    ];

    pub fn name(self) -> &'static str {
        match self {
            UpgradeId::Damage => "Power Rounds",
            UpgradeId::FireRate => "Rapid Fire",
            UpgradeId::MoveSpeed => "Thrusters",
            UpgradeId::MaxHp => "Hull Plating",
            UpgradeId::MultiShot => "Multi-Shot",
            UpgradeId::Pierce => "Piercing",
            UpgradeId::Magnet => "Magnet",
            UpgradeId::Crit => "Critical Eye",
            UpgradeId::Regen => "Nanobots",
            UpgradeId::Shield => "Shield Cell",
            UpgradeId::BlastRadius => "Big Boom",
            UpgradeId::DashCooldown => "Quick Dash",
            UpgradeId::Invuln => "Phase Armor",
            UpgradeId::UltCharge => "Overcharge",
        }
    }

    /// Already at its cap, so offering it would do nothing
    pub fn is_maxed(self, player: &Player) -> bool {
        let s = &player.stats;
        match self {
            UpgradeId::MultiShot => s.bonus_projectiles >= MAX_BONUS_PROJECTILES,
            UpgradeId::Pierce => s.bonus_pierce >= MAX_BONUS_PIERCE,
            UpgradeId::Crit => s.crit_chance >= MAX_CRIT_CHANCE,
            UpgradeId::Shield => s.shield_slots >= MAX_SHIELD,
            _ => false,
        }
    }

    pub fn apply(self, player: &mut Player) {
        let s = &mut player.stats;
        match self {
            UpgradeId::Damage => s.damage_mult *= 1.2,
            UpgradeId::FireRate => s.fire_rate_mult *= 1.15,
            UpgradeId::MoveSpeed => s.speed_mult *= 1.1,
            UpgradeId::MaxHp => {
                player.max_hp += 20.0;
                player.heal(20.0);
            }
            UpgradeId::MultiShot => {
                s.bonus_projectiles = (s.bonus_projectiles + 1).min(MAX_BONUS_PROJECTILES)
            }
            UpgradeId::Pierce => s.bonus_pierce = (s.bonus_pierce + 1).min(MAX_BONUS_PIERCE),
            UpgradeId::Magnet => s.magnet_mult *= 1.3,
            UpgradeId::Crit => s.crit_chance = (s.crit_chance + 0.05).min(MAX_CRIT_CHANCE),
            UpgradeId::Regen => s.regen += 1.0,
            UpgradeId::Shield => {
                s.shield_slots = (s.shield_slots + 1).min(MAX_SHIELD);
                player.refresh_shield_cap();
                player.shield = (player.shield + 1).min(player.shield_max);
            }
            UpgradeId::BlastRadius => s.blast_radius_mult *= 1.25,
            UpgradeId::DashCooldown => s.dash_cooldown_mult *= 0.85,
            UpgradeId::Invuln => s.invuln_bonus += 0.25,
            UpgradeId::UltCharge => s.ult_gain_mult *= 1.25,
        }
    }
}

/// XP needed for the level after one requiring `current`: floor(current × 1.3) + 10
pub fn next_xp_requirement(current: u32) -> u32 {
    current * XP_GROWTH_NUM / XP_GROWTH_DEN + XP_GROWTH_ADD
}

/// Add XP, resolving every threshold crossed
pub fn award_xp(state: &mut GameState, amount: u32) {
    let p = &mut state.player;
    p.xp += amount;
    let mut gained = 0;
    while p.xp >= p.xp_next {
        p.xp -= p.xp_next;
        p.level += 1;
        p.xp_next = next_xp_requirement(p.xp_next);
        gained += 1;
    }
    if gained == 0 {
        return;
    }
    log::info!("Level up -> {} (xp {}/{})", p.level, p.xp, p.xp_next);
    state.pending_levelups += gained;
    if state.phase == GamePhase::Playing {
        offer_upgrades(state);
    }
}

/// Freeze the simulation and present a fresh set of choices
fn offer_upgrades(state: &mut GameState) {
    let mut pool: Vec<UpgradeId> = UpgradeId::ALL
        .iter()
        .copied()
        .filter(|u| !u.is_maxed(&state.player))
        .collect();
    pool.shuffle(&mut state.rng);
    pool.truncate(UPGRADE_CHOICES);

    state.phase = GamePhase::AwaitingUpgrade;
    state.upgrade_choices = pool.clone();
    let level = state.player.level + 1 - state.pending_levelups;
    state.sound(SoundCue::Powerup);
    state.emit(GameEvent::Banner(format!("Level {}!", level)));
    state.emit(GameEvent::LevelUpAvailable {
        level,
        choices: pool,
    });
}

/// Resolve the pending level-up with one of the offered upgrades
pub fn select_upgrade(state: &mut GameState, id: UpgradeId) -> Result<(), SimError> {
    if state.phase != GamePhase::AwaitingUpgrade {
        return Err(SimError::NotAwaitingUpgrade);
    }
    if !state.upgrade_choices.contains(&id) {
        return Err(SimError::UpgradeNotOffered(id));
    }

    id.apply(&mut state.player);
    log::info!("Upgrade selected: {}", id.name());
    state.emit(GameEvent::UpgradeApplied(id));
    state.pending_levelups = state.pending_levelups.saturating_sub(1);
    state.upgrade_choices.clear();

    if state.pending_levelups > 0 {
        offer_upgrades(state);
    } else {
        state.phase = GamePhase::Playing;
    }
    Ok(())
}

/// Grow the kill streak and pay out the streak bonus
pub fn register_combo_kill(state: &mut GameState) {
    let count = state.combo.register_kill();
    if count >= COMBO_BONUS_MIN {
        state.player.score += count as u64 * COMBO_BONUS_PER_KILL;
    }
}

/// Charge the ultimate from a kill worth `score`
pub fn grant_ult_charge(state: &mut GameState, score: u64) {
    let p = &mut state.player;
    let was_ready = p.ult_ready();
    let gain = score as f32 / ULT_SCORE_DIVISOR * p.stats.ult_gain_mult;
    p.ult_charge = (p.ult_charge + gain).min(p.ult_max);
    if !was_ready && p.ult_ready() {
        state.emit(GameEvent::UltimateReady);
    }
}

/// Damage every enemy in view. Consumes the full charge.
pub fn trigger_ultimate(state: &mut GameState) -> Result<usize, SimError> {
    if state.phase != GamePhase::Playing {
        return Err(SimError::NotPlaying);
    }
    if !state.player.ult_ready() {
        return Err(SimError::UltimateNotReady {
            charge: state.player.ult_charge,
            max: state.player.ult_max,
        });
    }
    state.player.ult_charge = 0.0;

    let mut hits = 0;
    for j in (0..state.enemies.len()).rev() {
        let enemy = &state.enemies[j];
        if !enemy.alive || !state.on_screen(enemy.pos, 0.0) {
            continue;
        }
        let enemy = &mut state.enemies[j];
        enemy.hp -= ULT_DAMAGE;
        enemy.flash_timer = 0.15;
        hits += 1;
        let (label_pos, dead) = (enemy.pos - Vec2::new(0.0, enemy.size), enemy.hp <= 0.0);
        spawn_damage_number(state, label_pos, damage_label(ULT_DAMAGE), 0x00ffff);
        if dead {
            kill_enemy(state, j, KillSource::Ultimate);
        }
    }
    state.compact_enemies();

    let pos = state.player.pos;
    spawn_particles(state, pos, 0x00ffff, 40, 400.0, 0.8);
    state.shake(12.0);
    state.sound(SoundCue::Ultimate);
    state.emit(GameEvent::UltimateFired { hits });
    log::info!("Ultimate fired, {} enemies hit", hits);
    Ok(hits)
}

/// Roll for a weapon pickup at a death location
pub fn maybe_drop_pickup(state: &mut GameState, pos: Vec2) {
    if state.pickups.len() >= PICKUP_GROUND_CAP || !state.rng.random_bool(PICKUP_DROP_CHANCE) {
        return;
    }
    let weapon = WeaponDef::PICKUP_POOL[state.rng.random_range(0..WeaponDef::PICKUP_POOL.len())];
    let id = state.next_entity_id();
    let bob_phase = state.rng.random_range(0.0..std::f32::consts::TAU);
    log::debug!("Dropped {} pickup", weapon.name);
    state.pickups.push(WeaponPickup {
        id,
        pos,
        weapon,
        life: PICKUP_LIFETIME,
        bob_phase,
    });
}

/// Replace any active power-up with `weapon`
pub fn equip_weapon(state: &mut GameState, weapon: WeaponDef) {
    state.powerup = Some(ActivePowerup::new(weapon));
    let pos = state.player.pos;
    spawn_particles(state, pos, 0xff3344, 20, 200.0, 0.6);
    state.sound(SoundCue::Powerup);
    state.emit(GameEvent::Banner(format!("{}!", weapon.name)));
    state.emit(GameEvent::WeaponAcquired { name: weapon.name });
}

/// Magnet, collect and expire gems
pub fn update_gems(state: &mut GameState, dt: f32) {
    let player_pos = state.player.pos;
    let magnet = GEM_MAGNET_RANGE * state.player.stats.magnet_mult;

    let mut i = state.gems.len();
    while i > 0 {
        i -= 1;
        let gem = &mut state.gems[i];
        gem.life -= dt;
        gem.bob_phase += dt * 3.0;
        gem.sparkle += dt;
        if gem.sparkle > 0.5 {
            gem.sparkle = 0.0;
        }
        if gem.life <= 0.0 {
            state.gems.remove(i);
            continue;
        }

        let d = gem.pos.distance(player_pos);
        if d < magnet {
            let pull = (1.0 - d / magnet) * GEM_PULL;
            gem.pos += unit(angle_between(gem.pos, player_pos)) * pull * dt;
        }
        if d < GEM_COLLECT_RANGE {
            let gem = state.gems.remove(i);
            let value = gem.value();
            state.player.gems += value;
            state.player.score += value as u64 * GEM_SCORE_MULT;
            spawn_particles(state, gem.pos, gem.color(), 6, 80.0, 0.3);
            state.sound(SoundCue::Gem);
            check_gem_milestones(state);
            award_xp(state, value);
        }
    }
}

/// Expire and collect weapon pickups
pub fn update_pickups(state: &mut GameState, dt: f32) {
    let player_pos = state.player.pos;
    let reach = state.player.size + PICKUP_RADIUS;

    let mut i = state.pickups.len();
    while i > 0 {
        i -= 1;
        let pickup = &mut state.pickups[i];
        pickup.life -= dt;
        pickup.bob_phase += dt * 3.0;
        if pickup.life <= 0.0 {
            state.pickups.remove(i);
            continue;
        }
        if pickup.pos.distance(player_pos) < reach {
            let pickup = state.pickups.remove(i);
            equip_weapon(state, pickup.weapon);
        }
    }
}

/// Count down the active power-up and revert to the base weapon on expiry
pub fn update_powerup(state: &mut GameState, dt: f32) {
    let Some(powerup) = state.powerup.as_mut() else {
        return;
    };
    powerup.timer -= dt;
    if powerup.timer <= 0.0 {
        let name = powerup.weapon.name;
        state.powerup = None;
        state.emit(GameEvent::WeaponExpired { name });
    }
}
