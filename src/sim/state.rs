//! Game state and core simulation types
//!
//! `GameState` is the world aggregate: every registry lives here and is only
//! mutated from inside a tick or a lifecycle call.

use std::collections::VecDeque;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::buffs::{ActiveBuff, BuffSource};
use super::enemy::EnemyKind;
use super::events::{GameEvent, SoundCue};
use super::progression::UpgradeId;
use super::spawner::Spawner;
use super::weapon::{ActivePowerup, WeaponDef, WeaponKind, WeaponPickup};
use crate::consts::*;
use crate::settings::Settings;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    /// No run in progress
    Menu,
    /// Active gameplay
    Playing,
    /// Simulation frozen until an upgrade is chosen
    AwaitingUpgrade,
    /// Lives exhausted
    GameOver,
}

/// Stat modifiers granted by upgrades
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStats {
    pub speed_mult: f32,
    pub fire_rate_mult: f32,
    pub damage_mult: f32,
    pub bonus_projectiles: u32,
    pub bonus_pierce: u32,
    pub magnet_mult: f32,
    /// Probability in [0, 1]
    pub crit_chance: f32,
    /// HP healed per second
    pub regen: f32,
    pub blast_radius_mult: f32,
    pub dash_cooldown_mult: f32,
    /// Extra seconds added to the post-hit invulnerability window
    pub invuln_bonus: f32,
    pub ult_gain_mult: f32,
    /// Shield capacity bought with upgrades
    pub shield_slots: u32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            speed_mult: 1.0,
            fire_rate_mult: 1.0,
            damage_mult: 1.0,
            bonus_projectiles: 0,
            bonus_pierce: 0,
            magnet_mult: 1.0,
            crit_chance: 0.0,
            regen: 0.0,
            blast_radius_mult: 1.0,
            dash_cooldown_mult: 1.0,
            invuln_bonus: 0.0,
            ult_gain_mult: 1.0,
            shield_slots: 0,
        }
    }
}

/// The player ship
#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub pos: Vec2,
    /// Normalized movement intent from the last tick
    pub move_dir: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub lives: u32,
    pub score: u64,
    pub gems: u32,
    pub kills: u32,
    pub level: u32,
    pub xp: u32,
    pub xp_next: u32,
    /// Facing / aim angle (radians)
    pub angle: f32,
    pub fire_timer: f32,
    pub invuln_timer: f32,
    pub dash_timer: f32,
    pub dash_cooldown: f32,
    pub dash_angle: f32,
    /// Collision radius
    pub size: f32,
    pub regen_timer: f32,
    pub shield: u32,
    /// Effective capacity: upgrade slots, raised while a shield buff runs
    pub shield_max: u32,
    pub shield_boost: bool,
    /// Seconds since the last hit, drives shield recharge
    pub shield_timer: f32,
    pub ult_charge: f32,
    pub ult_max: f32,
    pub stats: PlayerStats,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::splat(WORLD_SIZE / 2.0),
            move_dir: Vec2::ZERO,
            hp: PLAYER_MAX_HP,
            max_hp: PLAYER_MAX_HP,
            lives: PLAYER_LIVES,
            score: 0,
            gems: 0,
            kills: 0,
            level: 1,
            xp: 0,
            xp_next: XP_START,
            angle: 0.0,
            fire_timer: 0.0,
            invuln_timer: 0.0,
            dash_timer: 0.0,
            dash_cooldown: 0.0,
            dash_angle: 0.0,
            size: PLAYER_SIZE,
            regen_timer: 0.0,
            shield: 0,
            shield_max: 0,
            shield_boost: false,
            shield_timer: 0.0,
            ult_charge: 0.0,
            ult_max: ULT_MAX,
            stats: PlayerStats::default(),
        }
    }
}

impl Player {
    pub fn is_invulnerable(&self) -> bool {
        self.invuln_timer > 0.0
    }

    /// Extend invulnerability to at least `secs`
    pub fn grant_invuln(&mut self, secs: f32) {
        self.invuln_timer = self.invuln_timer.max(secs);
    }

    pub fn heal(&mut self, amount: f32) {
        self.hp = (self.hp + amount).clamp(0.0, self.max_hp);
    }

    /// Subtract hp, never below zero
    pub fn take_damage(&mut self, amount: f32) {
        self.hp = (self.hp - amount.max(0.0)).max(0.0);
    }

    pub fn is_dashing(&self) -> bool {
        self.dash_timer > 0.0
    }

    pub fn ult_ready(&self) -> bool {
        self.ult_charge >= self.ult_max
    }

    /// Recompute `shield_max` from slots and boost, dropping excess charges
    pub fn refresh_shield_cap(&mut self) {
        self.shield_max = if self.shield_boost {
            self.stats.shield_slots.max(BUFF_SHIELD_CHARGES)
        } else {
            self.stats.shield_slots
        };
        self.shield = self.shield.min(self.shield_max);
    }
}

/// An enemy entity
#[derive(Debug, Clone, Serialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub size: f32,
    /// Remaining burst time (dasher only)
    pub dash_timer: f32,
    /// Time until the next burst may start (dasher only)
    pub dash_cooldown: f32,
    pub flash_timer: f32,
    pub elite: bool,
    /// Cleared when killed; dead enemies are compacted out at the end of a pass
    #[serde(skip)]
    pub alive: bool,
}

impl Enemy {
    pub fn is_dashing(&self) -> bool {
        self.dash_timer > 0.0
    }
}

/// A projectile
#[derive(Debug, Clone, Serialize)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds remaining
    pub life: f32,
    pub damage: f32,
    pub radius: f32,
    /// How many enemies it may pass through before removal
    pub pierce: u32,
    pub explosive: bool,
    pub homing: bool,
    pub weapon: WeaponKind,
    /// Ids of enemies already damaged by this bullet
    pub hits: Vec<u32>,
    pub crit: bool,
}

impl Bullet {
    pub fn has_hit(&self, enemy_id: u32) -> bool {
        self.hits.contains(&enemy_id)
    }

    pub fn out_of_world(&self) -> bool {
        self.pos.x < 0.0 || self.pos.x > WORLD_SIZE || self.pos.y < 0.0 || self.pos.y > WORLD_SIZE
    }
}

/// Experience gem
#[derive(Debug, Clone, Serialize)]
pub struct Gem {
    pub id: u32,
    pub pos: Vec2,
    /// Index into the gem value table
    pub kind: u8,
    pub life: f32,
    pub bob_phase: f32,
    pub sparkle: f32,
}

impl Gem {
    /// Palette value table indexed by `kind`
    pub const VALUES: [u32; 4] = [1, 2, 5, 3];
    pub const COLORS: [u32; 4] = [0x4488ff, 0x44ff88, 0xffcc00, 0xcc66ff];

    pub fn value(&self) -> u32 {
        Self::VALUES[self.kind as usize % Self::VALUES.len()]
    }

    pub fn color(&self) -> u32 {
        Self::COLORS[self.kind as usize % Self::COLORS.len()]
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
}

/// Floating damage/label text
#[derive(Debug, Clone, Serialize)]
pub struct DamageNumber {
    pub pos: Vec2,
    pub text: String,
    pub color: u32,
    pub life: f32,
    pub max_life: f32,
}

/// Telegraphed spawn: the enemy appears at `pos` once `spawn_at` is reached
#[derive(Debug, Clone, Serialize)]
pub struct SpawnWarning {
    pub id: u32,
    pub pos: Vec2,
    pub kind: EnemyKind,
    pub elite: bool,
    /// Run time (seconds) the warning was issued
    pub created_at: f32,
    /// Run time (seconds) the enemy materializes
    pub spawn_at: f32,
}

/// Kill streak
#[derive(Debug, Clone, Default, Serialize)]
pub struct Combo {
    pub count: u32,
    /// Seconds left before the streak lapses
    pub timer: f32,
    pub best: u32,
}

impl Combo {
    /// Register a kill and return the new streak length
    pub fn register_kill(&mut self) -> u32 {
        self.count += 1;
        self.timer = COMBO_WINDOW;
        self.best = self.best.max(self.count);
        self.count
    }

    pub fn decay(&mut self, dt: f32) {
        if self.count == 0 {
            return;
        }
        self.timer -= dt;
        if self.timer <= 0.0 {
            self.timer = 0.0;
            self.count = 0;
        }
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub settings: Settings,
    pub phase: GamePhase,
    /// Seconds of simulated run time
    pub elapsed: f32,
    /// Informational difficulty label (1-based)
    pub wave: u32,
    pub wave_timer: f32,
    pub player: Player,
    pub bullets: Vec<Bullet>,
    /// Live enemies (sorted by id for determinism)
    pub enemies: Vec<Enemy>,
    pub gems: Vec<Gem>,
    pub pickups: Vec<WeaponPickup>,
    pub warnings: Vec<SpawnWarning>,
    pub powerup: Option<ActivePowerup>,
    /// Timed stat buffs from gem milestones, at most one per kind
    pub buffs: Vec<ActiveBuff>,
    /// Milestones already paid out this run
    pub buff_claims: Vec<BuffSource>,
    pub combo: Combo,
    pub spawner: Spawner,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub damage_numbers: VecDeque<DamageNumber>,
    /// Camera center in world space
    pub camera: Vec2,
    pub screen_shake: f32,
    /// Level-ups earned but not yet resolved
    pub pending_levelups: u32,
    pub upgrade_choices: Vec<UpgradeId>,
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed, sitting at the menu
    pub fn new(seed: u64, settings: Settings) -> Self {
        let player = Player::default();
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            settings,
            phase: GamePhase::Menu,
            elapsed: 0.0,
            wave: 1,
            wave_timer: 0.0,
            camera: player.pos,
            player,
            bullets: Vec::new(),
            enemies: Vec::new(),
            gems: Vec::new(),
            pickups: Vec::new(),
            warnings: Vec::new(),
            powerup: None,
            buffs: Vec::new(),
            buff_claims: Vec::new(),
            combo: Combo::default(),
            spawner: Spawner::default(),
            particles: Vec::new(),
            damage_numbers: VecDeque::new(),
            screen_shake: 0.0,
            pending_levelups: 0,
            upgrade_choices: Vec::new(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Discard the previous run and begin a fresh one.
    ///
    /// Scheduled spawns die with the old registries.
    pub fn start_run(&mut self) {
        let seed = self.seed;
        let settings = self.settings.clone();
        *self = Self::new(seed, settings);
        self.phase = GamePhase::Playing;
        log::info!("Run started with seed: {}", seed);
    }

    /// Weapon currently in the player's hands
    pub fn current_weapon(&self) -> WeaponDef {
        self.powerup
            .as_ref()
            .map(|p| p.weapon)
            .unwrap_or(WeaponDef::PISTOL)
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn sound(&mut self, cue: SoundCue) {
        self.events.push(GameEvent::Sound(cue));
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Raise screen shake to at least `intensity`
    pub fn shake(&mut self, intensity: f32) {
        if self.settings.effective_screen_shake() {
            self.screen_shake = self.screen_shake.max(intensity);
        }
    }

    /// Live enemies, skipping ones killed earlier in the current pass
    pub fn live_enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|e| e.alive)
    }

    pub fn live_enemy_count(&self) -> usize {
        self.live_enemies().count()
    }

    /// Drop enemies killed during the pass
    pub fn compact_enemies(&mut self) {
        self.enemies.retain(|e| e.alive);
    }

    /// Whether a world point lies inside the visible viewport
    pub fn on_screen(&self, pos: Vec2, pad: f32) -> bool {
        let half = Vec2::new(
            self.settings.viewport_width / 2.0,
            self.settings.viewport_height / 2.0,
        ) + Vec2::splat(pad);
        let d = (pos - self.camera).abs();
        d.x <= half.x && d.y <= half.y
    }
}
