//! Enemy spawn scheduling
//!
//! Spawns are telegraphed: each scheduled enemy first becomes a
//! [`SpawnWarning`] keyed to the run clock, then materializes at the same
//! position on the tick that reaches `spawn_at`. The run clock is a float sum
//! of tick lengths, so "reaches" allows half a fixed step of slack. Warnings
//! live in `GameState`, so starting a new run discards them along with
//! everything else.

use rand::Rng;
use serde::Serialize;

use super::effects::spawn_particles;
use super::enemy::{EnemyKind, spawn_enemy};
use super::events::GameEvent;
use super::state::{GameState, SpawnWarning};
use crate::consts::*;
use crate::{clamp_to_world, unit};

/// Rounding slack on the run clock when checking warnings
const SPAWN_DUE_SLACK: f32 = SIM_DT * 0.5;

/// Spawn timers. Reset with the rest of the run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Spawner {
    /// Seconds since the last burst
    pub spawn_timer: f32,
    /// Seconds since the last elite roll
    pub elite_timer: f32,
    /// The next burst is flagged elite
    pub elite_pending: bool,
}

/// Bursts per second at run time `t`
pub fn spawn_rate(t: f32) -> f32 {
    1.0 + t * SPAWN_RATE_GROWTH
}

/// Enemies per burst at run time `t`
pub fn burst_size(t: f32) -> u32 {
    (1 + (t / BURST_STEP_SECS).floor() as u32).min(MAX_BURST)
}

/// Kinds unlocked by run time `t`
pub fn eligible_kinds(t: f32) -> Vec<EnemyKind> {
    EnemyKind::ALL
        .iter()
        .copied()
        .filter(|k| t >= k.unlock_time())
        .collect()
}

/// Advance the spawn clock: materialize due warnings, schedule bursts, roll
/// elites and advance the wave label
pub fn update_spawner(state: &mut GameState, dt: f32) {
    materialize_due(state);

    state.spawner.elite_timer += dt;
    if state.spawner.elite_timer >= ELITE_INTERVAL {
        state.spawner.elite_timer = 0.0;
        if state.rng.random_bool(ELITE_CHANCE) {
            log::debug!("Elite burst armed at {:.1}s", state.elapsed);
            state.spawner.elite_pending = true;
            state.emit(GameEvent::EliteBurst);
            state.emit(GameEvent::Banner("Elite incoming!".to_string()));
        }
    }

    state.spawner.spawn_timer += dt;
    let rate = spawn_rate(state.elapsed);
    if state.spawner.spawn_timer >= 1.0 / rate {
        state.spawner.spawn_timer -= 1.0 / rate;
        schedule_burst(state);
    }

    state.wave_timer += dt;
    if state.wave_timer >= WAVE_DURATION {
        state.wave_timer -= WAVE_DURATION;
        state.wave += 1;
        let wave = state.wave;
        log::info!("Wave {} at {:.1}s", wave, state.elapsed);
        state.emit(GameEvent::WaveAdvanced { wave });
        state.emit(GameEvent::Banner(format!("Wave {}", wave)));
    }
}

/// Queue one burst of warnings around the player
pub fn schedule_burst(state: &mut GameState) {
    let t = state.elapsed;
    let kinds = eligible_kinds(t);
    if kinds.is_empty() {
        return;
    }
    let elite = std::mem::take(&mut state.spawner.elite_pending);

    for _ in 0..burst_size(t) {
        if state.live_enemy_count() + state.warnings.len() >= MAX_ENEMIES {
            log::debug!("Enemy cap reached, burst truncated");
            break;
        }
        let kind = kinds[state.rng.random_range(0..kinds.len())];
        let angle = state.rng.random_range(0.0..std::f32::consts::TAU);
        let dist = state.rng.random_range(SPAWN_DIST_MIN..SPAWN_DIST_MAX);
        let pos = clamp_to_world(state.player.pos + unit(angle) * dist, SPAWN_MARGIN);
        let id = state.next_entity_id();
        state.warnings.push(SpawnWarning {
            id,
            pos,
            kind,
            elite,
            created_at: t,
            spawn_at: t + SPAWN_WARNING_LEAD,
        });
    }
}

/// Turn every warning whose time has come into an enemy at its recorded position
pub fn materialize_due(state: &mut GameState) {
    let due_by = state.elapsed + SPAWN_DUE_SLACK;
    if !state.warnings.iter().any(|w| w.spawn_at <= due_by) {
        return;
    }
    let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut state.warnings)
        .into_iter()
        .partition(|w| w.spawn_at <= due_by);
    state.warnings = pending;

    for w in due {
        if spawn_enemy(state, w.kind, w.pos, w.elite).is_some() {
            spawn_particles(state, w.pos, w.kind.def().color, 6, 100.0, 0.3);
        }
    }
}
