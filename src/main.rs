//! Neon Survivors headless runner
//!
//! Plays a scripted run through the frame driver and logs what happens.
//! Usage: `neon-survivors [seed] [settings.json]`

use std::process::ExitCode;

use neon_survivors::consts::SIM_DT;
use neon_survivors::sim::{FrameDriver, GameEvent, GamePhase, GameState, Snapshot, TickInput};
use neon_survivors::{ControlMode, Settings};

const DEFAULT_SEED: u64 = 0x5eed;
/// Simulated seconds before the bot gives up
const MAX_RUN_SECS: f32 = 600.0;
const DASH_EVERY_SECS: f32 = 3.0;

fn load_settings(path: Option<String>) -> Settings {
    let Some(path) = path else {
        return Settings {
            control_mode: ControlMode::AutoAim,
            ..Settings::default()
        };
    };
    match std::fs::read_to_string(&path) {
        Ok(json) => match Settings::from_json(&json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring settings in {}: {}", path, e);
                Settings::default()
            }
        },
        Err(e) => {
            log::warn!("Could not read {}: {}", path, e);
            Settings::default()
        }
    }
}

/// Circle the arena, always firing, with a periodic dash
fn scripted_input(elapsed: f32) -> TickInput {
    let heading = elapsed * 0.4;
    let dash_phase = elapsed % DASH_EVERY_SECS;
    TickInput {
        move_x: heading.cos(),
        move_y: heading.sin(),
        fire: true,
        dash: dash_phase < SIM_DT,
        aim_angle: heading + std::f32::consts::FRAC_PI_2,
    }
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Neon Survivors (headless) starting...");

    let mut args = std::env::args().skip(1);
    let seed = match args.next().map(|s| s.parse::<u64>()) {
        None => DEFAULT_SEED,
        Some(Ok(seed)) => seed,
        Some(Err(e)) => {
            eprintln!("invalid seed: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let settings = load_settings(args.next());

    let mut state = GameState::new(seed, settings);
    state.start_run();
    let mut driver = FrameDriver::new();
    let mut summary = None;

    while state.elapsed < MAX_RUN_SECS {
        let input = scripted_input(state.elapsed);
        driver.advance(&mut state, &input, SIM_DT);

        for event in state.drain_events() {
            match event {
                GameEvent::Banner(text) => log::info!("[{:.1}s] {}", state.elapsed, text),
                GameEvent::UltimateFired { hits } => log::info!("Ultimate hit {} enemies", hits),
                GameEvent::GameOver(s) => summary = Some(s),
                _ => {}
            }
        }

        match state.phase {
            GamePhase::AwaitingUpgrade => {
                // Bot always takes the first offer
                if let Some(&choice) = state.upgrade_choices.first() {
                    if let Err(e) = state.select_upgrade(choice) {
                        log::warn!("Upgrade rejected: {}", e);
                    }
                }
            }
            GamePhase::Playing if state.player.ult_ready() => {
                if let Err(e) = state.trigger_ultimate() {
                    log::warn!("Ultimate rejected: {}", e);
                }
            }
            GamePhase::GameOver | GamePhase::Menu => break,
            _ => {}
        }
    }

    match summary {
        Some(s) => println!(
            "Game over  score {}  kills {}  level {}  wave {}  best combo {}  time {}",
            s.score,
            s.kills,
            s.level,
            s.wave,
            s.best_combo,
            s.time_label()
        ),
        None => {
            let snap = Snapshot::capture(&state);
            println!(
                "Survived {}  score {}  kills {}  level {}  lives {}",
                neon_survivors::format_time(snap.elapsed),
                snap.hud.score,
                snap.hud.kills,
                snap.hud.level,
                snap.hud.lives
            );
        }
    }
    ExitCode::SUCCESS
}
