//! Fixed-step frame driver
//!
//! Turns variable frame deltas into whole `SIM_DT` ticks. One-shot inputs
//! are consumed by the first substep so a single press never dashes twice.

use super::state::{GamePhase, GameState};
use super::tick::{TickInput, tick};
use crate::consts::*;

#[derive(Debug, Clone, Default)]
pub struct FrameDriver {
    /// Unsimulated time carried to the next frame
    pub accumulator: f32,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run as many fixed ticks as the frame allows. Returns the number run.
    pub fn advance(&mut self, state: &mut GameState, input: &TickInput, frame_dt: f32) -> u32 {
        if state.phase != GamePhase::Playing {
            self.accumulator = 0.0;
            return 0;
        }
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);

        let mut input = input.clone();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(state, &input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            input.dash = false;

            if state.phase != GamePhase::Playing {
                self.accumulator = 0.0;
                break;
            }
        }
        substeps
    }

    /// Fraction of a tick left over, for render interpolation
    pub fn alpha(&self) -> f32 {
        (self.accumulator / SIM_DT).clamp(0.0, 1.0)
    }
}
