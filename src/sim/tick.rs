//! Per-tick orchestration
//!
//! Stage order while playing: director, integrator, weapons, resolver.
//! Cleanup and the progression check follow in every phase.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{GamePhase, GameState};
use super::{collision, physics, progression, spawning, weapons};

/// Input commands for a single tick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickInput {
    pub thrust: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    /// Current render-surface size
    pub bounds: Vec2,
    /// Host wall clock (ms), used for invulnerability windows
    pub now_ms: f64,
    /// Start (or restart) a run from the menu or game-over screen
    pub start: bool,
    /// Pick the offer at this index during a level-up
    pub select: Option<usize>,
}

/// Advance the game state by one tick
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.bounds = input.bounds;
    state.now_ms = input.now_ms;

    if input.start && matches!(state.phase, GamePhase::Menu | GamePhase::GameOver) {
        state.start_run();
    }

    if let Some(index) = input.select
        && state.phase == GamePhase::LevelUp
        && let Err(err) = progression::select(state, index)
    {
        log::warn!("Ignoring upgrade selection: {err}");
    }

    // Cosmetics keep running behind every screen
    physics::integrate_cosmetics(state);

    if state.phase == GamePhase::Playing {
        state.time_ticks += 1;
        run_stages(state, input);
    }

    state.store.remove_flagged();
    progression::update(state);
}

/// Gameplay stages; a mid-tick game over stops the remaining ones
fn run_stages(state: &mut GameState, input: &TickInput) {
    spawning::update(state);
    physics::integrate(state, input);
    if state.phase != GamePhase::Playing {
        return;
    }
    weapons::update(state);
    collision::resolve(state);
}
