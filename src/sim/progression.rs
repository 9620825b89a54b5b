//! Score, leveling and the upgrade-offer state machine
//!
//! Playing -> LevelUp when the score crosses the XP target (or a free pick is
//! owed). Each selection installs one tier; once every owed pick is spent
//! the level advances and play resumes.

use std::collections::BTreeMap;

use rand::Rng;
use rand::seq::IndexedRandom;

use super::state::{GameEvent, GamePhase, GameState};
use super::upgrades::{self, CATALOG, UpgradeCategory, UpgradeId};
use super::weapons;
use crate::consts::{XP_TARGET_SCALE, XP_TARGET_START, XP_TARGET_STEP};
use crate::error::{SimError, SimResult};
use crate::settings::SimConfig;

/// Leveling state
#[derive(Debug, Clone)]
pub struct ProgressionController {
    /// Cumulative score; doubles as XP
    pub score: f32,
    pub level: u32,
    /// Score needed for the next level
    pub xp_target: f32,
    /// Upgrade picks still owed
    pub pending: u32,
    /// Level advances granted once the owed picks are spent
    levels_owed: u32,
    /// Current offer set (empty outside LevelUp)
    pub offers: Vec<UpgradeId>,
    /// Installed tier per upgrade
    pub active: BTreeMap<UpgradeId, u32>,
    dev_mode: bool,
}

impl ProgressionController {
    pub fn new(config: &SimConfig) -> Self {
        let seeded = config.seeded_picks();
        Self {
            score: 0.0,
            level: 1,
            xp_target: XP_TARGET_START,
            pending: seeded,
            levels_owed: seeded,
            offers: Vec::new(),
            active: BTreeMap::new(),
            dev_mode: config.dev_mode,
        }
    }

    /// Target after `prev`
    pub fn next_target(prev: f32) -> f32 {
        prev * XP_TARGET_SCALE + XP_TARGET_STEP
    }

    pub fn award(&mut self, points: f32) {
        self.score += points.max(0.0);
    }

    /// Owe one upgrade pick that does not advance the level
    pub fn grant_free_pick(&mut self) {
        self.pending += 1;
    }

    pub fn tier(&self, id: UpgradeId) -> u32 {
        self.active.get(&id).copied().unwrap_or(0)
    }

    /// Upgrades that may be offered right now
    pub fn offerable(&self) -> Vec<UpgradeId> {
        CATALOG
            .iter()
            .filter(|def| upgrades::is_offerable(def, &self.active))
            .map(|def| def.id)
            .collect()
    }

    /// Pick the offer set: everything in dev mode, else one per category
    pub fn roll_offers<R: Rng>(&mut self, rng: &mut R) {
        let offerable = self.offerable();
        self.offers = if self.dev_mode {
            offerable
        } else {
            UpgradeCategory::ALL
                .iter()
                .filter_map(|&category| {
                    let bucket: Vec<UpgradeId> = offerable
                        .iter()
                        .copied()
                        .filter(|id| id.def().category == category)
                        .collect();
                    bucket.choose(rng).copied()
                })
                .collect()
        };
    }

    /// Install one more tier; returns the new tier
    fn install(&mut self, id: UpgradeId) -> u32 {
        let tier = self.active.entry(id).or_insert(0);
        *tier += 1;
        *tier
    }
}

/// Threshold check; runs after cleanup each tick
pub fn update(state: &mut GameState) {
    if state.phase != GamePhase::Playing {
        return;
    }
    let prog = &mut state.progression;
    if prog.score >= prog.xp_target && prog.levels_owed == 0 {
        prog.pending += 1;
        prog.levels_owed += 1;
    }
    if prog.pending > 0 {
        enter_level_up(state);
    }
}

/// Freeze play and present an offer
pub fn enter_level_up(state: &mut GameState) {
    state.phase = GamePhase::LevelUp;
    state.ship.stats.refill_shields();
    offer_next(state);
}

fn offer_next(state: &mut GameState) {
    state.progression.roll_offers(&mut state.rng);
    if state.progression.offers.is_empty() {
        log::info!("Nothing left to offer, skipping {} pick(s)", state.progression.pending);
        state.progression.pending = 0;
        resume(state);
        return;
    }
    log::info!(
        "Level-up offer: {:?} ({} pending)",
        state.progression.offers,
        state.progression.pending
    );
    state.push_event(GameEvent::LevelUpOffered {
        offers: state.progression.offers.clone(),
        pending: state.progression.pending,
    });
}

/// Apply the offer at `index`
pub fn select(state: &mut GameState, index: usize) -> SimResult<UpgradeId> {
    if state.phase != GamePhase::LevelUp {
        return Err(SimError::NotChoosingUpgrade { phase: state.phase });
    }
    let offers = &state.progression.offers;
    let id = *offers.get(index).ok_or(SimError::InvalidOffer {
        index,
        len: offers.len(),
    })?;

    let tier = state.progression.install(id);
    id.def().apply(tier, &mut state.ship.stats);
    state.ship.recompute_derived();
    weapons::sync_drones(state);
    log::info!("Installed {} tier {}", id.def().name, tier);
    state.push_event(GameEvent::UpgradeApplied { id, tier });

    state.progression.pending = state.progression.pending.saturating_sub(1);
    if state.progression.pending > 0 {
        offer_next(state);
    } else {
        resume(state);
    }
    Ok(id)
}

fn resume(state: &mut GameState) {
    let prog = &mut state.progression;
    for _ in 0..prog.levels_owed {
        prog.level += 1;
        prog.xp_target = ProgressionController::next_target(prog.xp_target);
    }
    let advanced = prog.levels_owed > 0;
    prog.levels_owed = 0;
    prog.offers.clear();
    let level = prog.level;

    state.phase = GamePhase::Playing;
    if advanced {
        log::info!("Reached level {level} (next target {:.0})", state.progression.xp_target);
        state.push_event(GameEvent::LevelReached { level });
    }
}
