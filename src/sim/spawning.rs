//! Spawning director
//!
//! Keeps the ambient field at its density target and releases the special
//! threat families on their cooldowns. Everything enters from off-screen.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::entity::{EntityStore, Spawn};
use super::state::{Asteroid, AsteroidKind, GameEvent, GameState};
use crate::consts::*;
use crate::tuning::{ThreatFamily, Tuning};
use crate::{heading, outside_bounds};

/// Extra distance past the radius for off-screen entry points
const ENTRY_PAD: f32 = 8.0;
/// Cap on the steps used to back a formation off-screen
const MAX_BACKOFF_STEPS: usize = 256;

/// Director state: one timer for the field and one per threat family
#[derive(Debug, Clone)]
pub struct SpawningDirector {
    density_timer: f32,
    elemental_timer: f32,
    behemoth_timer: f32,
    swarm_timer: f32,
    sandbox_placed: bool,
}

impl SpawningDirector {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            density_timer: 0.0,
            elemental_timer: tuning.elemental.start_cooldown,
            behemoth_timer: tuning.behemoth.start_cooldown,
            swarm_timer: tuning.swarm.start_cooldown,
            sandbox_placed: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Elemental,
    Behemoth,
    Swarm,
}

#[derive(Debug, Clone, Copy)]
enum FormationShape {
    Line,
    /// Tip leads, pointing at the aim point
    Vee,
}

/// Run the director for one tick
pub fn update(state: &mut GameState) {
    let bounds = state.bounds;
    if bounds.x <= 0.0 || bounds.y <= 0.0 {
        return;
    }

    if state.config.sandbox {
        if !state.director.sandbox_placed {
            place_targets(&mut state.store, &mut state.rng, bounds);
            state.director.sandbox_placed = true;
            log::info!("Sandbox: placed {SANDBOX_TARGETS} practice targets");
        }
        return;
    }

    let level = state.progression.level;
    update_density(state, level);

    for family in [Family::Elemental, Family::Behemoth, Family::Swarm] {
        let params = match family {
            Family::Elemental => &state.tuning.elemental,
            Family::Behemoth => &state.tuning.behemoth,
            Family::Swarm => &state.tuning.swarm,
        };
        // Inert below the gate
        if level < params.min_level {
            continue;
        }
        let timer = match family {
            Family::Elemental => &mut state.director.elemental_timer,
            Family::Behemoth => &mut state.director.behemoth_timer,
            Family::Swarm => &mut state.director.swarm_timer,
        };
        *timer -= 1.0;
        if *timer > 0.0 {
            continue;
        }
        *timer = next_cooldown(&mut state.rng, params, level);
        let next = *timer;

        let kind = match family {
            Family::Elemental => {
                let kind = if state.rng.random::<f32>() < state.tuning.frost_share {
                    AsteroidKind::Frost
                } else {
                    AsteroidKind::Comet
                };
                spawn_flyby(&mut state.store, &mut state.rng, kind, level, bounds);
                kind
            }
            Family::Behemoth => {
                spawn_flyby(&mut state.store, &mut state.rng, AsteroidKind::Behemoth, level, bounds);
                AsteroidKind::Behemoth
            }
            Family::Swarm => {
                spawn_swarm(&mut state.store, &mut state.rng, level, bounds);
                AsteroidKind::Swarm
            }
        };
        log::info!("Special spawn: {} (level {level}, next in {next:.0} ticks)", kind.label());
        state.push_event(GameEvent::SpecialSpawned { kind });
    }
}

/// `max(min, start - level * decrease) + rand(0..variance)`
fn next_cooldown(rng: &mut Pcg32, family: &ThreatFamily, level: u32) -> f32 {
    family.base_cooldown(level) + rng.random::<f32>() * family.variance.max(0.0)
}

fn update_density(state: &mut GameState, level: u32) {
    let director = &mut state.director;
    director.density_timer = (director.density_timer - 1.0).max(0.0);

    let target = state.tuning.density_target(level);
    let live = state.store.count_standard();
    if live >= target || director.density_timer > 0.0 {
        return;
    }
    let room = target - live;
    let tuning = &state.tuning;
    let rng = &mut state.rng;

    let formation = level >= tuning.formation_min_level && rng.random::<f32>() < tuning.formation_chance;
    if formation {
        let count = rng.random_range(3..=5usize).min(room + 1);
        if count >= 3 {
            spawn_formation(&mut state.store, rng, tuning, level, state.bounds, count);
            director.density_timer = tuning.formation_cooldown;
            return;
        }
    }
    spawn_single(&mut state.store, rng, tuning, level, state.bounds);
    director.density_timer = tuning.single_cooldown;
}

/// Size category for a new field asteroid
pub fn roll_size<R: Rng>(rng: &mut R, tuning: &Tuning, level: u32) -> u8 {
    let roll = rng.random::<f32>();
    if level < tuning.size_gate_level {
        return if roll < tuning.small_chance_early { 1 } else { 2 };
    }
    let large = tuning.large_chance(level);
    if roll < large {
        3
    } else if roll < large + tuning.medium_chance {
        2
    } else {
        1
    }
}

/// Point on edge `edge` (0 left, 1 right, 2 top, 3 bottom), `margin` outside it
fn edge_point<R: Rng>(rng: &mut R, bounds: Vec2, edge: u8, margin: f32) -> Vec2 {
    match edge {
        0 => Vec2::new(-margin, rng.random_range(0.0..bounds.y)),
        1 => Vec2::new(bounds.x + margin, rng.random_range(0.0..bounds.y)),
        2 => Vec2::new(rng.random_range(0.0..bounds.x), -margin),
        _ => Vec2::new(rng.random_range(0.0..bounds.x), bounds.y + margin),
    }
}

/// Screen center with up to a quarter-screen of jitter
fn center_aim<R: Rng>(rng: &mut R, bounds: Vec2) -> Vec2 {
    bounds * 0.5
        + Vec2::new(
            rng.random_range(-0.25..0.25) * bounds.x,
            rng.random_range(-0.25..0.25) * bounds.y,
        )
}

fn field_speed<R: Rng>(rng: &mut R, size: u8) -> f32 {
    ASTEROID_SPEED[(size.clamp(1, 4) - 1) as usize] * rng.random_range(0.8..1.2)
}

fn spawn_single(store: &mut EntityStore, rng: &mut Pcg32, tuning: &Tuning, level: u32, bounds: Vec2) {
    let size = roll_size(rng, tuning, level);
    let mut asteroid = Asteroid::generate(rng, AsteroidKind::Standard, size, Vec2::ZERO, Vec2::ZERO, level);
    let edge = rng.random_range(0..4u8);
    let pos = edge_point(rng, bounds, edge, asteroid.body.radius + ENTRY_PAD);
    let dir = (center_aim(rng, bounds) - pos).normalize_or_zero();
    asteroid.body.pos = pos;
    asteroid.body.vel = dir * field_speed(rng, size);
    store.spawn(Spawn::Asteroid(asteroid));
}

fn spawn_formation(
    store: &mut EntityStore,
    rng: &mut Pcg32,
    tuning: &Tuning,
    level: u32,
    bounds: Vec2,
    count: usize,
) {
    let size = roll_size(rng, tuning, level);
    let members: Vec<Asteroid> = (0..count)
        .map(|_| Asteroid::generate(rng, AsteroidKind::Standard, size, Vec2::ZERO, Vec2::ZERO, level))
        .collect();
    let radius = members.iter().map(|a| a.body.radius).fold(0.0, f32::max);

    let edge = rng.random_range(0..4u8);
    let entry = edge_point(rng, bounds, edge, radius + ENTRY_PAD);
    let dir = (center_aim(rng, bounds) - entry).normalize_or_zero();
    if dir == Vec2::ZERO {
        return;
    }
    let side = dir.perp();
    let spacing = 2.0 * radius + rng.random_range(10.0..40.0);
    let shape = if rng.random_bool(0.5) {
        FormationShape::Line
    } else {
        FormationShape::Vee
    };

    let offsets: Vec<Vec2> = (0..count)
        .map(|i| match shape {
            FormationShape::Line => side * (i as f32 - (count - 1) as f32 * 0.5) * spacing,
            FormationShape::Vee => {
                let rank = i.div_ceil(2) as f32;
                let wing = if i % 2 == 0 { 1.0 } else { -1.0 };
                (-dir + side * wing) * rank * spacing * 0.8
            }
        })
        .collect();

    // Back the whole group off until every member is clear of the screen
    let mut anchor = entry;
    let clear = |anchor: Vec2| {
        offsets
            .iter()
            .all(|&o| outside_bounds(anchor + o, bounds, radius + ENTRY_PAD * 0.5))
    };
    for _ in 0..MAX_BACKOFF_STEPS {
        if clear(anchor) {
            break;
        }
        anchor -= dir * radius;
    }

    let speed = field_speed(rng, size);
    log::debug!("Formation of {count} ({shape:?}, size {size}) from edge {edge}");
    for (mut asteroid, offset) in members.into_iter().zip(offsets) {
        asteroid.body.pos = anchor + offset;
        asteroid.body.vel = dir * speed;
        store.spawn(Spawn::Asteroid(asteroid));
    }
}

/// Edge entry aimed at a jittered point near the opposite edge
fn flyby_path<R: Rng>(rng: &mut R, bounds: Vec2, margin: f32) -> (Vec2, Vec2) {
    let edge = rng.random_range(0..4u8);
    let pos = edge_point(rng, bounds, edge, margin);
    let jitter = Vec2::new(
        rng.random_range(-0.1..0.1) * bounds.x,
        rng.random_range(-0.1..0.1) * bounds.y,
    );
    let aim = edge_point(rng, bounds, edge ^ 1, 0.0) + jitter;
    (pos, (aim - pos).normalize_or_zero())
}

fn spawn_flyby(store: &mut EntityStore, rng: &mut Pcg32, kind: AsteroidKind, level: u32, bounds: Vec2) {
    let (size, speed) = match kind {
        AsteroidKind::Comet => (2, COMET_SPEED),
        AsteroidKind::Frost => (2, FROST_SPEED),
        _ => (4, BEHEMOTH_SPEED),
    };
    let mut asteroid = Asteroid::generate(rng, kind, size, Vec2::ZERO, Vec2::ZERO, level);
    let (pos, dir) = flyby_path(rng, bounds, asteroid.body.radius + ENTRY_PAD);
    asteroid.body.pos = pos;
    asteroid.body.vel = dir * speed;
    store.spawn(Spawn::Asteroid(asteroid));
}

fn spawn_swarm(store: &mut EntityStore, rng: &mut Pcg32, level: u32, bounds: Vec2) {
    let count = rng.random_range(4..=6);
    let members: Vec<(Asteroid, Vec2)> = (0..count)
        .map(|_| {
            let rock = Asteroid::generate(rng, AsteroidKind::Swarm, 1, Vec2::ZERO, Vec2::ZERO, level);
            let offset = heading(rng.random_range(0.0..std::f32::consts::TAU))
                * rng.random_range(0.0..SWARM_SPREAD);
            (rock, offset)
        })
        .collect();
    let radius = members.iter().map(|(a, _)| a.body.radius).fold(0.0, f32::max);
    let (center, dir) = flyby_path(rng, bounds, SWARM_SPREAD + radius + ENTRY_PAD);
    store.spawn_cloud(center, dir * SWARM_MAX_SPEED * 0.5, members);
}

/// Ring of invincible practice targets around the screen center
fn place_targets(store: &mut EntityStore, rng: &mut Pcg32, bounds: Vec2) {
    let center = bounds * 0.5;
    let ring = bounds.x.min(bounds.y) * 0.3;
    for i in 0..SANDBOX_TARGETS {
        let angle = i as f32 * std::f32::consts::TAU / SANDBOX_TARGETS as f32;
        let pos = center + heading(angle) * ring;
        let mut target = Asteroid::generate(rng, AsteroidKind::Target, 3, pos, Vec2::ZERO, 1);
        target.spin *= 0.5;
        store.spawn(Spawn::Asteroid(target));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SimConfig;
    use crate::sim::entity::EntityId;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn playing_at(level: u32, seed: u64) -> GameState {
        let mut state = GameState::new(SimConfig::with_seed(seed), Tuning::default());
        state.bounds = Vec2::new(800.0, 600.0);
        state.start_run();
        state.progression.level = level;
        state
    }

    fn specials(state: &GameState) -> usize {
        state
            .store
            .asteroids
            .iter()
            .filter(|a| a.kind != AsteroidKind::Standard)
            .count()
    }

    #[test]
    fn test_field_fills_to_target() {
        let mut state = playing_at(1, 3);
        for _ in 0..2000 {
            update(&mut state);
        }
        assert_eq!(state.store.count_standard(), state.tuning.density_target(1));
    }

    #[test]
    fn test_families_inert_below_gate() {
        let mut state = playing_at(2, 9);
        for _ in 0..10_000 {
            update(&mut state);
        }
        assert_eq!(specials(&state), 0);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_families_fire_once_gated_in() {
        let mut state = playing_at(8, 21);
        for _ in 0..3000 {
            update(&mut state);
        }
        let kinds: Vec<AsteroidKind> = state
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::SpecialSpawned { kind } => Some(kind),
                _ => None,
            })
            .collect();
        assert!(kinds.iter().any(|k| matches!(k, AsteroidKind::Comet | AsteroidKind::Frost)));
        assert!(kinds.contains(&AsteroidKind::Behemoth));
        assert!(kinds.contains(&AsteroidKind::Swarm));
        assert!(!state.store.clouds.is_empty());
    }

    #[test]
    fn test_swarm_members_do_not_count_toward_density() {
        let mut state = playing_at(1, 4);
        spawn_swarm(&mut state.store, &mut state.rng, 1, state.bounds);
        assert!(state.store.asteroids.len() >= 4);
        assert_eq!(state.store.count_standard(), 0);
    }

    #[test]
    fn test_zero_bounds_suppress_spawning() {
        let mut state = playing_at(8, 5);
        state.bounds = Vec2::ZERO;
        for _ in 0..5000 {
            update(&mut state);
        }
        assert!(state.store.asteroids.is_empty());
    }

    #[test]
    fn test_entries_are_off_screen() {
        let mut state = playing_at(9, 77);
        let mut seen = EntityId::UNASSIGNED;
        for _ in 0..4000 {
            update(&mut state);
            for a in state.store.asteroids.iter().filter(|a| a.body.id > seen) {
                assert!(
                    outside_bounds(a.body.pos, state.bounds, a.body.radius),
                    "{:?} entered on-screen at {:?}",
                    a.kind,
                    a.body.pos
                );
            }
            if let Some(last) = state.store.asteroids.last() {
                seen = seen.max(last.body.id);
            }
        }
    }

    #[test]
    fn test_sandbox_places_targets_once() {
        let mut state = GameState::new(
            SimConfig {
                sandbox: true,
                ..SimConfig::default()
            },
            Tuning::default(),
        );
        state.bounds = Vec2::new(800.0, 600.0);
        state.start_run();
        state.progression.level = 10;
        for _ in 0..3000 {
            update(&mut state);
        }
        assert_eq!(state.store.asteroids.len(), SANDBOX_TARGETS);
        assert!(state.store.asteroids.iter().all(|a| a.kind == AsteroidKind::Target));
    }

    #[test]
    fn test_size_roll_respects_gate() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let early: Vec<u8> = (0..500).map(|_| roll_size(&mut rng, &tuning, 1)).collect();
        assert!(early.iter().all(|&s| s <= 2));
        let late: Vec<u8> = (0..500).map(|_| roll_size(&mut rng, &tuning, 8)).collect();
        assert!(late.contains(&3));
    }

    #[test]
    fn test_formation_spacing_and_shared_heading() {
        let mut shapes = (0, 0);
        for seed in 0..40u64 {
            let mut state = playing_at(6, seed);
            let count = 3 + (seed % 3) as usize;
            spawn_formation(&mut state.store, &mut state.rng, &state.tuning, 6, state.bounds, count);

            let members = &state.store.asteroids;
            assert_eq!(members.len(), count);
            let vel = members[0].body.vel;
            assert_ne!(vel, Vec2::ZERO);
            assert!(members.iter().all(|a| a.body.vel == vel && a.size == members[0].size));

            let radius = members.iter().map(|a| a.body.radius).fold(0.0, f32::max);
            for (i, a) in members.iter().enumerate() {
                for b in &members[i + 1..] {
                    let dist = a.body.pos.distance(b.body.pos);
                    assert!(dist - a.body.radius - b.body.radius > 0.0, "seed {seed}: members overlap");
                    assert!(dist >= 2.0 * radius + 10.0 - 1e-3, "seed {seed}: spacing {dist}");
                }
            }

            // Line: one rank across the heading. Vee: the tip leads.
            let dir = vel.normalize();
            let ranks: Vec<f32> = members.iter().map(|a| a.body.pos.dot(dir)).collect();
            if ranks.iter().all(|r| (r - ranks[0]).abs() < 1e-2) {
                shapes.0 += 1;
            } else {
                assert!(ranks[1..].iter().all(|&r| r < ranks[0]), "seed {seed}: tip is not leading");
                shapes.1 += 1;
            }
        }
        assert!(shapes.0 > 0 && shapes.1 > 0, "line/vee counts {shapes:?}");
    }

    #[test]
    fn test_formation_uses_longer_cooldown() {
        let mut state = playing_at(6, 12);
        state.tuning.formation_chance = 1.0;
        update_density(&mut state, 6);
        let spawned = state.store.count_standard();
        assert!((3..=5).contains(&spawned));
        assert_eq!(state.director.density_timer, state.tuning.formation_cooldown);

        let mut state = playing_at(6, 12);
        state.tuning.formation_chance = 0.0;
        update_density(&mut state, 6);
        assert_eq!(state.store.count_standard(), 1);
        assert_eq!(state.director.density_timer, state.tuning.single_cooldown);
        assert!(state.tuning.formation_cooldown > state.tuning.single_cooldown);
    }

    #[test]
    fn test_formation_clamped_to_room_plus_one() {
        let mut state = playing_at(6, 8);
        state.tuning.formation_chance = 1.0;
        let target = state.tuning.density_target(6);
        for _ in 0..target - 2 {
            spawn_single(&mut state.store, &mut state.rng, &state.tuning, 6, state.bounds);
        }
        update_density(&mut state, 6);
        assert_eq!(state.store.count_standard(), target + 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_density_never_exceeds_target_plus_one(seed in any::<u64>(), level in 1u32..20) {
            let mut state = playing_at(level, seed);
            let bound = state.tuning.density_target(level) + 1;
            for _ in 0..1500 {
                update(&mut state);
                prop_assert!(state.store.count_standard() <= bound);
            }
        }
    }
}
