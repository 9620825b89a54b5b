//! Collision detection and combat resolution
//!
//! Bullets against asteroids (with ricochet chains), the ship against
//! asteroids, and the ship against orbs. Destroyed asteroids split along
//! their precomputed fracture and roll for loot here.

use glam::Vec2;
use rand::Rng;

use super::entity::{Entity, EntityId, Spawn};
use super::state::{
    Asteroid, AsteroidKind, DamageOutcome, FloatingText, GameEvent, GamePhase, GameState, Orb, OrbKind,
    asteroid_hp, spawn_burst,
};
use crate::consts::*;
use crate::rotate;

/// Resolve every interaction for this tick
pub fn resolve(state: &mut GameState) {
    bullets_vs_asteroids(state);
    ship_vs_asteroids(state);
    // A wrecked ship collects nothing
    if state.phase != GamePhase::Playing {
        return;
    }
    ship_vs_orbs(state);
}

/// Point-in-circle
#[inline]
pub fn point_in_circle(point: Vec2, center: Vec2, radius: f32) -> bool {
    point.distance_squared(center) < radius * radius
}

/// Nearest live asteroid within `range` of `from` that is not in `chain`
fn ricochet_target(asteroids: &[Asteroid], from: Vec2, chain: &[EntityId]) -> Option<Vec2> {
    asteroids
        .iter()
        .filter(|a| !a.is_removed() && !chain.contains(&a.body.id))
        .map(|a| (a.body.pos, a.body.pos.distance_squared(from)))
        .filter(|(_, d2)| *d2 <= RICOCHET_RANGE * RICOCHET_RANGE)
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(pos, _)| pos)
}

fn bullets_vs_asteroids(state: &mut GameState) {
    let refresh_life = state.ship.stats.bullet_life();
    let mut kills = Vec::new();

    let store = &mut state.store;
    for bullet in &mut store.bullets {
        if bullet.is_removed() {
            continue;
        }
        let Some(index) = store.asteroids.iter().position(|a| {
            !a.is_removed()
                && !bullet.hits.contains(&a.body.id)
                && point_in_circle(bullet.body.pos, a.body.pos, a.body.radius)
        }) else {
            continue;
        };

        let asteroid = &mut store.asteroids[index];
        if asteroid.kind != AsteroidKind::Target {
            asteroid.hp -= bullet.damage;
        }
        asteroid.hit_flash = HIT_FLASH_TICKS;
        bullet.hits.push(asteroid.body.id);
        if asteroid.is_dead() {
            // Flagging here makes the transition happen once
            asteroid.remove();
            kills.push(index);
        }

        if bullet.bounces == 0 {
            bullet.remove();
            continue;
        }
        match ricochet_target(&store.asteroids, bullet.body.pos, &bullet.hits) {
            Some(target) => {
                let speed = bullet.body.vel.length();
                let dir = (target - bullet.body.pos).normalize_or_zero();
                bullet.body.vel = dir * speed;
                bullet.body.angle = dir.y.atan2(dir.x);
                bullet.bounces -= 1;
                bullet.life = refresh_life;
            }
            None => bullet.remove(),
        }
    }

    for index in kills {
        destroy_asteroid(state, index);
    }
}

/// Score, effects, split and loot for an asteroid already flagged removed
pub fn destroy_asteroid(state: &mut GameState, index: usize) {
    let Some(asteroid) = state.store.asteroids.get_mut(index) else {
        return;
    };
    let fracture = asteroid.fracture.take();
    let id = asteroid.body.id;
    let kind = asteroid.kind;
    let size = asteroid.size;
    let pos = asteroid.body.pos;
    let vel = asteroid.body.vel;
    let angle = asteroid.body.angle;
    asteroid.remove();

    let points = SCORE_PER_SIZE * size as f32 * kind.score_factor() * state.ship.stats.xp_mult;
    state.progression.award(points);
    if points > 0.0 {
        state
            .store
            .spawn(Spawn::Text(FloatingText::new(pos, format!("+{}", points.round() as i64))));
    }
    spawn_burst(&mut state.store, &mut state.rng, pos, 6 + size as usize * 4, 2.5, kind.tint());
    state.screen_shake = (state.screen_shake + 0.05 * size as f32).min(1.0);

    let mut children = 0;
    if size > 1 {
        let level = state.progression.level;
        let child_kind = kind.fragment_kind();
        let hp = match child_kind {
            AsteroidKind::Target => SANDBOX_TARGET_HP,
            _ => asteroid_hp(size - 1, level),
        };
        for child in fracture.map(|f| f.children).unwrap_or_default() {
            let mut piece = Asteroid::from_shape(
                &mut state.rng,
                child_kind,
                size - 1,
                child.vertices,
                pos + rotate(child.offset, angle),
                vel + rotate(child.separation, angle),
                hp,
            );
            // Child vertices live in the parent's frame
            piece.body.angle = angle;
            state.store.spawn(Spawn::Asteroid(piece));
            children += 1;
        }
    }
    log::debug!("Destroyed {} size {size} ({children} pieces, +{points:.0})", kind.label());
    state.push_event(GameEvent::AsteroidDestroyed {
        id,
        kind,
        size,
        children,
    });

    roll_loot(state, pos, size);
}

fn roll_loot(state: &mut GameState, pos: Vec2, size: u8) {
    let tuning = &state.tuning;
    let rng = &mut state.rng;
    let mut drops = Vec::new();

    if rng.random::<f32>() < tuning.hull_drop_chance {
        if state.ship.hull >= HULL_NEAR_FULL * state.ship.max_hull {
            drops.push(OrbKind::Exp {
                value: SCORE_PER_SIZE * 0.5 * size as f32 * BIG_XP_FACTOR,
            });
        } else {
            drops.push(OrbKind::Hull {
                amount: HULL_ORB_AMOUNT,
            });
        }
    } else if rng.random::<f32>() < tuning.xp_drop_chance {
        drops.push(OrbKind::Exp {
            value: SCORE_PER_SIZE * 0.5 * size as f32,
        });
    }
    if size >= 3 && rng.random::<f32>() < tuning.freebie_drop_chance {
        drops.push(OrbKind::Freebie);
    }

    for kind in drops {
        let mut orb = Orb::new(pos, kind);
        orb.body.vel = Vec2::new(rng.random_range(-1.5..1.5), rng.random_range(-1.5..1.5));
        state.store.spawn(Spawn::Orb(orb));
    }
}

fn ship_vs_asteroids(state: &mut GameState) {
    let points = {
        let v = state.ship.vertices();
        [v[0], v[1], v[2], state.ship.body.pos]
    };

    for index in 0..state.store.asteroids.len() {
        if state.phase != GamePhase::Playing {
            return;
        }
        let asteroid = &state.store.asteroids[index];
        if asteroid.is_removed() {
            continue;
        }
        let reach = asteroid.body.radius * SHIP_HIT_SHRINK;
        if !points.iter().any(|&p| point_in_circle(p, asteroid.body.pos, reach)) {
            continue;
        }

        let size = asteroid.size;
        let pos = asteroid.body.pos;
        let cause = format!("Hull breached by a {} asteroid", asteroid.kind.label());
        let damage = if size <= 1 {
            destroy_asteroid(state, index);
            SMALL_IMPACT_DAMAGE
        } else {
            let away = (state.ship.body.pos - pos).normalize_or_zero();
            state.ship.body.vel += away * KNOCKBACK_IMPULSE;
            IMPACT_DAMAGE_PER_SIZE * size as f32
        };

        if state.hurt_ship(damage, &cause) == DamageOutcome::Hurt {
            state.ship.invulnerable_until_ms = state.now_ms + HIT_INVULN_MS;
        }
    }
}

fn ship_vs_orbs(state: &mut GameState) {
    let ship_pos = state.ship.body.pos;
    let reach = state.ship.stats.pickup_range();
    let touch = state.ship.body.radius;
    let mut collected = Vec::new();

    for orb in &mut state.store.orbs {
        if orb.is_removed() {
            continue;
        }
        let to_ship = ship_pos - orb.body.pos;
        let dist = to_ship.length();
        if dist <= touch + orb.body.radius {
            orb.remove();
            collected.push((orb.kind, orb.body.pos, Entity::kind(orb)));
            continue;
        }
        if dist < reach {
            orb.body.vel += to_ship.normalize_or_zero() * MAGNET_PULL;
            if orb.body.vel.length() > ORB_MAX_SPEED {
                orb.body.vel = orb.body.vel.normalize_or_zero() * ORB_MAX_SPEED;
            }
        }
    }

    for (kind, pos, entity) in collected {
        let label = match kind {
            OrbKind::Exp { value } => {
                state.progression.award(value * state.ship.stats.xp_mult);
                None
            }
            OrbKind::Hull { amount } => {
                let restored = state.ship.heal(amount);
                Some(format!("+{} HULL", restored.round() as i64))
            }
            OrbKind::Freebie => {
                state.progression.grant_free_pick();
                Some("FREE UPGRADE".to_string())
            }
        };
        if let Some(text) = label {
            state.store.spawn(Spawn::Text(FloatingText::new(pos, text)));
        }
        state.push_event(GameEvent::OrbCollected { kind: entity });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SimConfig;
    use crate::sim::entity::EntityKind;
    use crate::sim::state::Bullet;
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    fn playing() -> GameState {
        let mut state = GameState::new(SimConfig::default(), Tuning::default());
        state.bounds = Vec2::new(800.0, 600.0);
        state.start_run();
        state
    }

    /// Ship parked far from everything
    fn playing_clear() -> GameState {
        let mut state = playing();
        state.ship.body.pos = Vec2::new(-5000.0, -5000.0);
        state
    }

    fn add_rock(state: &mut GameState, kind: AsteroidKind, size: u8, pos: Vec2, hp: f32) -> EntityId {
        state
            .store
            .spawn(Spawn::Asteroid(Asteroid::test_rock(kind, size, pos, hp)))
    }

    fn fire_at(state: &mut GameState, pos: Vec2, damage: f32, bounces: u32) {
        state.store.spawn(Spawn::Bullet(Bullet::new(
            pos,
            Vec2::new(BULLET_SPEED, 0.0),
            damage,
            BULLET_LIFE,
            bounces,
            false,
        )));
    }

    #[test]
    fn test_fifteen_hits_split_into_two() {
        let mut state = playing_clear();
        let pos = Vec2::new(400.0, 300.0);
        let id = add_rock(&mut state, AsteroidKind::Standard, 3, pos, 150.0);
        let expected_children = state.store.asteroids[0]
            .fracture
            .as_ref()
            .map(|f| f.children.len())
            .unwrap_or(0);
        assert_eq!(expected_children, 2);

        for hit in 1..=14 {
            fire_at(&mut state, pos, 10.0, 0);
            resolve(&mut state);
            state.store.remove_flagged();
            let rock = state.store.find_asteroid(id).unwrap();
            assert_eq!(rock.hp, 150.0 - 10.0 * hit as f32);
        }
        fire_at(&mut state, pos, 10.0, 0);
        resolve(&mut state);
        state.store.remove_flagged();

        assert!(state.store.find_asteroid(id).is_none());
        let pieces: Vec<_> = state.store.asteroids.iter().collect();
        assert_eq!(pieces.len(), 2);
        assert!(pieces.iter().all(|a| a.size == 2 && a.kind == AsteroidKind::Standard));
        let destroyed = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::AsteroidDestroyed { children: 2, .. }))
            .count();
        assert_eq!(destroyed, 1);
    }

    #[test]
    fn test_overkill_is_destroyed_once() {
        let mut state = playing_clear();
        let pos = Vec2::new(400.0, 300.0);
        add_rock(&mut state, AsteroidKind::Standard, 1, pos, 20.0);
        for _ in 0..3 {
            fire_at(&mut state, pos, 50.0, 0);
        }
        resolve(&mut state);
        let destroyed = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::AsteroidDestroyed { .. }))
            .count();
        assert_eq!(destroyed, 1);
        // Two bullets find nothing left to hit
        assert_eq!(state.store.bullets.iter().filter(|b| b.is_removed()).count(), 1);
        state.store.remove_flagged();
        assert!(state.store.asteroids.is_empty());
    }

    #[test]
    fn test_score_awarded_on_kill() {
        let mut state = playing_clear();
        let pos = Vec2::new(400.0, 300.0);
        add_rock(&mut state, AsteroidKind::Standard, 1, pos, 5.0);
        fire_at(&mut state, pos, 10.0, 0);
        resolve(&mut state);
        assert_eq!(state.progression.score, SCORE_PER_SIZE);
    }

    #[test]
    fn test_targets_are_immune() {
        let mut state = playing_clear();
        let pos = Vec2::new(400.0, 300.0);
        add_rock(&mut state, AsteroidKind::Target, 3, pos, SANDBOX_TARGET_HP);
        fire_at(&mut state, pos, 1.0e9, 0);
        resolve(&mut state);
        let target = &state.store.asteroids[0];
        assert_eq!(target.hp, SANDBOX_TARGET_HP);
        assert_eq!(target.hit_flash, HIT_FLASH_TICKS);
        assert!(!target.is_removed());
    }

    #[test]
    fn test_chain_members_are_ignored() {
        let mut state = playing_clear();
        let pos = Vec2::new(400.0, 300.0);
        let id = add_rock(&mut state, AsteroidKind::Standard, 2, pos, 60.0);
        fire_at(&mut state, pos, 10.0, 0);
        state.store.bullets[0].hits.push(id);
        resolve(&mut state);
        assert_eq!(state.store.asteroids[0].hp, 60.0);
        assert!(!state.store.bullets[0].is_removed());
    }

    #[test]
    fn test_ricochet_redirects_to_nearest() {
        let mut state = playing_clear();
        let first = Vec2::new(300.0, 300.0);
        add_rock(&mut state, AsteroidKind::Standard, 2, first, 1000.0);
        add_rock(&mut state, AsteroidKind::Standard, 2, Vec2::new(300.0, 500.0), 1000.0);
        add_rock(&mut state, AsteroidKind::Standard, 2, Vec2::new(300.0, 150.0), 1000.0);
        fire_at(&mut state, first, 10.0, 1);
        resolve(&mut state);
        let bullet = &state.store.bullets[0];
        assert!(!bullet.is_removed());
        assert_eq!(bullet.bounces, 0);
        assert!(bullet.body.vel.y < 0.0, "should turn toward the closer rock above");
        assert!((bullet.body.vel.length() - BULLET_SPEED).abs() < 1e-3);
    }

    #[test]
    fn test_ricochet_without_target_removes_bullet() {
        let mut state = playing_clear();
        let pos = Vec2::new(300.0, 300.0);
        add_rock(&mut state, AsteroidKind::Standard, 2, pos, 1000.0);
        fire_at(&mut state, pos, 10.0, 2);
        resolve(&mut state);
        assert!(state.store.bullets[0].is_removed());
    }

    #[test]
    fn test_lethal_hit_without_shield_ends_run() {
        let mut state = playing();
        state.ship.hull = 5.0;
        let pos = state.ship.body.pos;
        add_rock(&mut state, AsteroidKind::Standard, 2, pos, 60.0);
        resolve(&mut state);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.ship.hull, 0.0);
        let reason = state.drain_events().into_iter().find_map(|e| match e {
            GameEvent::GameOver { reason } => Some(reason),
            _ => None,
        });
        assert!(reason.unwrap().contains("Hull"));
    }

    #[test]
    fn test_wrecked_ship_collects_no_orbs() {
        let mut state = playing();
        state.ship.hull = 5.0;
        let pos = state.ship.body.pos;
        add_rock(&mut state, AsteroidKind::Standard, 2, pos, 60.0);
        state
            .store
            .spawn(Spawn::Orb(Orb::new(pos, OrbKind::Hull { amount: HULL_ORB_AMOUNT })));
        state.store.spawn(Spawn::Orb(Orb::new(pos, OrbKind::Freebie)));
        state
            .store
            .spawn(Spawn::Orb(Orb::new(pos, OrbKind::Exp { value: 7.0 })));
        resolve(&mut state);

        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.ship.hull, 0.0);
        assert_eq!(state.progression.pending, 0);
        assert_eq!(state.progression.score, 0.0);
        assert!(state.store.orbs.iter().all(|o| !o.is_removed()));
        assert!(
            !state
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::OrbCollected { .. }))
        );
    }

    #[test]
    fn test_split_children_inherit_parent_motion() {
        let mut state = playing_clear();
        let pos = Vec2::new(400.0, 300.0);
        let parent_vel = Vec2::new(1.0, 0.5);
        let angle = 0.7;
        add_rock(&mut state, AsteroidKind::Standard, 3, pos, 5.0);
        let rock = &mut state.store.asteroids[0];
        rock.body.vel = parent_vel;
        rock.body.angle = angle;
        let expected: Vec<(Vec2, Vec2)> = rock
            .fracture
            .as_ref()
            .map(|f| {
                f.children
                    .iter()
                    .map(|c| (pos + rotate(c.offset, angle), parent_vel + rotate(c.separation, angle)))
                    .collect()
            })
            .unwrap_or_default();
        assert_eq!(expected.len(), 2);

        fire_at(&mut state, pos, 10.0, 0);
        resolve(&mut state);
        state.store.remove_flagged();

        let pieces: Vec<(Vec2, Vec2, f32)> = state
            .store
            .asteroids
            .iter()
            .map(|a| (a.body.pos, a.body.vel, a.body.angle))
            .collect();
        assert_eq!(pieces.len(), expected.len());
        for ((pos, vel, piece_angle), (want_pos, want_vel)) in pieces.into_iter().zip(expected) {
            assert!(pos.distance(want_pos) < 1e-4, "{pos} vs {want_pos}");
            assert!(vel.distance(want_vel) < 1e-4, "{vel} vs {want_vel}");
            assert_eq!(piece_angle, angle);
        }
        // Separation pushes the halves apart
        let vels: Vec<Vec2> = state.store.asteroids.iter().map(|a| a.body.vel).collect();
        assert_ne!(vels[0], vels[1]);
    }

    #[test]
    fn test_shield_absorbs_lethal_hit() {
        let mut state = playing();
        state.ship.hull = 5.0;
        state.ship.stats.shield_max = 1;
        state.ship.stats.shield_charges = 1;
        state.now_ms = 10_000.0;
        let pos = state.ship.body.pos;
        add_rock(&mut state, AsteroidKind::Standard, 2, pos, 60.0);
        resolve(&mut state);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.ship.hull, 1.0);
        assert_eq!(state.ship.stats.shield_charges, 0);
        assert!(state.ship.is_invulnerable(state.now_ms + 1.0));
        assert_eq!(state.ship.invulnerable_until_ms, state.now_ms + SHIELD_INVULN_MS);
    }

    #[test]
    fn test_large_impact_knocks_back_and_grants_invulnerability() {
        let mut state = playing();
        let pos = state.ship.body.pos + Vec2::new(10.0, 0.0);
        add_rock(&mut state, AsteroidKind::Standard, 3, pos, 150.0);
        resolve(&mut state);
        assert_eq!(state.ship.hull, SHIP_BASE_HULL - IMPACT_DAMAGE_PER_SIZE * 3.0);
        assert!(state.ship.body.vel.x < 0.0);
        assert!(state.ship.is_invulnerable(state.now_ms));
        assert!(!state.store.asteroids[0].is_removed());

        // Still overlapping next tick, but invulnerable
        resolve(&mut state);
        assert_eq!(state.ship.hull, SHIP_BASE_HULL - IMPACT_DAMAGE_PER_SIZE * 3.0);
    }

    #[test]
    fn test_small_impact_destroys_asteroid() {
        let mut state = playing();
        let pos = state.ship.body.pos;
        add_rock(&mut state, AsteroidKind::Standard, 1, pos, 20.0);
        resolve(&mut state);
        assert!(state.store.asteroids[0].is_removed());
        assert_eq!(state.ship.hull, SHIP_BASE_HULL - SMALL_IMPACT_DAMAGE);
        assert!(state.progression.score > 0.0);
    }

    #[test]
    fn test_hull_orb_collection_capped() {
        let mut state = playing();
        state.ship.hull = state.ship.max_hull - 5.0;
        let pos = state.ship.body.pos;
        state
            .store
            .spawn(Spawn::Orb(Orb::new(pos, OrbKind::Hull { amount: HULL_ORB_AMOUNT })));
        resolve(&mut state);
        assert_eq!(state.ship.hull, state.ship.max_hull);
        assert!(state.store.orbs[0].is_removed());
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::OrbCollected {
            kind: EntityKind::HullOrb
        }));
    }

    #[test]
    fn test_freebie_orb_grants_pick() {
        let mut state = playing();
        let pos = state.ship.body.pos;
        state.store.spawn(Spawn::Orb(Orb::new(pos, OrbKind::Freebie)));
        resolve(&mut state);
        assert_eq!(state.progression.pending, 1);
    }

    #[test]
    fn test_exp_orb_scaled_by_xp_mult() {
        let mut state = playing();
        state.ship.stats.xp_mult = 2.0;
        let pos = state.ship.body.pos;
        state
            .store
            .spawn(Spawn::Orb(Orb::new(pos, OrbKind::Exp { value: 7.0 })));
        resolve(&mut state);
        assert_eq!(state.progression.score, 14.0);
    }

    #[test]
    fn test_magnet_pulls_orbs_in_range() {
        let mut state = playing();
        let pos = state.ship.body.pos + Vec2::new(PICKUP_RANGE * 0.5, 0.0);
        state
            .store
            .spawn(Spawn::Orb(Orb::new(pos, OrbKind::Exp { value: 1.0 })));
        let far = state.ship.body.pos + Vec2::new(PICKUP_RANGE * 2.0, 0.0);
        state
            .store
            .spawn(Spawn::Orb(Orb::new(far, OrbKind::Exp { value: 1.0 })));
        resolve(&mut state);
        assert!(state.store.orbs[0].body.vel.x < 0.0);
        assert_eq!(state.store.orbs[1].body.vel, Vec2::ZERO);
    }

    #[test]
    fn test_near_full_hull_swaps_hull_drop_for_xp() {
        let mut state = playing_clear();
        state.tuning.hull_drop_chance = 1.0;
        state.tuning.freebie_drop_chance = 0.0;
        let pos = Vec2::new(400.0, 300.0);
        add_rock(&mut state, AsteroidKind::Standard, 1, pos, 5.0);
        fire_at(&mut state, pos, 10.0, 0);
        resolve(&mut state);
        assert_eq!(state.store.orbs.len(), 1);
        assert!(matches!(state.store.orbs[0].kind, OrbKind::Exp { .. }));

        state.ship.hull = 10.0;
        add_rock(&mut state, AsteroidKind::Standard, 1, pos, 5.0);
        fire_at(&mut state, pos, 10.0, 0);
        resolve(&mut state);
        assert!(matches!(state.store.orbs[1].kind, OrbKind::Hull { .. }));
    }

    proptest! {
        #[test]
        fn prop_ricochet_chain_unique(
            positions in proptest::collection::vec((50.0f32..750.0, 50.0f32..550.0), 2..8),
            bounces in 0u32..6,
        ) {
            let mut state = playing_clear();
            for &(x, y) in &positions {
                add_rock(&mut state, AsteroidKind::Standard, 2, Vec2::new(x, y), 1.0e6);
            }
            let (x0, y0) = positions[0];
            fire_at(&mut state, Vec2::new(x0, y0), 10.0, bounces);

            let mut last_bounces = bounces;
            for _ in 0..300 {
                resolve(&mut state);
                let Some(bullet) = state.store.bullets.first() else {
                    break;
                };
                let mut seen = bullet.hits.clone();
                seen.sort();
                seen.dedup();
                prop_assert_eq!(seen.len(), bullet.hits.len());
                prop_assert!(bullet.bounces <= last_bounces);
                prop_assert!(bullet.hits.len() as u32 <= bounces + 1);
                last_bounces = bullet.bounces;

                state.store.remove_flagged();
                for b in &mut state.store.bullets {
                    b.body.pos += b.body.vel;
                }
            }
        }

        #[test]
        fn prop_hull_stays_in_bounds(hits in proptest::collection::vec((0u8..2, 0.0f32..80.0), 1..40)) {
            let mut state = playing();
            for (i, &(what, amount)) in hits.iter().enumerate() {
                let pos = state.ship.body.pos;
                match what {
                    0 => {
                        state.store.spawn(Spawn::Orb(Orb::new(pos, OrbKind::Hull { amount })));
                    }
                    _ => {
                        state.now_ms = i as f64 * 1000.0;
                        state.hurt_ship(amount, "test");
                    }
                }
                resolve(&mut state);
                state.store.remove_flagged();
                prop_assert!(state.ship.hull >= 0.0 && state.ship.hull <= state.ship.max_hull);
            }
        }
    }
}
