//! Per-tick motion
//!
//! `integrate` advances gameplay entities and only runs while playing.
//! `integrate_cosmetics` runs in every phase so particles and popups finish
//! their life behind the level-up and game-over screens.

use std::collections::BTreeMap;

use glam::Vec2;

use super::entity::{Entity, EntityId};
use super::state::{AsteroidKind, GameState};
use super::tick::TickInput;
use crate::consts::*;
use crate::{outside_bounds, wrap_outgoing, wrap_position};

/// Advance the ship and every gameplay entity by one tick
pub fn integrate(state: &mut GameState, input: &TickInput) {
    apply_auras(state);
    integrate_ship(state, input);
    recharge(state);
    integrate_clouds(state);
    integrate_asteroids(state);
    integrate_bullets(state);
    integrate_orbs(state);
}

/// Frost auras slow the ship and chip at its hull
fn apply_auras(state: &mut GameState) {
    let ship_pos = state.ship.body.pos;
    let frozen = state.store.asteroids.iter().any(|a| {
        a.kind == AsteroidKind::Frost
            && !a.is_removed()
            && a.body.pos.distance_squared(ship_pos) <= FROST_AURA_RADIUS * FROST_AURA_RADIUS
    });
    state.ship.slowed = frozen;
    if frozen {
        state.hurt_ship(FROST_AURA_DAMAGE, "Frozen solid by a frost aura");
    }
}

fn integrate_ship(state: &mut GameState, input: &TickInput) {
    let bounds = state.bounds;
    let ship = &mut state.ship;

    if input.turn_left {
        ship.body.angle -= SHIP_TURN_RATE;
    }
    if input.turn_right {
        ship.body.angle += SHIP_TURN_RATE;
    }
    ship.body.angle = crate::normalize_angle(ship.body.angle);

    ship.thrusting = input.thrust;
    if input.thrust {
        let accel = SHIP_THRUST * ship.stats.thrust_mult;
        ship.body.vel += ship.facing() * accel;
    }
    ship.body.vel *= SHIP_FRICTION;

    let mut max_speed = ship.stats.max_speed();
    if ship.slowed {
        max_speed *= FROST_SLOW_FACTOR;
    }
    if ship.body.vel.length() > max_speed {
        ship.body.vel = ship.body.vel.normalize_or_zero() * max_speed;
    }

    ship.body.pos += ship.body.vel;
    ship.body.pos = wrap_position(ship.body.pos, ship.body.radius, bounds);
}

/// Hull regeneration and shield recharge
fn recharge(state: &mut GameState) {
    let ship = &mut state.ship;
    if ship.stats.hull_regen > 0.0 {
        ship.heal(ship.stats.hull_regen);
    }

    let stats = &mut ship.stats;
    if stats.shield_charges < stats.shield_max {
        stats.shield_timer += 1;
        if stats.shield_timer >= stats.shield_recharge_ticks {
            stats.shield_charges += 1;
            stats.shield_timer = 0;
        }
    } else {
        stats.shield_timer = 0;
    }
}

/// Cloud centers home on the ship; members ride along at fixed offsets
fn integrate_clouds(state: &mut GameState) {
    if state.store.clouds.is_empty() {
        return;
    }
    let target = state.ship.body.pos;
    let bounds = state.bounds;

    let mut anchors: BTreeMap<EntityId, (Vec2, Vec2)> = BTreeMap::new();
    for cloud in &mut state.store.clouds {
        let pull = (target - cloud.center).normalize_or_zero() * SWARM_HOMING;
        cloud.vel += pull;
        if cloud.vel.length() > SWARM_MAX_SPEED {
            cloud.vel = cloud.vel.normalize_or_zero() * SWARM_MAX_SPEED;
        }
        cloud.center += cloud.vel;
        cloud.center = wrap_outgoing(cloud.center, cloud.vel, SWARM_SPREAD, bounds);
        for &(id, offset) in &cloud.members {
            anchors.insert(id, (cloud.center + offset, cloud.vel));
        }
    }

    for asteroid in &mut state.store.asteroids {
        if asteroid.cloud.is_none() {
            continue;
        }
        if let Some(&(pos, vel)) = anchors.get(&asteroid.body.id) {
            asteroid.body.pos = pos;
            asteroid.body.vel = vel;
        }
    }
}

fn integrate_asteroids(state: &mut GameState) {
    let bounds = state.bounds;
    let has_bounds = bounds.x > 0.0 && bounds.y > 0.0;

    for asteroid in &mut state.store.asteroids {
        if asteroid.is_removed() {
            continue;
        }
        asteroid.body.angle += asteroid.spin;
        asteroid.hit_flash = asteroid.hit_flash.saturating_sub(1);
        if asteroid.cloud.is_some() {
            continue;
        }

        let body = &mut asteroid.body;
        body.pos += body.vel;
        if asteroid.kind.is_flyby() {
            if has_bounds && outside_bounds(body.pos, bounds, FLYBY_DESPAWN_BUFFER) {
                body.removed = true;
            }
        } else {
            body.pos = wrap_outgoing(body.pos, body.vel, body.radius, bounds);
        }
    }
}

fn integrate_bullets(state: &mut GameState) {
    let bounds = state.bounds;
    for bullet in &mut state.store.bullets {
        if bullet.is_removed() {
            continue;
        }
        bullet.record_trail();
        bullet.body.pos += bullet.body.vel;
        bullet.body.pos = wrap_position(bullet.body.pos, bullet.body.radius, bounds);
        bullet.life -= 1.0;
        if bullet.life <= 0.0 {
            bullet.remove();
        }
    }
}

fn integrate_orbs(state: &mut GameState) {
    let bounds = state.bounds;
    for orb in &mut state.store.orbs {
        if orb.is_removed() {
            continue;
        }
        orb.body.vel *= ORB_FRICTION;
        orb.body.pos += orb.body.vel;
        orb.body.pos = wrap_position(orb.body.pos, orb.body.radius, bounds);
        orb.life = orb.life.saturating_sub(1);
        if orb.life == 0 {
            orb.remove();
        }
    }
}

/// Particles, floating text and screen shake
pub fn integrate_cosmetics(state: &mut GameState) {
    for p in &mut state.store.particles {
        p.body.pos += p.body.vel;
        p.body.vel *= 0.96;
        p.life -= 1.0;
        if p.life <= 0.0 {
            p.remove();
        }
    }

    for text in &mut state.store.texts {
        text.body.pos += text.body.vel;
        text.life -= 1.0;
        if text.life <= 0.0 {
            text.remove();
        }
    }

    state.screen_shake *= 0.9;
    if state.screen_shake < 0.01 {
        state.screen_shake = 0.0;
    }
}
