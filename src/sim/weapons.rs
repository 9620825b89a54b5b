//! Ship auto-fire and escort drones

use glam::Vec2;

use super::entity::Spawn;
use super::state::{Asteroid, Bullet, Drone, GameState};
use crate::consts::*;
use crate::heading;

/// Fire the ship's guns and run the drones
pub fn update(state: &mut GameState) {
    fire_ship(state);
    update_drones(state);
}

fn fire_ship(state: &mut GameState) {
    let ship = &mut state.ship;
    let ready = ship.fire_cooldown <= 0.0;
    if ready {
        // Carry stays in (-1, 0], so fractional intervals average out
        ship.fire_cooldown += ship.stats.fire_interval();
    }
    ship.fire_cooldown -= 1.0;
    if !ready {
        return;
    }

    let barrels = 1 + ship.stats.multishot;
    let damage = ship.stats.bullet_damage();
    let life = ship.stats.bullet_life();
    let bounces = ship.stats.ricochet;
    let nose = ship.vertices()[0];
    let facing = ship.body.angle;

    for i in 0..barrels {
        let offset = (i as f32 - (barrels - 1) as f32 * 0.5) * MULTISHOT_SPREAD;
        let vel = heading(facing + offset) * BULLET_SPEED;
        state
            .store
            .spawn(Spawn::Bullet(Bullet::new(nose, vel, damage, life, bounces, false)));
    }
}

/// Nearest live asteroid to `from` within `range`
pub fn nearest_asteroid(asteroids: &[Asteroid], from: Vec2, range: f32) -> Option<&Asteroid> {
    asteroids
        .iter()
        .filter(|a| !a.body.removed)
        .map(|a| (a, a.body.pos.distance_squared(from)))
        .filter(|(_, d2)| *d2 <= range * range)
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(a, _)| a)
}

fn update_drones(state: &mut GameState) {
    let count = state.store.drones.len();
    if count == 0 {
        return;
    }
    let center = state.ship.body.pos;
    let phase = state.time_ticks as f32 * DRONE_ORBIT_SPEED;
    let range = state.ship.stats.drone_range();
    let interval = state.ship.stats.drone_fire_interval();
    let damage = DRONE_DAMAGE * state.ship.stats.drone_damage_mult;

    let mut shots = Vec::new();
    for (i, drone) in state.store.drones.iter_mut().enumerate() {
        let angle = phase + i as f32 * std::f32::consts::TAU / count as f32;
        let pos = center + heading(angle) * DRONE_ORBIT_RADIUS;
        drone.body.vel = pos - drone.body.pos;
        drone.body.pos = pos;
        drone.body.angle = angle;

        drone.fire_cooldown -= 1.0;
        if drone.fire_cooldown > 0.0 {
            continue;
        }
        if let Some(target) = nearest_asteroid(&state.store.asteroids, pos, range) {
            let dir = (target.body.pos - pos).normalize_or_zero();
            if dir != Vec2::ZERO {
                shots.push(Bullet::new(pos, dir * BULLET_SPEED, damage, BULLET_LIFE, 0, true));
                drone.fire_cooldown = interval;
            }
        }
    }
    for shot in shots {
        state.store.spawn(Spawn::Bullet(shot));
    }
}

/// Match the live drone count to the stat bundle
pub fn sync_drones(state: &mut GameState) {
    let target = state.ship.stats.drone_count as usize;
    let drones = &mut state.store.drones;
    if drones.len() > target {
        drones.truncate(target);
    }
    while state.store.drones.len() < target {
        let mut drone = Drone::new(state.ship.body.pos);
        // Stagger first shots
        drone.fire_cooldown = state.store.drones.len() as f32 * 7.0;
        state.store.spawn(Spawn::Drone(drone));
    }
}
