//! Entity storage and lifecycle
//!
//! One container per entity kind. Removal is lazy: systems set the `removed`
//! flag on a body and `EntityStore::remove_flagged` compacts every container
//! once per tick, after collision resolution.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Asteroid, AsteroidCloud, AsteroidKind, Bullet, Drone, FloatingText, Orb, Particle};
use crate::consts::MAX_PARTICLES;

/// Session-unique entity identifier (0 = not yet spawned)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    pub const UNASSIGNED: EntityId = EntityId(0);
}

/// Kind tag for every entity the simulation knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Ship,
    Asteroid,
    Bullet,
    Particle,
    ExpOrb,
    HullOrb,
    FreebieOrb,
    Drone,
    FloatingText,
}

/// Fields shared by every entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Facing / rotation (radians)
    pub angle: f32,
    /// Set during a tick, compacted away at the end of it
    pub removed: bool,
}

impl Body {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self {
            id: EntityId::UNASSIGNED,
            pos,
            vel,
            radius,
            angle: 0.0,
            removed: false,
        }
    }
}

/// Base capability implemented by every concrete entity
pub trait Entity {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;
    fn kind(&self) -> EntityKind;

    fn id(&self) -> EntityId {
        self.body().id
    }

    fn is_removed(&self) -> bool {
        self.body().removed
    }

    /// Flag for removal at the end of the tick
    fn remove(&mut self) {
        self.body_mut().removed = true;
    }
}

macro_rules! impl_entity {
    ($ty:ty, $kind:expr) => {
        impl Entity for $ty {
            fn body(&self) -> &Body {
                &self.body
            }
            fn body_mut(&mut self) -> &mut Body {
                &mut self.body
            }
            fn kind(&self) -> EntityKind {
                $kind
            }
        }
    };
}

impl_entity!(Asteroid, EntityKind::Asteroid);
impl_entity!(Bullet, EntityKind::Bullet);
impl_entity!(Particle, EntityKind::Particle);
impl_entity!(Drone, EntityKind::Drone);
impl_entity!(FloatingText, EntityKind::FloatingText);

/// A new entity to hand to the store
#[derive(Debug, Clone)]
pub enum Spawn {
    Asteroid(Asteroid),
    Bullet(Bullet),
    Particle(Particle),
    Orb(Orb),
    Drone(Drone),
    Text(FloatingText),
}

/// Owns every live entity except the ship
#[derive(Debug, Clone, Serialize)]
pub struct EntityStore {
    pub asteroids: Vec<Asteroid>,
    pub bullets: Vec<Bullet>,
    pub particles: Vec<Particle>,
    pub orbs: Vec<Orb>,
    pub drones: Vec<Drone>,
    pub texts: Vec<FloatingText>,
    pub clouds: Vec<AsteroidCloud>,
    next_id: u32,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            asteroids: Vec::new(),
            bullets: Vec::new(),
            particles: Vec::with_capacity(MAX_PARTICLES),
            orbs: Vec::new(),
            drones: Vec::new(),
            texts: Vec::new(),
            clouds: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Assign an id and push the entity into its container
    ///
    /// Particles beyond `MAX_PARTICLES` are dropped; they still get an id.
    pub fn spawn(&mut self, spawn: Spawn) -> EntityId {
        let id = self.next_entity_id();
        match spawn {
            Spawn::Asteroid(mut a) => {
                a.body.id = id;
                self.asteroids.push(a);
            }
            Spawn::Bullet(mut b) => {
                b.body.id = id;
                self.bullets.push(b);
            }
            Spawn::Particle(mut p) => {
                if self.particles.len() < MAX_PARTICLES {
                    p.body.id = id;
                    self.particles.push(p);
                }
            }
            Spawn::Orb(mut o) => {
                o.body.id = id;
                self.orbs.push(o);
            }
            Spawn::Drone(mut d) => {
                d.body.id = id;
                self.drones.push(d);
            }
            Spawn::Text(mut t) => {
                t.body.id = id;
                self.texts.push(t);
            }
        }
        id
    }

    /// Spawn a cohesion group; each member is placed at `center + offset`
    pub fn spawn_cloud(&mut self, center: Vec2, vel: Vec2, members: Vec<(Asteroid, Vec2)>) -> EntityId {
        let cloud_id = self.next_entity_id();
        let mut offsets = Vec::with_capacity(members.len());
        for (mut asteroid, offset) in members {
            asteroid.cloud = Some(cloud_id);
            asteroid.body.pos = center + offset;
            asteroid.body.vel = vel;
            let id = self.spawn(Spawn::Asteroid(asteroid));
            offsets.push((id, offset));
        }
        self.clouds.push(AsteroidCloud {
            id: cloud_id,
            center,
            vel,
            members: offsets,
        });
        cloud_id
    }

    /// Compact all containers, dropping flagged entities
    ///
    /// Returns the number of entities removed.
    pub fn remove_flagged(&mut self) -> usize {
        let before = self.len();
        self.asteroids.retain(|a| !a.body.removed);
        self.bullets.retain(|b| !b.body.removed);
        self.particles.retain(|p| !p.body.removed);
        self.orbs.retain(|o| !o.body.removed);
        self.drones.retain(|d| !d.body.removed);
        self.texts.retain(|t| !t.body.removed);

        let asteroids = &self.asteroids;
        for cloud in &mut self.clouds {
            cloud
                .members
                .retain(|(id, _)| asteroids.iter().any(|a| a.body.id == *id));
        }
        self.clouds.retain(|c| !c.members.is_empty());

        before - self.len()
    }

    /// Total entity count (clouds excluded; they own no body)
    pub fn len(&self) -> usize {
        self.asteroids.len()
            + self.bullets.len()
            + self.particles.len()
            + self.orbs.len()
            + self.drones.len()
            + self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn find_asteroid(&self, id: EntityId) -> Option<&Asteroid> {
        self.asteroids.iter().find(|a| a.body.id == id)
    }

    /// Live ambient-field asteroids (what the density target counts)
    pub fn count_standard(&self) -> usize {
        self.asteroids
            .iter()
            .filter(|a| a.kind == AsteroidKind::Standard && !a.body.removed)
            .count()
    }

    /// Drop everything (new run). Ids keep counting up.
    pub fn clear(&mut self) {
        self.asteroids.clear();
        self.bullets.clear();
        self.particles.clear();
        self.orbs.clear();
        self.drones.clear();
        self.texts.clear();
        self.clouds.clear();
    }
}
