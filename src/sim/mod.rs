//! Simulation module
//!
//! All gameplay logic lives here. It has no rendering, audio or platform
//! dependencies:
//! - One call to `tick` per frame, speeds in pixels per tick
//! - Seeded RNG only, owned by `GameState`
//! - The host reads `FrameSnapshot` and drains `GameEvent`s

pub mod collision;
pub mod entity;
pub mod fracture;
pub mod physics;
pub mod progression;
pub mod spawning;
pub mod state;
pub mod tick;
pub mod upgrades;
pub mod weapons;

pub use entity::{Body, Entity, EntityId, EntityKind, EntityStore, Spawn};
pub use fracture::{ChildShape, FractureData};
pub use progression::ProgressionController;
pub use spawning::SpawningDirector;
pub use state::{
    Asteroid, AsteroidCloud, AsteroidKind, Bullet, DamageOutcome, Drone, FloatingText, FrameSnapshot, GameEvent,
    GamePhase, GameState, Orb, OrbKind, Particle, Ship, StatBundle,
};
pub use tick::{TickInput, tick};
pub use upgrades::{CATALOG, UpgradeCategory, UpgradeDef, UpgradeId};
