//! Game state and core simulation types
//!
//! `GameState` is the simulation context: every system takes it by `&mut`
//! for the duration of its stage and the host only ever sees a
//! `FrameSnapshot` borrowed from it.

use std::collections::{BTreeMap, VecDeque};

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Body, Entity, EntityId, EntityKind, EntityStore, Spawn};
use super::fracture::{self, FractureData};
use super::progression::{self, ProgressionController};
use super::spawning::SpawningDirector;
use super::upgrades::UpgradeId;
use crate::consts::*;
use crate::settings::SimConfig;
use crate::tuning::Tuning;
use crate::{heading, rotate};

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the host to start a run
    Menu,
    /// Active gameplay
    Playing,
    /// Frozen while the player picks an upgrade
    LevelUp,
    /// Run ended
    GameOver,
}

/// Asteroid families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AsteroidKind {
    /// Ambient field; what the density target counts
    Standard,
    /// Fast elemental flyby
    Comet,
    /// Elemental flyby with a slowing, damaging aura
    Frost,
    /// Rare tanky hazard
    Behemoth,
    /// Sandbox practice target, never loses hp
    Target,
    /// Member of an `AsteroidCloud`
    Swarm,
}

impl AsteroidKind {
    /// Flybys cross the screen once and despawn instead of wrapping
    pub fn is_flyby(self) -> bool {
        matches!(self, AsteroidKind::Comet | AsteroidKind::Frost | AsteroidKind::Behemoth)
    }

    pub fn score_factor(self) -> f32 {
        match self {
            AsteroidKind::Standard | AsteroidKind::Swarm => 1.0,
            AsteroidKind::Comet => 2.0,
            AsteroidKind::Frost => 2.5,
            AsteroidKind::Behemoth => 4.0,
            AsteroidKind::Target => 0.0,
        }
    }

    /// What the pieces become when this kind splits
    pub fn fragment_kind(self) -> AsteroidKind {
        match self {
            AsteroidKind::Target => AsteroidKind::Target,
            _ => AsteroidKind::Standard,
        }
    }

    /// Palette index for this kind's debris; the host maps it to a color
    pub fn tint(self) -> u32 {
        match self {
            AsteroidKind::Standard => 0,
            AsteroidKind::Comet => 1,
            AsteroidKind::Frost => 2,
            AsteroidKind::Behemoth => 3,
            AsteroidKind::Target => 4,
            AsteroidKind::Swarm => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AsteroidKind::Standard => "rock",
            AsteroidKind::Comet => "comet",
            AsteroidKind::Frost => "frost",
            AsteroidKind::Behemoth => "behemoth",
            AsteroidKind::Target => "target",
            AsteroidKind::Swarm => "swarm",
        }
    }
}

/// Hp for a size category at a level
pub fn asteroid_hp(size: u8, level: u32) -> f32 {
    let idx = (size.clamp(1, 4) - 1) as usize;
    ASTEROID_HP[idx] * (1.0 + HP_PER_LEVEL * level.saturating_sub(1) as f32)
}

/// An asteroid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asteroid {
    pub body: Body,
    pub kind: AsteroidKind,
    /// Local-space polygon ring
    pub vertices: Vec<Vec2>,
    pub hp: f32,
    pub max_hp: f32,
    /// Size category 1..=4
    pub size: u8,
    /// Rotation per tick
    pub spin: f32,
    /// Ticks of hit flash left
    pub hit_flash: u32,
    /// Owning cloud, if any
    pub cloud: Option<EntityId>,
    pub fracture: Option<FractureData>,
}

impl Asteroid {
    /// Build from an explicit shape; fracture data is precomputed here
    #[allow(clippy::too_many_arguments)]
    pub fn from_shape<R: Rng>(
        rng: &mut R,
        kind: AsteroidKind,
        size: u8,
        vertices: Vec<Vec2>,
        pos: Vec2,
        vel: Vec2,
        hp: f32,
    ) -> Self {
        let fracture = if size > 1 {
            fracture::precompute(rng, &vertices)
        } else {
            None
        };
        let radius = fracture::bounding_radius(&vertices);
        let mut body = Body::new(pos, vel, radius);
        body.angle = rng.random_range(0.0..std::f32::consts::TAU);
        Self {
            body,
            kind,
            vertices,
            hp,
            max_hp: hp,
            size,
            spin: rng.random_range(-0.02..0.02),
            hit_flash: 0,
            cloud: None,
            fracture,
        }
    }

    /// Fresh asteroid of `size` with a generated shape and level-scaled hp
    pub fn generate<R: Rng>(rng: &mut R, kind: AsteroidKind, size: u8, pos: Vec2, vel: Vec2, level: u32) -> Self {
        let radius = ASTEROID_RADIUS[(size.clamp(1, 4) - 1) as usize];
        let shape = fracture::asteroid_shape(rng, radius);
        let hp = match kind {
            AsteroidKind::Target => SANDBOX_TARGET_HP,
            AsteroidKind::Behemoth => asteroid_hp(size, level) * 2.5,
            _ => asteroid_hp(size, level),
        };
        Self::from_shape(rng, kind, size, shape, pos, vel, hp)
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }

    /// Deterministic asteroid for tests
    #[cfg(test)]
    pub(crate) fn test_rock(kind: AsteroidKind, size: u8, pos: Vec2, hp: f32) -> Self {
        let mut rng = Pcg32::seed_from_u64(size as u64 * 31 + 7);
        let radius = ASTEROID_RADIUS[(size.clamp(1, 4) - 1) as usize];
        let shape = fracture::asteroid_shape(&mut rng, radius);
        let mut rock = Self::from_shape(&mut rng, kind, size, shape, pos, Vec2::ZERO, hp);
        rock.spin = 0.0;
        rock
    }
}

/// Cohesion group of asteroids sharing one homing center
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsteroidCloud {
    pub id: EntityId,
    pub center: Vec2,
    pub vel: Vec2,
    /// Member id and fixed offset from the center
    pub members: Vec<(EntityId, Vec2)>,
}

/// A projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub body: Body,
    /// Ticks left
    pub life: f32,
    /// Damage fixed at fire time
    pub damage: f32,
    /// Ricochet bounces left
    pub bounces: u32,
    /// Asteroids already damaged, in hit order
    pub hits: Vec<EntityId>,
    /// Recent positions, newest first
    pub trail: VecDeque<Vec2>,
    pub from_drone: bool,
}

impl Bullet {
    pub fn new(pos: Vec2, vel: Vec2, damage: f32, life: f32, bounces: u32, from_drone: bool) -> Self {
        let mut body = Body::new(pos, vel, BULLET_RADIUS);
        body.angle = vel.y.atan2(vel.x);
        Self {
            body,
            life,
            damage,
            bounces,
            hits: Vec::new(),
            trail: VecDeque::with_capacity(TRAIL_LENGTH),
            from_drone,
        }
    }

    /// Record current position to trail (call each tick)
    pub fn record_trail(&mut self) {
        self.trail.push_front(self.body.pos);
        self.trail.truncate(TRAIL_LENGTH);
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub body: Body,
    /// Ticks left
    pub life: f32,
    pub max_life: f32,
    /// Renderer color lookup
    pub tint: u32,
}

/// What an orb gives when collected
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OrbKind {
    Exp { value: f32 },
    Hull { amount: f32 },
    /// A free upgrade pick
    Freebie,
}

/// A collectible drop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Orb {
    pub body: Body,
    pub kind: OrbKind,
    /// Ticks until it fades
    pub life: u32,
}

impl Orb {
    pub fn new(pos: Vec2, kind: OrbKind) -> Self {
        Self {
            body: Body::new(pos, Vec2::ZERO, ORB_RADIUS),
            kind,
            life: ORB_LIFE,
        }
    }
}

impl Entity for Orb {
    fn body(&self) -> &Body {
        &self.body
    }
    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
    fn kind(&self) -> EntityKind {
        match self.kind {
            OrbKind::Exp { .. } => EntityKind::ExpOrb,
            OrbKind::Hull { .. } => EntityKind::HullOrb,
            OrbKind::Freebie => EntityKind::FreebieOrb,
        }
    }
}

/// Orbiting gun platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drone {
    pub body: Body,
    /// Ticks until it may fire again
    pub fire_cooldown: f32,
}

impl Drone {
    pub fn new(pos: Vec2) -> Self {
        Self {
            body: Body::new(pos, Vec2::ZERO, 5.0),
            fire_cooldown: 0.0,
        }
    }
}

/// Drifting popup text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatingText {
    pub body: Body,
    pub text: String,
    pub life: f32,
}

impl FloatingText {
    pub fn new(pos: Vec2, text: impl Into<String>) -> Self {
        Self {
            body: Body::new(pos, Vec2::new(0.0, -0.6), 0.0),
            text: text.into(),
            life: TEXT_LIFE,
        }
    }
}

/// Upgrade-derived ship stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatBundle {
    pub thrust_mult: f32,
    pub speed_mult: f32,
    pub fire_rate_mult: f32,
    pub damage_mult: f32,
    pub range_mult: f32,
    pub pickup_range_mult: f32,
    pub hull_bonus_mult: f32,
    /// Hull restored per tick
    pub hull_regen: f32,
    pub shield_charges: u32,
    pub shield_max: u32,
    /// Ticks per recharged charge
    pub shield_recharge_ticks: u32,
    /// Progress toward the next charge
    pub shield_timer: u32,
    pub drone_count: u32,
    pub drone_fire_rate_mult: f32,
    pub drone_damage_mult: f32,
    pub drone_range_mult: f32,
    /// Extra barrels
    pub multishot: u32,
    /// Ricochet bounces per bullet
    pub ricochet: u32,
    pub xp_mult: f32,
}

impl Default for StatBundle {
    fn default() -> Self {
        Self {
            thrust_mult: 1.0,
            speed_mult: 1.0,
            fire_rate_mult: 1.0,
            damage_mult: 1.0,
            range_mult: 1.0,
            pickup_range_mult: 1.0,
            hull_bonus_mult: 1.0,
            hull_regen: 0.0,
            shield_charges: 0,
            shield_max: 0,
            shield_recharge_ticks: SHIELD_RECHARGE_TICKS,
            shield_timer: 0,
            drone_count: 0,
            drone_fire_rate_mult: 1.0,
            drone_damage_mult: 1.0,
            drone_range_mult: 1.0,
            multishot: 0,
            ricochet: 0,
            xp_mult: 1.0,
        }
    }
}

impl StatBundle {
    /// Ticks between ship volleys, floored at `MIN_FIRE_INTERVAL`
    pub fn fire_interval(&self) -> f32 {
        (FIRE_INTERVAL_TICKS / self.fire_rate_mult.max(f32::EPSILON)).max(MIN_FIRE_INTERVAL)
    }

    pub fn drone_fire_interval(&self) -> f32 {
        (DRONE_FIRE_INTERVAL / self.drone_fire_rate_mult.max(f32::EPSILON)).max(MIN_FIRE_INTERVAL)
    }

    pub fn bullet_damage(&self) -> f32 {
        BULLET_DAMAGE * self.damage_mult
    }

    pub fn bullet_life(&self) -> f32 {
        BULLET_LIFE * self.range_mult
    }

    pub fn max_speed(&self) -> f32 {
        SHIP_MAX_SPEED * self.speed_mult
    }

    pub fn pickup_range(&self) -> f32 {
        PICKUP_RANGE * self.pickup_range_mult
    }

    pub fn drone_range(&self) -> f32 {
        DRONE_RANGE * self.drone_range_mult
    }

    pub fn max_hull(&self) -> f32 {
        SHIP_BASE_HULL * self.hull_bonus_mult
    }

    pub fn refill_shields(&mut self) {
        self.shield_charges = self.shield_max;
        self.shield_timer = 0;
    }
}

/// Result of applying damage to the ship
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Invulnerable; nothing happened
    Suppressed,
    /// Hull took the damage and survived
    Hurt,
    /// Lethal damage eaten by a shield charge
    ShieldAbsorbed,
    /// Hull reached zero with no shield left
    Destroyed,
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub body: Body,
    pub thrusting: bool,
    pub hull: f32,
    pub max_hull: f32,
    /// Wall-clock deadline (ms) before which damage is ignored
    pub invulnerable_until_ms: f64,
    /// Ticks until the next volley
    pub fire_cooldown: f32,
    pub stats: StatBundle,
    /// Inside an aura this tick
    pub slowed: bool,
}

impl Ship {
    pub fn new(pos: Vec2) -> Self {
        let stats = StatBundle::default();
        let max_hull = stats.max_hull();
        let mut body = Body::new(pos, Vec2::ZERO, SHIP_RADIUS);
        body.angle = -std::f32::consts::FRAC_PI_2; // Nose up
        Self {
            body,
            thrusting: false,
            hull: max_hull,
            max_hull,
            invulnerable_until_ms: 0.0,
            fire_cooldown: 0.0,
            stats,
            slowed: false,
        }
    }

    pub fn facing(&self) -> Vec2 {
        heading(self.body.angle)
    }

    pub fn is_invulnerable(&self, now_ms: f64) -> bool {
        now_ms < self.invulnerable_until_ms
    }

    /// Nose and two rear corners in world space
    pub fn vertices(&self) -> [Vec2; 3] {
        let r = self.body.radius;
        let local = [
            Vec2::new(r, 0.0),
            Vec2::new(-r * 0.7, r * 0.6),
            Vec2::new(-r * 0.7, -r * 0.6),
        ];
        local.map(|v| self.body.pos + rotate(v, self.body.angle))
    }

    /// Re-derive fields that depend on the stat bundle
    ///
    /// Growing max hull tops the hull off to the new max.
    pub fn recompute_derived(&mut self) {
        let new_max = self.stats.max_hull();
        if new_max > self.max_hull {
            self.hull = new_max;
        }
        self.max_hull = new_max;
        self.hull = self.hull.clamp(0.0, self.max_hull);
    }

    /// Restore hull, capped at max. Returns the amount actually restored.
    pub fn heal(&mut self, amount: f32) -> f32 {
        let before = self.hull;
        self.hull = (self.hull + amount.max(0.0)).min(self.max_hull);
        self.hull - before
    }

    /// Apply damage with invulnerability and shield rules
    pub fn take_damage(&mut self, amount: f32, now_ms: f64) -> DamageOutcome {
        if self.is_invulnerable(now_ms) {
            return DamageOutcome::Suppressed;
        }
        self.hull = (self.hull - amount.max(0.0)).max(0.0);
        if self.hull > 0.0 {
            return DamageOutcome::Hurt;
        }
        if self.stats.shield_charges > 0 {
            self.stats.shield_charges -= 1;
            self.hull = 1.0_f32.min(self.max_hull);
            self.invulnerable_until_ms = now_ms + SHIELD_INVULN_MS;
            DamageOutcome::ShieldAbsorbed
        } else {
            DamageOutcome::Destroyed
        }
    }
}

impl Entity for Ship {
    fn body(&self) -> &Body {
        &self.body
    }
    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
    fn kind(&self) -> EntityKind {
        EntityKind::Ship
    }
}

/// Discrete notifications for the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Gameplay froze for an upgrade choice
    LevelUpOffered { offers: Vec<UpgradeId>, pending: u32 },
    UpgradeApplied { id: UpgradeId, tier: u32 },
    LevelReached { level: u32 },
    AsteroidDestroyed { id: EntityId, kind: AsteroidKind, size: u8, children: usize },
    ShieldAbsorbed { charges_left: u32 },
    OrbCollected { kind: EntityKind },
    SpecialSpawned { kind: AsteroidKind },
    GameOver { reason: String },
}

/// Complete simulation context for one session
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: SimConfig,
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Render-surface size from the host (zero until known)
    pub bounds: Vec2,
    /// Host wall clock for this tick (ms)
    pub now_ms: f64,
    /// Ticks simulated while playing
    pub time_ticks: u64,
    pub ship: Ship,
    pub store: EntityStore,
    pub director: SpawningDirector,
    pub progression: ProgressionController,
    /// Screen shake intensity (0-1)
    pub screen_shake: f32,
    pub rng: Pcg32,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a session in the menu
    pub fn new(config: SimConfig, tuning: Tuning) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(config.seed),
            director: SpawningDirector::new(&tuning),
            progression: ProgressionController::new(&config),
            config,
            tuning,
            phase: GamePhase::Menu,
            bounds: Vec2::ZERO,
            now_ms: 0.0,
            time_ticks: 0,
            ship: Ship::new(Vec2::ZERO),
            store: EntityStore::new(),
            screen_shake: 0.0,
            events: Vec::new(),
        }
    }

    /// Reset everything and begin a run
    ///
    /// With a start level above 1 the run opens straight into upgrade picks.
    pub fn start_run(&mut self) {
        self.store.clear();
        self.ship = Ship::new(self.bounds * 0.5);
        self.progression = ProgressionController::new(&self.config);
        self.director = SpawningDirector::new(&self.tuning);
        self.time_ticks = 0;
        self.screen_shake = 0.0;
        self.phase = GamePhase::Playing;
        log::info!(
            "Run started (seed {}, start level {}, dev {}, sandbox {})",
            self.config.seed,
            self.config.start_level,
            self.config.dev_mode,
            self.config.sandbox
        );
        if self.progression.pending > 0 {
            progression::enter_level_up(self);
        }
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Damage the ship through the shared shield/game-over path
    pub fn hurt_ship(&mut self, amount: f32, cause: &str) -> DamageOutcome {
        if self.phase != GamePhase::Playing {
            return DamageOutcome::Suppressed;
        }
        let outcome = self.ship.take_damage(amount, self.now_ms);
        match outcome {
            DamageOutcome::ShieldAbsorbed => {
                let charges_left = self.ship.stats.shield_charges;
                log::debug!("Shield absorbed lethal hit ({charges_left} charges left)");
                self.screen_shake = (self.screen_shake + 0.4).min(1.0);
                self.push_event(GameEvent::ShieldAbsorbed { charges_left });
            }
            DamageOutcome::Destroyed => self.game_over(cause.to_string()),
            DamageOutcome::Hurt => {
                self.screen_shake = (self.screen_shake + 0.15).min(1.0);
            }
            DamageOutcome::Suppressed => {}
        }
        outcome
    }

    /// End the run
    pub fn game_over(&mut self, reason: String) {
        log::info!(
            "Game over at level {} with score {:.0}: {}",
            self.progression.level,
            self.progression.score,
            reason
        );
        self.phase = GamePhase::GameOver;
        self.screen_shake = 1.0;
        spawn_burst(&mut self.store, &mut self.rng, self.ship.body.pos, 40, 4.0, 99);
        self.push_event(GameEvent::GameOver { reason });
    }

    /// Read-only view for the renderer/HUD
    pub fn snapshot(&self) -> FrameSnapshot<'_> {
        FrameSnapshot {
            phase: self.phase,
            tick: self.time_ticks,
            bounds: self.bounds,
            ship: &self.ship,
            asteroids: &self.store.asteroids,
            clouds: &self.store.clouds,
            bullets: &self.store.bullets,
            particles: &self.store.particles,
            orbs: &self.store.orbs,
            drones: &self.store.drones,
            texts: &self.store.texts,
            score: self.progression.score,
            level: self.progression.level,
            xp_target: self.progression.xp_target,
            pending_picks: self.progression.pending,
            offers: &self.progression.offers,
            active_upgrades: &self.progression.active,
            screen_shake: self.screen_shake,
        }
    }
}

/// Immutable per-frame view handed to the host
#[derive(Debug, Clone, Serialize)]
pub struct FrameSnapshot<'a> {
    pub phase: GamePhase,
    pub tick: u64,
    pub bounds: Vec2,
    pub ship: &'a Ship,
    pub asteroids: &'a [Asteroid],
    pub clouds: &'a [AsteroidCloud],
    pub bullets: &'a [Bullet],
    pub particles: &'a [Particle],
    pub orbs: &'a [Orb],
    pub drones: &'a [Drone],
    pub texts: &'a [FloatingText],
    pub score: f32,
    pub level: u32,
    pub xp_target: f32,
    pub pending_picks: u32,
    pub offers: &'a [UpgradeId],
    pub active_upgrades: &'a BTreeMap<UpgradeId, u32>,
    pub screen_shake: f32,
}

/// Scatter `count` particles from `pos`
pub fn spawn_burst(store: &mut EntityStore, rng: &mut Pcg32, pos: Vec2, count: usize, speed: f32, tint: u32) {
    for _ in 0..count {
        let dir = heading(rng.random_range(0.0..std::f32::consts::TAU));
        let vel = dir * speed * rng.random_range(0.3..1.0);
        let life = PARTICLE_LIFE * rng.random_range(0.5..1.0);
        store.spawn(Spawn::Particle(Particle {
            body: Body::new(pos, vel, rng.random_range(1.0..3.0)),
            life,
            max_life: life,
            tint,
        }));
    }
}
