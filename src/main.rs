//! Void Drift headless runner
//!
//! Plays one session with a scripted pilot and prints a JSON summary of the
//! final frame. Usage: `void-drift [config.json] [tuning.json] [ticks]`

#[cfg(not(target_arch = "wasm32"))]
use void_drift::sim::{GameEvent, GamePhase, GameState, TickInput, tick};

#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_TICKS: u64 = 60 * 180;

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use void_drift::{SimConfig, Tuning};

    env_logger::init();
    log::info!("Void Drift (headless) starting...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match args.first() {
        Some(path) => SimConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => SimConfig::default(),
    };
    let tuning = match args.get(1) {
        Some(path) => Tuning::from_json(&std::fs::read_to_string(path)?)?,
        None => Tuning::default(),
    };
    let ticks = match args.get(2) {
        Some(n) => n.parse()?,
        None => DEFAULT_TICKS,
    };

    let mut state = GameState::new(config, tuning);
    let bounds = glam::Vec2::new(1280.0, 720.0);

    for t in 0..ticks {
        let input = pilot(&state, t, bounds);
        tick(&mut state, &input);
        for event in state.drain_events() {
            report(t, &event);
        }
        if state.phase == GamePhase::GameOver {
            break;
        }
    }

    let snap = state.snapshot();
    let summary = serde_json::json!({
        "phase": snap.phase,
        "ticks": snap.tick,
        "score": snap.score,
        "level": snap.level,
        "xp_target": snap.xp_target,
        "hull": snap.ship.hull,
        "max_hull": snap.ship.max_hull,
        "asteroids": snap.asteroids.len(),
        "drones": snap.drones.len(),
        "upgrades": snap.active_upgrades,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Scripted input: turn toward the nearest asteroid and keep some distance
#[cfg(not(target_arch = "wasm32"))]
fn pilot(state: &GameState, t: u64, bounds: glam::Vec2) -> TickInput {
    let mut input = TickInput {
        bounds,
        now_ms: t as f64 * 1000.0 / 60.0,
        start: t == 0,
        select: Some(0),
        ..Default::default()
    };

    let ship = &state.ship;
    let nearest = state
        .store
        .asteroids
        .iter()
        .filter(|a| !a.body.removed)
        .min_by(|a, b| {
            a.body
                .pos
                .distance_squared(ship.body.pos)
                .total_cmp(&b.body.pos.distance_squared(ship.body.pos))
        });
    if let Some(target) = nearest {
        let to = target.body.pos - ship.body.pos;
        let want = to.y.atan2(to.x);
        let diff = void_drift::normalize_angle(want - ship.body.angle);
        input.turn_left = diff < -0.05;
        input.turn_right = diff > 0.05;
        input.thrust = to.length() > 260.0 && diff.abs() < 0.5;
    }
    input
}

#[cfg(not(target_arch = "wasm32"))]
fn report(t: u64, event: &GameEvent) {
    match event {
        GameEvent::AsteroidDestroyed { .. } | GameEvent::OrbCollected { .. } => {
            log::debug!("[{t}] {event:?}")
        }
        _ => log::info!("[{t}] {event:?}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page; nothing to run here
}
