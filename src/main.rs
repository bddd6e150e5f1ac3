//! Headless demo: one autopilot run, then a summary in the log.
//!
//! Usage: `flappy-dragon [seed]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::path::Path;

    use flappy_dragon::GameSession;
    use flappy_dragon::consts::FRAME_DT;
    use flappy_dragon::platform;
    use flappy_dragon::sim::{RunPhase, autopilot_input};

    /// Simulated seconds before the demo gives up
    const MAX_DEMO_SECONDS: f32 = 120.0;

    if let Err(e) = platform::init_logging() {
        eprintln!("logger already installed: {}", e);
    }

    let seed = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<u64>().unwrap_or_else(|_| {
            log::warn!("Seed '{}' is not a number, using the clock", arg);
            clock_seed()
        }),
        None => clock_seed(),
    };
    log::info!("Flappy Dragon (native) starting, seed {}", seed);

    let store = platform::default_store(Path::new("flappy-dragon-save.json"));
    let mut session = GameSession::new(seed)
        .with_store(store)
        .with_audio(platform::default_audio());
    session.start_run();

    let max_ticks = (MAX_DEMO_SECONDS / FRAME_DT) as usize;
    for _ in 0..max_ticks {
        let input = autopilot_input(session.run());
        if input.flap {
            session.request_flap();
        }
        if input.fire {
            session.request_fire();
        }
        session.tick(FRAME_DT);
        if session.phase() == RunPhase::Terminated {
            break;
        }
    }

    let run = session.run();
    match session.snapshot() {
        Some(snapshot) => log::info!(
            "Crashed into the {} after {:.1}s: score {}, kills {}, shards {}",
            snapshot.cause.as_str(),
            snapshot.elapsed,
            snapshot.score,
            snapshot.kills,
            snapshot.shards.lifetime
        ),
        None => log::info!(
            "Survived {:.0}s: score {}, kills {}, shards {}",
            run.elapsed,
            run.score,
            run.kills,
            run.shards.lifetime
        ),
    }
    log::info!(
        "Best score {}, weather now {}",
        session.progress().best_score,
        session.weather().current().id()
    );
}

#[cfg(not(target_arch = "wasm32"))]
fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser host drives GameSession through the library
}
