//! Spacegame headless driver
//!
//! Runs the simulation without a window: a tiny autopilot steers the ship
//! toward the nearest enemy, runs are restarted on game over, and the best
//! score is persisted between invocations.
//!
//! Usage: `spacegame [frames] [tuning.json]`

use spacegame::background::ParallaxBackground;
use spacegame::consts::FRAME_DT;
use spacegame::highscores::HIGHSCORE_FILE;
use spacegame::render::{AssetHandles, DrawLog};
use spacegame::sim::{Category, GameEvent, Session};
use spacegame::{HighScore, Tuning};

const DEFAULT_FRAMES: u64 = 60 * 60 * 5;

fn main() {
    env_logger::init();
    log::info!("Spacegame (headless) starting...");

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let frames = match args.next() {
        Some(n) => n.parse::<u64>()?,
        None => DEFAULT_FRAMES,
    };
    let tuning = match args.next() {
        Some(path) => {
            log::info!("Loading tuning from {}", path);
            Tuning::from_json(&std::fs::read_to_string(path)?)?
        }
        None => Tuning::default(),
    };

    let mut best = HighScore::load(HIGHSCORE_FILE)?;
    let assets = AssetHandles::default();
    let mut session =
        Session::with_background(ParallaxBackground::new(assets.background_layers), assets, tuning)?;
    session.set_highscore(best.best);
    session.start();

    let mut renderer = DrawLog::default();
    let mut runs = 1u32;
    for _ in 0..frames {
        steer(&mut session);
        session.update(FRAME_DT);

        renderer.clear();
        session.draw(&mut renderer);

        for event in session.drain_events() {
            if let GameEvent::GameOver { score, highscore } = event {
                log::info!("Run {} over: score {} (best {})", runs, score, highscore);
                best.submit(score);
            }
        }

        if session.is_gameover() {
            runs += 1;
            session.restart();
        }
    }

    log::info!(
        "{} frames, {} runs, last score {}, best {}",
        frames,
        runs,
        session.score(),
        best.best
    );
    best.save(HIGHSCORE_FILE)?;
    Ok(())
}

/// Climb toward the lowest live enemy, otherwise hold mid-field
fn steer(session: &mut Session) {
    let player = session.player();
    let target = session
        .pool()
        .active(Category::Enemy)
        .map(|e| e.pos.y)
        .min_by(f32::total_cmp)
        .unwrap_or(300.0);

    if player.pos.y < target {
        session.accelerate_up();
    } else {
        session.stop_accelerating();
    }
}
