//! Headless blockfall runner (default binary).
//!
//! Plays a scripted game frame by frame and prints the final session
//! snapshot as JSON. Useful for smoke-testing engine changes and for
//! producing fixtures.
//!
//! Usage: `blockfall [config.json] [seed]`
//!
//! Logging is controlled through `RUST_LOG` (default `info`).

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use blockfall::core::EngineConfig;
use blockfall::engine::{Action, Phase, Session};

/// Frame budget for one run, in case the script never tops out
const MAX_FRAMES: u32 = 60 * 60 * 10;

/// Hard drop cadence while falling
const FRAMES_PER_DROP: u32 = 20;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => load_config(Path::new(&path))?,
        None => EngineConfig::default(),
    };
    let seed = match args.next() {
        Some(raw) => raw
            .parse::<u32>()
            .with_context(|| format!("invalid seed {raw:?}"))?,
        None => 1,
    };

    let mut session = Session::new(config, seed)?;
    info!(
        width = config.grid_width,
        height = config.grid_height,
        seed,
        "session started"
    );

    let frames = run(&mut session)?;
    info!(
        frames,
        score = session.score(),
        lines = session.lines(),
        level = session.level(),
        "session finished"
    );

    let snapshot = serde_json::to_string_pretty(&session.snapshot())?;
    println!("{snapshot}");
    Ok(())
}

fn load_config(path: &Path) -> Result<EngineConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config = EngineConfig::from_json_str(&json)
        .with_context(|| format!("failed to load {}", path.display()))?;
    Ok(config)
}

/// Walk each block to a column picked from the drop count, then hard drop it.
fn run(session: &mut Session) -> Result<u32> {
    let width = session.grid().width() as i32;
    let mut drops: i32 = 0;

    for frame in 0..MAX_FRAMES {
        if session.is_game_over() {
            return Ok(frame);
        }

        if session.phase() == Phase::Falling && frame % FRAMES_PER_DROP == 0 {
            if drops % 3 == 1 {
                session.apply_action(Action::RotateCw)?;
            }
            let target = (drops * 3) % width;
            let shift = target - width / 2;
            let step = if shift < 0 { Action::MoveLeft } else { Action::MoveRight };
            for _ in 0..shift.abs() {
                if !session.apply_action(step)? {
                    break;
                }
            }
            session.apply_action(Action::HardDrop)?;
            drops += 1;
        }

        session.tick()?;
    }
    Ok(MAX_FRAMES)
}
