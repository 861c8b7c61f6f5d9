//! dino_run: obstacle runner.
//!
//! Usage: `dino_run [model-path] [camera-index]`

use std::path::{Path, PathBuf};

use anyhow::Context;
use gesture_arcade::{runner, ArcadeConfig, CONFIG_FILE};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = ArcadeConfig::load(Path::new(CONFIG_FILE))
        .with_context(|| format!("loading {}", CONFIG_FILE))?;

    let mut args = std::env::args().skip(1);
    let model = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&cfg.runner.model_path));
    let camera = match args.next() {
        Some(a) => a.parse().unwrap_or_else(|_| {
            log::warn!("camera index {:?} is not a number; using {}", a, cfg.runner.camera_index);
            cfg.runner.camera_index
        }),
        None => cfg.runner.camera_index,
    };

    log::info!("model {}, camera {}", model.display(), camera);
    let outcome = runner::run(cfg, model, camera).context("runner game failed")?;

    println!("Game Over! Final Score: {}", outcome.score);
    log::info!("exited after {} ticks (game over: {})", outcome.ticks, outcome.game_over);
    Ok(())
}
