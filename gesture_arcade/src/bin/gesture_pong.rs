//! gesture_pong: paddle game.  Takes no arguments; model and camera come
//! from `gesture_arcade.toml` or the built-in defaults.
//!
//! Exits with an error (code 1) when gesture input cannot start or is lost.

use std::path::Path;

use anyhow::Context;
use gesture_arcade::{paddle, ArcadeConfig, CONFIG_FILE};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = ArcadeConfig::load(Path::new(CONFIG_FILE))
        .with_context(|| format!("loading {}", CONFIG_FILE))?;
    let outcome = paddle::run(cfg).context("paddle game stopped")?;

    log::info!(
        "final score {} - {} after {} ticks",
        outcome.score_left, outcome.score_right, outcome.ticks
    );
    Ok(())
}
