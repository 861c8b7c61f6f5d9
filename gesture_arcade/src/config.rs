//! Game configuration.
//!
//! Built once at startup and handed to both the worker and the simulation.
//! Every field has a default; `gesture_arcade.toml` in the working directory,
//! if present, overrides any subset of them.

use std::path::Path;

use gesture_link::config::{check_finite, check_fps, check_secs, check_unit, load_or_default, secs};
use gesture_link::{ConfigError, InputConfig};
use serde::{Deserialize, Serialize};

/// File name looked up in the working directory at startup.
pub const CONFIG_FILE: &str = "gesture_arcade.toml";

pub const DEFAULT_MODEL_PATH: &str = "/home/kinetika/gestures.eim";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcadeConfig {
    pub input:  InputConfig,
    pub runner: RunnerConfig,
    pub paddle: PaddleConfig,
}

impl ArcadeConfig {
    /// Defaults overridden by `path` if it exists, rejected if any value is
    /// out of range.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let cfg: Self = load_or_default(path)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.input.validate()?;
        self.runner.validate()?;
        self.paddle.validate()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Runner
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub width:  f32,
    pub height: f32,
    /// Distance from the bottom edge to the ground line.
    pub ground_margin: f32,
    pub fps: u32,

    pub gravity_per_tick:   f32,
    pub jump_impulse:       f32,
    pub duck_duration_secs: f32,
    pub max_lives:          u32,

    /// Ground obstacle speed at score 0.
    pub base_speed:          f32,
    /// Extra speed flying obstacles get on top of the ground speed.
    pub flying_speed_bonus:  f32,
    /// Probability that a spawned obstacle flies.
    pub flying_chance:       f64,
    pub score_per_obstacle:  u32,
    /// Score needed for each +1 of obstacle speed.
    pub points_per_speed_step: u32,
    /// Spawn countdown at score 0, in ticks.
    pub spawn_interval_max:  u32,
    /// Lower bound on the spawn countdown.
    pub spawn_interval_min:  u32,
    /// Most the countdown may shrink as the score grows.
    pub spawn_shrink_cap:    u32,

    pub hint_secs:           f32,
    pub game_over_pause_secs: f32,

    pub jump_label: String,
    pub duck_label: String,
    pub model_path: String,
    pub camera_index: u32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            width:  800.0,
            height: 300.0,
            ground_margin: 40.0,
            fps: 60,

            gravity_per_tick:   0.54,
            jump_impulse:       -12.0,
            duck_duration_secs: 1.0,
            max_lives:          3,

            base_speed:            6.0,
            flying_speed_bonus:    1.0,
            flying_chance:         0.3,
            score_per_obstacle:    10,
            points_per_speed_step: 100,
            spawn_interval_max:    90,
            spawn_interval_min:    30,
            spawn_shrink_cap:      50,

            hint_secs:            3.0,
            game_over_pause_secs: 2.0,

            jump_label: "peace".to_string(),
            duck_label: "good".to_string(),
            model_path: DEFAULT_MODEL_PATH.to_string(),
            camera_index: 0,
        }
    }
}

impl RunnerConfig {
    pub fn ground_y(&self) -> f32 {
        self.height - self.ground_margin
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_fps("runner.fps", self.fps)?;
        check_secs("runner.duck_duration_secs", self.duck_duration_secs)?;
        check_secs("runner.hint_secs", self.hint_secs)?;
        check_secs("runner.game_over_pause_secs", self.game_over_pause_secs)?;
        check_unit("runner.flying_chance", self.flying_chance)?;
        for (field, v) in [
            ("runner.width", self.width),
            ("runner.height", self.height),
            ("runner.ground_margin", self.ground_margin),
            ("runner.gravity_per_tick", self.gravity_per_tick),
            ("runner.jump_impulse", self.jump_impulse),
            ("runner.base_speed", self.base_speed),
            ("runner.flying_speed_bonus", self.flying_speed_bonus),
        ] {
            check_finite(field, v)?;
        }
        Ok(())
    }

    /// Whole ticks covering `secs` at this config's rate.
    pub fn ticks(&self, s: f32) -> u32 {
        (secs(s).as_secs_f64() * self.fps as f64).round() as u32
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Paddle
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaddleConfig {
    pub width:  f32,
    pub height: f32,
    pub fps:    u32,

    pub paddle_width:  f32,
    pub paddle_height: f32,
    /// Gap between each paddle and its side wall.
    pub paddle_margin: f32,
    pub paddle_speed:  f32,

    pub ball_size: f32,
    pub ball_vx:   f32,
    pub ball_vy:   f32,
    /// Vertical speed magnitudes a serve may draw from, each with either sign.
    pub serve_vy:  f32,

    pub left_label:  String,
    pub right_label: String,
    /// Height of the classifier's input frame; its midline splits up from down.
    pub frame_height: f32,
    pub model_path:  String,
    pub camera_index: u32,
}

impl Default for PaddleConfig {
    fn default() -> Self {
        PaddleConfig {
            width:  800.0,
            height: 400.0,
            fps:    30,

            paddle_width:  15.0,
            paddle_height: 100.0,
            paddle_margin: 20.0,
            paddle_speed:  10.0,

            ball_size: 20.0,
            ball_vx:   10.0,
            ball_vy:   10.0,
            serve_vy:  4.0,

            left_label:  "five".to_string(),
            right_label: "peace".to_string(),
            frame_height: 320.0,
            model_path:  DEFAULT_MODEL_PATH.to_string(),
            camera_index: 0,
        }
    }
}

impl PaddleConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_fps("paddle.fps", self.fps)?;
        for (field, v) in [
            ("paddle.width", self.width),
            ("paddle.height", self.height),
            ("paddle.paddle_width", self.paddle_width),
            ("paddle.paddle_height", self.paddle_height),
            ("paddle.paddle_margin", self.paddle_margin),
            ("paddle.paddle_speed", self.paddle_speed),
            ("paddle.ball_size", self.ball_size),
            ("paddle.ball_vx", self.ball_vx),
            ("paddle.ball_vy", self.ball_vy),
            ("paddle.serve_vy", self.serve_vy),
            ("paddle.frame_height", self.frame_height),
        ] {
            check_finite(field, v)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gesture_link::config::from_toml_str;

    #[test]
    fn documented_defaults() {
        let c = ArcadeConfig::default();
        assert_eq!(c.input.confidence_threshold, 0.60);
        assert_eq!(c.runner.gravity_per_tick, 0.54);
        assert_eq!(c.runner.jump_impulse, -12.0);
        assert_eq!(c.runner.duck_duration_secs, 1.0);
        assert_eq!(c.runner.max_lives, 3);
        assert_eq!(c.runner.fps, 60);
        assert_eq!(c.paddle.fps, 30);
        assert_eq!(c.runner.ground_y(), 260.0);
    }

    #[test]
    fn duck_duration_in_ticks() {
        let c = RunnerConfig::default();
        assert_eq!(c.ticks(c.duck_duration_secs), 60);
        assert_eq!(c.ticks(0.5), 30);
        assert_eq!(c.ticks(-3.0), 0);
    }

    #[test]
    fn nested_override() {
        let text = "[runner]\nmax_lives = 5\n\n[paddle]\nleft_label = \"fist\"\n";
        let c: ArcadeConfig = from_toml_str(text, "inline").unwrap();
        assert_eq!(c.runner.max_lives, 5);
        assert_eq!(c.runner.jump_label, "peace");
        assert_eq!(c.paddle.left_label, "fist");
        assert_eq!(c.input, InputConfig::default());
    }

    fn rejected(text: &str) -> String {
        let c: ArcadeConfig = from_toml_str(text, "inline").unwrap();
        match c.validate() {
            Err(ConfigError::Invalid { field, .. }) => field,
            other => panic!("{:?} accepted: {:?}", text, other),
        }
    }

    #[test]
    fn defaults_validate() {
        assert!(ArcadeConfig::default().validate().is_ok());
    }

    #[test]
    fn huge_durations_are_config_errors() {
        assert_eq!(rejected("[runner]\nduck_duration_secs = 1e20"), "runner.duck_duration_secs");
        assert_eq!(rejected("[runner]\nhint_secs = 1e20"), "runner.hint_secs");
        assert_eq!(rejected("[runner]\ngame_over_pause_secs = inf"), "runner.game_over_pause_secs");
        assert_eq!(rejected("[input]\ncooldown_secs = 1e20"), "input.cooldown_secs");
        assert_eq!(rejected("[input]\nshutdown_timeout_secs = 1e20"), "input.shutdown_timeout_secs");
    }

    #[test]
    fn flying_chance_must_be_a_probability() {
        assert_eq!(rejected("[runner]\nflying_chance = nan"), "runner.flying_chance");
        assert_eq!(rejected("[runner]\nflying_chance = 2.0"), "runner.flying_chance");
    }

    #[test]
    fn zero_fps_and_non_finite_sizes_are_rejected() {
        assert_eq!(rejected("[runner]\nfps = 0"), "runner.fps");
        assert_eq!(rejected("[paddle]\nfps = 0"), "paddle.fps");
        assert_eq!(rejected("[paddle]\nball_vx = inf"), "paddle.ball_vx");
    }

    #[test]
    fn oversized_duration_does_not_panic_tick_conversion() {
        let c = RunnerConfig { duck_duration_secs: 1e20, ..RunnerConfig::default() };
        assert_eq!(c.ticks(c.duck_duration_secs), u32::MAX);
    }

    #[test]
    fn load_rejects_bad_file() {
        let path = std::env::temp_dir().join(format!("gesture_arcade_bad_{}.toml", std::process::id()));
        std::fs::write(&path, "[runner]\nduck_duration_secs = 1e20\n").unwrap();
        let r = ArcadeConfig::load(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(r, Err(ConfigError::Invalid { .. })));
    }
}
