//! Obstacles and the spawner that paces them.

use arcade_window::Rect;
use rand::Rng;

use crate::config::RunnerConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObstacleKind {
    /// Sits on the ground line; must be jumped.
    Ground,
    /// Hangs at head height; must be ducked.
    Flying,
}

impl ObstacleKind {
    /// (width, height, clearance above the ground line to the box's top).
    pub fn geometry(self) -> (f32, f32, f32) {
        match self {
            ObstacleKind::Ground => (20.0, 30.0, 30.0),
            ObstacleKind::Flying => (30.0, 20.0, 50.0),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Obstacle {
    pub kind:  ObstacleKind,
    pub x:     f32,
    pub y:     f32,
    pub speed: f32,
}

impl Obstacle {
    pub fn new(kind: ObstacleKind, x: f32, ground_y: f32, speed: f32) -> Self {
        let (_, _, clearance) = kind.geometry();
        Obstacle { kind, x, y: ground_y - clearance, speed }
    }

    pub fn rect(&self) -> Rect {
        let (w, h, _) = self.kind.geometry();
        Rect::new(self.x, self.y, w, h)
    }

    pub fn advance(&mut self) {
        self.x -= self.speed;
    }

    /// Trailing edge is past the left boundary.
    pub fn has_exited(&self) -> bool {
        self.rect().right() < 0.0
    }
}

/// Countdown that drops a new obstacle at the right edge when it runs out.
#[derive(Clone, Debug)]
pub struct Spawner {
    countdown: i64,
}

impl Default for Spawner {
    fn default() -> Self {
        // First obstacle on the first tick.
        Spawner { countdown: 0 }
    }
}

impl Spawner {
    pub fn countdown(&self) -> i64 { self.countdown }

    /// Tick the countdown; returns the obstacle spawned this tick, if any.
    pub fn tick<R: Rng>(&mut self, cfg: &RunnerConfig, score: u32, rng: &mut R) -> Option<Obstacle> {
        self.countdown -= 1;
        if self.countdown > 0 {
            return None;
        }
        let speed = ground_speed(cfg, score);
        let obstacle = if rng.gen_bool(flying_probability(cfg)) {
            Obstacle::new(ObstacleKind::Flying, cfg.width + 50.0, cfg.ground_y(), speed + cfg.flying_speed_bonus)
        } else {
            Obstacle::new(ObstacleKind::Ground, cfg.width + 50.0, cfg.ground_y(), speed)
        };
        self.countdown = spawn_interval(cfg, score) as i64;
        Some(obstacle)
    }
}

/// `flying_chance` forced into `[0, 1]`; NaN counts as never.
fn flying_probability(cfg: &RunnerConfig) -> f64 {
    if cfg.flying_chance.is_nan() { 0.0 } else { cfg.flying_chance.clamp(0.0, 1.0) }
}

/// Base speed plus one per `points_per_speed_step` points.
pub fn ground_speed(cfg: &RunnerConfig, score: u32) -> f32 {
    cfg.base_speed + (score / cfg.points_per_speed_step.max(1)) as f32
}

/// Ticks until the next spawn: one tick shorter per 10 points, by at most
/// `spawn_shrink_cap`, never below `spawn_interval_min`.
pub fn spawn_interval(cfg: &RunnerConfig, score: u32) -> u32 {
    let shrink = (score / 10).min(cfg.spawn_shrink_cap);
    cfg.spawn_interval_max.saturating_sub(shrink).max(cfg.spawn_interval_min)
}
