//! Runner simulation: one call to [`RunnerSim::tick`] per frame.
//!
//! Per tick, in order:
//!
//! 1. apply the jump / duck actions drained from the shared gesture state;
//! 2. player physics and the duck timer;
//! 3. spawner countdown;
//! 4. move obstacles, retire the ones that left the board and score them;
//! 5. collision: at most one hit per tick, then soft reset or game over.
//!
//! Once the phase is [`Phase::GameOver`] ticks are no-ops.

use arcade_window::Rect;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::RunnerConfig;
use super::obstacle::{Obstacle, ObstacleKind, Spawner};
use super::player::{Player, Stance};

/// Actions for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Actions {
    pub jump: bool,
    pub duck: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Playing,
    GameOver,
}

/// What happened during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Obstacles that left the board this tick.
    pub passed: u32,
    pub hit:    bool,
}

/// Read-only view handed to presentation once per tick.
#[derive(Clone, Debug, PartialEq)]
pub struct RunnerFrame {
    pub player:       Rect,
    pub obstacles:    Vec<(Rect, ObstacleKind)>,
    pub score:        u32,
    pub lives:        u32,
    pub last_gesture: String,
    pub phase:        Phase,
    pub show_hint:    bool,
}

pub struct RunnerSim<R: Rng = StdRng> {
    cfg:        RunnerConfig,
    player:     Player,
    obstacles:  Vec<Obstacle>,
    spawner:    Spawner,
    score:      u32,
    lives:      u32,
    phase:      Phase,
    ticks:      u64,
    duck_ticks: u32,
    hint_ticks: u64,
    rng:        R,
}

impl RunnerSim<StdRng> {
    pub fn new(cfg: RunnerConfig) -> Self {
        Self::with_rng(cfg, StdRng::from_entropy())
    }
}

impl<R: Rng> RunnerSim<R> {
    pub fn with_rng(cfg: RunnerConfig, rng: R) -> Self {
        let duck_ticks = cfg.ticks(cfg.duck_duration_secs);
        let hint_ticks = cfg.ticks(cfg.hint_secs) as u64;
        RunnerSim {
            player:    Player::new(cfg.ground_y()),
            obstacles: Vec::new(),
            spawner:   Spawner::default(),
            score:     0,
            lives:     cfg.max_lives,
            phase:     if cfg.max_lives == 0 { Phase::GameOver } else { Phase::Playing },
            ticks:     0,
            duck_ticks,
            hint_ticks,
            rng,
            cfg,
        }
    }

    pub fn config(&self) -> &RunnerConfig { &self.cfg }
    pub fn player(&self) -> &Player { &self.player }
    pub fn obstacles(&self) -> &[Obstacle] { &self.obstacles }
    pub fn score(&self) -> u32 { self.score }
    pub fn lives(&self) -> u32 { self.lives }
    pub fn phase(&self) -> Phase { self.phase }
    pub fn ticks(&self) -> u64 { self.ticks }

    pub fn tick(&mut self, actions: Actions) -> TickReport {
        let mut report = TickReport::default();
        if self.phase == Phase::GameOver {
            return report;
        }

        // Jump is checked first, so a simultaneous duck is dropped by the
        // stance rules rather than the other way round.
        if actions.jump && self.player.jump(self.cfg.jump_impulse) {
            log::trace!("jump at tick {}", self.ticks);
        }
        if actions.duck && self.player.duck(self.duck_ticks) {
            log::trace!("duck at tick {}", self.ticks);
        }
        self.player.update(self.cfg.gravity_per_tick);

        if let Some(o) = self.spawner.tick(&self.cfg, self.score, &mut self.rng) {
            self.obstacles.push(o);
        }

        for o in &mut self.obstacles {
            o.advance();
        }
        let before = self.obstacles.len();
        self.obstacles.retain(|o| !o.has_exited());
        report.passed = (before - self.obstacles.len()) as u32;
        self.score += report.passed * self.cfg.score_per_obstacle;

        let hitbox = self.player.rect();
        if let Some(i) = self.obstacles.iter().position(|o| o.rect().intersects(&hitbox)) {
            let o = self.obstacles.remove(i);
            report.hit = true;
            self.lives = self.lives.saturating_sub(1);
            log::debug!("hit {:?} obstacle, {} lives left", o.kind, self.lives);
            if self.lives == 0 {
                self.phase = Phase::GameOver;
                log::info!("game over at tick {} with score {}", self.ticks, self.score);
            } else {
                self.player.reset();
            }
        }

        self.ticks += 1;
        report
    }

    pub fn frame(&self, last_gesture: &str) -> RunnerFrame {
        RunnerFrame {
            player:       self.player.rect(),
            obstacles:    self.obstacles.iter().map(|o| (o.rect(), o.kind)).collect(),
            score:        self.score,
            lives:        self.lives,
            last_gesture: last_gesture.to_string(),
            phase:        self.phase,
            show_hint:    self.ticks < self.hint_ticks,
        }
    }

    pub fn stance(&self) -> Stance {
        self.player.stance()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
