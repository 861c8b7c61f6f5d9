//! Paddle simulation: two level-driven paddles and a bouncing ball.
//!
//! Per tick: move both paddles, integrate the ball, flip `vy` on a wall,
//! flip `vx` on a paddle, then score and re-serve if the ball left the board.

use arcade_window::Rect;
use gesture_link::Intent;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::PaddleConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Paddle {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Paddle {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    /// Move by the intent's velocity, clamped to `[0, board_h - h]`.
    pub fn drive(&mut self, intent: Intent, speed: f32, board_h: f32) {
        let max = (board_h - self.h).max(0.0);
        self.y = (self.y + intent.velocity(speed)).clamp(0.0, max);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ball {
    pub x:    f32,
    pub y:    f32,
    pub vx:   f32,
    pub vy:   f32,
    pub size: f32,
}

impl Ball {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.size, self.size)
    }
}

/// Read-only view for presentation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaddleFrame {
    pub left:        Rect,
    pub right:       Rect,
    pub ball:        Rect,
    pub score_left:  u32,
    pub score_right: u32,
}

pub struct Court<R: Rng = StdRng> {
    cfg:         PaddleConfig,
    left:        Paddle,
    right:       Paddle,
    ball:        Ball,
    score_left:  u32,
    score_right: u32,
    ticks:       u64,
    rng:         R,
}

impl Court<StdRng> {
    pub fn new(cfg: PaddleConfig) -> Self {
        Self::with_rng(cfg, StdRng::from_entropy())
    }
}

impl<R: Rng> Court<R> {
    pub fn with_rng(cfg: PaddleConfig, rng: R) -> Self {
        let y = (cfg.height - cfg.paddle_height) / 2.0;
        let left = Paddle { x: cfg.paddle_margin, y, w: cfg.paddle_width, h: cfg.paddle_height };
        let right = Paddle {
            x: cfg.width - cfg.paddle_margin - cfg.paddle_width,
            ..left
        };
        let mut ball = Ball { x: 0.0, y: 0.0, vx: cfg.ball_vx, vy: cfg.ball_vy, size: cfg.ball_size };
        center(&mut ball, &cfg);
        Court { cfg, left, right, ball, score_left: 0, score_right: 0, ticks: 0, rng }
    }

    pub fn left(&self) -> &Paddle { &self.left }
    pub fn right(&self) -> &Paddle { &self.right }
    pub fn ball(&self) -> &Ball { &self.ball }
    pub fn scores(&self) -> (u32, u32) { (self.score_left, self.score_right) }
    pub fn ticks(&self) -> u64 { self.ticks }

    /// Advance one tick.  Returns the side that scored, if any.
    pub fn tick(&mut self, left: Intent, right: Intent) -> Option<Side> {
        let (speed, h, w) = (self.cfg.paddle_speed, self.cfg.height, self.cfg.width);
        self.left.drive(left, speed, h);
        self.right.drive(right, speed, h);

        let b = &mut self.ball;
        b.x += b.vx;
        b.y += b.vy;
        if b.y <= 0.0 || b.y + b.size >= h {
            b.vy = -b.vy;
        }
        let r = b.rect();
        if r.intersects(&self.left.rect()) || r.intersects(&self.right.rect()) {
            b.vx = -b.vx;
        }

        let scored = if r.x <= 0.0 {
            self.score_right += 1;
            Some(Side::Right)
        } else if r.right() >= w {
            self.score_left += 1;
            Some(Side::Left)
        } else {
            None
        };
        if let Some(side) = scored {
            log::debug!("{:?} scores: {} - {}", side, self.score_left, self.score_right);
            self.serve();
        }

        self.ticks += 1;
        scored
    }

    /// Re-centre the ball, reverse its horizontal direction and draw a new
    /// vertical speed from `{-serve_vy, +serve_vy}`.
    fn serve(&mut self) {
        center(&mut self.ball, &self.cfg);
        self.ball.vx = -self.ball.vx;
        let k = self.cfg.serve_vy;
        self.ball.vy = if self.rng.gen_bool(0.5) { k } else { -k };
    }

    pub fn frame(&self) -> PaddleFrame {
        PaddleFrame {
            left:        self.left.rect(),
            right:       self.right.rect(),
            ball:        self.ball.rect(),
            score_left:  self.score_left,
            score_right: self.score_right,
        }
    }
}

fn center(ball: &mut Ball, cfg: &PaddleConfig) {
    ball.x = (cfg.width - ball.size) / 2.0;
    ball.y = (cfg.height - ball.size) / 2.0;
}
