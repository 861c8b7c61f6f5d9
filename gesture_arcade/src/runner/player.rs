//! The runner's player and its stance machine.
//!
//! ```text
//!            jump                         duck
//!   Airborne ◄──── Grounded ──────────────────► Ducking { ticks_left }
//!      │               ▲                            │
//!      └── lands ──────┘◄─── update with ticks_left 0 ─┘
//! ```
//!
//! Ducking is a one-shot latch: it ends on its own timer whatever the duck
//! signal does meanwhile.

use arcade_window::Rect;

pub const PLAYER_X:      f32 = 50.0;
pub const PLAYER_WIDTH:  f32 = 40.0;
pub const STAND_HEIGHT:  f32 = 40.0;
pub const DUCK_HEIGHT:   f32 = STAND_HEIGHT / 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stance {
    Grounded,
    Airborne,
    Ducking { ticks_left: u32 },
}

#[derive(Clone, Debug)]
pub struct Player {
    pub x:      f32,
    /// Top edge.
    pub y:      f32,
    pub vy:     f32,
    stance:     Stance,
    ground_y:   f32,
}

impl Player {
    pub fn new(ground_y: f32) -> Self {
        Player {
            x: PLAYER_X,
            y: ground_y - STAND_HEIGHT,
            vy: 0.0,
            stance: Stance::Grounded,
            ground_y,
        }
    }

    pub fn stance(&self) -> Stance { self.stance }

    pub fn on_ground(&self) -> bool { self.stance != Stance::Airborne }

    pub fn is_ducking(&self) -> bool { matches!(self.stance, Stance::Ducking { .. }) }

    pub fn height(&self) -> f32 {
        if self.is_ducking() { DUCK_HEIGHT } else { STAND_HEIGHT }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, PLAYER_WIDTH, self.height())
    }

    /// Returns whether the jump happened.  Only from `Grounded`.
    pub fn jump(&mut self, impulse: f32) -> bool {
        if self.stance != Stance::Grounded {
            return false;
        }
        self.vy = impulse;
        self.stance = Stance::Airborne;
        true
    }

    /// Returns whether the duck happened.  Only from `Grounded`.
    ///
    /// The next `duration_ticks` updates, starting with the one in the same
    /// tick, leave the player ducked.
    pub fn duck(&mut self, duration_ticks: u32) -> bool {
        if self.stance != Stance::Grounded {
            return false;
        }
        self.stance = Stance::Ducking { ticks_left: duration_ticks };
        self.snap_to_ground();
        true
    }

    /// One tick of gravity, landing and the duck timer.
    pub fn update(&mut self, gravity: f32) {
        self.vy += gravity;
        self.y += self.vy;

        if self.y >= self.ground_y - self.height() {
            self.snap_to_ground();
            if self.stance == Stance::Airborne {
                self.stance = Stance::Grounded;
            }
        } else if self.stance == Stance::Grounded {
            self.stance = Stance::Airborne;
        }

        if let Stance::Ducking { ticks_left } = self.stance {
            match ticks_left {
                0 => {
                    self.stance = Stance::Grounded;
                    self.snap_to_ground();
                }
                left => self.stance = Stance::Ducking { ticks_left: left - 1 },
            }
        }
    }

    /// Back to `Grounded` on the ground line, at rest.
    pub fn reset(&mut self) {
        self.stance = Stance::Grounded;
        self.snap_to_ground();
    }

    fn snap_to_ground(&mut self) {
        self.y = self.ground_y - self.height();
        self.vy = 0.0;
    }
}
