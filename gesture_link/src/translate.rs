//! Label → action translation.
//!
//! Translators are pure: detections in, [`Signals`] out.  Debounce of the
//! jump edge is applied later, by the writer side of
//! [`SharedGestureState`](crate::shared::SharedGestureState), so the same
//! translator can be driven by the worker or by a test.

use std::time::Instant;

use crate::detection::{select_best, Detection, GestureEvent};

// ════════════════════════════════════════════════════════════════════════════
// Intent: level-triggered paddle direction
// ════════════════════════════════════════════════════════════════════════════

/// Direction requested for one paddle.  Screen coordinates: up is negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Intent {
    Up,
    #[default]
    Still,
    Down,
}

impl Intent {
    /// `-speed`, `0` or `+speed`.
    pub fn velocity(self, speed: f32) -> f32 {
        match self {
            Intent::Up    => -speed,
            Intent::Still => 0.0,
            Intent::Down  => speed,
        }
    }

    pub(crate) fn to_raw(self) -> i8 {
        match self {
            Intent::Up    => -1,
            Intent::Still => 0,
            Intent::Down  => 1,
        }
    }

    pub(crate) fn from_raw(raw: i8) -> Self {
        match raw {
            r if r < 0 => Intent::Up,
            0          => Intent::Still,
            _          => Intent::Down,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Signals
// ════════════════════════════════════════════════════════════════════════════

/// Everything one classification cycle has to say.
#[derive(Clone, Debug, PartialEq)]
pub struct Signals {
    /// Best detection of the cycle, for display.
    pub event: GestureEvent,
    /// Jump requested this cycle (still subject to the cooldown).
    pub jump:  bool,
    /// Duck asserted this cycle.
    pub duck:  bool,
    pub left:  Intent,
    pub right: Intent,
}

impl Signals {
    pub fn idle(event: GestureEvent) -> Self {
        Signals { event, jump: false, duck: false, left: Intent::Still, right: Intent::Still }
    }
}

/// Converts one frame of detections into signals.
pub trait Translator: Send + 'static {
    fn translate(&mut self, detections: &[Detection], now: Instant) -> Signals;
}

// ════════════════════════════════════════════════════════════════════════════
// RunnerTranslator: jump / duck
// ════════════════════════════════════════════════════════════════════════════

/// Maps the best detection of a frame onto jump (edge) and duck (level).
#[derive(Clone, Debug)]
pub struct RunnerTranslator {
    pub threshold:  f32,
    pub jump_label: String,
    pub duck_label: String,
}

impl RunnerTranslator {
    pub fn new(threshold: f32, jump_label: &str, duck_label: &str) -> Self {
        RunnerTranslator {
            threshold,
            jump_label: jump_label.to_string(),
            duck_label: duck_label.to_string(),
        }
    }
}

impl Translator for RunnerTranslator {
    fn translate(&mut self, detections: &[Detection], now: Instant) -> Signals {
        let event = select_best(detections, self.threshold, now);
        let jump = event.is(&self.jump_label);
        let duck = !jump && event.is(&self.duck_label);
        Signals { jump, duck, ..Signals::idle(event) }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PaddleTranslator: two labels, two paddles
// ════════════════════════════════════════════════════════════════════════════

/// Drives each paddle from the vertical position of its own label.
///
/// A box whose centre lies above the frame midline means up, otherwise down.
/// Later boxes override earlier ones; boxes are not filtered by confidence.
#[derive(Clone, Debug)]
pub struct PaddleTranslator {
    pub threshold:    f32,
    pub left_label:   String,
    pub right_label:  String,
    /// Height of the classifier's input frame, in its own pixels.
    pub frame_height: f32,
}

impl PaddleTranslator {
    pub fn new(threshold: f32, left_label: &str, right_label: &str, frame_height: f32) -> Self {
        PaddleTranslator {
            threshold,
            left_label:  left_label.to_string(),
            right_label: right_label.to_string(),
            frame_height,
        }
    }

    fn intent_of(&self, d: &Detection) -> Intent {
        match d.bbox {
            Some(b) if b.center_y() < self.frame_height / 2.0 => Intent::Up,
            Some(_) => Intent::Down,
            None    => Intent::Still,
        }
    }
}

impl Translator for PaddleTranslator {
    fn translate(&mut self, detections: &[Detection], now: Instant) -> Signals {
        let mut signals = Signals::idle(select_best(detections, self.threshold, now));
        for d in detections {
            if d.label == self.left_label {
                signals.left = self.intent_of(d);
            } else if d.label == self.right_label {
                signals.right = self.intent_of(d);
            }
        }
        signals
    }
}
