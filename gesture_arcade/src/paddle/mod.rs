//! Two-player paddle game, one hand gesture per paddle.

pub mod app;
pub mod court;

pub use app::{run, PaddleOutcome};
pub use court::{Ball, Court, Paddle, PaddleFrame, Side};
