//! # gesture_arcade
//!
//! Two small games played with hand gestures in front of a camera:
//!
//! * [`runner`]: jump ground obstacles and duck flying ones (`dino_run`).
//! * [`paddle`]: two paddles, each steered by its own gesture (`gesture_pong`).
//!
//! Both are fixed-timestep simulations that read their input from a
//! [`gesture_link::SharedGestureState`] once per tick and never wait on the
//! classifier.

pub mod config;
pub mod error;
pub mod paddle;
pub mod runner;

pub use config::{ArcadeConfig, PaddleConfig, RunnerConfig, CONFIG_FILE};
pub use error::AppError;
