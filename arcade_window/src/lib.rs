//! # arcade_window
//!
//! Just enough presentation for the gesture games: a software framebuffer
//! with rectangles and a tiny bitmap font, a `minifb` window to show it in,
//! and a clock that paces a fixed-rate loop.

pub mod canvas;
pub mod clock;
pub mod window;

pub use canvas::{Canvas, Rect};
pub use clock::FrameClock;
pub use minifb::Key;
pub use window::{GameWindow, WindowError};
