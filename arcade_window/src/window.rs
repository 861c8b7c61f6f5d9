//! `minifb` window that shows a [`Canvas`].

use minifb::{Key, KeyRepeat, Window, WindowOptions};
use thiserror::Error;

use crate::canvas::Canvas;

#[derive(Debug, Error)]
pub enum WindowError {
    #[error("failed to open window: {0}")]
    Open(String),
    #[error("failed to present frame: {0}")]
    Present(String),
}

pub struct GameWindow {
    window: Window,
}

impl GameWindow {
    pub fn open(title: &str, width: usize, height: usize) -> Result<Self, WindowError> {
        let window = Window::new(
            title,
            width, height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| WindowError::Open(e.to_string()))?;
        Ok(GameWindow { window })
    }

    /// False once the user closed the window.
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Key went down since the last frame.
    pub fn pressed(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, KeyRepeat::No)
    }

    /// Push the canvas to the screen and pump window events.
    pub fn present(&mut self, canvas: &Canvas) -> Result<(), WindowError> {
        self.window
            .update_with_buffer(canvas.pixels(), canvas.width(), canvas.height())
            .map_err(|e| WindowError::Present(e.to_string()))
    }

    /// Keep the window responsive without drawing.
    pub fn pump(&mut self) {
        self.window.update();
    }
}
