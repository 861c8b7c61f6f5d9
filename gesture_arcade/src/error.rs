use arcade_window::WindowError;
use gesture_link::{ConfigError, WorkerError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Window(#[from] WindowError),
    #[error("failed to start gesture worker: {0}")]
    SpawnWorker(#[source] std::io::Error),
    #[error(transparent)]
    Gesture(#[from] WorkerError),
}
