//! Obstacle runner: jump ground obstacles, duck flying ones.

pub mod app;
pub mod obstacle;
pub mod player;
pub mod sim;

pub use app::{run, RunOutcome};
pub use obstacle::{Obstacle, ObstacleKind};
pub use player::{Player, Stance};
pub use sim::{Actions, Phase, RunnerFrame, RunnerSim, TickReport};
