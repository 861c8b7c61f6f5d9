use std::sync::Arc;

use arcade_window::canvas::text_width;
use arcade_window::{Canvas, FrameClock, GameWindow};
use gesture_link::{
    FaultPolicy, GestureWorker, PaddleTranslator, ProcessClassifier, SharedGestureState, WorkerExit,
};

use crate::config::ArcadeConfig;
use crate::error::AppError;
use super::court::{Court, PaddleFrame};

const TITLE: &str = "Gesture Pong";

const BACKGROUND: u32 = 0xFF000000;
const FOREGROUND: u32 = 0xFFFFFFFF;
const NET:        u32 = 0xFF808080;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaddleOutcome {
    pub score_left:  u32,
    pub score_right: u32,
    pub ticks:       u64,
}

/// Run the paddle game until the window closes.
///
/// Gesture input is required here: if the classifier cannot start or dies,
/// the shared flag drops, the loop ends and the worker's error is returned.
pub fn run(cfg: ArcadeConfig) -> Result<PaddleOutcome, AppError> {
    let pc = cfg.paddle.clone();
    let shared = Arc::new(SharedGestureState::new(cfg.input.cooldown()));
    let translator = PaddleTranslator::new(
        cfg.input.confidence_threshold,
        &pc.left_label,
        &pc.right_label,
        pc.frame_height,
    );
    let model = std::path::PathBuf::from(&pc.model_path);
    let camera_index = pc.camera_index;
    let worker = GestureWorker::spawn(
        move || ProcessClassifier::open(&model, camera_index),
        translator,
        Arc::clone(&shared),
        FaultPolicy::Terminate,
    ).map_err(AppError::SpawnWorker)?;

    let mut window = match GameWindow::open(TITLE, pc.width as usize, pc.height as usize) {
        Ok(w) => w,
        Err(e) => {
            let _ = worker.shutdown(cfg.input.shutdown_timeout());
            return Err(e.into());
        }
    };
    let mut canvas = Canvas::new(pc.width as usize, pc.height as usize);
    let mut court = Court::new(pc.clone());
    let mut clock = FrameClock::new(pc.fps);

    let mut presented = Ok(());
    while window.is_open() && shared.is_running() {
        let (left, right) = shared.intents();
        court.tick(left, right);

        draw(&mut canvas, &court.frame());
        if let Err(e) = window.present(&canvas) {
            presented = Err(e);
            break;
        }
        clock.wait();
    }

    let exit = worker.shutdown(cfg.input.shutdown_timeout());
    presented?;
    if let WorkerExit::Finished(Err(e)) = exit {
        return Err(e.into());
    }

    let (score_left, score_right) = court.scores();
    Ok(PaddleOutcome { score_left, score_right, ticks: court.ticks() })
}

pub fn draw(canvas: &mut Canvas, frame: &PaddleFrame) {
    canvas.clear(BACKGROUND);
    canvas.vline(canvas.width() / 2, NET);
    canvas.fill_rect(frame.left, FOREGROUND);
    canvas.fill_rect(frame.right, FOREGROUND);
    canvas.fill_ellipse(frame.ball, FOREGROUND);

    let score = format!("{}   |   {}", frame.score_left, frame.score_right);
    let x = canvas.width().saturating_sub(text_width(&score, 3)) / 2;
    canvas.draw_text(&score, x, 10, 3, FOREGROUND);
}
