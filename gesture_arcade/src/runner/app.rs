//! Runner main loop: drain gestures → tick → draw, at a fixed rate.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use arcade_window::canvas::text_width;
use arcade_window::{Canvas, FrameClock, GameWindow, Key, Rect};
use gesture_link::config::secs;
use gesture_link::{
    FaultPolicy, GestureWorker, ProcessClassifier, RunnerTranslator, SharedGestureState, WorkerExit,
};

use crate::config::ArcadeConfig;
use crate::error::AppError;
use super::obstacle::ObstacleKind;
use super::sim::{Actions, Phase, RunnerFrame, RunnerSim};

const TITLE: &str = "Dino - Jump & Duck Gestures";

const SKY:    u32 = 0xFFEBEBEB;
const GROUND: u32 = 0xFF535353;
const PLAYER: u32 = 0xFF141414;
const CACTUS: u32 = 0xFF228B22;
const BIRD:   u32 = 0xFF0000FF;
const INK:    u32 = 0xFF000000;
const ALERT:  u32 = 0xFFC80000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunOutcome {
    pub score:     u32,
    pub ticks:     u64,
    pub game_over: bool,
}

/// Read the gesture signals for one tick.  Never blocks.
pub fn drain(shared: &SharedGestureState) -> Actions {
    Actions {
        jump: shared.consume_jump_edge(),
        duck: shared.consume_duck_level(),
    }
}

/// Run the runner until game over, Escape or window close.
///
/// Missing or failing gesture input does not stop the game; the player just
/// receives no actions.
pub fn run(cfg: ArcadeConfig, model: PathBuf, camera_index: u32) -> Result<RunOutcome, AppError> {
    let rc = cfg.runner.clone();
    let shared = Arc::new(SharedGestureState::new(cfg.input.cooldown()));
    let translator = RunnerTranslator::new(cfg.input.confidence_threshold, &rc.jump_label, &rc.duck_label);
    let worker = GestureWorker::spawn(
        move || ProcessClassifier::open(&model, camera_index),
        translator,
        Arc::clone(&shared),
        FaultPolicy::Degrade,
    ).map_err(AppError::SpawnWorker)?;

    let mut window = match GameWindow::open(TITLE, rc.width as usize, rc.height as usize) {
        Ok(w) => w,
        Err(e) => {
            stop_worker(worker, &cfg);
            return Err(e.into());
        }
    };
    let mut canvas = Canvas::new(rc.width as usize, rc.height as usize);
    let mut sim = RunnerSim::new(rc.clone());
    let mut clock = FrameClock::new(rc.fps);

    let result = loop {
        if !window.is_open() || window.pressed(Key::Escape) {
            break Ok(());
        }

        sim.tick(drain(&shared));

        let frame = sim.frame(&shared.last_action());
        draw(&mut canvas, &frame, rc.ground_y());
        if let Err(e) = window.present(&canvas) {
            break Err(e);
        }

        if sim.phase() == Phase::GameOver {
            pause(&mut window, secs(rc.game_over_pause_secs));
            break Ok(());
        }
        clock.wait();
    };

    if clock.overruns() > 0 {
        log::debug!("{} frames overran their budget", clock.overruns());
    }
    stop_worker(worker, &cfg);
    result?;

    Ok(RunOutcome {
        score:     sim.score(),
        ticks:     sim.ticks(),
        game_over: sim.phase() == Phase::GameOver,
    })
}

fn stop_worker(worker: GestureWorker, cfg: &ArcadeConfig) {
    match worker.shutdown(cfg.input.shutdown_timeout()) {
        WorkerExit::Finished(Ok(())) => {}
        // Already reported by the worker when it happened.
        WorkerExit::Finished(Err(e)) => log::debug!("gesture worker ended with: {}", e),
        WorkerExit::TimedOut => {}
    }
}

/// Hold the final frame on screen, closing early if the window goes away.
fn pause(window: &mut GameWindow, length: std::time::Duration) {
    let Some(until) = Instant::now().checked_add(length) else { return };
    while Instant::now() < until && window.is_open() {
        window.pump();
        std::thread::sleep(std::time::Duration::from_millis(16));
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Drawing
// ════════════════════════════════════════════════════════════════════════════

pub fn draw(canvas: &mut Canvas, frame: &RunnerFrame, ground_y: f32) {
    let (w, h) = (canvas.width() as f32, canvas.height() as f32);
    canvas.clear(SKY);
    canvas.fill_rect(Rect::new(0.0, ground_y, w, h - ground_y), GROUND);

    canvas.fill_rect(frame.player, PLAYER);
    for (rect, kind) in &frame.obstacles {
        let color = match kind {
            ObstacleKind::Ground => CACTUS,
            ObstacleKind::Flying => BIRD,
        };
        canvas.fill_rect(*rect, color);
    }

    canvas.draw_text(&format!("Score: {}", frame.score), 10, 10, 2, INK);
    canvas.draw_text(&format!("Lives: {}", frame.lives), 10, 30, 2, INK);
    if frame.last_gesture != gesture_link::detection::NO_GESTURE {
        canvas.draw_text(&format!("Gesture: {}", frame.last_gesture), 10, 50, 2, INK);
    }
    if frame.show_hint {
        canvas.draw_text("peace = jump | good = duck", 200, 10, 2, INK);
    }

    if frame.phase == Phase::GameOver {
        let msg = "GAME OVER";
        let scale = 5;
        let x = (canvas.width().saturating_sub(text_width(msg, scale))) / 2;
        let y = (canvas.height().saturating_sub(5 * scale)) / 2;
        canvas.draw_text(msg, x, y, scale, ALERT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use gesture_link::{Detection, Translator};

    fn frame(phase: Phase) -> RunnerFrame {
        RunnerFrame {
            player:       Rect::new(50.0, 220.0, 40.0, 40.0),
            obstacles:    vec![
                (Rect::new(300.0, 230.0, 20.0, 30.0), ObstacleKind::Ground),
                (Rect::new(500.0, 210.0, 30.0, 20.0), ObstacleKind::Flying),
            ],
            score:        40,
            lives:        2,
            last_gesture: "peace".to_string(),
            phase,
            show_hint:    false,
        }
    }

    #[test]
    fn draw_colors_entities_by_kind() {
        let mut c = Canvas::new(800, 300);
        draw(&mut c, &frame(Phase::Playing), 260.0);
        assert_eq!(c.pixel(60, 240), Some(PLAYER));
        assert_eq!(c.pixel(305, 250), Some(CACTUS));
        assert_eq!(c.pixel(510, 215), Some(BIRD));
        assert_eq!(c.pixel(700, 280), Some(GROUND));
        assert_eq!(c.pixel(700, 100), Some(SKY));
    }

    #[test]
    fn game_over_banner_only_when_over() {
        let count = |phase| {
            let mut c = Canvas::new(800, 300);
            draw(&mut c, &frame(phase), 260.0);
            c.pixels().iter().filter(|&&p| p == ALERT).count()
        };
        assert_eq!(count(Phase::Playing), 0);
        assert!(count(Phase::GameOver) > 0);
    }

    #[test]
    fn drain_reads_each_jump_once() {
        let shared = SharedGestureState::new(Duration::from_millis(500));
        let mut t = RunnerTranslator::new(0.6, "peace", "good");
        let now = Instant::now();
        shared.publish(t.translate(&[Detection::new("peace", 0.9)], now), now);
        assert_eq!(drain(&shared), Actions { jump: true, duck: false });
        assert_eq!(drain(&shared), Actions::default());
    }

    #[test]
    fn injected_gestures_drive_the_simulation() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let cfg = ArcadeConfig::default();
        let shared = SharedGestureState::new(cfg.input.cooldown());
        let mut t = RunnerTranslator::new(0.6, "peace", "good");
        let mut sim = RunnerSim::with_rng(cfg.runner.clone(), StdRng::seed_from_u64(5));

        let t0 = Instant::now();
        shared.publish(t.translate(&[Detection::new("peace", 0.9)], t0), t0);
        let later = t0 + Duration::from_millis(100);
        shared.publish(t.translate(&[Detection::new("peace", 0.9)], later), later);

        let mut jumps = 0;
        for _ in 0..120 {
            let actions = drain(&shared);
            if actions.jump { jumps += 1; }
            sim.tick(actions);
        }
        assert_eq!(jumps, 1);
        assert_eq!(shared.last_action(), "peace");
    }
}
