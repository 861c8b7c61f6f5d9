//! The only state that crosses the worker / game-loop boundary.
//!
//! Discipline: the worker (or a test standing in for it) is the single writer
//! through [`SharedGestureState::publish`]; the game loop is the single
//! reader through the `consume_*` / `observe` calls.  The termination flag is
//! the one field either side may write.
//!
//! Signals are atomics so the reader never takes a lock.  The mutex only
//! guards the display event and the cooldown bookkeeping, and is held for a
//! handful of field writes, never across a classification call.

use std::sync::atomic::{AtomicBool, AtomicI8, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::detection::{GestureEvent, NO_GESTURE};
use crate::translate::{Intent, Signals};

struct Latest {
    event:        GestureEvent,
    /// Label of the last gesture that produced an action, for the HUD.
    last_action:  String,
    last_trigger: Option<Instant>,
}

pub struct SharedGestureState {
    cooldown: Duration,
    latest:   Mutex<Latest>,
    jump:     AtomicBool,
    duck:     AtomicBool,
    left:     AtomicI8,
    right:    AtomicI8,
    running:  AtomicBool,
}

impl SharedGestureState {
    pub fn new(cooldown: Duration) -> Self {
        SharedGestureState {
            cooldown,
            latest: Mutex::new(Latest {
                event:        GestureEvent::none(Instant::now()),
                last_action:  NO_GESTURE.to_string(),
                last_trigger: None,
            }),
            jump:    AtomicBool::new(false),
            duck:    AtomicBool::new(false),
            left:    AtomicI8::new(0),
            right:   AtomicI8::new(0),
            running: AtomicBool::new(true),
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    // A panicking writer cannot leave `Latest` half-updated in a way that
    // matters to the reader, so a poisoned lock is simply recovered.
    fn lock(&self) -> MutexGuard<'_, Latest> {
        self.latest.lock().unwrap_or_else(|p| p.into_inner())
    }

    // ── writer side ───────────────────────────────────────────────────────

    /// Record one classification cycle.
    ///
    /// The jump edge is raised only if at least `cooldown` has passed since it
    /// was last raised, no matter how many jump requests arrive in between.
    /// Duck and move levels are overwritten unconditionally.
    pub fn publish(&self, signals: Signals, now: Instant) {
        let mut latest = self.lock();

        if signals.jump {
            let ready = latest
                .last_trigger
                .map_or(true, |t| now.saturating_duration_since(t) >= self.cooldown);
            if ready {
                latest.last_trigger = Some(now);
                latest.last_action = signals.event.label.clone();
                self.jump.store(true, Ordering::Release);
            }
        }
        if signals.duck {
            latest.last_action = signals.event.label.clone();
        }
        self.duck.store(signals.duck, Ordering::Release);
        self.left.store(signals.left.to_raw(), Ordering::Release);
        self.right.store(signals.right.to_raw(), Ordering::Release);

        latest.event = signals.event;
    }

    // ── reader side ───────────────────────────────────────────────────────

    /// Latest label and confidence.  Non-destructive; display only.
    pub fn observe(&self) -> (String, f32) {
        let latest = self.lock();
        (latest.event.label.clone(), latest.event.confidence)
    }

    /// Label of the last gesture that turned into a jump or duck.
    pub fn last_action(&self) -> String {
        self.lock().last_action.clone()
    }

    /// Test and clear the jump edge in one step.
    pub fn consume_jump_edge(&self) -> bool {
        self.jump.swap(false, Ordering::AcqRel)
    }

    /// Duck level of the most recent sample.
    ///
    /// Reading clears it, so a sample is seen by at most one tick and a new
    /// duck needs a new sample.  It never carries anything older than the
    /// latest sample: a "not duck" cycle overwrites it with `false`.
    pub fn consume_duck_level(&self) -> bool {
        self.duck.swap(false, Ordering::AcqRel)
    }

    /// Current (left, right) paddle intents.  Level signals, not cleared.
    pub fn intents(&self) -> (Intent, Intent) {
        (
            Intent::from_raw(self.left.load(Ordering::Acquire)),
            Intent::from_raw(self.right.load(Ordering::Acquire)),
        )
    }

    // ── termination ───────────────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Ask every context to wind down.  Idempotent.
    pub fn request_stop(&self) {
        self.running.store(false, Ordering::Release);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    use crate::detection::Detection;
    use crate::translate::{RunnerTranslator, Translator};

    fn state() -> SharedGestureState {
        SharedGestureState::new(Duration::from_millis(500))
    }

    fn feed(s: &SharedGestureState, t: &mut RunnerTranslator, label: &str, conf: f32, at: Instant) {
        let sig = t.translate(&[Detection::new(label, conf)], at);
        s.publish(sig, at);
    }

    fn runner() -> RunnerTranslator {
        RunnerTranslator::new(0.6, "peace", "good")
    }

    #[test]
    fn second_peace_within_cooldown_fires_once() {
        let s = state();
        let mut t = runner();
        let t0 = Instant::now();
        feed(&s, &mut t, "peace", 0.9, t0);
        feed(&s, &mut t, "peace", 0.9, t0 + Duration::from_millis(100));
        assert!(s.consume_jump_edge());
        assert!(!s.consume_jump_edge());
    }

    #[test]
    fn consumed_edge_not_rearmed_inside_window() {
        let s = state();
        let mut t = runner();
        let t0 = Instant::now();
        feed(&s, &mut t, "peace", 0.9, t0);
        assert!(s.consume_jump_edge());
        feed(&s, &mut t, "peace", 0.9, t0 + Duration::from_millis(100));
        assert!(!s.consume_jump_edge());
    }

    #[test]
    fn at_most_one_jump_per_window_under_continuous_detection() {
        let s = state();
        let mut t = runner();
        let t0 = Instant::now();
        let mut fired = Vec::new();
        // 30 Hz classifier for 2 s, reader polling after every sample.
        for i in 0..60u64 {
            let at = t0 + Duration::from_millis(i * 33);
            feed(&s, &mut t, "peace", 0.95, at);
            if s.consume_jump_edge() {
                fired.push(at);
            }
        }
        assert_eq!(fired.len(), 4);
        for pair in fired.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(500));
        }
    }

    #[test]
    fn jump_fires_again_after_cooldown() {
        let s = state();
        let mut t = runner();
        let t0 = Instant::now();
        feed(&s, &mut t, "peace", 0.9, t0);
        assert!(s.consume_jump_edge());
        feed(&s, &mut t, "peace", 0.9, t0 + Duration::from_millis(500));
        assert!(s.consume_jump_edge());
    }

    #[test]
    fn duck_level_tracks_latest_sample_only() {
        let s = state();
        let mut t = runner();
        let t0 = Instant::now();
        let mut seen = Vec::new();
        for i in 0..6u64 {
            let label = if i % 2 == 0 { "good" } else { "nothing" };
            feed(&s, &mut t, label, 0.9, t0 + Duration::from_millis(i * 10));
            seen.push(s.consume_duck_level());
        }
        assert_eq!(seen, vec![true, false, true, false, true, false]);
    }

    #[test]
    fn duck_overwritten_by_newer_sample_before_read() {
        let s = state();
        let mut t = runner();
        let t0 = Instant::now();
        feed(&s, &mut t, "good", 0.9, t0);
        feed(&s, &mut t, "none", 0.9, t0);
        assert!(!s.consume_duck_level());
    }

    #[test]
    fn observe_is_non_destructive() {
        let s = state();
        let mut t = runner();
        feed(&s, &mut t, "good", 0.75, Instant::now());
        assert_eq!(s.observe(), ("good".to_string(), 0.75));
        assert_eq!(s.observe(), ("good".to_string(), 0.75));
    }

    #[test]
    fn last_action_only_changes_on_actions() {
        let s = state();
        let mut t = runner();
        let t0 = Instant::now();
        assert_eq!(s.last_action(), "none");
        feed(&s, &mut t, "peace", 0.9, t0);
        assert_eq!(s.last_action(), "peace");
        feed(&s, &mut t, "five", 0.9, t0);
        assert_eq!(s.last_action(), "peace");
        feed(&s, &mut t, "good", 0.9, t0);
        assert_eq!(s.last_action(), "good");
    }

    #[test]
    fn intents_are_level_signals() {
        let s = state();
        let mut sig = Signals::idle(GestureEvent::none(Instant::now()));
        sig.left = Intent::Up;
        sig.right = Intent::Down;
        s.publish(sig, Instant::now());
        assert_eq!(s.intents(), (Intent::Up, Intent::Down));
        assert_eq!(s.intents(), (Intent::Up, Intent::Down));
    }

    #[test]
    fn stop_flag_visible_across_threads() {
        let s = Arc::new(state());
        let s2 = Arc::clone(&s);
        thread::spawn(move || s2.request_stop()).join().unwrap();
        assert!(!s.is_running());
    }

    #[test]
    fn concurrent_writer_never_double_fires() {
        let s = Arc::new(state());
        let writer = {
            let s = Arc::clone(&s);
            thread::spawn(move || {
                let mut t = runner();
                let t0 = Instant::now();
                // Simulated clock: 200 samples spaced 10 ms → 2 s of detections.
                for i in 0..200u64 {
                    feed(&s, &mut t, "peace", 0.9, t0 + Duration::from_millis(i * 10));
                }
            })
        };
        let mut count = 0;
        while !writer.is_finished() {
            if s.consume_jump_edge() { count += 1; }
        }
        writer.join().unwrap();
        if s.consume_jump_edge() { count += 1; }
        // Triggers at 0, 500, 1000, 1500 ms.
        assert_eq!(count, 4);
    }
}
