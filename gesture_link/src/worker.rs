//! Background classification thread.
//!
//! The worker opens its classifier on its own thread, then loops:
//! classify (blocking) → translate → publish, until the shared termination
//! flag drops or the classifier dies.  Nothing it does can unwind into the
//! game loop; the game only ever sees stale signals or a lowered flag.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::classifier::{Classifier, ClassifyError, SetupError};
use crate::shared::SharedGestureState;
use crate::translate::Translator;

/// Consecutive I/O failures after which the classifier is given up on.
pub const MAX_IO_FAILURES: u32 = 5;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("gesture input unavailable: {0}")]
    Setup(#[from] SetupError),
    #[error("gesture input lost: {0}")]
    Runtime(#[source] ClassifyError),
    #[error("gesture worker panicked")]
    Panicked,
}

/// What an unrecoverable classifier fault does to the rest of the program.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaultPolicy {
    /// Stop publishing; the game keeps running without input.
    Degrade,
    /// Lower the shared termination flag so the game stops too.
    Terminate,
}

/// How [`GestureWorker::shutdown`] ended.
#[derive(Debug)]
pub enum WorkerExit {
    Finished(Result<(), WorkerError>),
    /// The worker did not finish in time and was left to exit on its own.
    TimedOut,
}

/// Handle to the classification thread.
pub struct GestureWorker {
    shared: Arc<SharedGestureState>,
    handle: JoinHandle<Result<(), WorkerError>>,
    done_rx: Receiver<()>,
}

// Signals completion even if the worker unwinds.
struct DoneGuard(Sender<()>);

impl Drop for DoneGuard {
    fn drop(&mut self) {
        let _ = self.0.send(());
    }
}

impl GestureWorker {
    /// Spawn the worker.
    ///
    /// `open` runs on the worker thread, so a slow or failing model load
    /// never holds up the caller.
    pub fn spawn<O, C, T>(
        open:       O,
        translator: T,
        shared:     Arc<SharedGestureState>,
        policy:     FaultPolicy,
    ) -> std::io::Result<Self>
    where
        O: FnOnce() -> Result<C, SetupError> + Send + 'static,
        C: Classifier + 'static,
        T: Translator,
    {
        let (done_tx, done_rx) = mpsc::channel();
        let state = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("gesture-worker".to_string())
            .spawn(move || {
                let _done = DoneGuard(done_tx);
                worker_main(open, translator, &state, policy)
            })?;
        Ok(GestureWorker { shared, handle, done_rx })
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Lower the termination flag and wait up to `timeout` for the worker.
    ///
    /// Never hangs: a worker stuck inside a classification call is detached
    /// and releases its classifier whenever that call returns.
    pub fn shutdown(self, timeout: Duration) -> WorkerExit {
        self.shared.request_stop();
        match self.done_rx.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                let result = self.handle.join().unwrap_or(Err(WorkerError::Panicked));
                log::debug!("gesture worker joined");
                WorkerExit::Finished(result)
            }
            Err(RecvTimeoutError::Timeout) => {
                log::warn!("gesture worker did not stop within {:?}; detaching", timeout);
                WorkerExit::TimedOut
            }
        }
    }
}

fn worker_main<O, C, T>(
    open:           O,
    mut translator: T,
    shared:         &SharedGestureState,
    policy:         FaultPolicy,
) -> Result<(), WorkerError>
where
    O: FnOnce() -> Result<C, SetupError>,
    C: Classifier,
    T: Translator,
{
    let fail = |err: WorkerError| {
        log::error!("{}", err);
        if policy == FaultPolicy::Terminate {
            shared.request_stop();
        }
        Err(err)
    };

    let mut classifier = match open() {
        Ok(c) => c,
        Err(e) => return fail(e.into()),
    };
    log::info!("gesture worker started");

    let mut frames = 0u64;
    let mut io_failures = 0u32;
    while shared.is_running() {
        let detections = match classifier.classify() {
            Ok(d) => {
                io_failures = 0;
                d
            }
            Err(e) if e.is_fatal() => {
                drop(classifier);
                return fail(WorkerError::Runtime(e));
            }
            Err(e @ ClassifyError::Io(_)) => {
                io_failures += 1;
                if io_failures >= MAX_IO_FAILURES {
                    drop(classifier);
                    log::error!("{} consecutive read failures", io_failures);
                    return fail(WorkerError::Runtime(e));
                }
                log::warn!("skipping classification cycle: {}", e);
                continue;
            }
            Err(e) => {
                log::warn!("skipping classification cycle: {}", e);
                continue;
            }
        };
        // The flag may have dropped while we were blocked.
        if !shared.is_running() {
            break;
        }
        let now = Instant::now();
        let signals = translator.translate(&detections, now);
        shared.publish(signals, now);
        frames += 1;
    }

    drop(classifier);
    log::info!("gesture worker exiting after {} frames", frames);
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use crate::classifier::ScriptedClassifier;
    use crate::detection::Detection;
    use crate::translate::RunnerTranslator;

    const WAIT: Duration = Duration::from_secs(2);

    fn shared() -> Arc<SharedGestureState> {
        Arc::new(SharedGestureState::new(Duration::from_millis(500)))
    }

    fn runner() -> RunnerTranslator {
        RunnerTranslator::new(0.6, "peace", "good")
    }

    #[test]
    fn publishes_classified_frames() {
        let s = shared();
        let frames = vec![Ok(vec![Detection::new("good", 0.9)])];
        let w = GestureWorker::spawn(
            move || Ok(ScriptedClassifier::new(frames).repeat_last().with_interval(Duration::from_millis(2))),
            runner(),
            Arc::clone(&s),
            FaultPolicy::Degrade,
        ).unwrap();

        let deadline = Instant::now() + WAIT;
        while s.observe().0 != "good" && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(s.observe().0, "good");
        assert!(matches!(w.shutdown(WAIT), WorkerExit::Finished(Ok(()))));
    }

    #[test]
    fn cycle_fault_keeps_previous_state() {
        let s = shared();
        let frames = vec![
            Ok(vec![Detection::new("peace", 0.9)]),
            Err(ClassifyError::Io(std::io::Error::other("dropped frame"))),
        ];
        let w = GestureWorker::spawn(
            move || Ok(ScriptedClassifier::new(frames)),
            runner(),
            Arc::clone(&s),
            FaultPolicy::Degrade,
        ).unwrap();

        // Script ends in Disconnected, which ends the worker.
        let exit = w.shutdown(WAIT);
        assert!(matches!(exit, WorkerExit::Finished(Err(WorkerError::Runtime(_)))));
        assert_eq!(s.observe().0, "peace");
        assert!(s.consume_jump_edge());
    }

    #[test]
    fn setup_fault_degrade_leaves_game_running() {
        let s = shared();
        let w = GestureWorker::spawn(
            || Err::<ScriptedClassifier, _>(SetupError::NoOutput),
            runner(),
            Arc::clone(&s),
            FaultPolicy::Degrade,
        ).unwrap();
        let deadline = Instant::now() + WAIT;
        while !w.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(s.is_running());
        assert!(matches!(w.shutdown(WAIT), WorkerExit::Finished(Err(WorkerError::Setup(_)))));
    }

    #[test]
    fn setup_fault_terminate_lowers_flag() {
        let s = shared();
        let w = GestureWorker::spawn(
            || Err::<ScriptedClassifier, _>(SetupError::ModelNotFound("/x".into())),
            runner(),
            Arc::clone(&s),
            FaultPolicy::Terminate,
        ).unwrap();
        let deadline = Instant::now() + WAIT;
        while s.is_running() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(!s.is_running());
        assert!(matches!(w.shutdown(WAIT), WorkerExit::Finished(Err(WorkerError::Setup(_)))));
    }

    #[test]
    fn stop_flag_ends_loop() {
        let s = shared();
        let w = GestureWorker::spawn(
            || Ok(ScriptedClassifier::new(vec![Ok(vec![])]).repeat_last().with_interval(Duration::from_millis(5))),
            runner(),
            Arc::clone(&s),
            FaultPolicy::Degrade,
        ).unwrap();
        thread::sleep(Duration::from_millis(20));
        assert!(matches!(w.shutdown(WAIT), WorkerExit::Finished(Ok(()))));
    }

    struct Stuck(Arc<AtomicBool>);

    impl Classifier for Stuck {
        fn classify(&mut self) -> Result<Vec<Detection>, ClassifyError> {
            thread::sleep(Duration::from_millis(300));
            Ok(Vec::new())
        }
    }

    impl Drop for Stuck {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn shutdown_times_out_on_stuck_classifier_and_worker_still_releases() {
        let s = shared();
        let released = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&released);
        let w = GestureWorker::spawn(
            move || Ok(Stuck(flag)),
            runner(),
            Arc::clone(&s),
            FaultPolicy::Degrade,
        ).unwrap();
        thread::sleep(Duration::from_millis(20));

        let started = Instant::now();
        assert!(matches!(w.shutdown(Duration::from_millis(50)), WorkerExit::TimedOut));
        assert!(started.elapsed() < Duration::from_millis(250));

        let deadline = Instant::now() + WAIT;
        while !released.load(Ordering::SeqCst) && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(released.load(Ordering::SeqCst));
    }

    /// Fails every read, counting attempts.
    struct BrokenPipe(Arc<std::sync::atomic::AtomicU32>);

    impl Classifier for BrokenPipe {
        fn classify(&mut self) -> Result<Vec<Detection>, ClassifyError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(ClassifyError::Io(std::io::Error::other("EIO")))
        }
    }

    #[test]
    fn persistent_read_failure_is_fatal() {
        let s = shared();
        let calls = Arc::new(std::sync::atomic::AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let w = GestureWorker::spawn(
            move || Ok(BrokenPipe(counter)),
            runner(),
            Arc::clone(&s),
            FaultPolicy::Terminate,
        ).unwrap();
        let deadline = Instant::now() + WAIT;
        while s.is_running() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(!s.is_running());
        let exit = w.shutdown(WAIT);
        assert!(matches!(exit, WorkerExit::Finished(Err(WorkerError::Runtime(ClassifyError::Io(_))))));
        assert_eq!(calls.load(Ordering::SeqCst), MAX_IO_FAILURES);
    }

    #[test]
    fn intermittent_read_failures_are_skipped() {
        let s = shared();
        let io = || -> Result<Vec<Detection>, ClassifyError> {
            Err(ClassifyError::Io(std::io::Error::other("EAGAIN")))
        };
        let mut frames = Vec::new();
        for _ in 0..3 {
            for _ in 0..MAX_IO_FAILURES - 1 {
                frames.push(io());
            }
            frames.push(Ok(vec![Detection::new("good", 0.9)]));
        }
        let w = GestureWorker::spawn(
            move || Ok(ScriptedClassifier::new(frames).repeat_last().with_interval(Duration::from_millis(1))),
            runner(),
            Arc::clone(&s),
            FaultPolicy::Terminate,
        ).unwrap();
        let deadline = Instant::now() + WAIT;
        while s.observe().0 != "good" && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        thread::sleep(Duration::from_millis(20));
        assert!(s.is_running());
        assert_eq!(s.observe().0, "good");
        assert!(matches!(w.shutdown(WAIT), WorkerExit::Finished(Ok(()))));
    }
}
