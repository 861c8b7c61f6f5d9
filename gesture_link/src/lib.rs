//! # gesture_link
//!
//! The boundary between a blocking gesture classifier and a fixed-timestep
//! game loop.
//!
//! ## Data flow
//!
//! ```text
//!   Classifier ──► GestureWorker ──► Translator ──► SharedGestureState ──► game tick
//!   (blocking)     (own thread)      (pure logic)   (atomics + one mutex)  (never blocks)
//! ```
//!
//! * A [`classifier::Classifier`] produces the detections for one sampled
//!   frame per call.  The call blocks; it is the only thing pacing the worker.
//! * A [`translate::Translator`] turns those detections into [`translate::Signals`].
//! * [`shared::SharedGestureState`] holds the latest event, the edge-triggered
//!   jump signal, the level-triggered duck / move signals and the shared
//!   termination flag.  The worker is its only writer, the game loop its only
//!   reader.
//! * [`worker::GestureWorker`] owns the background thread and its bounded
//!   shutdown.
//!
//! Tests and demos can skip the worker entirely and call
//! [`shared::SharedGestureState::publish`] directly.

pub mod config;
pub mod detection;
pub mod shared;
pub mod translate;
pub mod classifier;
pub mod worker;

pub use classifier::{Classifier, ClassifyError, ProcessClassifier, ScriptedClassifier, SetupError};
pub use config::{ConfigError, InputConfig};
pub use detection::{BoundingBox, Detection, GestureEvent};
pub use shared::SharedGestureState;
pub use translate::{Intent, PaddleTranslator, RunnerTranslator, Signals, Translator};
pub use worker::{FaultPolicy, GestureWorker, WorkerError, WorkerExit};
