//! The classifier collaborator: camera + model behind one blocking call.
//!
//! [`ProcessClassifier`] runs the model as a child process which owns the
//! camera and writes one JSON result per sampled frame on stdout.
//! [`ScriptedClassifier`] replays canned frames and needs no hardware.

use std::collections::{BTreeMap, VecDeque};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::detection::{BoundingBox, Detection};

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

/// The classifier could not be brought up at all.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("model not found: {0}")]
    ModelNotFound(PathBuf),
    #[error("failed to launch model {path}: {source}")]
    Spawn {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model process has no stdout pipe")]
    NoOutput,
}

/// A single classification cycle failed.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("failed to read classifier output: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed classifier result: {0}")]
    Malformed(#[from] serde_json::Error),
    /// Camera or model went away; no further frames will come.
    #[error("classifier disconnected")]
    Disconnected,
}

impl ClassifyError {
    /// Fatal faults end the worker; the rest skip one cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ClassifyError::Disconnected)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Classifier trait
// ════════════════════════════════════════════════════════════════════════════

/// Samples one frame and classifies it.
///
/// `classify` is expected to block for roughly one frame; the worker loop
/// relies on that for its pacing.  Dropping the classifier releases the
/// capture device.
pub trait Classifier: Send {
    fn classify(&mut self) -> Result<Vec<Detection>, ClassifyError>;
}

// ════════════════════════════════════════════════════════════════════════════
// Wire format
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default, Deserialize)]
struct FrameResult {
    #[serde(default)]
    result: ResultBody,
}

#[derive(Debug, Default, Deserialize)]
struct ResultBody {
    #[serde(default)]
    bounding_boxes: Vec<RawBox>,
    #[serde(default)]
    classification: BTreeMap<String, f32>,
}

#[derive(Debug, Deserialize)]
struct RawBox {
    #[serde(default, alias = "class")]
    label:  String,
    #[serde(default, alias = "score")]
    value:  f32,
    x:      Option<f32>,
    y:      Option<f32>,
    width:  Option<f32>,
    height: Option<f32>,
}

impl From<RawBox> for Detection {
    fn from(raw: RawBox) -> Self {
        let bbox = match (raw.x, raw.y, raw.width, raw.height) {
            (Some(x), Some(y), Some(width), Some(height)) => {
                Some(BoundingBox { x, y, width, height })
            }
            _ => None,
        };
        Detection { label: raw.label, confidence: raw.value, bbox }
    }
}

/// Parse one result line.  Object-detection boxes come first, followed by
/// whole-frame classification scores (which carry no box).
pub fn parse_result(line: &str) -> Result<Vec<Detection>, ClassifyError> {
    let frame: FrameResult = serde_json::from_str(line)?;
    let mut out: Vec<Detection> =
        frame.result.bounding_boxes.into_iter().map(Detection::from).collect();
    out.extend(
        frame.result.classification
            .into_iter()
            .map(|(label, p)| Detection { label, confidence: p, bbox: None }),
    );
    Ok(out)
}

// ════════════════════════════════════════════════════════════════════════════
// ProcessClassifier
// ════════════════════════════════════════════════════════════════════════════

/// Model executable launched as `<model> <camera-index>`.
pub struct ProcessClassifier {
    child:  Child,
    stdout: BufReader<ChildStdout>,
    line:   String,
}

impl ProcessClassifier {
    pub fn open(model: &Path, camera_index: u32) -> Result<Self, SetupError> {
        if !model.exists() {
            return Err(SetupError::ModelNotFound(model.to_path_buf()));
        }
        log::info!("loading model {} (camera {})", model.display(), camera_index);

        let mut child = Command::new(model)
            .arg(camera_index.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| SetupError::Spawn { path: model.to_path_buf(), source })?;

        let stdout = match child.stdout.take() {
            Some(s) => s,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(SetupError::NoOutput);
            }
        };
        Ok(ProcessClassifier { child, stdout: BufReader::new(stdout), line: String::new() })
    }
}

impl Classifier for ProcessClassifier {
    fn classify(&mut self) -> Result<Vec<Detection>, ClassifyError> {
        loop {
            self.line.clear();
            if self.stdout.read_line(&mut self.line)? == 0 {
                return Err(ClassifyError::Disconnected);
            }
            // Blank keep-alive lines carry no frame.
            if !self.line.trim().is_empty() {
                return parse_result(self.line.trim());
            }
        }
    }
}

impl Drop for ProcessClassifier {
    fn drop(&mut self) {
        if let Err(e) = self.child.kill() {
            log::debug!("model process already gone: {}", e);
        }
        let _ = self.child.wait();
        log::debug!("model process released");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ScriptedClassifier
// ════════════════════════════════════════════════════════════════════════════

/// Replays a fixed list of frame results, then reports `Disconnected`.
pub struct ScriptedClassifier {
    frames:   VecDeque<Result<Vec<Detection>, ClassifyError>>,
    interval: Duration,
    repeat_last: bool,
    last:     Vec<Detection>,
}

impl ScriptedClassifier {
    pub fn new(frames: Vec<Result<Vec<Detection>, ClassifyError>>) -> Self {
        ScriptedClassifier {
            frames:      frames.into(),
            interval:    Duration::ZERO,
            repeat_last: false,
            last:        Vec::new(),
        }
    }

    /// Sleep this long per frame, standing in for capture + inference time.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Keep returning the last successful frame once the script runs out.
    pub fn repeat_last(mut self) -> Self {
        self.repeat_last = true;
        self
    }
}

impl Classifier for ScriptedClassifier {
    fn classify(&mut self) -> Result<Vec<Detection>, ClassifyError> {
        if !self.interval.is_zero() {
            std::thread::sleep(self.interval);
        }
        match self.frames.pop_front() {
            Some(Ok(frame)) => {
                self.last = frame.clone();
                Ok(frame)
            }
            Some(Err(e)) => Err(e),
            None if self.repeat_last => Ok(self.last.clone()),
            None => Err(ClassifyError::Disconnected),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
