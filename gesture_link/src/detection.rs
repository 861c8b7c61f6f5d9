//! Classifier output and the per-cycle gesture pick.

use std::time::Instant;

/// Label reported when no detection clears the confidence threshold.
pub const NO_GESTURE: &str = "none";

/// Pixel-space box in the classifier's input frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub x:      f32,
    pub y:      f32,
    pub width:  f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

/// One labelled detection from a single sampled frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub label:      String,
    /// 0.0–1.0
    pub confidence: f32,
    pub bbox:       Option<BoundingBox>,
}

impl Detection {
    pub fn new(label: &str, confidence: f32) -> Self {
        Detection { label: label.to_string(), confidence, bbox: None }
    }

    pub fn with_box(label: &str, confidence: f32, bbox: BoundingBox) -> Self {
        Detection { label: label.to_string(), confidence, bbox: Some(bbox) }
    }
}

/// The gesture chosen for one classification cycle.
///
/// Overwritten every cycle; nothing downstream keeps history of it.
#[derive(Clone, Debug, PartialEq)]
pub struct GestureEvent {
    pub label:      String,
    pub confidence: f32,
    pub time:       Instant,
}

impl GestureEvent {
    pub fn none(time: Instant) -> Self {
        GestureEvent { label: NO_GESTURE.to_string(), confidence: 0.0, time }
    }

    pub fn is_none(&self) -> bool {
        self.label == NO_GESTURE
    }

    /// Case-insensitive label comparison.
    pub fn is(&self, label: &str) -> bool {
        self.label.eq_ignore_ascii_case(label)
    }
}

/// Pick the highest-confidence detection at or above `threshold`.
///
/// Empty labels never qualify.  On equal confidence the earlier detection
/// wins.  Falls back to [`NO_GESTURE`] with confidence 0.
pub fn select_best(detections: &[Detection], threshold: f32, time: Instant) -> GestureEvent {
    let mut best = GestureEvent::none(time);
    for d in detections {
        if d.label.is_empty() || d.confidence < threshold {
            continue;
        }
        if d.confidence > best.confidence {
            best.label = d.label.clone();
            best.confidence = d.confidence;
        }
    }
    best
}
