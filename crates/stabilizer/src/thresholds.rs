use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Confidence a detection needs before it can start or extend a hold.
pub const DEFAULT_CONFIDENCE_MIN: f32 = 0.83;

/// How long a sign must be held before it is added to the word.
pub const DEFAULT_HOLD_DURATION: Duration = Duration::from_secs(1);

/// Gate and hold settings read by the engine on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    confidence_min: f32,
    hold_duration: Duration,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            confidence_min: DEFAULT_CONFIDENCE_MIN,
            hold_duration: DEFAULT_HOLD_DURATION,
        }
    }
}

impl Thresholds {
    pub fn new(confidence_min: f32, hold_duration: Duration) -> Self {
        Self {
            confidence_min: clamp_unit(confidence_min),
            hold_duration,
        }
    }

    pub fn confidence_min(&self) -> f32 {
        self.confidence_min
    }

    pub fn hold_duration(&self) -> Duration {
        self.hold_duration
    }

    /// Clamped into `[0, 1]`.
    pub fn set_confidence_min(&mut self, value: f32) {
        self.confidence_min = clamp_unit(value);
    }

    pub fn set_hold_duration(&mut self, value: Duration) {
        self.hold_duration = value;
    }

    /// Whether a confidence passes the gate.
    pub fn accepts(&self, confidence: f32) -> bool {
        confidence >= self.confidence_min
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
