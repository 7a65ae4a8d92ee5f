//! Temporal stabilization of detector output.
//!
//! The detector flickers: a held sign can drop out for a frame, jump to a
//! neighbouring class, or dip below the confidence threshold. The
//! [`StabilizationEngine`] only confirms a symbol once it has been the
//! qualifying candidate for at least the configured hold duration, and
//! confirms it once per hold episode.

mod engine;
mod thresholds;

pub use engine::{EngineState, Phase, StabilizationEngine, Step};
pub use thresholds::{Thresholds, DEFAULT_CONFIDENCE_MIN, DEFAULT_HOLD_DURATION};
