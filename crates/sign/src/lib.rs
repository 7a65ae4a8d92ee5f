//! Value types shared by every stage of the spelling pipeline.
//!
//! Nothing in here performs I/O. Detector output arrives as [`Detection`]s,
//! gets reduced to one [`Sample`] per tick, and leaves the stabilizer as a
//! [`ConfirmedSymbol`].

mod detection;
mod symbol;
mod time;

pub use detection::{top_detection, BoundingBox, Detection};
pub use symbol::Symbol;
pub use time::Timestamp;

/// One detector observation for a single tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// `None` means nothing was detected this tick.
    pub symbol: Option<Symbol>,
    pub confidence: f32,
    pub timestamp: Timestamp,
}

impl Sample {
    pub fn new(symbol: Option<Symbol>, confidence: f32, timestamp: Timestamp) -> Self {
        Self {
            symbol,
            confidence,
            timestamp,
        }
    }

    /// A tick where the detector reported nothing.
    pub fn none(timestamp: Timestamp) -> Self {
        Self::new(None, 0.0, timestamp)
    }

    /// Build the tick's sample from the detector's best detection, if any.
    pub fn from_detection(detection: Option<&Detection>, timestamp: Timestamp) -> Self {
        match detection {
            Some(d) => Self::new(Symbol::from_label(&d.label), d.confidence, timestamp),
            None => Self::none(timestamp),
        }
    }

    /// Confidence clamped into `[0, 1]`. NaN counts as zero.
    pub fn clamped_confidence(&self) -> f32 {
        if self.confidence.is_nan() {
            0.0
        } else {
            self.confidence.clamp(0.0, 1.0)
        }
    }
}

/// A symbol that completed a hold episode.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ConfirmedSymbol {
    pub symbol: Symbol,
    pub at: Timestamp,
}
