//! Hold-time debounce state machine.

use std::time::Duration;

use fingerspell_sign::{ConfirmedSymbol, Sample, Symbol, Timestamp};

use crate::thresholds::Thresholds;

/// Memory of the debounce state machine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EngineState {
    /// Last symbol that passed the confidence gate.
    pub candidate_symbol: Option<Symbol>,
    /// When `candidate_symbol` first appeared in the current hold episode.
    pub candidate_since: Timestamp,
    /// Whether the current hold episode already produced a confirmation.
    pub confirmed: bool,
}

/// Logical state of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No qualifying candidate.
    Idle,
    /// Candidate present, not yet confirmed.
    Holding,
    /// Candidate present and already emitted.
    Confirmed,
}

/// What a single tick did.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Nothing qualifying this tick.
    Idle,
    /// A new hold episode started.
    Started(Symbol),
    /// Still holding, not long enough yet.
    Holding { symbol: Symbol, elapsed: Duration },
    /// Hold completed on this tick.
    Confirmed(ConfirmedSymbol),
    /// Still holding a symbol that was already confirmed.
    Held(Symbol),
}

impl Step {
    pub fn into_confirmed(self) -> Option<ConfirmedSymbol> {
        match self {
            Step::Confirmed(c) => Some(c),
            _ => None,
        }
    }
}

/// Turns one sample per tick into at most one confirmed symbol per hold.
#[derive(Debug, Clone, Default)]
pub struct StabilizationEngine {
    thresholds: Thresholds,
    state: EngineState,
}

impl StabilizationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            state: EngineState::default(),
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Applies from the next tick on.
    pub fn set_confidence_min(&mut self, value: f32) {
        self.thresholds.set_confidence_min(value);
        tracing::debug!(confidence_min = self.thresholds.confidence_min(), "confidence gate updated");
    }

    /// Applies from the next tick on, including to a hold already in progress.
    pub fn set_hold_duration(&mut self, value: Duration) {
        self.thresholds.set_hold_duration(value);
        tracing::debug!(hold_ms = value.as_millis() as u64, "hold duration updated");
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        match (&self.state.candidate_symbol, self.state.confirmed) {
            (None, _) => Phase::Idle,
            (Some(_), false) => Phase::Holding,
            (Some(_), true) => Phase::Confirmed,
        }
    }

    /// Feed one tick. Returns the confirmed symbol if this tick completed a hold.
    ///
    /// Calls must arrive in non-decreasing `now` order.
    pub fn process(&mut self, sample: &Sample, now: Timestamp) -> Option<ConfirmedSymbol> {
        self.step(sample, now).into_confirmed()
    }

    /// Like [`process`](Self::process), but reports what happened on every tick.
    pub fn step(&mut self, sample: &Sample, now: Timestamp) -> Step {
        let symbol = match &sample.symbol {
            Some(symbol) if self.thresholds.accepts(sample.clamped_confidence()) => symbol,
            _ => {
                if self.state.candidate_symbol.is_some() {
                    tracing::trace!(at = %now, "candidate dropped");
                }
                self.idle_at(now);
                return Step::Idle;
            }
        };

        if self.state.candidate_symbol.as_ref() != Some(symbol) {
            self.state = EngineState {
                candidate_symbol: Some(symbol.clone()),
                candidate_since: now,
                confirmed: false,
            };
            tracing::debug!(symbol = %symbol, at = %now, "hold started");
            return Step::Started(symbol.clone());
        }

        if self.state.confirmed {
            return Step::Held(symbol.clone());
        }

        let elapsed = now.saturating_duration_since(self.state.candidate_since);
        if elapsed >= self.thresholds.hold_duration() {
            self.state.confirmed = true;
            tracing::debug!(
                symbol = %symbol,
                elapsed_ms = elapsed.as_millis() as u64,
                "symbol confirmed"
            );
            return Step::Confirmed(ConfirmedSymbol {
                symbol: symbol.clone(),
                at: now,
            });
        }

        Step::Holding {
            symbol: symbol.clone(),
            elapsed,
        }
    }

    /// Back to Idle. The removed or cleared symbol needs a fresh hold.
    pub fn reset(&mut self, now: Timestamp) {
        self.idle_at(now);
    }

    fn idle_at(&mut self, now: Timestamp) {
        self.state = EngineState {
            candidate_symbol: None,
            candidate_since: now,
            confirmed: false,
        };
    }
}
