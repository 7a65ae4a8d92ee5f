//! The stabilizer and the word session, driven as one unit.

use std::time::Duration;

use fingerspell_events::{
    emit_event, event_names, EventBusRef, HistoryChangedEvent, Status, StatusEvent,
    WordChangedEvent,
};
use fingerspell_history::HistoryEntry;
use fingerspell_session::{BackspaceOutcome, SubmitOutcome, WordSession};
use fingerspell_sign::{ConfirmedSymbol, Sample, Timestamp};
use fingerspell_stabilizer::{StabilizationEngine, Step};

use crate::error::Result;

const DEFAULT_HISTORY_DISPLAY: usize = 3;

/// Owns the stabilizer and the word session.
///
/// Both are always touched together: edits that change the word also put the
/// stabilizer back to Idle, so the sign that is still up does not re-add the
/// letter that was just removed or cleared. Callers serialize access to the
/// whole `Speller` (one lock is enough).
pub struct Speller {
    engine: StabilizationEngine,
    words: WordSession,
    bus: EventBusRef,
    history_display: usize,
    /// Latest tick time, used to timestamp resets triggered by edits.
    last_tick: Timestamp,
}

impl Speller {
    pub fn new(engine: StabilizationEngine, words: WordSession, bus: EventBusRef) -> Self {
        Self {
            engine,
            words,
            bus,
            history_display: DEFAULT_HISTORY_DISPLAY,
            last_tick: Timestamp::ZERO,
        }
    }

    pub fn with_history_display(mut self, n: usize) -> Self {
        self.history_display = n;
        self
    }

    pub fn engine(&self) -> &StabilizationEngine {
        &self.engine
    }

    pub fn current_word(&self) -> &str {
        self.words.current_word()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        self.words.history()
    }

    /// The entries the presentation layer shows.
    pub fn recent_history(&self) -> &[HistoryEntry] {
        self.words.recent_history(self.history_display)
    }

    /// Run one detection tick.
    pub fn tick(&mut self, sample: &Sample, now: Timestamp) -> Option<ConfirmedSymbol> {
        self.last_tick = now;
        match self.engine.step(sample, now) {
            Step::Started(symbol) => {
                self.publish_at(Status::Holding(symbol), now);
                None
            }
            Step::Confirmed(confirmed) => {
                self.words.append_symbol(&confirmed.symbol);
                self.publish_at(
                    Status::Added {
                        symbol: confirmed.symbol.clone(),
                        word: self.words.current_word().to_string(),
                    },
                    now,
                );
                self.publish_word();
                Some(confirmed)
            }
            Step::Idle | Step::Holding { .. } | Step::Held(_) => None,
        }
    }

    pub fn backspace(&mut self) -> BackspaceOutcome {
        let outcome = self.words.backspace();
        self.engine.reset(self.last_tick);
        match outcome {
            BackspaceOutcome::Removed(c) => {
                self.publish(Status::Removed(c));
                self.publish_word();
            }
            BackspaceOutcome::NothingToRemove => self.publish(Status::NothingToRemove),
        }
        outcome
    }

    pub fn add_space(&mut self) {
        self.words.add_space();
        self.publish(Status::SpaceAdded);
        self.publish_word();
    }

    pub fn clear(&mut self) {
        self.clear_word();
        self.publish(Status::WordCleared);
        self.publish_word();
    }

    /// Record the current word in history and start a new one.
    ///
    /// On a log failure nothing changes and the call can be retried.
    pub fn submit(&mut self) -> Result<SubmitOutcome> {
        let outcome = match self.words.submit() {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "submit failed");
                self.publish(Status::Error(e.to_string()));
                return Err(e.into());
            }
        };

        match &outcome {
            SubmitOutcome::Submitted(entry) => {
                self.engine.reset(self.last_tick);
                self.publish(Status::Submitted(entry.text.clone()));
                self.publish_history();
                self.publish_word();
            }
            SubmitOutcome::NothingToSubmit => self.publish(Status::NothingToSubmit),
        }
        Ok(outcome)
    }

    pub fn clear_history(&mut self) -> Result<()> {
        if let Err(e) = self.words.clear_history() {
            tracing::error!(error = %e, "clearing history failed");
            self.publish(Status::Error(e.to_string()));
            return Err(e.into());
        }
        self.publish(Status::HistoryCleared);
        self.publish_history();
        Ok(())
    }

    pub fn set_confidence_min(&mut self, value: f32) {
        self.engine.set_confidence_min(value);
        self.publish(Status::ConfidenceChanged(
            self.engine.thresholds().confidence_min(),
        ));
    }

    pub fn set_hold_duration(&mut self, value: Duration) {
        self.engine.set_hold_duration(value);
        self.publish(Status::HoldChanged(value.as_millis() as u64));
    }

    /// Forget any hold in progress, e.g. when detection stops.
    pub fn reset_engine(&mut self) {
        self.engine.reset(self.last_tick);
    }

    /// Emit a status on behalf of the detection session.
    pub(crate) fn publish(&self, status: Status) {
        self.emit_status(status, None);
    }

    fn publish_at(&self, status: Status, now: Timestamp) {
        self.emit_status(status, Some(now.as_millis()));
    }

    fn emit_status(&self, status: Status, at_ms: Option<u64>) {
        tracing::debug!(status = %status, "status");
        emit_event(
            self.bus.as_ref(),
            event_names::STATUS,
            &StatusEvent::new(status, at_ms),
        );
    }

    fn publish_word(&self) {
        emit_event(
            self.bus.as_ref(),
            event_names::WORD_CHANGED,
            &WordChangedEvent {
                word: self.words.current_word().to_string(),
            },
        );
    }

    fn publish_history(&self) {
        emit_event(
            self.bus.as_ref(),
            event_names::HISTORY_CHANGED,
            &HistoryChangedEvent {
                recent: self.recent_history().to_vec(),
                total: self.words.history().len(),
            },
        );
    }

    fn clear_word(&mut self) {
        self.words.clear();
        self.engine.reset(self.last_tick);
    }
}

impl std::fmt::Debug for Speller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Speller")
            .field("engine", &self.engine)
            .field("words", &self.words)
            .field("last_tick", &self.last_tick)
            .finish()
    }
}
