//! Contracts between the spelling core and whatever renders it.
//!
//! The core never draws anything. After every tick and every edit command it
//! publishes what changed on an [`EventBus`]; the presentation layer can also
//! read the word and history directly.

mod bus;
mod status;

pub use bus::{emit_event, EmittedEvent, EventBus, EventBusRef, InMemoryEventBus, NullEventBus};
pub use status::Status;

use fingerspell_history::HistoryEntry;
use serde::{Deserialize, Serialize};

/// Something happened that the user should be told about.
///
/// Producers: application (speller, detection session)
/// Consumers: status bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub status: Status,
    /// `status` rendered for display.
    pub message: String,
    /// Monotonic tick time, when the status came from a tick.
    #[serde(default)]
    pub at_ms: Option<u64>,
}

impl StatusEvent {
    pub fn new(status: Status, at_ms: Option<u64>) -> Self {
        let message = status.to_string();
        Self {
            status,
            message,
            at_ms,
        }
    }
}

/// The word in progress changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordChangedEvent {
    pub word: String,
}

/// The submitted-word history changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryChangedEvent {
    /// Most recent entries, oldest first.
    pub recent: Vec<HistoryEntry>,
    pub total: usize,
}

/// Event names as constants to prevent typos.
pub mod event_names {
    pub const STATUS: &str = "speller:status";
    pub const WORD_CHANGED: &str = "speller:word";
    pub const HISTORY_CHANGED: &str = "speller:history";
}
