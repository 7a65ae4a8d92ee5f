//! Event bus abstraction for publishing to the presentation layer.
//!
//! The spelling core only knows this trait, so it runs unchanged under the
//! headless driver, in tests, or behind a GUI.

use serde::Serialize;
use std::sync::{Arc, Mutex};

/// Sink for events published by the core.
pub trait EventBus: Send + Sync {
    /// Publish `payload` under `topic` (see [`crate::event_names`]).
    fn emit(&self, topic: &str, payload: serde_json::Value);
}

/// Shared event bus reference.
pub type EventBusRef = Arc<dyn EventBus>;

/// Serialize `payload` and publish it. A payload that cannot be serialized is
/// logged and dropped; it never interrupts the tick loop.
pub fn emit_event<T: Serialize>(bus: &dyn EventBus, topic: &str, payload: &T) {
    match serde_json::to_value(payload) {
        Ok(value) => bus.emit(topic, value),
        Err(e) => tracing::warn!(topic, error = %e, "dropping unserializable event"),
    }
}

/// Bus that records everything, for tests and replay reports.
#[derive(Default)]
pub struct InMemoryEventBus {
    events: Mutex<Vec<EmittedEvent>>,
}

/// A captured event from [`InMemoryEventBus`].
#[derive(Debug, Clone)]
pub struct EmittedEvent {
    pub topic: String,
    pub payload: serde_json::Value,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events_for(&self, topic: &str) -> Vec<EmittedEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.topic == topic)
            .cloned()
            .collect()
    }

    /// `message` fields of every status event, in order.
    pub fn status_messages(&self) -> Vec<String> {
        self.events_for(crate::event_names::STATUS)
            .into_iter()
            .filter_map(|e| e.payload.get("message")?.as_str().map(str::to_string))
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().unwrap().is_empty()
    }
}

impl EventBus for InMemoryEventBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        self.events.lock().unwrap().push(EmittedEvent {
            topic: topic.to_string(),
            payload,
        });
    }
}

/// Discards everything.
pub struct NullEventBus;

impl EventBus for NullEventBus {
    fn emit(&self, _topic: &str, _payload: serde_json::Value) {}
}
