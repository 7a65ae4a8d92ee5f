mod detection;
mod error;
mod settings;
mod speller;

pub use detection::DetectionSession;
pub use error::{Result, SessionError, SettingsError};
pub use settings::{default_log_path, Settings, LOG_FILE_NAME};
pub use speller::Speller;

use fingerspell_events::EventBusRef;
use fingerspell_session::{SystemClock, WordSession};
use fingerspell_stabilizer::StabilizationEngine;
use fingerspell_storage::FileWordLog;

/// Open the history log named in `settings` and build a speller on top of it.
pub fn open_speller(settings: &Settings, bus: EventBusRef) -> Result<Speller> {
    let log = FileWordLog::open(&settings.log_path)?.with_append_attempts(settings.append_attempts);
    let words = WordSession::open(Box::new(log), Box::new(SystemClock))?;
    let engine = StabilizationEngine::with_thresholds(settings.thresholds());

    tracing::info!(
        log = ?settings.log_path,
        confidence_min = settings.confidence_min,
        hold_ms = settings.hold_ms,
        history = words.history().len(),
        "speller ready"
    );
    Ok(Speller::new(engine, words, bus).with_history_display(settings.history_display))
}
