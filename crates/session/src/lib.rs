//! The word being spelled and the words already submitted.

mod clock;

pub use clock::{FixedClock, SystemClock, WallClock};

use chrono::{NaiveDateTime, TimeDelta};
use fingerspell_history::{HistoryEntry, HistoryLog, Result};
use fingerspell_sign::Symbol;

/// Result of [`WordSession::backspace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackspaceOutcome {
    Removed(char),
    NothingToRemove,
}

/// Result of [`WordSession::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted(HistoryEntry),
    NothingToSubmit,
}

/// Owns the word buffer, the in-memory history and the durable log behind it.
///
/// Operations that touch the log write it first and only then change memory,
/// so a failed write leaves the session exactly as it was.
pub struct WordSession {
    buffer: String,
    history: Vec<HistoryEntry>,
    log: Box<dyn HistoryLog>,
    clock: Box<dyn WallClock>,
}

impl WordSession {
    /// Start a session, loading whatever the log already holds.
    pub fn open(mut log: Box<dyn HistoryLog>, clock: Box<dyn WallClock>) -> Result<Self> {
        let history = log.load()?;
        tracing::debug!(entries = history.len(), "word session opened");
        Ok(Self {
            buffer: String::new(),
            history,
            log,
            clock,
        })
    }

    pub fn current_word(&self) -> &str {
        &self.buffer
    }

    /// Oldest first.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// The last `n` entries, oldest first.
    pub fn recent_history(&self, n: usize) -> &[HistoryEntry] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }

    /// Symbols with control characters are ignored; the buffer only holds
    /// text that fits on one log line.
    pub fn append_symbol(&mut self, symbol: &Symbol) {
        if !symbol.is_writable() {
            tracing::warn!(symbol = ?symbol, "ignoring symbol with control characters");
            return;
        }
        self.buffer.push_str(symbol.text());
        tracing::debug!(symbol = %symbol, word = %self.buffer, "symbol appended");
    }

    pub fn add_space(&mut self) {
        self.append_symbol(&Symbol::Space);
    }

    pub fn backspace(&mut self) -> BackspaceOutcome {
        match self.buffer.pop() {
            Some(c) => BackspaceOutcome::Removed(c),
            None => BackspaceOutcome::NothingToRemove,
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Record the current word and start a new one.
    ///
    /// On a log failure the word stays in the buffer and history is unchanged.
    pub fn submit(&mut self) -> Result<SubmitOutcome> {
        if self.buffer.is_empty() {
            return Ok(SubmitOutcome::NothingToSubmit);
        }

        let entry = HistoryEntry::new(self.clock.now(), self.buffer.clone());
        let entry = HistoryEntry {
            timestamp: self.after_last_entry(entry.timestamp),
            ..entry
        };
        self.log.append(&entry)?;
        self.history.push(entry.clone());
        self.clear();

        tracing::info!(word = %entry.text, "word submitted");
        Ok(SubmitOutcome::Submitted(entry))
    }

    /// Two submits within the same millisecond would get the same timestamp;
    /// move the later one just past the previous entry. Larger backward steps
    /// of the wall clock are kept as they are.
    fn after_last_entry(&self, timestamp: NaiveDateTime) -> NaiveDateTime {
        let Some(last) = self.history.last().map(|e| e.timestamp) else {
            return timestamp;
        };
        if timestamp <= last && last - timestamp < TimeDelta::seconds(1) {
            last.checked_add_signed(TimeDelta::milliseconds(1))
                .unwrap_or(timestamp)
        } else {
            timestamp
        }
    }

    pub fn clear_history(&mut self) -> Result<()> {
        self.log.truncate()?;
        self.history.clear();
        tracing::info!("word history cleared");
        Ok(())
    }
}

impl std::fmt::Debug for WordSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordSession")
            .field("buffer", &self.buffer)
            .field("history", &self.history.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};
    use fingerspell_history::{HistoryError, MemoryLog};

    fn at(secs: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 2)
            .unwrap()
            .and_hms_opt(8, 30, secs)
            .unwrap()
    }

    fn session_with(log: MemoryLog) -> WordSession {
        WordSession::open(Box::new(log), Box::new(FixedClock::new(at(0)))).unwrap()
    }

    fn type_word(session: &mut WordSession, word: &str) {
        for c in word.chars() {
            session.append_symbol(&Symbol::label(c.to_string()));
        }
    }

    /// Log whose writes fail until `heal` is called.
    struct BrokenLog {
        inner: MemoryLog,
        broken: std::sync::Arc<std::sync::atomic::AtomicBool>,
    }

    impl BrokenLog {
        fn fail() -> std::io::Error {
            std::io::Error::new(std::io::ErrorKind::Other, "disk full")
        }
    }

    impl HistoryLog for BrokenLog {
        fn load(&mut self) -> Result<Vec<HistoryEntry>> {
            self.inner.load()
        }

        fn append(&mut self, entry: &HistoryEntry) -> Result<()> {
            if self.broken.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(HistoryError::io("append", Self::fail()));
            }
            self.inner.append(entry)
        }

        fn truncate(&mut self) -> Result<()> {
            if self.broken.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(HistoryError::io("truncate", Self::fail()));
            }
            self.inner.truncate()
        }
    }

    #[test]
    fn test_append_and_space() {
        let mut s = session_with(MemoryLog::new());
        type_word(&mut s, "HI");
        s.add_space();
        type_word(&mut s, "YO");
        assert_eq!(s.current_word(), "HI YO");
    }

    #[test]
    fn test_backspace_round_trip() {
        let mut s = session_with(MemoryLog::new());
        type_word(&mut s, "AB");
        let before = s.current_word().to_string();

        s.append_symbol(&Symbol::label("C"));
        assert_eq!(s.backspace(), BackspaceOutcome::Removed('C'));
        assert_eq!(s.current_word(), before);
    }

    #[test]
    fn test_backspace_on_empty() {
        let mut s = session_with(MemoryLog::new());
        assert_eq!(s.backspace(), BackspaceOutcome::NothingToRemove);
        assert_eq!(s.current_word(), "");
    }

    #[test]
    fn test_backspace_removes_one_char_of_multichar_label() {
        let mut s = session_with(MemoryLog::new());
        s.append_symbol(&Symbol::label("TH"));
        assert_eq!(s.backspace(), BackspaceOutcome::Removed('H'));
        assert_eq!(s.current_word(), "T");
    }

    #[test]
    fn test_submit_records_and_clears() {
        let log = MemoryLog::new();
        let mut s = session_with(log.clone());
        type_word(&mut s, "HI");

        let outcome = s.submit().unwrap();

        assert_eq!(
            outcome,
            SubmitOutcome::Submitted(HistoryEntry::new(at(0), "HI"))
        );
        assert_eq!(s.current_word(), "");
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.history()[0].text, "HI");
        assert_eq!(log.entries(), s.history());
    }

    #[test]
    fn test_submit_empty_is_noop() {
        let log = MemoryLog::new();
        let mut s = session_with(log.clone());
        assert_eq!(s.submit().unwrap(), SubmitOutcome::NothingToSubmit);
        assert!(s.history().is_empty());
        assert!(log.entries().is_empty());
    }

    #[test]
    fn test_double_submit_creates_two_entries() {
        let clock = FixedClock::new(at(1));
        let mut s = WordSession::open(Box::new(MemoryLog::new()), Box::new(clock.clone())).unwrap();

        type_word(&mut s, "GO");
        s.submit().unwrap();
        clock.set(at(2));
        type_word(&mut s, "GO");
        s.submit().unwrap();

        assert_eq!(s.history().len(), 2);
        assert_eq!(s.history()[0].timestamp, at(1));
        assert_eq!(s.history()[1].timestamp, at(2));
        assert!(s.history().iter().all(|e| e.text == "GO"));
    }

    #[test]
    fn test_submits_within_one_second_keep_milliseconds() {
        let first = at(4).with_nanosecond(120_000_000).unwrap();
        let second = at(4).with_nanosecond(870_000_000).unwrap();
        let clock = FixedClock::new(first);
        let log = MemoryLog::new();
        let mut s = WordSession::open(Box::new(log.clone()), Box::new(clock.clone())).unwrap();

        type_word(&mut s, "GO");
        s.submit().unwrap();
        clock.set(second);
        type_word(&mut s, "GO");
        s.submit().unwrap();

        assert_ne!(s.history()[0], s.history()[1]);
        assert_eq!(s.history()[0].timestamp, first);
        assert_eq!(s.history()[1].timestamp, second);
        assert_eq!(log.entries(), s.history());
    }

    #[test]
    fn test_submits_at_the_same_instant_get_distinct_timestamps() {
        let clock = FixedClock::new(at(5));
        let mut s = WordSession::open(Box::new(MemoryLog::new()), Box::new(clock)).unwrap();

        for _ in 0..3 {
            type_word(&mut s, "GO");
            s.submit().unwrap();
        }

        let millis: Vec<_> = s
            .history()
            .iter()
            .map(|e| e.timestamp.nanosecond() / 1_000_000)
            .collect();
        assert_eq!(millis, vec![0, 1, 2]);
    }

    #[test]
    fn test_clock_stepping_back_is_kept() {
        let clock = FixedClock::new(at(30));
        let mut s = WordSession::open(Box::new(MemoryLog::new()), Box::new(clock.clone())).unwrap();
        type_word(&mut s, "A");
        s.submit().unwrap();

        clock.set(at(10));
        type_word(&mut s, "B");
        s.submit().unwrap();
        assert_eq!(s.history()[1].timestamp, at(10));
    }

    #[test]
    fn test_control_characters_never_reach_the_buffer() {
        let mut s = session_with(MemoryLog::new());
        type_word(&mut s, "A");
        s.append_symbol(&Symbol::label("X\nY"));
        s.append_symbol(&Symbol::label("\r"));
        type_word(&mut s, "B");
        assert_eq!(s.current_word(), "AB");
    }

    #[test]
    fn test_clear_history() {
        let log = MemoryLog::new();
        let mut s = session_with(log.clone());
        type_word(&mut s, "A");
        s.submit().unwrap();

        s.clear_history().unwrap();
        assert!(s.history().is_empty());
        assert!(log.entries().is_empty());
    }

    #[test]
    fn test_open_loads_existing_history() {
        let mut log = MemoryLog::new();
        log.append(&HistoryEntry::new(at(3), "OLD")).unwrap();

        let s = session_with(log);
        assert_eq!(s.history(), &[HistoryEntry::new(at(3), "OLD")]);
    }

    #[test]
    fn test_recent_history() {
        let mut s = session_with(MemoryLog::new());
        for word in ["A", "B", "C", "D"] {
            type_word(&mut s, word);
            s.submit().unwrap();
        }
        let recent: Vec<_> = s.recent_history(3).iter().map(|e| e.text.as_str()).collect();
        assert_eq!(recent, vec!["B", "C", "D"]);
        assert_eq!(s.recent_history(10).len(), 4);
    }

    #[test]
    fn test_failed_submit_leaves_state_unchanged() {
        let broken = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(true));
        let log = BrokenLog {
            inner: MemoryLog::new(),
            broken: broken.clone(),
        };
        let mut s = WordSession::open(Box::new(log), Box::new(FixedClock::new(at(0)))).unwrap();
        type_word(&mut s, "HI");

        assert!(s.submit().is_err());
        assert_eq!(s.current_word(), "HI");
        assert!(s.history().is_empty());

        // Retry once the log recovers.
        broken.store(false, std::sync::atomic::Ordering::SeqCst);
        assert!(matches!(s.submit().unwrap(), SubmitOutcome::Submitted(_)));
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn test_failed_clear_history_keeps_entries() {
        let broken = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let log = BrokenLog {
            inner: MemoryLog::new(),
            broken: broken.clone(),
        };
        let mut s = WordSession::open(Box::new(log), Box::new(FixedClock::new(at(0)))).unwrap();
        type_word(&mut s, "KEEP");
        s.submit().unwrap();

        broken.store(true, std::sync::atomic::Ordering::SeqCst);
        assert!(s.clear_history().is_err());
        assert_eq!(s.history().len(), 1);
    }
}
