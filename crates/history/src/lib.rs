use chrono::{NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Timestamp layout used in the durable log.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Layout of logs written before millisecond timestamps. Still readable.
const WHOLE_SECOND_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fractional digits kept in entry timestamps.
const SUBSEC_DIGITS: u16 = 3;

const SEPARATOR: &str = ": ";

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("failed to {op} history log: {source}")]
    Io {
        op: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed history line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error("word {0:?} cannot be stored on a single log line")]
    Unwritable(String),
}

impl HistoryError {
    pub fn io(op: &'static str, source: std::io::Error) -> Self {
        HistoryError::Io { op, source }
    }

    /// Errors worth retrying without any change on the caller's side.
    pub fn is_transient(&self) -> bool {
        match self {
            HistoryError::Io { source, .. } => matches!(
                source.kind(),
                std::io::ErrorKind::Interrupted
                    | std::io::ErrorKind::WouldBlock
                    | std::io::ErrorKind::TimedOut
            ),
            HistoryError::Malformed { .. } | HistoryError::Unwritable(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, HistoryError>;

/// Durable, append-only store of submitted words.
///
/// Implemented by the storage layer so sessions stay independent of files.
pub trait HistoryLog: Send {
    /// All entries, oldest first.
    fn load(&mut self) -> Result<Vec<HistoryEntry>>;
    /// Durably record one entry. Returns only once the write is complete.
    fn append(&mut self, entry: &HistoryEntry) -> Result<()>;
    /// Remove every entry.
    fn truncate(&mut self) -> Result<()>;
}

/// A submitted word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: NaiveDateTime,
    pub text: String,
}

impl HistoryEntry {
    /// The timestamp is truncated to milliseconds so the entry survives a log
    /// round trip.
    pub fn new(timestamp: NaiveDateTime, text: impl Into<String>) -> Self {
        let timestamp = timestamp.trunc_subsecs(SUBSEC_DIGITS);
        Self {
            timestamp,
            text: text.into(),
        }
    }

    /// Whether the text fits on one log line.
    pub fn is_writable(&self) -> bool {
        !self.text.contains(['\n', '\r'])
    }

    /// Log line for this entry, including the trailing newline.
    pub fn to_line(&self) -> String {
        format!(
            "{}{SEPARATOR}{}\n",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.text
        )
    }

    /// Parse one log line (with or without its newline). `line_no` is 1-based
    /// and only used for error reporting.
    pub fn parse_line(line: &str, line_no: usize) -> Result<Self> {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let line = line.strip_suffix('\r').unwrap_or(line);
        let (ts, text) = line
            .split_once(SEPARATOR)
            .ok_or_else(|| HistoryError::Malformed {
                line: line_no,
                reason: "missing separator".to_string(),
            })?;
        let timestamp = NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(ts, WHOLE_SECOND_FORMAT))
            .map_err(|e| HistoryError::Malformed {
                line: line_no,
                reason: format!("bad timestamp {ts:?}: {e}"),
            })?;
        Ok(Self {
            timestamp,
            text: text.to_string(),
        })
    }
}

impl std::fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.text
        )
    }
}

/// Log kept in memory. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    entries: Arc<Mutex<Vec<HistoryEntry>>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.lock().expect("history mutex poisoned").clone()
    }
}

impl HistoryLog for MemoryLog {
    fn load(&mut self) -> Result<Vec<HistoryEntry>> {
        Ok(self.entries())
    }

    fn append(&mut self, entry: &HistoryEntry) -> Result<()> {
        self.entries
            .lock()
            .expect("history mutex poisoned")
            .push(entry.clone());
        Ok(())
    }

    fn truncate(&mut self) -> Result<()> {
        self.entries.lock().expect("history mutex poisoned").clear();
        Ok(())
    }
}
