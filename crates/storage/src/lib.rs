use fingerspell_history::{HistoryEntry, HistoryError, HistoryLog, Result};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Attempts per append when the failure is transient.
pub const DEFAULT_APPEND_ATTEMPTS: u32 = 3;

/// Append-only text log, one `"<timestamp>: <word>\n"` line per entry.
///
/// Every append is a single write followed by `sync_data`, so a completed
/// call is on disk. A torn trailing line left by a crash is cut off the next
/// time the log is opened; entries before it are never touched.
pub struct FileWordLog {
    path: PathBuf,
    file: File,
    append_attempts: u32,
}

impl FileWordLog {
    pub fn open(path: &Path) -> Result<Self> {
        let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(parent) = parent {
            std::fs::create_dir_all(parent).map_err(|e| HistoryError::io("create", e))?;
        }

        let created = !path.exists();
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)
            .map_err(|e| HistoryError::io("open", e))?;
        if created {
            sync_dir(parent.unwrap_or(Path::new(".")))?;
        }

        let mut log = Self {
            path: path.to_path_buf(),
            file,
            append_attempts: DEFAULT_APPEND_ATTEMPTS,
        };
        log.repair_torn_tail()?;
        tracing::debug!(path = ?log.path, "history log opened");
        Ok(log)
    }

    /// At least one attempt is always made.
    pub fn with_append_attempts(mut self, attempts: u32) -> Self {
        self.append_attempts = attempts.max(1);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn len(&self) -> Result<u64> {
        self.file
            .metadata()
            .map(|m| m.len())
            .map_err(|e| HistoryError::io("stat", e))
    }

    fn read_all(&mut self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.file
            .seek(SeekFrom::Start(0))
            .and_then(|_| self.file.read_to_end(&mut bytes))
            .map_err(|e| HistoryError::io("read", e))?;
        Ok(bytes)
    }

    fn repair_torn_tail(&mut self) -> Result<()> {
        let bytes = self.read_all()?;
        if bytes.last().map_or(true, |b| *b == b'\n') {
            return Ok(());
        }

        let keep = bytes
            .iter()
            .rposition(|b| *b == b'\n')
            .map_or(0, |pos| pos + 1);
        tracing::warn!(
            path = ?self.path,
            dropped_bytes = bytes.len() - keep,
            "discarding incomplete trailing history line"
        );
        self.rollback(keep as u64)
    }

    fn rollback(&mut self, len: u64) -> Result<()> {
        self.file
            .set_len(len)
            .and_then(|_| self.file.sync_all())
            .map_err(|e| HistoryError::io("truncate", e))
    }

    fn write_line(&mut self, line: &[u8]) -> Result<()> {
        self.file
            .write_all(line)
            .and_then(|_| self.file.sync_data())
            .map_err(|e| HistoryError::io("append", e))
    }
}

impl HistoryLog for FileWordLog {
    fn load(&mut self) -> Result<Vec<HistoryEntry>> {
        let bytes = self.read_all()?;
        let text = String::from_utf8_lossy(&bytes);

        let mut entries = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match HistoryEntry::parse_line(line, idx + 1) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!(path = ?self.path, error = %e, "skipping history line"),
            }
        }
        Ok(entries)
    }

    fn append(&mut self, entry: &HistoryEntry) -> Result<()> {
        if !entry.is_writable() {
            return Err(HistoryError::Unwritable(entry.text.clone()));
        }
        let line = entry.to_line();
        let start = self.len()?;
        let attempts = self.append_attempts;

        retry_transient(attempts, |attempt| {
            if attempt > 1 {
                tracing::warn!(path = ?self.path, attempt, "retrying history append");
                self.rollback(start)?;
            }
            let result = self.write_line(line.as_bytes());
            if result.is_err() {
                // Never leave half a line behind for the next writer.
                if let Err(e) = self.rollback(start) {
                    tracing::error!(path = ?self.path, error = %e, "rollback after failed append");
                }
            }
            result
        })
    }

    fn truncate(&mut self) -> Result<()> {
        self.rollback(0)?;
        tracing::info!(path = ?self.path, "history log truncated");
        Ok(())
    }
}

/// Make a newly created directory entry durable.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<()> {
    File::open(dir)
        .and_then(|d| d.sync_all())
        .map_err(|e| HistoryError::io("sync directory of", e))
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<()> {
    Ok(())
}

/// Run `op` until it succeeds, fails with a non-transient error, or `attempts`
/// runs out. `op` receives the 1-based attempt number.
fn retry_transient<F>(attempts: u32, mut op: F) -> Result<()>
where
    F: FnMut(u32) -> Result<()>,
{
    let mut attempt = 1;
    loop {
        match op(attempt) {
            Ok(()) => return Ok(()),
            Err(e) if e.is_transient() && attempt < attempts => attempt += 1,
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    fn err(kind: ErrorKind) -> HistoryError {
        HistoryError::io("append", std::io::Error::from(kind))
    }

    #[test]
    fn test_retry_succeeds_after_transient_errors() {
        let mut calls = 0;
        let result = retry_transient(3, |_| {
            calls += 1;
            if calls < 3 {
                Err(err(ErrorKind::Interrupted))
            } else {
                Ok(())
            }
        });
        assert!(result.is_ok());
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_retry_gives_up_after_attempts() {
        let mut calls = 0;
        let result = retry_transient(2, |_| {
            calls += 1;
            Err(err(ErrorKind::TimedOut))
        });
        assert!(result.is_err());
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_retry_stops_on_permanent_error() {
        let mut calls = 0;
        let result = retry_transient(5, |_| {
            calls += 1;
            Err(err(ErrorKind::PermissionDenied))
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
