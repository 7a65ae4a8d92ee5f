use crate::error::SettingsError;
use fingerspell_stabilizer::{Thresholds, DEFAULT_CONFIDENCE_MIN, DEFAULT_HOLD_DURATION};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const LOG_FILE_NAME: &str = "spelled_words.txt";

const APP_DIR: &str = "fingerspell";
const FALLBACK_DIR: &str = "words";

/// Where the history log lives unless configured otherwise.
pub fn default_log_path() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_DIR))
        .join(LOG_FILE_NAME)
}

/// User-adjustable settings. Every field has a default, so a settings file
/// only needs the keys it wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Minimum detector confidence, `0.0..=1.0`.
    pub confidence_min: f32,
    /// How long a sign must be held, in milliseconds.
    pub hold_ms: u64,
    pub log_path: PathBuf,
    /// Number of recent words published with history updates.
    pub history_display: usize,
    /// Attempts per history append on transient I/O errors.
    pub append_attempts: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            confidence_min: DEFAULT_CONFIDENCE_MIN,
            hold_ms: DEFAULT_HOLD_DURATION.as_millis() as u64,
            log_path: default_log_path(),
            history_display: 3,
            append_attempts: 3,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = ?path, "no settings file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(SettingsError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let settings: Settings =
            serde_json::from_str(&raw).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(settings.normalized())
    }

    /// Clamp every field into its valid range.
    pub fn normalized(mut self) -> Self {
        self.confidence_min = if self.confidence_min.is_nan() {
            DEFAULT_CONFIDENCE_MIN
        } else {
            self.confidence_min.clamp(0.0, 1.0)
        };
        self.append_attempts = self.append_attempts.max(1);
        self
    }

    pub fn hold_duration(&self) -> Duration {
        Duration::from_millis(self.hold_ms)
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds::new(self.confidence_min, self.hold_duration())
    }
}
