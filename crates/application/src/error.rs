use fingerspell_capture::CaptureError;
use fingerspell_history::HistoryError;
use std::path::PathBuf;

/// Failures surfaced by the spelling session. None of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The camera could not be opened or stopped delivering frames.
    /// Detection has been stopped and the device released.
    #[error("camera failure: {0}")]
    Device(#[from] CaptureError),
    /// The history log could not be written. In-memory state is unchanged,
    /// so the command can be retried.
    #[error("history log failure: {0}")]
    Persistence(#[from] HistoryError),
    #[error("no webcam selected")]
    NoDeviceSelected,
}

pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings in '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
