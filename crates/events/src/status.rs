use fingerspell_sign::Symbol;
use serde::{Deserialize, Serialize};

/// User-facing status after a tick or an edit command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Status {
    /// A new hold started.
    Holding(Symbol),
    /// A held symbol was committed to the word.
    Added { symbol: Symbol, word: String },
    Removed(char),
    NothingToRemove,
    SpaceAdded,
    WordCleared,
    Submitted(String),
    NothingToSubmit,
    HistoryCleared,
    ConfidenceChanged(f32),
    HoldChanged(u64),
    DeviceSelected(u32),
    SelectDeviceFirst,
    DetectionStarted,
    DetectionStopped,
    Error(String),
}

impl Status {
    pub fn is_error(&self) -> bool {
        matches!(self, Status::Error(_))
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Holding(symbol) => write!(f, "Detected {symbol} - Hold to add to word"),
            Status::Added { symbol, word } => write!(f, "Added {symbol} to word: {word}"),
            Status::Removed(_) => write!(f, "Removed last letter"),
            Status::NothingToRemove => write!(f, "No letter to remove"),
            Status::SpaceAdded => write!(f, "Added space"),
            Status::WordCleared => write!(f, "Word cleared"),
            Status::Submitted(word) => write!(f, "Submitted word: {word}"),
            Status::NothingToSubmit => write!(f, "No word to submit"),
            Status::HistoryCleared => write!(f, "Word history cleared"),
            Status::ConfidenceChanged(v) => write!(f, "Confidence threshold set to {v:.2}"),
            Status::HoldChanged(ms) => write!(f, "Hold time set to {ms} ms"),
            Status::DeviceSelected(index) => write!(f, "Webcam {index} selected"),
            Status::SelectDeviceFirst => write!(f, "Please select a webcam first"),
            Status::DetectionStarted => write!(f, "Detection running"),
            Status::DetectionStopped => write!(f, "Detection stopped"),
            Status::Error(msg) => write!(f, "Error: {msg}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let cases = [
            (
                Status::Added {
                    symbol: Symbol::label("I"),
                    word: "HI".to_string(),
                },
                "Added I to word: HI",
            ),
            (Status::Removed('I'), "Removed last letter"),
            (Status::NothingToRemove, "No letter to remove"),
            (Status::Submitted("HI".to_string()), "Submitted word: HI"),
            (Status::NothingToSubmit, "No word to submit"),
            (Status::HistoryCleared, "Word history cleared"),
            (Status::ConfidenceChanged(0.8), "Confidence threshold set to 0.80"),
            (Status::HoldChanged(750), "Hold time set to 750 ms"),
            (Status::DeviceSelected(1), "Webcam 1 selected"),
            (
                Status::Error("could not open webcam 4".to_string()),
                "Error: could not open webcam 4",
            ),
        ];
        for (status, expected) in cases {
            assert_eq!(status.to_string(), expected);
        }
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(Status::Submitted("OK".to_string())).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "submitted", "data": "OK"}));

        let back: Status = serde_json::from_value(json).unwrap();
        assert_eq!(back, Status::Submitted("OK".to_string()));
    }

    #[test]
    fn test_is_error() {
        assert!(Status::Error("x".to_string()).is_error());
        assert!(!Status::WordCleared.is_error());
    }
}
