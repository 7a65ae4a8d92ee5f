use serde::{Deserialize, Serialize};

/// Labels that mean "the detector saw no sign".
const NO_SIGN_LABELS: &[&str] = &["none", "nothing"];

/// Label the detector uses for the space gesture.
const SPACE_LABEL: &str = "space";

/// A recognized sign.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symbol {
    /// Appends a literal space.
    Space,
    /// Any other class label, usually a single letter.
    Label(String),
}

impl Symbol {
    pub fn label(text: impl Into<String>) -> Self {
        Symbol::Label(text.into())
    }

    /// Map a raw detector label to a symbol.
    ///
    /// Returns `None` for "no sign" labels and for labels that could not be
    /// written to the word buffer (empty, or containing control characters).
    pub fn from_label(raw: &str) -> Option<Self> {
        let label = raw.trim();
        if label.is_empty() || NO_SIGN_LABELS.iter().any(|l| label.eq_ignore_ascii_case(l)) {
            return None;
        }
        if label.eq_ignore_ascii_case(SPACE_LABEL) {
            return Some(Symbol::Space);
        }
        let symbol = Symbol::Label(label.to_string());
        if !symbol.is_writable() {
            tracing::debug!(label = ?raw, "ignoring label with control characters");
            return None;
        }
        Some(symbol)
    }

    /// Text appended to the word when this symbol is confirmed.
    pub fn text(&self) -> &str {
        match self {
            Symbol::Space => " ",
            Symbol::Label(text) => text,
        }
    }

    /// Whether the text can go into a word. Control characters would break
    /// the one-line-per-word history log.
    pub fn is_writable(&self) -> bool {
        !self.text().chars().any(char::is_control)
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::Space => write!(f, "space"),
            Symbol::Label(text) => write!(f, "{text}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label_letters() {
        assert_eq!(Symbol::from_label("A"), Some(Symbol::label("A")));
        assert_eq!(Symbol::from_label("  y "), Some(Symbol::label("y")));
    }

    #[test]
    fn test_from_label_no_sign() {
        assert_eq!(Symbol::from_label(""), None);
        assert_eq!(Symbol::from_label("   "), None);
        assert_eq!(Symbol::from_label("none"), None);
        assert_eq!(Symbol::from_label("Nothing"), None);
    }

    #[test]
    fn test_from_label_space() {
        assert_eq!(Symbol::from_label("space"), Some(Symbol::Space));
        assert_eq!(Symbol::from_label("SPACE"), Some(Symbol::Space));
        assert_eq!(Symbol::Space.text(), " ");
    }

    #[test]
    fn test_from_label_rejects_control_chars() {
        assert_eq!(Symbol::from_label("A\nB"), None);
        assert_eq!(Symbol::from_label("\u{7}"), None);
    }

    #[test]
    fn test_is_writable() {
        assert!(Symbol::label("TH").is_writable());
        assert!(Symbol::Space.is_writable());
        assert!(!Symbol::label("A\nB").is_writable());
        assert!(!Symbol::label("\t").is_writable());
    }

    #[test]
    fn test_display() {
        assert_eq!(Symbol::label("Q").to_string(), "Q");
        assert_eq!(Symbol::Space.to_string(), "space");
    }
}
