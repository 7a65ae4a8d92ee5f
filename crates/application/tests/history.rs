//! The word session on top of the file log: what is in memory must be exactly
//! what a fresh process reads back.

use fingerspell_history::HistoryLog;
use fingerspell_session::{SystemClock, WordSession};
use fingerspell_sign::Symbol;
use fingerspell_storage::FileWordLog;
use std::path::Path;
use tempfile::tempdir;

fn open_session(path: &Path) -> WordSession {
    let log = FileWordLog::open(path).expect("Failed to open history log");
    WordSession::open(Box::new(log), Box::new(SystemClock)).unwrap()
}

fn spell(session: &mut WordSession, word: &str) {
    for c in word.chars() {
        session.append_symbol(&Symbol::label(c.to_string()));
    }
}

#[test]
fn test_back_to_back_submits_are_distinct_on_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("spelled_words.txt");
    let mut session = open_session(&path);

    spell(&mut session, "GO");
    session.submit().unwrap();
    spell(&mut session, "GO");
    session.submit().unwrap();

    let history = session.history().to_vec();
    assert_eq!(history.len(), 2);
    assert_ne!(history[0], history[1]);
    assert!(history[0].timestamp < history[1].timestamp);

    let on_disk = FileWordLog::open(&path).unwrap().load().unwrap();
    assert_eq!(on_disk, history);
}

#[test]
fn test_label_with_newline_cannot_split_a_log_line() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("spelled_words.txt");
    let mut session = open_session(&path);

    session.append_symbol(&Symbol::label("A\nB"));
    spell(&mut session, "OK");
    session.submit().unwrap();

    let in_memory = session.history().to_vec();
    assert_eq!(in_memory[0].text, "OK");

    let raw = std::fs::read_to_string(&path).unwrap();
    assert_eq!(raw.lines().count(), 1);

    let reopened = open_session(&path);
    assert_eq!(reopened.history(), in_memory.as_slice());
}
