//! Recorded detector output, one JSON object per line.

use anyhow::{bail, Context};
use fingerspell_sign::Detection;
use serde::Deserialize;
use std::io::BufRead;

/// A user command interleaved with the frames.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Backspace,
    Space,
    Clear,
    Submit,
    ClearHistory,
    Start,
    Stop,
    SetConfidence(f32),
    SetHoldMs(u64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    Frame(Vec<Detection>),
    Command(Command),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraceLine {
    /// Offset from the start of the recording.
    pub t_ms: u64,
    pub event: TraceEvent,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLine {
    t_ms: u64,
    #[serde(default)]
    detections: Option<Vec<Detection>>,
    #[serde(default)]
    command: Option<Command>,
}

fn parse_line(raw: &str) -> anyhow::Result<TraceLine> {
    let line: RawLine = serde_json::from_str(raw)?;
    let event = match (line.detections, line.command) {
        (Some(detections), None) => TraceEvent::Frame(detections),
        (None, Some(command)) => TraceEvent::Command(command),
        (Some(_), Some(_)) => bail!("line has both detections and a command"),
        (None, None) => bail!("line has neither detections nor a command"),
    };
    Ok(TraceLine {
        t_ms: line.t_ms,
        event,
    })
}

/// Parse a whole trace. Blank lines are skipped; any other bad line is an
/// error naming its line number.
pub fn read_trace(reader: impl BufRead) -> anyhow::Result<Vec<TraceLine>> {
    let mut lines = Vec::new();
    let mut last_ms = 0;

    for (i, raw) in reader.lines().enumerate() {
        let line_no = i + 1;
        let raw = raw.with_context(|| format!("failed to read trace line {line_no}"))?;
        if raw.trim().is_empty() {
            continue;
        }
        let line = parse_line(&raw).with_context(|| format!("invalid trace line {line_no}"))?;
        if line.t_ms < last_ms {
            tracing::warn!(line = line_no, t_ms = line.t_ms, last_ms, "trace time goes backwards");
        }
        last_ms = last_ms.max(line.t_ms);
        lines.push(line);
    }

    Ok(lines)
}
