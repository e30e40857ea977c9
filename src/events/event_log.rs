//! Event log reading and validation.
//!
//! Handles the two formats instrumentation sources commonly write:
//! JSON Lines (one event object per line, streaming-friendly) and a single
//! JSON array. Format is detected from the first non-whitespace byte.

use super::schema::TraceEvent;
use crate::utils::error::ParseError;
use log::debug;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Read an event log from a file
///
/// **Public** - main entry point for the replay command
///
/// # Arguments
/// * `path` - Path to a `.jsonl` or `.json` event log
///
/// # Returns
/// Events in file order
///
/// # Errors
/// * `ParseError::IoError` - file cannot be opened or read
/// * `ParseError::JsonError` - malformed JSON
/// * `ParseError::EmptyLog` - no events in the file
pub fn read_event_log(path: impl AsRef<Path>) -> Result<Vec<TraceEvent>, ParseError> {
    let path = path.as_ref();
    debug!("Reading event log from: {}", path.display());

    let file = File::open(path)?;
    let events = parse_events(BufReader::new(file))?;

    debug!("Read {} events from {}", events.len(), path.display());
    Ok(events)
}

/// Parse events from any reader, detecting JSONL vs JSON array
///
/// **Public** - used directly by tests and in-memory sources
pub fn parse_events(mut reader: impl BufRead) -> Result<Vec<TraceEvent>, ParseError> {
    // Peek at the first non-whitespace byte to detect the format
    let starts_with_array = loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Err(ParseError::EmptyLog);
        }
        match buf.iter().position(|b| !b.is_ascii_whitespace()) {
            Some(pos) => break buf[pos] == b'[',
            None => {
                let len = buf.len();
                reader.consume(len);
            }
        }
    };

    let events = if starts_with_array {
        parse_json_array(reader)?
    } else {
        parse_json_lines(reader)?
    };

    if events.is_empty() {
        return Err(ParseError::EmptyLog);
    }

    Ok(events)
}

/// Parse a single JSON array of events
fn parse_json_array(mut reader: impl Read) -> Result<Vec<TraceEvent>, ParseError> {
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Parse one event object per line, skipping blank lines
fn parse_json_lines(reader: impl BufRead) -> Result<Vec<TraceEvent>, ParseError> {
    let mut events = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let event: TraceEvent = serde_json::from_str(trimmed).map_err(|e| {
            ParseError::InvalidFormat(format!("line {}: {}", line_no + 1, e))
        })?;
        events.push(event);
    }

    Ok(events)
}

/// Validate structural properties of an event log
///
/// **Public** - called before replay
///
/// Checks timestamps are non-negative and finite, and per-thread
/// non-decreasing (the recording clock was monotonic). Balance problems
/// (missing exits, extra exits) are *not* errors here: absorbing those is
/// the tracker's job, and they surface as anomalies in the report.
pub fn validate_events(events: &[TraceEvent]) -> Result<(), ParseError> {
    let mut last_ts: HashMap<u64, f64> = HashMap::new();

    for (index, event) in events.iter().enumerate() {
        let ts = event.ts_ms();

        if !ts.is_finite() || ts < 0.0 {
            return Err(ParseError::InvalidFormat(format!(
                "event {}: invalid timestamp {}",
                index, ts
            )));
        }

        if event.function().is_empty() {
            return Err(ParseError::InvalidFormat(format!(
                "event {}: empty function name",
                index
            )));
        }

        let thread = event.thread();
        if let Some(&prev) = last_ts.get(&thread) {
            if ts < prev {
                return Err(ParseError::InvalidFormat(format!(
                    "event {}: timestamp {} goes backward on thread {} (previous {})",
                    index, ts, thread, prev
                )));
            }
        }
        last_ts.insert(thread, ts);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const JSONL: &str = concat!(
        r#"{"event":"enter","function":"fib","ts_ms":0.0}"#,
        "\n\n",
        r#"{"event":"exit","function":"fib","ts_ms":5.0}"#,
        "\n",
    );

    #[test]
    fn test_parse_json_lines_format() {
        let events = parse_events(Cursor::new(JSONL)).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].function(), "fib");
    }

    #[test]
    fn test_parse_json_array_format() {
        let json = r#"[
            {"event":"enter","function":"fib","ts_ms":0.0},
            {"event":"exit","function":"fib","ts_ms":5.0}
        ]"#;

        let events = parse_events(Cursor::new(json)).unwrap();
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_empty_input_is_error() {
        let result = parse_events(Cursor::new(""));
        assert!(matches!(result, Err(ParseError::EmptyLog)));
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let input = concat!(
            r#"{"event":"enter","function":"fib","ts_ms":0.0}"#,
            "\n",
            "not json\n",
        );

        let err = parse_events(Cursor::new(input)).unwrap_err();
        match err {
            ParseError::InvalidFormat(msg) => assert!(msg.starts_with("line 2")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_accepts_well_formed_log() {
        let events = parse_events(Cursor::new(JSONL)).unwrap();
        assert!(validate_events(&events).is_ok());
    }

    #[test]
    fn test_validate_rejects_negative_timestamp() {
        let events = vec![TraceEvent::Enter {
            function: "fib".to_string(),
            ts_ms: -1.0,
            thread: 0,
        }];
        assert!(validate_events(&events).is_err());
    }

    #[test]
    fn test_validate_rejects_backward_timestamps_per_thread() {
        let events = vec![
            TraceEvent::Enter {
                function: "fib".to_string(),
                ts_ms: 5.0,
                thread: 0,
            },
            TraceEvent::Exit {
                function: "fib".to_string(),
                ts_ms: 3.0,
                thread: 0,
            },
        ];
        assert!(validate_events(&events).is_err());
    }

    #[test]
    fn test_validate_allows_interleaved_threads() {
        let events = vec![
            TraceEvent::Enter {
                function: "a".to_string(),
                ts_ms: 5.0,
                thread: 0,
            },
            TraceEvent::Enter {
                function: "b".to_string(),
                ts_ms: 1.0,
                thread: 1,
            },
        ];
        assert!(validate_events(&events).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_function_name() {
        let events = vec![TraceEvent::Enter {
            function: String::new(),
            ts_ms: 0.0,
            thread: 0,
        }];
        assert!(validate_events(&events).is_err());
    }
}
