//! Event-log loading for mailstats.
//!
//! Reads the header-less, comma-delimited log with the fixed column order
//! `time, message_id, sender, recipients, topic, mode` into [`Event`]s.

use std::io::Read;
use std::path::Path;

use mailstats_core::error::{MailStatsError, Result};
use mailstats_core::models::{millis_to_utc, Event};
use tracing::debug;

/// Number of columns every row must carry.
pub const EXPECTED_FIELDS: usize = 6;

// ── Public API ────────────────────────────────────────────────────────────────

/// Load every event from the file at `path`.
///
/// Fails with [`MailStatsError::FileRead`] when the file cannot be opened and
/// with [`MailStatsError::Format`] on the first structurally invalid row.
pub fn load_events(path: &Path) -> Result<Vec<Event>> {
    let file = std::fs::File::open(path).map_err(|source| MailStatsError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let events = parse_events(std::io::BufReader::new(file))?;

    debug!("Loaded {} events from {}", events.len(), path.display());
    Ok(events)
}

/// Parse events from any reader holding the event-log format.
pub fn parse_events<R: Read>(reader: R) -> Result<Vec<Event>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut events = Vec::new();
    let mut record = csv::StringRecord::new();

    loop {
        let more = rdr.read_record(&mut record).map_err(map_csv_error)?;
        if !more {
            break;
        }
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(events.len() as u64 + 1);
        events.push(record_to_event(&record, line)?);
    }

    Ok(events)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Map one CSV record to an [`Event`], validating field count and time.
fn record_to_event(record: &csv::StringRecord, line: u64) -> Result<Event> {
    if record.len() != EXPECTED_FIELDS {
        return Err(MailStatsError::Format {
            line,
            message: format!(
                "expected {} fields, found {}",
                EXPECTED_FIELDS,
                record.len()
            ),
        });
    }

    let raw_time = &record[0];
    let time_ms: i64 = raw_time.trim().parse().map_err(|_| MailStatsError::Format {
        line,
        message: format!("time \"{}\" is not an integer", raw_time),
    })?;
    if millis_to_utc(time_ms).is_none() {
        return Err(MailStatsError::Format {
            line,
            message: format!("time {} is out of range", time_ms),
        });
    }

    Ok(Event {
        time_ms,
        message_id: record[1].to_string(),
        sender: record[2].to_string(),
        recipients: record[3].to_string(),
        topic: record[4].to_string(),
        mode: record[5].to_string(),
    })
}

/// Surface malformed quoting and encoding problems as format errors; keep
/// everything else (I/O) as a CSV pass-through.
fn map_csv_error(err: csv::Error) -> MailStatsError {
    let is_utf8 = matches!(err.kind(), csv::ErrorKind::Utf8 { .. });
    let line = err.position().map(|p| p.line());
    match line {
        Some(line) if is_utf8 => MailStatsError::Format {
            line,
            message: "row is not valid UTF-8".to_string(),
        },
        _ => MailStatsError::Csv(err),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_log(dir: &Path, name: &str, lines: &[&str]) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    // ── parse_events ──────────────────────────────────────────────────────────

    #[test]
    fn test_parse_events_basic() {
        let data = "978307200000,m1,alice,bob|carol,Budget,email\n\
                    978393600000,m2,bob,alice,Re: Budget,email\n";
        let events = parse_events(data.as_bytes()).unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].time_ms, 978_307_200_000);
        assert_eq!(events[0].message_id, "m1");
        assert_eq!(events[0].sender, "alice");
        assert_eq!(events[0].recipients, "bob|carol");
        assert_eq!(events[0].topic, "Budget");
        assert_eq!(events[0].mode, "email");
        assert_eq!(events[1].topic, "Re: Budget");
    }

    #[test]
    fn test_parse_events_keeps_row_order() {
        let data = "3,m3,c,a,t,email\n1,m1,a,b,t,email\n2,m2,b,c,t,email\n";
        let events = parse_events(data.as_bytes()).unwrap();
        let ids: Vec<&str> = events.iter().map(|e| e.message_id.as_str()).collect();
        assert_eq!(ids, vec!["m3", "m1", "m2"]);
    }

    #[test]
    fn test_parse_events_empty_and_nan_recipients_kept_verbatim() {
        let data = "1,m1,alice,,t,email\n2,m2,alice,nan,t,email\n3,m3,alice,  ,t,email\n";
        let events = parse_events(data.as_bytes()).unwrap();
        assert_eq!(events[0].recipients, "");
        assert_eq!(events[1].recipients, "nan");
        assert_eq!(events[2].recipients, "  ");
    }

    #[test]
    fn test_parse_events_quoted_fields() {
        let data = "1,m1,alice,bob,\"Lunch, Friday?\",email\n";
        let events = parse_events(data.as_bytes()).unwrap();
        assert_eq!(events[0].topic, "Lunch, Friday?");
    }

    #[test]
    fn test_parse_events_wrong_field_count() {
        let data = "1,m1,alice,bob,t,email\n2,m2,bob,alice\n";
        let err = parse_events(data.as_bytes()).unwrap_err();
        match err {
            MailStatsError::Format { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("expected 6 fields, found 4"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_events_too_many_fields() {
        let data = "1,m1,alice,bob,t,email,extra\n";
        let err = parse_events(data.as_bytes()).unwrap_err();
        assert!(matches!(err, MailStatsError::Format { line: 1, .. }));
    }

    #[test]
    fn test_parse_events_non_numeric_time() {
        let data = "yesterday,m1,alice,bob,t,email\n";
        let err = parse_events(data.as_bytes()).unwrap_err();
        match err {
            MailStatsError::Format { line, message } => {
                assert_eq!(line, 1);
                assert!(message.contains("yesterday"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_events_out_of_range_time() {
        let data = format!("{},m1,alice,bob,t,email\n", i64::MAX);
        let err = parse_events(data.as_bytes()).unwrap_err();
        assert!(matches!(err, MailStatsError::Format { .. }));
    }

    #[test]
    fn test_parse_events_empty_input() {
        let events = parse_events("".as_bytes()).unwrap();
        assert!(events.is_empty());
    }

    // ── load_events ───────────────────────────────────────────────────────────

    #[test]
    fn test_load_events_from_file() {
        let dir = TempDir::new().unwrap();
        let path = write_log(
            dir.path(),
            "events.csv",
            &["1,m1,alice,bob,t,email", "2,m2,bob,alice|carol,t,email"],
        );

        let events = load_events(&path).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].recipients, "alice|carol");
    }

    #[test]
    fn test_load_events_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.csv");

        let err = load_events(&path).unwrap_err();
        match err {
            MailStatsError::FileRead { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
