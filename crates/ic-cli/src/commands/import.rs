//! Import command for loading calendar events into the local `SQLite` store.

use std::io::{self, BufRead};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Deserialize;
use uuid::Uuid;

use ic_core::CalendarEventRecord;
use ic_db::Database;

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Calendar to assign when incoming events omit `calendar_id`.
    #[arg(long)]
    pub calendar: Option<String>,
}

/// Reads JSONL events from stdin and stores them. Returns the number inserted.
pub fn run(db: &mut Database, args: &ImportArgs, default_calendar: Option<&str>) -> Result<usize> {
    let calendar = args.calendar.as_deref().or(default_calendar);
    let stdin = io::stdin();
    let events = parse_events(stdin.lock(), calendar)?;
    let inserted = db.insert_events(&events)?;
    tracing::info!(inserted, read = events.len(), "imported calendar events");
    Ok(inserted)
}

fn parse_events<R: BufRead>(
    reader: R,
    default_calendar: Option<&str>,
) -> Result<Vec<CalendarEventRecord>> {
    let mut events = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", idx + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let parsed: ImportEvent = serde_json::from_str(trimmed)
            .with_context(|| format!("invalid JSON on line {}", idx + 1))?;
        let record = parsed
            .into_record(default_calendar)
            .with_context(|| format!("invalid event on line {}", idx + 1))?;
        events.push(record);
    }
    Ok(events)
}

#[derive(Debug, Deserialize)]
struct ImportEvent {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    calendar_id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    start: String,
    #[serde(default)]
    end: Option<String>,
    #[serde(default)]
    creators: Vec<String>,
}

impl ImportEvent {
    fn into_record(self, default_calendar: Option<&str>) -> Result<CalendarEventRecord> {
        let calendar_id = match self.calendar_id {
            Some(calendar) if !calendar.trim().is_empty() => calendar,
            _ => default_calendar
                .map(str::to_string)
                .filter(|val| !val.trim().is_empty())
                .ok_or_else(|| anyhow::anyhow!("missing calendar_id"))?,
        };
        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let start = parse_instant(&self.start, "start")?;
        let end = match self.end.as_deref() {
            Some(end) => parse_instant(end, "end")?,
            None => start,
        };
        if end < start {
            anyhow::bail!("end {end} is before start {start}");
        }

        Ok(CalendarEventRecord {
            id,
            calendar_id,
            title: self.title,
            start,
            end,
            creators: self.creators,
        })
    }
}

fn parse_instant(s: &str, field: &str) -> Result<DateTime<Utc>> {
    let dt = DateTime::parse_from_rfc3339(s).with_context(|| {
        format!("invalid {field} timestamp, expected ISO 8601 (e.g., 2025-01-29T12:00:00Z)")
    })?;
    Ok(dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn parses_events_and_applies_default_calendar() {
        let input = r#"{"id":"e1","title":"1st Interview","start":"2025-01-29T10:00:00+09:00","end":"2025-01-29T11:00:00+09:00","creators":["a@example.com"]}

{"id":"e2","calendar_id":"other","start":"2025-01-30T01:00:00Z"}
"#;
        let events = parse_events(Cursor::new(input), Some("recruiting")).unwrap();
        assert_eq!(events.len(), 2);

        assert_eq!(events[0].calendar_id, "recruiting");
        assert_eq!(events[0].start.to_rfc3339(), "2025-01-29T01:00:00+00:00");
        assert_eq!(events[0].creators, vec!["a@example.com"]);

        assert_eq!(events[1].calendar_id, "other");
        assert_eq!(events[1].title, None);
        assert_eq!(events[1].end, events[1].start);
        assert!(events[1].creators.is_empty());
    }

    #[test]
    fn generates_ids_when_missing() {
        let input = r#"{"title":"Casual","start":"2025-01-29T01:00:00Z"}"#;
        let events = parse_events(Cursor::new(input), Some("cal")).unwrap();
        assert!(Uuid::parse_str(&events[0].id).is_ok());
    }

    #[test]
    fn missing_calendar_is_an_error() {
        let input = r#"{"id":"e1","start":"2025-01-29T01:00:00Z"}"#;
        let err = parse_events(Cursor::new(input), None).unwrap_err();
        assert!(format!("{err:#}").contains("missing calendar_id"));
    }

    #[test]
    fn reports_line_numbers() {
        let input = "{\"id\":\"e1\",\"start\":\"2025-01-29T01:00:00Z\"}\nnot json\n";
        let err = parse_events(Cursor::new(input), Some("cal")).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn rejects_end_before_start() {
        let input = r#"{"id":"e1","start":"2025-01-29T02:00:00Z","end":"2025-01-29T01:00:00Z"}"#;
        assert!(parse_events(Cursor::new(input), Some("cal")).is_err());
    }
}
