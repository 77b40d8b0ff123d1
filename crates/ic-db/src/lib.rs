//! Storage layer for interview counts.
//!
//! Provides persistence for imported calendar events and for the report
//! sheet (a sparse cell grid) using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A run owns its `Database` for the whole run; nothing here is shared across threads.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Event start/end times are stored as TEXT in ISO 8601 UTC format with
//! millisecond precision (e.g., `2025-01-15T10:30:00.000Z`), so lexicographic
//! ordering matches chronological ordering and range queries can compare text.
//!
//! ## Creators
//!
//! The `creators` column stores a JSON array of identity strings.
//!
//! ## Cells
//!
//! The `cells` table holds one row per non-empty cell. The `value` column has
//! no declared type so INTEGER and TEXT values keep their storage class.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use ic_core::sheet::apply_plan;
use ic_core::{
    CalendarEventRecord, CellRef, CellValue, DateRange, EventSource, Region, SheetStore,
    TabularSink, WritePlan,
};
use rusqlite::types::Value;
use rusqlite::{Connection, params};
use thiserror::Error;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse an event timestamp.
    #[error("invalid timestamp for event {event_id}: {timestamp}")]
    TimestampParse {
        event_id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// Failed to parse stored event fields.
    #[error("invalid event data for {event_id}: {message}")]
    InvalidEventData { event_id: String, message: String },
    /// A coordinate does not fit the cell table.
    #[error("cell out of range: row {row}, column {col}")]
    CellOutOfRange { row: usize, col: usize },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- Calendar events imported from the calendar provider
            -- start_time/end_time: ISO 8601 UTC (e.g., '2025-01-15T10:30:00.000Z')
            -- creators: JSON array of identity strings
            CREATE TABLE IF NOT EXISTS calendar_events (
                id TEXT PRIMARY KEY,
                calendar_id TEXT NOT NULL,
                title TEXT,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                creators TEXT NOT NULL DEFAULT '[]'
            );

            CREATE INDEX IF NOT EXISTS idx_calendar_events_start
                ON calendar_events(calendar_id, start_time);

            -- Sparse cell grid; absent rows are empty cells
            CREATE TABLE IF NOT EXISTS cells (
                sheet TEXT NOT NULL,
                row INTEGER NOT NULL,
                col INTEGER NOT NULL,
                value NOT NULL,
                PRIMARY KEY (sheet, row, col)
            );
            ",
        )?;
        Ok(())
    }

    // ========== Calendar Events ==========

    /// Inserts a batch of events, ignoring duplicates by ID.
    pub fn insert_events(&mut self, events: &[CalendarEventRecord]) -> Result<usize, DbError> {
        if events.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "
                INSERT OR IGNORE INTO calendar_events
                (id, calendar_id, title, start_time, end_time, creators)
                VALUES (?, ?, ?, ?, ?, ?)
                ",
            )?;
            for event in events {
                let creators = serde_json::to_string(&event.creators).map_err(|e| {
                    DbError::InvalidEventData {
                        event_id: event.id.clone(),
                        message: e.to_string(),
                    }
                })?;
                inserted += stmt.execute(params![
                    event.id,
                    event.calendar_id,
                    event.title,
                    format_timestamp(event.start),
                    format_timestamp(event.end),
                    creators,
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(inserted, total = events.len(), "inserted calendar events");
        Ok(inserted)
    }

    /// Lists events overlapping `[range.start, range.end)`, ordered by start then ID.
    ///
    /// An event overlaps when it starts before the range ends and ends after
    /// the range starts. Zero-length events count when they start inside it.
    /// `calendar_id` of `None` searches every calendar.
    pub fn events_in_range(
        &self,
        calendar_id: Option<&str>,
        range: &DateRange,
    ) -> Result<Vec<CalendarEventRecord>, DbError> {
        if range.end <= range.start {
            return Ok(Vec::new());
        }
        let start = format_timestamp(range.start);
        let end = format_timestamp(range.end);
        let mut stmt = self.conn.prepare(
            "
            SELECT id, calendar_id, title, start_time, end_time, creators
            FROM calendar_events
            WHERE (?1 IS NULL OR calendar_id = ?1)
              AND start_time < ?3
              AND (end_time > ?2 OR start_time >= ?2)
            ORDER BY start_time ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map(params![calendar_id, start, end], read_event_row)?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row?.into_record()?);
        }
        Ok(events)
    }

    /// Lists all events ordered by start then ID.
    pub fn list_events(&self) -> Result<Vec<CalendarEventRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, calendar_id, title, start_time, end_time, creators
            FROM calendar_events
            ORDER BY start_time ASC, id ASC
            ",
        )?;
        let rows = stmt.query_map([], read_event_row)?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row?.into_record()?);
        }
        Ok(events)
    }

    /// Returns an event source over one calendar, or all of them.
    pub fn calendar(&self, calendar_id: Option<&str>) -> Calendar<'_> {
        Calendar {
            db: self,
            calendar_id: calendar_id.map(str::to_string),
        }
    }

    // ========== Cells ==========

    /// Reads a cell; missing cells are empty.
    pub fn get_cell(&self, sheet: &str, cell: CellRef) -> Result<CellValue, DbError> {
        get_cell(&self.conn, sheet, cell)
    }

    /// Writes a single cell. Writing [`CellValue::Empty`] deletes it.
    pub fn set_cell(&self, sheet: &str, cell: CellRef, value: &CellValue) -> Result<(), DbError> {
        set_cell(&self.conn, sheet, cell, value)
    }

    /// Lists the non-empty cells of a sheet in row-major order.
    pub fn list_cells(&self, sheet: &str) -> Result<Vec<(CellRef, CellValue)>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT row, col, value
            FROM cells
            WHERE sheet = ?
            ORDER BY row ASC, col ASC
            ",
        )?;
        let rows = stmt.query_map([sheet], |row| {
            let r: u32 = row.get(0)?;
            let c: u32 = row.get(1)?;
            let value: Value = row.get(2)?;
            Ok((CellRef::new(r, c), cell_value(value)))
        })?;
        let mut cells = Vec::new();
        for row in rows {
            cells.push(row?);
        }
        Ok(cells)
    }

    /// Returns a handle to a named sheet.
    pub fn sheet(&self, name: &str) -> Sheet<'_> {
        Sheet {
            conn: &self.conn,
            name: name.to_string(),
        }
    }
}

/// Event source backed by the `calendar_events` table.
pub struct Calendar<'a> {
    db: &'a Database,
    calendar_id: Option<String>,
}

impl EventSource for Calendar<'_> {
    type Event = CalendarEventRecord;
    type Error = DbError;

    fn events(&self, range: &DateRange) -> Result<Vec<CalendarEventRecord>, DbError> {
        let events = self.db.events_in_range(self.calendar_id.as_deref(), range)?;
        tracing::debug!(
            calendar = self.calendar_id.as_deref().unwrap_or("*"),
            count = events.len(),
            "fetched calendar events"
        );
        Ok(events)
    }
}

/// A named sheet in the `cells` table.
///
/// Writes through [`SheetStore::commit_plan`] run in one transaction, so a
/// failed report write leaves the previous contents in place.
pub struct Sheet<'a> {
    conn: &'a Connection,
    name: String,
}

impl TabularSink for Sheet<'_> {
    type Error = DbError;

    fn clear_region(&mut self, region: Region) -> Result<(), DbError> {
        clear_region(self.conn, &self.name, region)
    }

    fn write_cells(&mut self, top_left: CellRef, rows: &[Vec<CellValue>]) -> Result<(), DbError> {
        write_cells(self.conn, &self.name, top_left, rows)
    }
}

impl SheetStore for Sheet<'_> {
    fn read_cell(&self, cell: CellRef) -> Result<CellValue, DbError> {
        get_cell(self.conn, &self.name, cell)
    }

    fn commit_plan(&mut self, plan: &WritePlan) -> Result<(), DbError> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut staged = Sheet {
                conn: &tx,
                name: self.name.clone(),
            };
            apply_plan(&mut staged, plan)?;
        }
        tx.commit()?;
        tracing::debug!(sheet = %self.name, steps = plan.steps.len(), "committed report");
        Ok(())
    }
}

// ========== Row Helpers ==========

/// Raw `calendar_events` row before timestamp and JSON parsing.
struct EventRow {
    id: String,
    calendar_id: String,
    title: Option<String>,
    start_time: String,
    end_time: String,
    creators: String,
}

impl EventRow {
    fn into_record(self) -> Result<CalendarEventRecord, DbError> {
        let start = parse_timestamp(&self.start_time, &self.id)?;
        let end = parse_timestamp(&self.end_time, &self.id)?;
        let creators: Vec<String> =
            serde_json::from_str(&self.creators).map_err(|e| DbError::InvalidEventData {
                event_id: self.id.clone(),
                message: format!("creators: {e}"),
            })?;
        Ok(CalendarEventRecord {
            id: self.id,
            calendar_id: self.calendar_id,
            title: self.title,
            start,
            end,
            creators,
        })
    }
}

fn read_event_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EventRow> {
    Ok(EventRow {
        id: row.get(0)?,
        calendar_id: row.get(1)?,
        title: row.get(2)?,
        start_time: row.get(3)?,
        end_time: row.get(4)?,
        creators: row.get(5)?,
    })
}

fn cell_value(value: Value) -> CellValue {
    match value {
        Value::Integer(n) => CellValue::Int(n),
        Value::Text(s) => CellValue::Text(s),
        Value::Real(f) => CellValue::Text(f.to_string()),
        Value::Null | Value::Blob(_) => CellValue::Empty,
    }
}

fn get_cell(conn: &Connection, sheet: &str, cell: CellRef) -> Result<CellValue, DbError> {
    let mut stmt = conn.prepare_cached(
        "SELECT value FROM cells WHERE sheet = ? AND row = ? AND col = ?",
    )?;
    let mut rows = stmt.query(params![sheet, cell.row, cell.col])?;
    match rows.next()? {
        Some(row) => Ok(cell_value(row.get(0)?)),
        None => Ok(CellValue::Empty),
    }
}

fn set_cell(conn: &Connection, sheet: &str, cell: CellRef, value: &CellValue) -> Result<(), DbError> {
    match value {
        CellValue::Empty => {
            conn.prepare_cached("DELETE FROM cells WHERE sheet = ? AND row = ? AND col = ?")?
                .execute(params![sheet, cell.row, cell.col])?;
        }
        CellValue::Int(n) => {
            conn.prepare_cached(
                "INSERT OR REPLACE INTO cells (sheet, row, col, value) VALUES (?, ?, ?, ?)",
            )?
            .execute(params![sheet, cell.row, cell.col, n])?;
        }
        CellValue::Text(s) => {
            conn.prepare_cached(
                "INSERT OR REPLACE INTO cells (sheet, row, col, value) VALUES (?, ?, ?, ?)",
            )?
            .execute(params![sheet, cell.row, cell.col, s])?;
        }
    }
    Ok(())
}

fn clear_region(conn: &Connection, sheet: &str, region: Region) -> Result<(), DbError> {
    let removed = conn.execute(
        "
        DELETE FROM cells
        WHERE sheet = ?
          AND row BETWEEN ? AND ?
          AND col BETWEEN ? AND ?
        ",
        params![
            sheet,
            region.top_left.row,
            region.bottom_right.row,
            region.top_left.col,
            region.bottom_right.col,
        ],
    )?;
    tracing::trace!(sheet, %region, removed, "cleared region");
    Ok(())
}

fn write_cells(
    conn: &Connection,
    sheet: &str,
    top_left: CellRef,
    rows: &[Vec<CellValue>],
) -> Result<(), DbError> {
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            let (Ok(dr), Ok(dc)) = (u32::try_from(r), u32::try_from(c)) else {
                return Err(DbError::CellOutOfRange { row: r, col: c });
            };
            set_cell(conn, sheet, top_left.offset(dr, dc), value)?;
        }
    }
    Ok(())
}

fn parse_timestamp(timestamp: &str, event_id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            event_id: event_id.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
