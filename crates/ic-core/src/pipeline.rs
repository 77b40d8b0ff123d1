//! End-to-end run: range → events → aggregation → report → sheet.

use chrono::TimeZone;
use thiserror::Error;

use crate::aggregate::aggregate;
use crate::event::CalendarEvent;
use crate::range::{DateRange, RangeError, resolve_range};
use crate::report::{Report, build_report};
use crate::sheet::{CellRef, CellValue, SheetLayout, TabularSink, WritePlan, apply_plan};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum Error {
    /// The start/end inputs could not be resolved.
    #[error(transparent)]
    Range(#[from] RangeError),

    /// The event source could not be queried.
    #[error("failed to fetch events")]
    Source(#[source] BoxError),

    /// The sheet could not be read or written.
    #[error("failed to access report sheet")]
    Sheet(#[source] BoxError),
}

/// Something that can list calendar events in a time range.
pub trait EventSource {
    type Event: CalendarEvent;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns events overlapping `[range.start, range.end)`.
    fn events(&self, range: &DateRange) -> Result<Vec<Self::Event>, Self::Error>;
}

/// A sheet that holds the range inputs and receives the report.
pub trait SheetStore: TabularSink {
    /// Reads a single cell.
    fn read_cell(&self, cell: CellRef) -> Result<CellValue, Self::Error>;

    /// Applies a write plan.
    ///
    /// The default applies steps one at a time. Stores that support
    /// transactions should override this to make the write all-or-nothing.
    fn commit_plan(&mut self, plan: &WritePlan) -> Result<(), Self::Error> {
        apply_plan(self, plan)
    }
}

/// Fetches, classifies and aggregates events for `range`.
///
/// A source failure aborts the run; no partial report is produced.
pub fn run_report<S: EventSource>(
    source: &S,
    range: DateRange,
    primary_creators: &[String],
) -> Result<Report, Error> {
    let events = source
        .events(&range)
        .map_err(|e| Error::Source(Box::new(e)))?;
    let aggregation = aggregate(&events);
    let report = build_report(range, &aggregation, primary_creators);
    tracing::info!(
        events = report.total,
        creators = report.matrix.creators.len(),
        "built interview report"
    );
    Ok(report)
}

/// Reads the range inputs from the sheet, builds the report and writes it back.
///
/// Invalid inputs abort before the event source is queried. The sheet is
/// only touched after the whole report has been computed.
pub fn run_sheet<S, E, Tz>(
    sheet: &mut S,
    source: &E,
    layout: &SheetLayout,
    primary_creators: &[String],
    tz: &Tz,
) -> Result<Report, Error>
where
    S: SheetStore,
    E: EventSource,
    Tz: TimeZone,
{
    let start = sheet
        .read_cell(layout.start_cell)
        .map_err(|e| Error::Sheet(Box::new(e)))?;
    let end = sheet
        .read_cell(layout.end_cell)
        .map_err(|e| Error::Sheet(Box::new(e)))?;
    let range = resolve_range(&start, &end, tz)?;

    let report = run_report(source, range, primary_creators)?;
    let plan = layout.plan(&report);
    sheet
        .commit_plan(&plan)
        .map_err(|e| Error::Sheet(Box::new(e)))?;
    Ok(report)
}
