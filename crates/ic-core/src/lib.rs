//! Core domain logic for interview counts.
//!
//! This crate contains the fundamental types and logic for:
//! - Classification: ordered title rules, first match wins
//! - Aggregation: per-category and per-creator tallies
//! - Reporting: summary, sorted event list, creator matrix, sheet layout

mod aggregate;
pub mod category;
pub mod event;
mod pipeline;
pub mod range;
pub mod report;
pub mod rules;
pub mod sheet;
mod trigger;

pub use aggregate::{Aggregation, ClassifiedEvent, aggregate};
pub use category::{CategoryLabel, UnknownCategory};
pub use event::{CalendarEvent, CalendarEventRecord, UNKNOWN_CREATOR, effective_creators};
pub use pipeline::{Error, EventSource, SheetStore, run_report, run_sheet};
pub use range::{DateRange, RangeError, resolve_range};
pub use report::{CreatorMatrix, Report, build_report, creators_for_header};
pub use rules::classify;
pub use sheet::{CellRef, CellValue, Region, SheetLayout, TabularSink, WritePlan};
pub use trigger::EditTrigger;
