//! Tabular sink abstraction and the fixed report layout.
//!
//! The report is rendered into a grid of cells addressed in A1 notation.
//! [`SheetLayout`] pins every output to fixed coordinates, and
//! [`SheetLayout::plan`] turns a finished [`Report`] into an ordered list
//! of clears and writes. Nothing touches the sink until the plan exists,
//! so a failure while computing the report never leaves regions cleared.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::report::Report;

/// Errors parsing A1-style cell references.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CellRefError {
    /// The reference is not `<letters><digits>`.
    #[error("invalid cell reference: {0}")]
    Invalid(String),

    /// The range is not `<cell>:<cell>` or its corners are out of order.
    #[error("invalid cell range: {0}")]
    InvalidRange(String),
}

/// A single cell position, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

impl CellRef {
    /// Creates a reference; both coordinates are 1-based.
    #[must_use]
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Returns the cell `rows` down and `cols` right of this one.
    #[must_use]
    pub const fn offset(self, rows: u32, cols: u32) -> Self {
        Self {
            row: self.row + rows,
            col: self.col + cols,
        }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_name(self.col), self.row)
    }
}

impl FromStr for CellRef {
    type Err = CellRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CellRefError::Invalid(s.to_string());
        let split = s
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (letters, digits) = s.split_at(split);
        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }

        let mut col: u32 = 0;
        for c in letters.chars() {
            let digit = u32::from(c.to_ascii_uppercase()) - u32::from('A') + 1;
            col = col
                .checked_mul(26)
                .and_then(|v| v.checked_add(digit))
                .ok_or_else(invalid)?;
        }
        let row: u32 = digits.parse().map_err(|_| invalid())?;
        if row == 0 {
            return Err(invalid());
        }
        Ok(Self { row, col })
    }
}

/// Converts a 1-based column index to letters (1 → `A`, 27 → `AA`).
fn column_name(mut col: u32) -> String {
    let mut name = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        name.push(char::from_u32(u32::from('A') + rem).unwrap_or('?'));
        col = (col - 1) / 26;
    }
    name.iter().rev().collect()
}

/// A rectangular block of cells, inclusive on both corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub top_left: CellRef,
    pub bottom_right: CellRef,
}

impl Region {
    /// Creates a region from its corners.
    pub fn new(top_left: CellRef, bottom_right: CellRef) -> Result<Self, CellRefError> {
        if bottom_right.row < top_left.row || bottom_right.col < top_left.col {
            return Err(CellRefError::InvalidRange(format!(
                "{top_left}:{bottom_right}"
            )));
        }
        Ok(Self {
            top_left,
            bottom_right,
        })
    }

    /// Returns whether the cell lies inside the region.
    pub const fn contains(&self, cell: CellRef) -> bool {
        cell.row >= self.top_left.row
            && cell.row <= self.bottom_right.row
            && cell.col >= self.top_left.col
            && cell.col <= self.bottom_right.col
    }

    /// Number of rows spanned.
    pub const fn rows(&self) -> u32 {
        self.bottom_right.row - self.top_left.row + 1
    }

    /// Number of columns spanned.
    pub const fn cols(&self) -> u32 {
        self.bottom_right.col - self.top_left.col + 1
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.top_left, self.bottom_right)
    }
}

impl FromStr for Region {
    type Err = CellRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (a, b) = s
            .split_once(':')
            .ok_or_else(|| CellRefError::InvalidRange(s.to_string()))?;
        Self::new(a.parse()?, b.parse()?)
    }
}

/// A cell's content.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Int(i64),
    Text(String),
}

impl CellValue {
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<usize> for CellValue {
    fn from(n: usize) -> Self {
        Self::Int(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

/// A grid the report can be written into.
pub trait TabularSink {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Empties every cell in `region`.
    fn clear_region(&mut self, region: Region) -> Result<(), Self::Error>;

    /// Writes a block of rows starting at `top_left`.
    fn write_cells(&mut self, top_left: CellRef, rows: &[Vec<CellValue>])
    -> Result<(), Self::Error>;
}

/// One step of a [`WritePlan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetWrite {
    Clear(Region),
    Write {
        top_left: CellRef,
        rows: Vec<Vec<CellValue>>,
    },
}

/// Ordered clears and writes that materialize a report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WritePlan {
    pub steps: Vec<SheetWrite>,
}

/// Fixed coordinates of the inputs and outputs on the report sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    /// Cell holding the first day of the range.
    pub start_cell: CellRef,
    /// Cell holding the last day of the range (inclusive).
    pub end_cell: CellRef,
    /// Where the label/count summary starts.
    pub summary_origin: CellRef,
    /// Cleared before the summary is written.
    pub summary_clear: Region,
    /// Where the sorted `(title, label)` list starts.
    pub events_origin: CellRef,
    /// Cleared before the event list is written.
    pub events_clear: Region,
    /// Corner cell of the creator matrix; creators run right of it.
    pub matrix_origin: CellRef,
    /// Cleared before the matrix is written.
    pub matrix_clear: Region,
}

impl SheetLayout {
    /// Corner label written above the matrix label column.
    pub const MATRIX_CORNER: &'static str = "Category";

    /// Lays the report out as clears followed by writes, region by region.
    pub fn plan(&self, report: &Report) -> WritePlan {
        let mut steps = Vec::with_capacity(6);

        steps.push(SheetWrite::Clear(self.summary_clear));
        steps.push(SheetWrite::Write {
            top_left: self.summary_origin,
            rows: report
                .summary
                .iter()
                .map(|row| vec![row.label.as_str().into(), row.count.into()])
                .collect(),
        });

        steps.push(SheetWrite::Clear(self.events_clear));
        if !report.events.is_empty() {
            steps.push(SheetWrite::Write {
                top_left: self.events_origin,
                rows: report
                    .events
                    .iter()
                    .map(|e| vec![e.title.as_str().into(), e.label.as_str().into()])
                    .collect(),
            });
        }

        steps.push(SheetWrite::Clear(self.matrix_clear));
        steps.push(SheetWrite::Write {
            top_left: self.matrix_origin,
            rows: matrix_rows(report),
        });

        WritePlan { steps }
    }
}

impl Default for SheetLayout {
    fn default() -> Self {
        let matrix_origin = CellRef::new(6, 4);
        let matrix_rows = u32::try_from(crate::CategoryLabel::ALL.len()).unwrap_or(u32::MAX);
        Self {
            start_cell: CellRef::new(1, 2),
            end_cell: CellRef::new(2, 2),
            summary_origin: CellRef::new(7, 1),
            summary_clear: Region {
                top_left: CellRef::new(7, 1),
                bottom_right: CellRef::new(18, 2),
            },
            events_origin: CellRef::new(21, 1),
            events_clear: Region {
                top_left: CellRef::new(21, 1),
                bottom_right: CellRef::new(999, 2),
            },
            matrix_origin,
            // Open-ended to the right: the creator count varies between runs
            matrix_clear: Region {
                top_left: matrix_origin,
                bottom_right: CellRef::new(matrix_origin.row + matrix_rows, u32::MAX),
            },
        }
    }
}

fn matrix_rows(report: &Report) -> Vec<Vec<CellValue>> {
    let matrix = &report.matrix;
    let mut rows = Vec::with_capacity(matrix.rows.len() + 1);

    let mut header = Vec::with_capacity(matrix.creators.len() + 1);
    header.push(SheetLayout::MATRIX_CORNER.into());
    header.extend(matrix.creators.iter().map(|c| c.as_str().into()));
    rows.push(header);

    for row in &matrix.rows {
        let mut cells = Vec::with_capacity(row.counts.len() + 1);
        cells.push(row.label.as_str().into());
        cells.extend(row.counts.iter().map(|&n| n.into()));
        rows.push(cells);
    }
    rows
}

/// Applies a plan to a sink step by step.
///
/// A failure part way leaves earlier steps applied; sinks that can batch
/// (such as a database transaction) should wrap this call.
pub fn apply_plan<S: TabularSink + ?Sized>(sink: &mut S, plan: &WritePlan) -> Result<(), S::Error> {
    for step in &plan.steps {
        match step {
            SheetWrite::Clear(region) => sink.clear_region(*region)?,
            SheetWrite::Write { top_left, rows } => sink.write_cells(*top_left, rows)?,
        }
    }
    Ok(())
}
