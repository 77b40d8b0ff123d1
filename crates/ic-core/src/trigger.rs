//! Edit trigger: decides whether a cell edit should re-run the report.

use crate::sheet::{CellRef, SheetLayout};

/// Watches the range input cells of one sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTrigger {
    sheet: String,
    watched: [CellRef; 2],
}

impl EditTrigger {
    pub fn new(sheet: impl Into<String>, layout: &SheetLayout) -> Self {
        Self {
            sheet: sheet.into(),
            watched: [layout.start_cell, layout.end_cell],
        }
    }

    /// Returns true only for edits to the start or end cell of the report sheet.
    pub fn should_run(&self, sheet: &str, cell: CellRef) -> bool {
        sheet == self.sheet && self.watched.contains(&cell)
    }

    pub fn sheet(&self) -> &str {
        &self.sheet
    }
}
