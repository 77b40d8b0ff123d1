//! Show command: print a sheet's non-empty cells.

use std::fmt::Write;

use anyhow::Result;
use ic_core::{CellRef, CellValue};
use ic_db::Database;

/// Prints the sheet as `CELL<TAB>VALUE` lines in row-major order.
pub fn run(db: &Database, sheet: &str) -> Result<()> {
    let cells = db.list_cells(sheet)?;
    print!("{}", format_cells(&cells));
    Ok(())
}

fn format_cells(cells: &[(CellRef, CellValue)]) -> String {
    if cells.is_empty() {
        return "(empty sheet)\n".to_string();
    }
    let mut output = String::new();
    for (cell, value) in cells {
        writeln!(output, "{cell}\t{value}").unwrap();
    }
    output
}
