//! Edit command: set a cell and fire the edit trigger.

use anyhow::{Context, Result};
use clap::Args;

use ic_core::{CellRef, EditTrigger, Report, SheetLayout};
use ic_db::Database;

use super::util::{RunLock, parse_cell_value, print_report};
use crate::Config;

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Cell in A1 notation (e.g., B1).
    pub cell: String,

    /// New value. An empty string clears the cell.
    pub value: String,

    /// Sheet to edit (defaults to the report sheet).
    #[arg(long)]
    pub sheet: Option<String>,

    /// Output as JSON when the edit re-runs the report.
    #[arg(long)]
    pub json: bool,
}

/// Writes the cell, then re-runs the report if the trigger watches it.
///
/// Returns the report when a run happened.
pub fn run(db: &Database, config: &Config, args: &EditArgs) -> Result<Option<Report>> {
    let cell: CellRef = args
        .cell
        .parse()
        .with_context(|| format!("invalid cell {:?}", args.cell))?;
    let sheet = args.sheet.as_deref().unwrap_or(&config.sheet);

    let _lock = RunLock::acquire(&config.database_path)?;
    db.set_cell(sheet, cell, &parse_cell_value(&args.value))?;

    let trigger = EditTrigger::new(config.sheet.as_str(), &SheetLayout::default());
    if !trigger.should_run(sheet, cell) {
        tracing::debug!(sheet, %cell, "edit outside the range inputs, not re-running");
        return Ok(None);
    }

    tracing::info!(sheet = trigger.sheet(), %cell, "range input changed, re-running report");
    let report = super::run::generate(db, config)?;
    print_report(&report, args.json)?;
    Ok(Some(report))
}
