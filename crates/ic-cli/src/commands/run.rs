//! Run command: rebuild the report from the sheet's range inputs.
//!
//! This is the explicit re-run entry point. The edit trigger in
//! [`super::edit`] calls into [`generate`] as well.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;

use ic_core::{Report, SheetLayout, SheetStore, resolve_range, run_report, run_sheet};
use ic_db::Database;

use super::util::{RunLock, parse_cell_value, print_report};
use crate::Config;

#[derive(Debug, Args)]
pub struct RunArgs {
    /// First day of the range; overwrites the start cell.
    #[arg(long)]
    pub start: Option<String>,

    /// Last day of the range (inclusive); overwrites the end cell.
    #[arg(long)]
    pub end: Option<String>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,

    /// Print the report without writing anything to the sheet.
    #[arg(long)]
    pub dry_run: bool,
}

/// Runs the report command.
pub fn run(db: &Database, config: &Config, args: &RunArgs) -> Result<Report> {
    let report = if args.dry_run {
        preview(db, config, args)?
    } else {
        let _lock = RunLock::acquire(&config.database_path)?;
        let layout = SheetLayout::default();
        if let Some(start) = &args.start {
            db.set_cell(&config.sheet, layout.start_cell, &parse_cell_value(start))?;
        }
        if let Some(end) = &args.end {
            db.set_cell(&config.sheet, layout.end_cell, &parse_cell_value(end))?;
        }
        generate(db, config)?
    };

    print_report(&report, args.json)?;
    Ok(report)
}

/// Builds the report from the sheet inputs and writes it to the sheet.
///
/// Callers must hold the [`RunLock`].
pub fn generate(db: &Database, config: &Config) -> Result<Report> {
    let source = db.calendar(config.calendar_id.as_deref());
    let mut sheet = db.sheet(&config.sheet);
    run_sheet(
        &mut sheet,
        &source,
        &SheetLayout::default(),
        &config.primary_creators,
        &Local,
    )
    .context("report run failed")
}

/// Builds the report for `--dry-run`, reading missing inputs from the sheet.
fn preview(db: &Database, config: &Config, args: &RunArgs) -> Result<Report> {
    let layout = SheetLayout::default();
    let sheet = db.sheet(&config.sheet);
    let start = match &args.start {
        Some(raw) => parse_cell_value(raw),
        None => sheet.read_cell(layout.start_cell)?,
    };
    let end = match &args.end {
        Some(raw) => parse_cell_value(raw),
        None => sheet.read_cell(layout.end_cell)?,
    };

    let range = resolve_range(&start, &end, &Local).context("invalid date range")?;
    let source = db.calendar(config.calendar_id.as_deref());
    run_report(&source, range, &config.primary_creators).context("report run failed")
}
