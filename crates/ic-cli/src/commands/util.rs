//! Shared utilities for CLI commands.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use ic_core::{CellValue, Report};
use serde::Serialize;

/// Exclusive lock on the report database, held for the duration of a run.
///
/// The sheet has no concurrent-writer protocol, so two runs must not overlap.
/// The lock is released when the guard is dropped.
#[derive(Debug)]
pub struct RunLock {
    _file: File,
}

impl RunLock {
    pub fn acquire(database_path: &Path) -> Result<Self> {
        let path = lock_path(database_path);
        let file = File::create(&path)
            .with_context(|| format!("failed to create lock file {}", path.display()))?;
        file.lock_exclusive().context("failed to acquire lock")?;
        tracing::debug!(path = %path.display(), "acquired run lock");
        Ok(Self { _file: file })
    }
}

fn lock_path(database_path: &Path) -> PathBuf {
    let mut name = database_path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

/// Interprets a value typed on the command line as a cell value.
///
/// Blank input clears the cell; whole numbers are stored as numbers.
pub fn parse_cell_value(raw: &str) -> CellValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        CellValue::Empty
    } else if let Ok(n) = trimmed.parse::<i64>() {
        CellValue::Int(n)
    } else {
        CellValue::Text(raw.to_string())
    }
}

/// JSON report output.
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    timezone: String,
    #[serde(flatten)]
    report: &'a Report,
}

/// Prints a report as text or pretty JSON.
pub fn print_report(report: &Report, json: bool) -> Result<()> {
    if json {
        let output = JsonReport {
            timezone: iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string()),
            report,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", report.to_text());
    }
    Ok(())
}
