//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::edit::EditArgs;
use crate::commands::import::ImportArgs;
use crate::commands::run::RunArgs;

/// Interview pipeline counts from calendar events.
///
/// Classifies calendar event titles into interview categories and writes
/// per-category and per-creator counts to a report sheet.
#[derive(Debug, Parser)]
#[command(name = "ic", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import calendar events as JSONL from stdin.
    Import(ImportArgs),

    /// Set a sheet cell. Editing the start or end cell re-runs the report.
    Edit(EditArgs),

    /// Re-run the report from the sheet's start and end cells.
    Run(RunArgs),

    /// Print the non-empty cells of the report sheet.
    Show {
        /// Sheet to print (defaults to the configured report sheet).
        #[arg(long)]
        sheet: Option<String>,
    },

    /// List the classification rules in evaluation order.
    Rules,
}
