//! CLI subcommand implementations.

pub mod edit;
pub mod import;
pub mod rules;
pub mod run;
pub mod show;
mod util;
