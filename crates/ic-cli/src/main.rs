use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ic_cli::commands::{edit, import, rules, run, show};
use ic_cli::{Cli, Commands, Config};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(ic_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = ic_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so report output on stdout stays parseable
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    match &cli.command {
        Some(Commands::Import(args)) => {
            let (mut db, config) = open_database(cli.config.as_deref())?;
            let inserted = import::run(&mut db, args, config.calendar_id.as_deref())?;
            println!("Imported {inserted} events");
        }
        Some(Commands::Edit(args)) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            edit::run(&db, &config, args)?;
        }
        Some(Commands::Run(args)) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            run::run(&db, &config, args)?;
        }
        Some(Commands::Show { sheet }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            show::run(&db, sheet.as_deref().unwrap_or(&config.sheet))?;
        }
        Some(Commands::Rules) => {
            rules::run();
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
