use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tp_cli::commands::{add, delete, done, edit, free, list, reminders, star, suggest, today};
use tp_cli::{Cli, Commands, Config};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config: &Config) -> Result<tp_db::Database> {
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    tp_db::Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))
}

fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = load_config(cli.config.as_deref())?;
    let now = Local::now();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::Add(args) => {
            let mut db = open_database(&config)?;
            add::run(&mut out, &mut db, args, now.with_timezone(&Utc))?;
        }
        Commands::List(args) => {
            let db = open_database(&config)?;
            list::run(&mut out, &db, args, &now)?;
        }
        Commands::Edit(args) => {
            let mut db = open_database(&config)?;
            edit::run(&mut out, &mut db, args, &now)?;
        }
        Commands::Done(args) => {
            let mut db = open_database(&config)?;
            done::run(&mut out, &mut db, args, now.with_timezone(&Utc))?;
        }
        Commands::Star(args) => {
            let mut db = open_database(&config)?;
            star::run(&mut out, &mut db, args, &now)?;
        }
        Commands::Delete(args) => {
            let mut db = open_database(&config)?;
            delete::run(&mut out, &mut db, args)?;
        }
        Commands::Today => {
            let db = open_database(&config)?;
            today::run(&mut out, &db, &now)?;
        }
        Commands::Suggest(args) => {
            let db = open_database(&config)?;
            suggest::run(&mut out, &db, args, &config, &now)?;
        }
        Commands::Free(args) => {
            free::run(&mut out, args, &config, &now)?;
        }
        Commands::Reminders(args) => {
            let db = open_database(&config)?;
            reminders::run(&mut out, &db, args, &now)?;
        }
    }

    out.flush()?;
    Ok(())
}
