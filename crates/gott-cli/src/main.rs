use std::io::Write;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use gott_db::JsonStore;
use tracing_subscriber::EnvFilter;

use gott_cli::commands::{annotate, cancel, edit, resume, start, status, stop, summary, track};
use gott_cli::{Cli, Commands, Config, ExternalEditor};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let db = JsonStore::new(&config.database_path);
    let mut store = db
        .load_or_default()
        .with_context(|| format!("failed to load {}", config.database_path.display()))?;

    let now = Utc::now();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let changed = match cli.command.unwrap_or(Commands::Status) {
        Commands::Status => {
            status::run(&mut out, &store, now)?;
            false
        }
        Commands::Start { tokens } => {
            start::run(&mut out, &mut store, &tokens, now)?;
            true
        }
        Commands::Stop => stop::run(&mut out, &mut store, now)?,
        Commands::Cancel => cancel::run(&mut out, &mut store)?,
        Commands::Annotate { tokens } => {
            annotate::run(&mut out, &mut store, &tokens, now)?;
            true
        }
        Commands::Continue => {
            resume::run(&mut out, &mut store, now)?;
            true
        }
        Commands::Track {
            date,
            duration,
            tokens,
        } => {
            track::run(&mut out, &mut store, &date, &duration, &tokens, now)?;
            true
        }
        Commands::Summary { filters, json } => {
            summary::run(&mut out, &mut store, &filters, json, now)?;
            false
        }
        Commands::Edit { filters } => {
            let editor = ExternalEditor::resolve(config.editor.as_deref());
            edit::run(&mut out, &mut store, &filters, &editor, now)?
        }
    };
    out.flush()?;

    if changed {
        db.save(&store)
            .with_context(|| format!("failed to save {}", config.database_path.display()))?;
    }

    Ok(())
}
