use anyhow::{Context, Result};
use clap::Parser;
use rusqlite::Connection;

use emberarc::cli::args::{Cli, Commands};
use emberarc::cli::handlers;
use emberarc::config::AppConfig;
use emberarc::db::migrations::run_migrations;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = AppConfig::load().context("Loading config")?;

    // Ensure data directory exists and open DB
    AppConfig::ensure_data_dir()?;
    let db_path = AppConfig::db_path()?;
    let conn = Connection::open(&db_path)
        .with_context(|| format!("Opening database at {:?}", db_path))?;

    // Enable WAL mode for better concurrent access
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    // Run migrations on every startup
    run_migrations(&conn)?;

    match cli.command {
        Some(Commands::Status) | None => {
            handlers::handle_status(&conn, &config)?;
        }
        Some(Commands::Mark {
            pillar,
            task,
            note,
            undo,
        }) => {
            handlers::handle_mark(
                &conn,
                &config,
                &pillar,
                task.as_deref(),
                note.as_deref(),
                undo,
            )?;
        }
        Some(Commands::Day { number }) => {
            handlers::handle_day(&conn, number)?;
        }
        Some(Commands::Stats { week, json }) => {
            handlers::handle_stats(&conn, week, json)?;
        }
        Some(Commands::Complete) => {
            handlers::handle_complete(&conn, &config)?;
        }
        Some(Commands::New) => {
            handlers::handle_new(&conn)?;
        }
        Some(Commands::Reset { yes }) => {
            handlers::handle_reset(&conn, yes)?;
        }
        Some(Commands::Config { entitled }) => {
            handlers::handle_config(&mut config, entitled)?;
        }
        Some(Commands::Export) => {
            handlers::handle_export(&conn)?;
        }
    }

    Ok(())
}
