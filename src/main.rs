//! Matchday Warehouse
//!
//! Loads international football results, penalty shootouts and goal scorer
//! events from CSV into a local SQLite database, then prints five fixed
//! reports.
//!
//! PIPELINE:
//! - Stage 1 (Load): parse each CSV and replace its table
//! - Stage 2 (Annotate): add `match_key` to every table, report collisions
//! - Stage 3 (Analyze): run the report queries and print them

mod analysis;
mod annotate;
mod config;
mod db;
mod error;
mod loader;
mod models;

use crate::config::{OutputFormat, Settings};
use crate::db::Database;
use crate::error::AppResult;
use crate::models::Reports;
use std::io::{self, Write};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber for structured logging
    init_tracing();

    let settings = Settings::load()?;
    info!("Configuration loaded");

    let reports = match run(&settings) {
        Ok(reports) => reports,
        Err(e) => {
            e.log();
            return Err(e.into());
        }
    };

    print_reports(&reports, settings.report.format)?;
    info!("Run complete");
    Ok(())
}

/// Load, annotate and analyze; the connection is closed when `db` drops
fn run(settings: &Settings) -> AppResult<Reports> {
    let mut db = Database::open(&settings.database)?;

    let loaded = loader::load(&mut db, &settings.data)?;
    let key_reports = annotate::annotate(&db, &loaded)?;
    let collisions = key_reports.iter().filter(|r| !r.is_unique()).count();
    info!(
        database = ?db.path(),
        tables = key_reports.len(),
        tables_with_collisions = collisions,
        "Match keys annotated"
    );

    analysis::run_queries(&db, settings.report.sample_size)
}

fn print_reports(reports: &Reports, format: OutputFormat) -> AppResult<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match format {
        OutputFormat::Table => {
            for table in reports.tables() {
                writeln!(out, "{}", table)?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, reports)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Initialize tracing with structured logging on stderr
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_level(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}
