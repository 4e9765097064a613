//! Analysis Module
//!
//! The five fixed report queries over the annotated tables:
//! 1. Average goals per game within a date range
//! 2. Shootout wins per team
//! 3. A capped sample of the combined match / shootout / goal view
//! 4. Shootout winners after a 1-1 draw
//! 5. Top scorer(s) per tournament with their share of tournament goals

pub mod analyzer;
pub mod top_scorers;

pub use analyzer::{Analyzer, DateRange};

use crate::db::Database;
use crate::error::AppResult;
use crate::models::Reports;
use tracing::info;

/// Run every report query in print order
pub fn run_queries(db: &Database, sample_size: usize) -> AppResult<Reports> {
    let analyzer = Analyzer::new(db);

    let reports = Reports {
        average_goals: analyzer.average_goals(DateRange::TWENTIETH_CENTURY)?,
        shootout_wins: analyzer.shootout_wins()?,
        combined_sample: analyzer.combined_sample(sample_size)?,
        draw_shootout_wins: analyzer.draw_shootout_wins()?,
        top_scorers: analyzer.top_scorers()?,
    };

    info!(
        shootout_winners = reports.shootout_wins.len(),
        draw_shootouts = reports.draw_shootout_wins.len(),
        tournaments = reports.top_scorers.len(),
        "Reports computed"
    );
    Ok(reports)
}
