//! Report query execution

use super::top_scorers::{self, TopScorerRow};
use crate::db::queries;
use crate::db::Database;
use crate::error::AppResult;
use crate::models::{
    AverageGoals, CombinedSample, DrawShootoutWin, ShootoutWins, TournamentTopScorer,
};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use tracing::debug;

const fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid calendar date"),
    }
}

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// 1900-01-01 through 2000-12-31
    pub const TWENTIETH_CENTURY: DateRange = DateRange {
        start: ymd(1900, 1, 1),
        end: ymd(2000, 12, 31),
    };

    #[cfg(test)]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Runs the report queries against an annotated database
pub struct Analyzer<'a> {
    conn: &'a Connection,
}

impl<'a> Analyzer<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self {
            conn: db.connection(),
        }
    }

    /// Mean of home + away score over matches dated within `range`
    pub fn average_goals(&self, range: DateRange) -> AppResult<AverageGoals> {
        debug!(start = %range.start, end = %range.end, "Running average goals query");
        let avg_goals_per_game = self.conn.query_row(
            queries::AVG_GOALS_PER_GAME,
            params![range.start, range.end],
            |row| row.get::<_, Option<f64>>(0),
        )?;
        Ok(AverageGoals { avg_goals_per_game })
    }

    /// Shootout wins grouped by winner, ascending by name
    pub fn shootout_wins(&self) -> AppResult<Vec<ShootoutWins>> {
        debug!("Running shootout wins query");
        let mut stmt = self.conn.prepare(queries::SHOOTOUT_WINS)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ShootoutWins {
                    winner: row.get(0)?,
                    shootout_wins: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// First `limit` rows of matches joined to shootouts and goal events
    pub fn combined_sample(&self, limit: usize) -> AppResult<Vec<CombinedSample>> {
        debug!(limit, "Running combined sample query");
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare(queries::COMBINED_SAMPLE)?;
        let rows = stmt
            .query_map([limit], |row| {
                Ok(CombinedSample {
                    match_date: row.get(0)?,
                    home_team: row.get(1)?,
                    away_team: row.get(2)?,
                    tournament: row.get(3)?,
                    home_score: row.get(4)?,
                    away_score: row.get(5)?,
                    shootout_winner: row.get(6)?,
                    goal_scorer: row.get(7)?,
                    own_goal: row.get(8)?,
                    penalty: row.get(9)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Shootout winners of matches drawn 1-1, by winner then date
    pub fn draw_shootout_wins(&self) -> AppResult<Vec<DrawShootoutWin>> {
        debug!("Running 1-1 draw shootout query");
        let mut stmt = self.conn.prepare(queries::DRAW_SHOOTOUT_WINS)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(DrawShootoutWin {
                    winner: row.get(0)?,
                    date: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Top scorer(s) of every tournament with their share of its goals
    pub fn top_scorers(&self) -> AppResult<Vec<TournamentTopScorer>> {
        debug!("Running top scorers query");
        let mut stmt = self.conn.prepare(queries::TOP_SCORERS)?;
        let top = stmt
            .query_map([], |row| {
                Ok(TopScorerRow {
                    tournament: row.get(0)?,
                    scorer: row.get(1)?,
                    goals_scored: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = self.conn.prepare(queries::TOTAL_GOALS)?;
        let totals = stmt
            .query_map([], |row| {
                Ok((row.get::<_, Option<String>>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(top_scorers::merge(&top, &totals))
    }
}
