//! Report rows and their tabular rendering

use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlResult, ValueRef};
use serde::{Serialize, Serializer};
use std::fmt;

/// Query 1: average goals per game over the configured date range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageGoals {
    pub avg_goals_per_game: Option<f64>,
}

/// Query 2: shootout wins for one team
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShootoutWins {
    /// `None` groups shootouts recorded without a winner
    pub winner: Option<String>,
    pub shootout_wins: i64,
}

/// Query 3: one row of the combined match / shootout / goal view.
///
/// Scores and goal flags keep whatever storage class the loader inferred
/// for their column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedSample {
    pub match_date: Option<NaiveDate>,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub tournament: Option<String>,
    pub home_score: Cell,
    pub away_score: Cell,
    pub shootout_winner: Option<String>,
    pub goal_scorer: Option<String>,
    pub own_goal: Cell,
    pub penalty: Cell,
}

/// Query 4: a shootout won after a 1-1 draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawShootoutWin {
    pub winner: Option<String>,
    pub date: NaiveDate,
}

/// Query 5: a tournament's top scorer and their share of its goals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TournamentTopScorer {
    pub tournament: Option<String>,
    pub scorer: String,
    pub goals_scored: i64,
    pub total_goals: i64,
    pub percentage_of_tournament_goals: f64,
}

/// All five reports of one run
#[derive(Debug, Clone, Serialize)]
pub struct Reports {
    pub average_goals: AverageGoals,
    pub shootout_wins: Vec<ShootoutWins>,
    pub combined_sample: Vec<CombinedSample>,
    pub draw_shootout_wins: Vec<DrawShootoutWin>,
    pub top_scorers: Vec<TournamentTopScorer>,
}

impl Reports {
    /// Reports in print order, converted to display tables
    pub fn tables(&self) -> Vec<ReportTable> {
        vec![
            ReportTable::new(
                "Average Goals per Game (1900-2000):",
                &["avg_goals_per_game"],
                vec![vec![Cell::from(self.average_goals.avg_goals_per_game)]],
            ),
            ReportTable::new(
                "Shootout Wins by Country:",
                &["winner", "shootout_wins"],
                self.shootout_wins
                    .iter()
                    .map(|r| vec![Cell::from(r.winner.as_deref()), Cell::Int(r.shootout_wins)])
                    .collect(),
            ),
            ReportTable::new(
                "Sample Combined Data with Match Keys:",
                &[
                    "match_date",
                    "home_team",
                    "away_team",
                    "tournament",
                    "home_score",
                    "away_score",
                    "shootout_winner",
                    "goal_scorer",
                    "own_goal",
                    "penalty",
                ],
                self.combined_sample
                    .iter()
                    .map(|r| {
                        vec![
                            r.match_date.map(Cell::from).unwrap_or(Cell::Null),
                            Cell::from(r.home_team.as_deref()),
                            Cell::from(r.away_team.as_deref()),
                            Cell::from(r.tournament.as_deref()),
                            r.home_score.clone(),
                            r.away_score.clone(),
                            Cell::from(r.shootout_winner.as_deref()),
                            Cell::from(r.goal_scorer.as_deref()),
                            r.own_goal.clone(),
                            r.penalty.clone(),
                        ]
                    })
                    .collect(),
            ),
            ReportTable::new(
                "Teams that Won a Penalty Shootout After a 1-1 Draw (with Dates):",
                &["winner", "date"],
                self.draw_shootout_wins
                    .iter()
                    .map(|r| vec![Cell::from(r.winner.as_deref()), Cell::from(r.date)])
                    .collect(),
            ),
            ReportTable::new(
                "Top Scorers with Percentage of Tournament Goals (including all tournaments):",
                &[
                    "tournament",
                    "scorer",
                    "goals_scored",
                    "total_goals",
                    "percentage_of_tournament_goals",
                ],
                self.top_scorers
                    .iter()
                    .map(|r| {
                        vec![
                            Cell::from(r.tournament.as_deref()),
                            Cell::from(r.scorer.as_str()),
                            Cell::Int(r.goals_scored),
                            Cell::Int(r.total_goals),
                            Cell::Float(r.percentage_of_tournament_goals),
                        ]
                    })
                    .collect(),
            ),
        ]
    }
}

/// A single display value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => f.write_str("None"),
            Cell::Int(v) => write!(f, "{}", v),
            Cell::Float(v) => f.write_str(&format_float(*v)),
            Cell::Text(v) => f.write_str(v),
        }
    }
}

impl FromSql for Cell {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(match value {
            ValueRef::Null => Cell::Null,
            ValueRef::Integer(v) => Cell::Int(v),
            ValueRef::Real(v) => Cell::Float(v),
            ValueRef::Text(v) | ValueRef::Blob(v) => {
                Cell::Text(String::from_utf8_lossy(v).into_owned())
            }
        })
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Null => serializer.serialize_none(),
            Cell::Int(v) => serializer.serialize_i64(*v),
            Cell::Float(v) => serializer.serialize_f64(*v),
            Cell::Text(v) => serializer.serialize_str(v),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<NaiveDate> for Cell {
    fn from(value: NaiveDate) -> Self {
        Cell::Text(value.format("%Y-%m-%d").to_string())
    }
}

impl From<Option<&str>> for Cell {
    fn from(value: Option<&str>) -> Self {
        value.map(Cell::from).unwrap_or(Cell::Null)
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map(Cell::Float).unwrap_or(Cell::Null)
    }
}

/// Six decimals with trailing zeros trimmed, keeping one digit after the point
fn format_float(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let text = format!("{:.6}", value);
    let trimmed = text.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{}0", trimmed)
    } else {
        trimmed.to_string()
    }
}

/// A titled result set, printed with a leading row index
#[derive(Debug, Clone)]
pub struct ReportTable {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ReportTable {
    pub fn new(title: &str, columns: &[&str], rows: Vec<Vec<Cell>>) -> Self {
        Self {
            title: title.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }
}

impl fmt::Display for ReportTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;

        if self.rows.is_empty() {
            writeln!(f, "Empty result set")?;
            return writeln!(f, "Columns: [{}]", self.columns.join(", "));
        }

        let rendered: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();

        // Calculate column widths
        let index_width = (self.rows.len() - 1).to_string().len();
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &rendered {
            for (i, value) in row.iter().enumerate() {
                widths[i] = widths[i].max(value.chars().count());
            }
        }

        // Header
        write!(f, "{:width$}", "", width = index_width)?;
        for (i, column) in self.columns.iter().enumerate() {
            write!(f, "  {:>width$}", column, width = widths[i])?;
        }
        writeln!(f)?;

        // Rows
        for (index, row) in rendered.iter().enumerate() {
            write!(f, "{:<width$}", index, width = index_width)?;
            for (i, value) in row.iter().enumerate() {
                write!(f, "  {:>width$}", value, width = widths[i])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
