//! Source datasets and their in-memory table form

use rusqlite::types::Value;
use serde::Serialize;
use std::fmt;

/// The three datasets the warehouse is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    Results,
    Shootouts,
    Goalscorers,
}

impl Dataset {
    pub const ALL: [Dataset; 3] = [Dataset::Results, Dataset::Shootouts, Dataset::Goalscorers];

    /// Name of the table the dataset is materialized into
    pub fn table_name(self) -> &'static str {
        match self {
            Dataset::Results => "results_table",
            Dataset::Shootouts => "shootouts",
            Dataset::Goalscorers => "goalscorers",
        }
    }

    /// Columns the report queries depend on
    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            Dataset::Results => &[
                "date",
                "home_team",
                "away_team",
                "home_score",
                "away_score",
                "tournament",
            ],
            Dataset::Shootouts => &["date", "home_team", "away_team", "winner"],
            Dataset::Goalscorers => &[
                "date",
                "home_team",
                "away_team",
                "scorer",
                "own_goal",
                "penalty",
            ],
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Column type inferred from source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    Integer,
    Real,
    /// Stored as INTEGER 0/1
    Boolean,
    Text,
}

impl ColumnType {
    /// SQLite declared type
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnType::Integer | ColumnType::Boolean => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }
}

/// Column definition of a loaded table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// A parsed dataset, ready to be written as a table
#[derive(Debug, Clone)]
pub struct RawTable {
    pub dataset: Dataset,
    pub columns: Vec<ColumnDef>,
    pub rows: Vec<Vec<Value>>,
}

impl RawTable {
    pub fn name(&self) -> &'static str {
        self.dataset.table_name()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
