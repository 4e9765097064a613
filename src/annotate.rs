//! Match key annotation
//!
//! Adds `match_key` (date ⧺ home_team ⧺ away_team, no separator) to every
//! loaded table. The key is only a join hint: it is checked for collisions
//! and duplicates are reported, never rejected.

use crate::db::queries::SqlBuilder;
use crate::db::Database;
use crate::error::AppResult;
use crate::loader::LoadedTables;
use crate::models::Dataset;
use serde::Serialize;
use tracing::{info, warn};

pub const MATCH_KEY_COLUMN: &str = "match_key";

/// Number of duplicate keys listed per table
const DUPLICATE_SAMPLE: usize = 5;

/// Key statistics for one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyReport {
    pub table: String,
    pub rows: i64,
    pub distinct_keys: i64,
    /// Number of keys shared by more than one row
    pub duplicate_keys: i64,
    /// Most frequent duplicates as (key, occurrences)
    pub sample: Vec<(String, i64)>,
}

impl KeyReport {
    pub fn is_unique(&self) -> bool {
        self.duplicate_keys == 0
    }
}

/// Annotate every table of the load stage
pub fn annotate(db: &Database, loaded: &LoadedTables) -> AppResult<Vec<KeyReport>> {
    loaded
        .tables
        .iter()
        .map(|table| KeyAnnotator::annotate(db, table.dataset))
        .collect()
}

pub struct KeyAnnotator;

impl KeyAnnotator {
    /// Add `match_key` if absent, fill it and report collisions.
    ///
    /// Safe to run more than once on the same table.
    pub fn annotate(db: &Database, dataset: Dataset) -> AppResult<KeyReport> {
        let table = dataset.table_name();

        if !db.has_column(table, MATCH_KEY_COLUMN)? {
            db.add_column(table, MATCH_KEY_COLUMN, "TEXT")?;
        }
        db.connection()
            .execute(&SqlBuilder::set_match_key(table), [])?;

        let report = Self::key_report(db, table)?;
        if report.is_unique() {
            info!(table, rows = report.rows, "match_key is unique");
        } else {
            warn!(
                table,
                duplicates = report.duplicate_keys,
                sample = ?report.sample,
                "match_key is not unique; joins on this table may multiply rows"
            );
        }
        Ok(report)
    }

    /// Collect row, distinct key and duplicate counts for a table
    pub fn key_report(db: &Database, table: &str) -> AppResult<KeyReport> {
        let conn = db.connection();

        let (rows, distinct_keys): (i64, i64) = conn.query_row(
            &SqlBuilder::key_cardinality(table),
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let duplicate_keys: i64 =
            conn.query_row(&SqlBuilder::duplicate_key_count(table), [], |row| row.get(0))?;

        let mut stmt = conn.prepare(&SqlBuilder::duplicate_keys(table, DUPLICATE_SAMPLE))?;
        let sample: Vec<(String, i64)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(KeyReport {
            table: table.to_string(),
            rows,
            distinct_keys,
            duplicate_keys,
            sample,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use pretty_assertions::assert_eq;

    fn seed(db: &Database) {
        db.connection()
            .execute_batch(
                "CREATE TABLE shootouts (date TEXT, home_team TEXT, away_team TEXT, winner TEXT);
                 INSERT INTO shootouts VALUES ('1900-01-01', 'England', 'Scotland', 'England');
                 INSERT INTO shootouts VALUES ('1984-06-27', 'France', 'Spain', 'France');",
            )
            .unwrap();
    }

    #[test]
    fn test_key_is_plain_concatenation() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);

        KeyAnnotator::annotate(&db, Dataset::Shootouts).unwrap();

        let key: String = db
            .connection()
            .query_row(
                "SELECT match_key FROM shootouts WHERE home_team = 'England'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(key, "1900-01-01EnglandScotland");
    }

    #[test]
    fn test_annotate_twice_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);

        let first = KeyAnnotator::annotate(&db, Dataset::Shootouts).unwrap();
        let second = KeyAnnotator::annotate(&db, Dataset::Shootouts).unwrap();

        assert_eq!(first, second);
        let key_columns = db
            .table_columns("shootouts")
            .unwrap()
            .into_iter()
            .filter(|c| c == MATCH_KEY_COLUMN)
            .count();
        assert_eq!(key_columns, 1);
    }

    #[test]
    fn test_blind_add_after_annotation_conflicts() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);
        KeyAnnotator::annotate(&db, Dataset::Shootouts).unwrap();

        let result = db.add_column("shootouts", MATCH_KEY_COLUMN, "TEXT");
        assert!(matches!(result, Err(AppError::SchemaConflict(_))));
    }

    #[test]
    fn test_collisions_are_reported() {
        let db = Database::open_in_memory().unwrap();
        seed(&db);
        db.connection()
            .execute(
                "INSERT INTO shootouts VALUES ('1984-06-27', 'France', 'Spain', 'Spain')",
                [],
            )
            .unwrap();

        let report = KeyAnnotator::annotate(&db, Dataset::Shootouts).unwrap();

        assert!(!report.is_unique());
        assert_eq!(report.rows, 3);
        assert_eq!(report.distinct_keys, 2);
        assert_eq!(report.duplicate_keys, 1);
        assert_eq!(report.sample, vec![("1984-06-27FranceSpain".to_string(), 2)]);
    }

    #[test]
    fn test_annotate_missing_table_fails() {
        let db = Database::open_in_memory().unwrap();
        let result = KeyAnnotator::annotate(&db, Dataset::Goalscorers);
        assert!(result.is_err());
    }
}
