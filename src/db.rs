//! Database connection management
//!
//! Owns the single SQLite connection used for the whole run and the
//! schema-level operations the pipeline stages need.

pub mod queries;

use crate::config::DatabaseConfig;
use crate::error::{schema_conflict, AppResult};
use crate::models::RawTable;
use queries::SqlBuilder;
use rusqlite::{params_from_iter, Connection};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Database handle; the connection is closed when this is dropped
pub struct Database {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Database {
    /// Open (or create) the database file at the configured path
    pub fn open(config: &DatabaseConfig) -> AppResult<Self> {
        let conn = Connection::open(&config.path)?;
        info!("Database opened at {}", config.path.display());
        Ok(Self {
            conn,
            path: Some(config.path.clone()),
        })
    }

    /// Open a private in-memory database
    #[cfg(test)]
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()?;
        debug!("In-memory database opened");
        Ok(Self { conn, path: None })
    }

    /// File path, `None` for in-memory databases
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Underlying connection for read queries
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Drop and recreate the table for `table`, then insert all of its rows.
    ///
    /// Runs in one transaction; returns the number of inserted rows.
    pub fn replace_table(&mut self, table: &RawTable) -> AppResult<usize> {
        let name = table.name();
        let columns: Vec<(&str, &str)> = table
            .columns
            .iter()
            .map(|c| (c.name.as_str(), c.column_type.sql_type()))
            .collect();
        let column_names: Vec<&str> = columns.iter().map(|(n, _)| *n).collect();

        let tx = self.conn.transaction()?;
        tx.execute(&SqlBuilder::drop_table(name), [])?;
        tx.execute(&SqlBuilder::create_table(name, &columns), [])?;

        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(&SqlBuilder::insert(name, &column_names))?;
            for row in &table.rows {
                inserted += stmt.execute(params_from_iter(row.iter()))?;
            }
        }
        tx.commit()?;

        debug!("Replaced table {} ({} rows)", name, inserted);
        Ok(inserted)
    }

    /// Column names of a table in declaration order
    pub fn table_columns(&self, table: &str) -> AppResult<Vec<String>> {
        let mut stmt = self.conn.prepare(&SqlBuilder::table_info(table))?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>("name"))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    /// Check whether a table has a column of the given name
    pub fn has_column(&self, table: &str, column: &str) -> AppResult<bool> {
        Ok(self.table_columns(table)?.iter().any(|c| c == column))
    }

    /// Add a column, failing with `SchemaConflict` if it already exists
    pub fn add_column(&self, table: &str, column: &str, sql_type: &str) -> AppResult<()> {
        match self
            .conn
            .execute(&SqlBuilder::add_column(table, column, sql_type), [])
        {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(_, Some(msg)))
                if msg.contains("duplicate column name") =>
            {
                Err(schema_conflict(format!(
                    "column {} already exists on {}",
                    column, table
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Row count of a table
    pub fn row_count(&self, table: &str) -> AppResult<i64> {
        let count = self
            .conn
            .query_row(&SqlBuilder::count_rows(table), [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{ColumnDef, ColumnType, Dataset};
    use rusqlite::types::Value;

    fn shootout_table() -> RawTable {
        RawTable {
            dataset: Dataset::Shootouts,
            columns: vec![
                ColumnDef::new("date", ColumnType::Text),
                ColumnDef::new("home_team", ColumnType::Text),
                ColumnDef::new("away_team", ColumnType::Text),
                ColumnDef::new("winner", ColumnType::Text),
            ],
            rows: vec![
                vec![
                    Value::Text("1967-08-22".into()),
                    Value::Text("India".into()),
                    Value::Text("Taiwan".into()),
                    Value::Text("Taiwan".into()),
                ],
                vec![
                    Value::Text("1971-11-14".into()),
                    Value::Text("South Korea".into()),
                    Value::Text("Vietnam Republic".into()),
                    Value::Text("South Korea".into()),
                ],
            ],
        }
    }

    #[test]
    fn test_replace_table_inserts_every_row() {
        let mut db = Database::open_in_memory().unwrap();
        let inserted = db.replace_table(&shootout_table()).unwrap();

        assert_eq!(inserted, 2);
        assert_eq!(db.row_count("shootouts").unwrap(), 2);
        assert_eq!(
            db.table_columns("shootouts").unwrap(),
            vec!["date", "home_team", "away_team", "winner"]
        );
    }

    #[test]
    fn test_replace_table_drops_previous_contents() {
        let mut db = Database::open_in_memory().unwrap();
        db.replace_table(&shootout_table()).unwrap();
        db.add_column("shootouts", "match_key", "TEXT").unwrap();

        let mut smaller = shootout_table();
        smaller.rows.truncate(1);
        db.replace_table(&smaller).unwrap();

        assert_eq!(db.row_count("shootouts").unwrap(), 1);
        assert!(!db.has_column("shootouts", "match_key").unwrap());
    }

    #[test]
    fn test_add_existing_column_is_schema_conflict() {
        let mut db = Database::open_in_memory().unwrap();
        db.replace_table(&shootout_table()).unwrap();

        db.add_column("shootouts", "match_key", "TEXT").unwrap();
        let second = db.add_column("shootouts", "match_key", "TEXT");

        assert!(matches!(second, Err(AppError::SchemaConflict(_))));
    }

    #[test]
    fn test_missing_table_is_database_error() {
        let db = Database::open_in_memory().unwrap();
        let result = db.row_count("goalscorers");
        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[test]
    fn test_open_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Database.db");
        let config = DatabaseConfig { path: path.clone() };

        let mut db = Database::open(&config).unwrap();
        assert_eq!(db.path(), Some(path.as_path()));
        db.replace_table(&shootout_table()).unwrap();
        drop(db);

        assert!(path.exists());
        let reopened = Database::open(&config).unwrap();
        assert_eq!(reopened.row_count("shootouts").unwrap(), 2);
    }
}
