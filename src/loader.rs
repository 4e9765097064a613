//! CSV loader
//!
//! Reads the three source datasets, infers a SQL type per column from the
//! source text and materializes each one as a fresh table.

use crate::config::DataPaths;
use crate::db::Database;
use crate::error::{malformed_row, AppError, AppResult};
use crate::models::{ColumnDef, ColumnType, Dataset, RawTable};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use rusqlite::types::Value;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Source date formats, tried in order
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Cell texts treated as missing values
const NULL_MARKERS: [&str; 4] = ["", "NA", "NaN", "nan"];

/// Summary of one materialized table
#[derive(Debug, Clone, Serialize)]
pub struct LoadedTable {
    pub dataset: Dataset,
    pub source: PathBuf,
    pub columns: Vec<ColumnDef>,
    pub rows: usize,
}

/// Result of the load stage
#[derive(Debug, Clone, Serialize)]
pub struct LoadedTables {
    pub tables: Vec<LoadedTable>,
}

impl LoadedTables {
    #[cfg(test)]
    pub fn get(&self, dataset: Dataset) -> Option<&LoadedTable> {
        self.tables.iter().find(|t| t.dataset == dataset)
    }
}

/// Load all three datasets into the database, replacing existing tables
pub fn load(db: &mut Database, paths: &DataPaths) -> AppResult<LoadedTables> {
    let mut tables = Vec::with_capacity(Dataset::ALL.len());
    for dataset in Dataset::ALL {
        let path = paths.path(dataset);
        let raw = CsvSource::read(path, dataset)?;
        let rows = db.replace_table(&raw)?;

        let stored = db.row_count(dataset.table_name())?;
        if rows != raw.row_count() || usize::try_from(stored).ok() != Some(rows) {
            return Err(AppError::RowCountMismatch {
                table: dataset.table_name().to_string(),
                expected: raw.row_count(),
                actual: stored,
            });
        }
        info!(table = dataset.table_name(), rows, "Loaded {}", path.display());

        tables.push(LoadedTable {
            dataset,
            source: path.to_path_buf(),
            columns: raw.columns,
            rows,
        });
    }

    Ok(LoadedTables { tables })
}

/// CSV reader for a single dataset
pub struct CsvSource;

impl CsvSource {
    /// Parse a CSV file into a typed table.
    ///
    /// Any unreadable file, missing required column or malformed record
    /// fails the whole read.
    pub fn read(path: &Path, dataset: Dataset) -> AppResult<RawTable> {
        let file = File::open(path).map_err(|source| AppError::InputNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| csv_error(path, e))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        for required in dataset.required_columns() {
            if !headers.iter().any(|h| h == required) {
                return Err(AppError::MissingColumn {
                    path: path.to_path_buf(),
                    column: required.to_string(),
                });
            }
        }

        let mut records = Vec::new();
        for result in reader.records() {
            records.push(result.map_err(|e| csv_error(path, e))?);
        }

        let columns: Vec<ColumnDef> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let column_type = if name == "date" {
                    ColumnType::Text
                } else {
                    infer_column_type(records.iter().filter_map(|r| r.get(i)))
                };
                ColumnDef::new(name.clone(), column_type)
            })
            .collect();
        debug!(table = dataset.table_name(), ?columns, "Inferred schema");

        let rows = records
            .iter()
            .map(|record| convert_record(path, record, &columns))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(RawTable {
            dataset,
            columns,
            rows,
        })
    }
}

fn csv_error(path: &Path, err: csv::Error) -> AppError {
    match err.position() {
        Some(pos) => malformed_row(path, pos.line(), err.to_string()),
        None => AppError::Csv(err),
    }
}

fn is_null(cell: &str) -> bool {
    NULL_MARKERS.contains(&cell.trim())
}

fn parse_bool(cell: &str) -> Option<bool> {
    let cell = cell.trim();
    if cell.eq_ignore_ascii_case("true") {
        Some(true)
    } else if cell.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Parse a source date in any accepted format
pub fn parse_date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(cell, format).ok())
}

/// Narrowest type that fits every non-missing cell
fn infer_column_type<'a>(cells: impl Iterator<Item = &'a str>) -> ColumnType {
    let mut integer = true;
    let mut real = true;
    let mut boolean = true;
    let mut seen = false;

    for cell in cells.filter(|c| !is_null(c)) {
        seen = true;
        let trimmed = cell.trim();
        integer &= trimmed.parse::<i64>().is_ok();
        real &= trimmed.parse::<f64>().is_ok();
        boolean &= parse_bool(trimmed).is_some();
        if !integer && !real && !boolean {
            return ColumnType::Text;
        }
    }

    match (seen, integer, real, boolean) {
        (false, ..) => ColumnType::Text,
        (true, true, _, _) => ColumnType::Integer,
        (true, _, true, _) => ColumnType::Real,
        (true, _, _, true) => ColumnType::Boolean,
        _ => ColumnType::Text,
    }
}

fn convert_record(
    path: &Path,
    record: &StringRecord,
    columns: &[ColumnDef],
) -> AppResult<Vec<Value>> {
    let line = record.position().map(|p| p.line()).unwrap_or(0);

    columns
        .iter()
        .zip(record.iter())
        .map(|(column, cell)| {
            if is_null(cell) {
                return Ok(Value::Null);
            }
            if column.name == "date" {
                let date = parse_date(cell).ok_or_else(|| {
                    malformed_row(path, line, format!("unparseable date '{}'", cell))
                })?;
                return Ok(Value::Text(date.format("%Y-%m-%d").to_string()));
            }
            // Inference already guarantees these parses succeed
            let value = match column.column_type {
                ColumnType::Integer => cell.trim().parse::<i64>().ok().map(Value::Integer),
                ColumnType::Real => cell.trim().parse::<f64>().ok().map(Value::Real),
                ColumnType::Boolean => parse_bool(cell).map(|b| Value::Integer(b as i64)),
                ColumnType::Text => Some(Value::Text(cell.to_string())),
            };
            value.ok_or_else(|| {
                malformed_row(
                    path,
                    line,
                    format!("'{}' is not a valid {:?} for '{}'", cell, column.column_type, column.name),
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const RESULTS: &str = "\
date,home_team,away_team,home_score,away_score,tournament,city,country,neutral
1872-11-30,Scotland,England,0,0,Friendly,Glasgow,Scotland,FALSE
1900-01-01,England,Scotland,2,1,British Home Championship,London,England,FALSE
2000-12-31,Peru,Chile,NA,NA,Copa América,Lima,Peru,TRUE
";

    #[test]
    fn test_read_infers_column_types() {
        let file = csv_file(RESULTS);
        let table = CsvSource::read(file.path(), Dataset::Results).unwrap();

        let types: Vec<(&str, ColumnType)> = table
            .columns
            .iter()
            .map(|c| (c.name.as_str(), c.column_type))
            .collect();
        assert_eq!(
            types,
            vec![
                ("date", ColumnType::Text),
                ("home_team", ColumnType::Text),
                ("away_team", ColumnType::Text),
                ("home_score", ColumnType::Integer),
                ("away_score", ColumnType::Integer),
                ("tournament", ColumnType::Text),
                ("city", ColumnType::Text),
                ("country", ColumnType::Text),
                ("neutral", ColumnType::Boolean),
            ]
        );
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.rows[2][3], Value::Null);
        assert_eq!(table.rows[2][8], Value::Integer(1));
    }

    #[test]
    fn test_infer_real_and_text() {
        assert_eq!(infer_column_type(["44", "90.0", ""].into_iter()), ColumnType::Real);
        assert_eq!(infer_column_type(["44", "abc"].into_iter()), ColumnType::Text);
        assert_eq!(infer_column_type(["NA", ""].into_iter()), ColumnType::Text);
    }

    #[test]
    fn test_dates_are_normalized_to_iso() {
        let file = csv_file("date,home_team,away_team,winner\n1967/08/22,India,Taiwan,Taiwan\n");
        let table = CsvSource::read(file.path(), Dataset::Shootouts).unwrap();
        assert_eq!(table.rows[0][0], Value::Text("1967-08-22".into()));
    }

    #[test]
    fn test_unparseable_date_is_malformed_row() {
        let file = csv_file("date,home_team,away_team,winner\n22.08.1967,India,Taiwan,Taiwan\n");
        let result = CsvSource::read(file.path(), Dataset::Shootouts);
        match result {
            Err(AppError::MalformedRow { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected MalformedRow, got {:?}", other),
        }
    }

    #[test]
    fn test_short_record_is_malformed_row() {
        let file = csv_file("date,home_team,away_team,winner\n1967-08-22,India,Taiwan\n");
        let result = CsvSource::read(file.path(), Dataset::Shootouts);
        assert!(matches!(result, Err(AppError::MalformedRow { .. })));
    }

    #[test]
    fn test_missing_required_column() {
        let file = csv_file("date,home_team,away_team\n1967-08-22,India,Taiwan\n");
        let result = CsvSource::read(file.path(), Dataset::Shootouts);
        match result {
            Err(AppError::MissingColumn { column, .. }) => assert_eq!(column, "winner"),
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_input_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = CsvSource::read(&dir.path().join("nope.csv"), Dataset::Results);
        assert!(matches!(result, Err(AppError::InputNotFound { .. })));
    }

    #[test]
    fn test_empty_cells_load_as_null() {
        let file = csv_file(
            "date,home_team,away_team,winner\n\
             1967-08-22,India,Taiwan,\n\
             ,South Korea,Vietnam Republic,South Korea\n",
        );
        let table = CsvSource::read(file.path(), Dataset::Shootouts).unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0][3], Value::Null);
        assert_eq!(table.rows[1][0], Value::Null);
    }

    #[test]
    fn test_empty_tournament_loads_as_null() {
        let file = csv_file(
            "date,home_team,away_team,home_score,away_score,tournament\n\
             1900-01-01,England,Scotland,2,1,\n",
        );
        let table = CsvSource::read(file.path(), Dataset::Results).unwrap();
        assert_eq!(table.rows[0][5], Value::Null);
    }

    #[test]
    fn test_load_row_counts_match_sources() {
        let results = csv_file(RESULTS);
        let shootouts = csv_file(
            "date,home_team,away_team,winner,first_shooter\n2000-12-31,Peru,Chile,Peru,\n",
        );
        let goalscorers = csv_file(
            "date,home_team,away_team,team,scorer,minute,own_goal,penalty\n\
             1900-01-01,England,Scotland,England,Gilbert Smith,10,FALSE,FALSE\n\
             1900-01-01,England,Scotland,England,Gilbert Smith,55,FALSE,TRUE\n\
             1900-01-01,England,Scotland,Scotland,Bob Hamilton,NA,FALSE,FALSE\n",
        );
        let paths = DataPaths {
            results: results.path().to_path_buf(),
            shootouts: shootouts.path().to_path_buf(),
            goalscorers: goalscorers.path().to_path_buf(),
        };

        let mut db = Database::open_in_memory().unwrap();
        let loaded = load(&mut db, &paths).unwrap();

        assert_eq!(loaded.get(Dataset::Results).unwrap().rows, 3);
        assert_eq!(loaded.get(Dataset::Shootouts).unwrap().rows, 1);
        assert_eq!(loaded.get(Dataset::Goalscorers).unwrap().rows, 3);
        assert_eq!(db.row_count("results_table").unwrap(), 3);
        assert_eq!(db.row_count("shootouts").unwrap(), 1);
        assert_eq!(db.row_count("goalscorers").unwrap(), 3);
    }
}
