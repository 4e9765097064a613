//! Data models
//!
//! - `dataset`: the three source datasets and their raw, typed table form
//! - `report`: typed result rows of the five report queries

pub mod dataset;
pub mod report;

pub use dataset::{ColumnDef, ColumnType, Dataset, RawTable};
pub use report::{
    AverageGoals, CombinedSample, DrawShootoutWin, Reports, ShootoutWins, TournamentTopScorer,
};
