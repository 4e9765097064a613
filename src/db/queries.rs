//! SQL query constants and builders
//!
//! Contains all SQL queries used by the application.

/// Query 1: average goals per game, dates bound as `?1` and `?2` (ISO text)
pub const AVG_GOALS_PER_GAME: &str = r#"
    SELECT
        AVG(home_score + away_score) AS avg_goals_per_game
    FROM results_table
    WHERE date BETWEEN ?1 AND ?2
"#;

/// Query 2: shootout wins per winning team
pub const SHOOTOUT_WINS: &str = r#"
    SELECT
        winner,
        COUNT(*) AS shootout_wins
    FROM shootouts
    GROUP BY winner
    ORDER BY winner ASC
"#;

/// Query 3: matches left-joined to shootouts and goal events, row cap bound as `?1`
pub const COMBINED_SAMPLE: &str = r#"
    SELECT
        r.date AS match_date,
        r.home_team,
        r.away_team,
        r.tournament,
        r.home_score,
        r.away_score,
        s.winner AS shootout_winner,
        g.scorer AS goal_scorer,
        g.own_goal,
        g.penalty
    FROM results_table r
    LEFT JOIN shootouts s ON r.match_key = s.match_key
    LEFT JOIN goalscorers g ON r.match_key = g.match_key
    LIMIT ?1
"#;

/// Query 4: shootout winners after a 1-1 draw
pub const DRAW_SHOOTOUT_WINS: &str = r#"
    SELECT
        s.winner,
        r.date
    FROM results_table r
    JOIN shootouts s ON r.match_key = s.match_key
    WHERE r.home_score = 1 AND r.away_score = 1
    ORDER BY s.winner, r.date
"#;

/// Query 5a: top scorer(s) of every tournament, ties kept.
///
/// Tournaments without any matched goal event come back with a NULL scorer.
pub const TOP_SCORERS: &str = r#"
    WITH scorer_totals AS (
        SELECT
            r.tournament,
            g.scorer,
            COUNT(*) AS goals_scored
        FROM goalscorers g
        JOIN results_table r ON g.match_key = r.match_key
        GROUP BY r.tournament, g.scorer
    ),
    top_scorers AS (
        SELECT
            st.tournament,
            st.scorer,
            st.goals_scored
        FROM scorer_totals st
        WHERE st.goals_scored = (
            SELECT MAX(st2.goals_scored)
            FROM scorer_totals st2
            WHERE st2.tournament = st.tournament
        )
    )
    SELECT
        r.tournament,
        ts.scorer,
        ts.goals_scored
    FROM results_table r
    LEFT JOIN top_scorers ts ON r.tournament = ts.tournament
    GROUP BY r.tournament, ts.scorer, ts.goals_scored
    ORDER BY r.tournament
"#;

/// Query 5b: goal events per tournament
pub const TOTAL_GOALS: &str = r#"
    SELECT
        r.tournament,
        COUNT(*) AS total_goals
    FROM goalscorers g
    JOIN results_table r ON g.match_key = r.match_key
    GROUP BY r.tournament
"#;

/// SQL builder for safe identifier quoting
pub struct SqlBuilder;

impl SqlBuilder {
    /// Quote an identifier (table/column name) safely
    pub fn quote_ident(ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    /// Build DROP TABLE IF EXISTS query
    pub fn drop_table(name: &str) -> String {
        format!("DROP TABLE IF EXISTS {}", Self::quote_ident(name))
    }

    /// Build CREATE TABLE query from (name, declared type) pairs
    pub fn create_table(name: &str, columns: &[(&str, &str)]) -> String {
        let column_defs = columns
            .iter()
            .map(|(column, sql_type)| format!("{} {}", Self::quote_ident(column), sql_type))
            .collect::<Vec<_>>()
            .join(", ");
        format!("CREATE TABLE {} ({})", Self::quote_ident(name), column_defs)
    }

    /// Build INSERT query with one positional parameter per column
    pub fn insert(name: &str, columns: &[&str]) -> String {
        let column_list = columns
            .iter()
            .map(|c| Self::quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=columns.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            Self::quote_ident(name),
            column_list,
            placeholders
        )
    }

    /// Build ALTER TABLE ADD COLUMN query
    pub fn add_column(table: &str, column: &str, sql_type: &str) -> String {
        format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            Self::quote_ident(table),
            Self::quote_ident(column),
            sql_type
        )
    }

    /// Build the UPDATE that fills `match_key` from date, home and away team
    pub fn set_match_key(table: &str) -> String {
        format!(
            "UPDATE {} SET match_key = date || home_team || away_team",
            Self::quote_ident(table)
        )
    }

    /// Build query returning (row count, distinct non-null key count)
    pub fn key_cardinality(table: &str) -> String {
        format!(
            "SELECT COUNT(*), COUNT(DISTINCT match_key) FROM {}",
            Self::quote_ident(table)
        )
    }

    /// Build query listing keys that occur more than once, most frequent first
    pub fn duplicate_keys(table: &str, limit: usize) -> String {
        format!(
            "SELECT match_key, COUNT(*) AS occurrences FROM {} \
             WHERE match_key IS NOT NULL \
             GROUP BY match_key HAVING COUNT(*) > 1 \
             ORDER BY occurrences DESC, match_key ASC LIMIT {}",
            Self::quote_ident(table),
            limit
        )
    }

    /// Build query counting keys that occur more than once
    pub fn duplicate_key_count(table: &str) -> String {
        format!(
            "SELECT COUNT(*) FROM (SELECT match_key FROM {} \
             WHERE match_key IS NOT NULL \
             GROUP BY match_key HAVING COUNT(*) > 1)",
            Self::quote_ident(table)
        )
    }

    /// Build COUNT(*) query
    pub fn count_rows(table: &str) -> String {
        format!("SELECT COUNT(*) FROM {}", Self::quote_ident(table))
    }

    /// Build PRAGMA table_info query
    pub fn table_info(table: &str) -> String {
        format!("PRAGMA table_info({})", Self::quote_ident(table))
    }
}
