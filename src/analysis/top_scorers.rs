//! Merge of per-tournament top scorers with per-tournament goal totals

use crate::models::TournamentTopScorer;
use std::collections::{BTreeMap, BTreeSet};

/// Scorer shown for tournaments without a top scorer
pub const NO_SCORER: &str = "No Scorer";

/// Row of the top scorer query; scorer and count are NULL for tournaments
/// without any matched goal event. A NULL tournament is its own group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopScorerRow {
    pub tournament: Option<String>,
    pub scorer: Option<String>,
    pub goals_scored: Option<i64>,
}

/// Outer-merge top scorers with goal totals on tournament.
///
/// Tournaments present on either side appear in the output. Missing scorers
/// become [`NO_SCORER`], missing counts become 0, and a zero total is
/// replaced by 1 in the percentage so the share reads 0.
pub fn merge(
    top: &[TopScorerRow],
    totals: &[(Option<String>, i64)],
) -> Vec<TournamentTopScorer> {
    let totals: BTreeMap<Option<&str>, i64> =
        totals.iter().map(|(t, n)| (t.as_deref(), *n)).collect();

    let mut by_tournament: BTreeMap<Option<&str>, Vec<&TopScorerRow>> = BTreeMap::new();
    for row in top {
        by_tournament.entry(row.tournament.as_deref()).or_default().push(row);
    }

    let tournaments: BTreeSet<Option<&str>> = by_tournament
        .keys()
        .copied()
        .chain(totals.keys().copied())
        .collect();

    let mut merged = Vec::new();
    for tournament in tournaments {
        let total_goals = totals.get(&tournament).copied().unwrap_or(0);
        match by_tournament.get(&tournament) {
            Some(rows) => {
                for row in rows {
                    let goals_scored = row.goals_scored.unwrap_or(0);
                    merged.push(TournamentTopScorer {
                        tournament: tournament.map(str::to_string),
                        scorer: row.scorer.clone().unwrap_or_else(|| NO_SCORER.to_string()),
                        goals_scored,
                        total_goals,
                        percentage_of_tournament_goals: share(goals_scored, total_goals),
                    });
                }
            }
            None => merged.push(TournamentTopScorer {
                tournament: tournament.map(str::to_string),
                scorer: NO_SCORER.to_string(),
                goals_scored: 0,
                total_goals,
                percentage_of_tournament_goals: 0.0,
            }),
        }
    }

    merged.sort_by(|a, b| {
        a.tournament
            .cmp(&b.tournament)
            .then_with(|| a.scorer.cmp(&b.scorer))
    });
    merged
}

fn share(goals: i64, total: i64) -> f64 {
    let denominator = if total == 0 { 1 } else { total };
    goals as f64 / denominator as f64 * 100.0
}
