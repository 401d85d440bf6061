// Display-layer leaderboards built from an area's histories.

use std::collections::BTreeMap;

use crate::protocol::{GameResultDto, ScoreEntryDto};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    pub label: String,
    pub score: u32,
}

/// Session history with duplicate labels collapsed to their best score, best first.
pub fn session_leaderboard(history: &[GameResultDto]) -> Vec<LeaderboardRow> {
    let mut best: BTreeMap<&str, u32> = BTreeMap::new();
    for (label, score) in history.iter().flat_map(|row| row.scores.iter()) {
        let entry = best.entry(label.as_str()).or_insert(*score);
        *entry = (*entry).max(*score);
    }

    let mut rows: Vec<LeaderboardRow> = best
        .into_iter()
        .map(|(label, score)| LeaderboardRow {
            label: label.to_string(),
            score,
        })
        .collect();
    // Stable sort keeps labels alphabetical within equal scores.
    rows.sort_by(|a, b| b.score.cmp(&a.score));
    rows
}

/// Remote top scores, shown exactly as stored.
pub fn persistent_leaderboard(entries: &[ScoreEntryDto]) -> Vec<LeaderboardRow> {
    entries
        .iter()
        .map(|entry| LeaderboardRow {
            label: entry.initials.clone(),
            score: entry.score,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(game_id: &str, rows: &[(&str, u32)]) -> GameResultDto {
        GameResultDto {
            game_id: game_id.into(),
            scores: rows.iter().map(|(l, s)| (l.to_string(), *s)).collect(),
        }
    }

    fn row(label: &str, score: u32) -> LeaderboardRow {
        LeaderboardRow {
            label: label.into(),
            score,
        }
    }

    #[test]
    fn duplicates_collapse_to_their_max() {
        let history = vec![
            result("g1", &[("ABC", 300)]),
            result("g2", &[("XYZ", 200)]),
            result("g3", &[("ABC", 500)]),
            result("g4", &[("ABC", 100)]),
        ];

        assert_eq!(
            session_leaderboard(&history),
            vec![row("ABC", 500), row("XYZ", 200)]
        );
    }

    #[test]
    fn persistent_rows_keep_duplicates_and_order() {
        let entries = vec![
            ScoreEntryDto {
                initials: "ABC".into(),
                score: 500,
            },
            ScoreEntryDto {
                initials: "ABC".into(),
                score: 300,
            },
        ];

        assert_eq!(
            persistent_leaderboard(&entries),
            vec![row("ABC", 500), row("ABC", 300)]
        );
    }
}
