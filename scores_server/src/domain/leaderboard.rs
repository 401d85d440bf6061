// Ranked top-score list kept in descending order.

use serde::{Deserialize, Serialize};

/// Number of rows the leaderboard keeps.
pub const MAX_ENTRIES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub initials: String,
    pub score: u32,
}

impl ScoreEntry {
    pub fn new(initials: impl Into<String>, score: u32) -> Self {
        Self {
            initials: initials.into(),
            score,
        }
    }
}

/// Sorts descending (stable for ties) and drops rows past the cap.
pub fn normalize(mut entries: Vec<ScoreEntry>) -> Vec<ScoreEntry> {
    entries.sort_by(|a, b| b.score.cmp(&a.score));
    entries.truncate(MAX_ENTRIES);
    entries
}

/// Inserts `candidate` if it ranks. A full board only accepts a score strictly
/// greater than its last row, which is then evicted. Ties rank after existing rows.
pub fn insert_ranked(entries: Vec<ScoreEntry>, candidate: ScoreEntry) -> (Vec<ScoreEntry>, bool) {
    let mut entries = normalize(entries);

    if entries.len() >= MAX_ENTRIES {
        match entries.last() {
            Some(last) if candidate.score > last.score => {}
            _ => return (entries, false),
        }
    }

    let position = entries
        .iter()
        .position(|row| row.score < candidate.score)
        .unwrap_or(entries.len());
    entries.insert(position, candidate);
    entries.truncate(MAX_ENTRIES);
    (entries, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(scores: &[u32]) -> Vec<ScoreEntry> {
        scores
            .iter()
            .enumerate()
            .map(|(i, score)| ScoreEntry::new(format!("P{i}"), *score))
            .collect()
    }

    fn scores(entries: &[ScoreEntry]) -> Vec<u32> {
        entries.iter().map(|e| e.score).collect()
    }

    #[test]
    fn normalize_sorts_and_caps() {
        let entries = board(&[5, 90, 10, 70, 1, 2, 3, 4, 6, 7, 8, 9]);

        let normalized = normalize(entries);

        assert_eq!(scores(&normalized), vec![90, 70, 10, 9, 8, 7, 6, 5, 4, 3]);
    }

    #[test]
    fn partial_board_accepts_any_score_in_rank_order() {
        let (entries, inserted) = insert_ranked(board(&[300, 100]), ScoreEntry::new("NEW", 200));

        assert!(inserted);
        assert_eq!(scores(&entries), vec![300, 200, 100]);
        assert_eq!(entries[1].initials, "NEW");
    }

    #[test]
    fn full_board_rejects_a_tie_with_the_last_row() {
        let full = board(&[100, 90, 80, 70, 60, 50, 40, 30, 20, 10]);

        let (entries, inserted) = insert_ranked(full.clone(), ScoreEntry::new("TIE", 10));

        assert!(!inserted);
        assert_eq!(entries, full);
    }

    #[test]
    fn full_board_evicts_the_lowest_row() {
        let full = board(&[100, 90, 80, 70, 60, 50, 40, 30, 20, 10]);

        let (entries, inserted) = insert_ranked(full, ScoreEntry::new("ABC", 55));

        assert!(inserted);
        assert_eq!(entries.len(), MAX_ENTRIES);
        assert_eq!(scores(&entries), vec![100, 90, 80, 70, 60, 55, 50, 40, 30, 20]);
    }

    #[test]
    fn ties_rank_after_existing_rows() {
        let (entries, _) = insert_ranked(board(&[50, 50]), ScoreEntry::new("NEW", 50));

        assert_eq!(entries[2].initials, "NEW");
    }
}
