use serde::{Deserialize, Serialize};

use crate::domain::leaderboard::ScoreEntry;

// Request payload for submitting a score.
#[derive(Debug, Deserialize)]
pub struct SubmitScoreRequest {
    pub initials: String,
    pub score: u32,
}

// One leaderboard row on the wire.
#[derive(Debug, Serialize)]
pub struct ScoreEntryResponse {
    pub initials: String,
    pub score: u32,
}

impl From<ScoreEntry> for ScoreEntryResponse {
    fn from(entry: ScoreEntry) -> Self {
        Self {
            initials: entry.initials,
            score: entry.score,
        }
    }
}

// Simple error envelope for JSON responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}
