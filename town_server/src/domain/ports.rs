use async_trait::async_trait;

use crate::domain::scores::ScoreEntry;

// Port for retrieving the current time.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u64;
}

// Port for the random draw used by the word generator.
pub trait RandomSource: Send + Sync {
    /// Returns an index in `0..len`. Callers never pass `len == 0`.
    fn index(&self, len: usize) -> usize;
}

// Port for the remote top-N leaderboard. Areas depend on this trait, not the HTTP client.
#[async_trait]
pub trait ScoreBoard: Send + Sync {
    async fn top_scores(&self) -> Result<Vec<ScoreEntry>, Box<dyn std::error::Error + Send + Sync>>;
    async fn add_score(
        &self,
        entry: ScoreEntry,
    ) -> Result<Vec<ScoreEntry>, Box<dyn std::error::Error + Send + Sync>>;
}
