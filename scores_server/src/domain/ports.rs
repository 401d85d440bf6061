use async_trait::async_trait;

use crate::domain::errors::StoreError;
use crate::domain::leaderboard::ScoreEntry;

// Port for the persisted leaderboard used by the score use cases.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    async fn load(&self) -> Result<Vec<ScoreEntry>, StoreError>;
    async fn save(&self, entries: &[ScoreEntry]) -> Result<(), StoreError>;
}
