use crate::domain::errors::ScoresError;
use crate::domain::leaderboard::{ScoreEntry, normalize};
use crate::domain::ports::ScoreStore;

// Reads the current leaderboard.
pub struct TopScoresUseCase<S> {
    pub store: S,
}

impl<S> TopScoresUseCase<S>
where
    S: ScoreStore,
{
    pub async fn execute(&self) -> Result<Vec<ScoreEntry>, ScoresError> {
        let entries = self.store.load().await?;
        Ok(normalize(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::StoreError;
    use crate::use_cases::test_support::{FailureFlags, RecordingStore};

    #[tokio::test]
    async fn when_store_has_rows_then_returns_them_ranked() {
        let store = RecordingStore::with_entries(vec![
            ScoreEntry::new("LOW", 10),
            ScoreEntry::new("TOP", 900),
            ScoreEntry::new("MID", 300),
        ]);
        let use_case = TopScoresUseCase { store };

        let result = use_case.execute().await.expect("expected scores");

        let initials: Vec<&str> = result.iter().map(|e| e.initials.as_str()).collect();
        assert_eq!(initials, vec!["TOP", "MID", "LOW"]);
    }

    #[tokio::test]
    async fn when_store_is_missing_then_returns_missing() {
        let use_case = TopScoresUseCase {
            store: RecordingStore::new().with_failures(FailureFlags {
                missing: true,
                ..FailureFlags::default()
            }),
        };

        let result = use_case.execute().await;

        assert!(matches!(
            result,
            Err(ScoresError::Store(StoreError::Missing))
        ));
    }
}
