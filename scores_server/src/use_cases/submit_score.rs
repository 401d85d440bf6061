use tracing::debug;

use crate::domain::errors::ScoresError;
use crate::domain::leaderboard::{ScoreEntry, insert_ranked};
use crate::domain::ports::ScoreStore;

const MAX_INITIALS_LEN: usize = 16;

// Adds a score to the leaderboard and returns the resulting list.
pub struct SubmitScoreUseCase<S> {
    pub store: S,
}

impl<S> SubmitScoreUseCase<S>
where
    S: ScoreStore,
{
    pub async fn execute(&self, initials: &str, score: u32) -> Result<Vec<ScoreEntry>, ScoresError> {
        let initials = validate_initials(initials)?;

        let current = self.store.load().await?;
        let (entries, inserted) = insert_ranked(current, ScoreEntry::new(initials.clone(), score));
        if inserted {
            self.store.save(&entries).await?;
        } else {
            debug!(%initials, score, "score did not rank");
        }

        Ok(entries)
    }
}

fn validate_initials(value: &str) -> Result<String, ScoresError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_INITIALS_LEN {
        return Err(ScoresError::InvalidInitials);
    }
    Ok(trimmed.to_string())
}
