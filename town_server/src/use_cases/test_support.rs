use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{ScoreBoard, ScoreEntry};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

// In-memory leaderboard that records every submission.
pub(crate) struct RecordingScoreBoard {
    scores: Mutex<Vec<ScoreEntry>>,
    submitted: Mutex<Vec<ScoreEntry>>,
    fail: bool,
    fetch_delay: Option<Duration>,
}

impl RecordingScoreBoard {
    pub(crate) fn new() -> Self {
        Self::with_scores(Vec::new())
    }

    pub(crate) fn with_scores(scores: Vec<ScoreEntry>) -> Self {
        Self {
            scores: Mutex::new(scores),
            submitted: Mutex::new(Vec::new()),
            fail: false,
            fetch_delay: None,
        }
    }

    pub(crate) fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    // Holds `top_scores` back so later calls can finish first.
    pub(crate) fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }

    pub(crate) fn submitted(&self) -> Vec<ScoreEntry> {
        self.submitted.lock().expect("submitted mutex poisoned").clone()
    }
}

#[async_trait]
impl ScoreBoard for RecordingScoreBoard {
    async fn top_scores(&self) -> Result<Vec<ScoreEntry>, BoxError> {
        if self.fail {
            return Err("top scores unavailable".into());
        }
        // Snapshot before the delay, like a response already in flight.
        let scores = self.scores.lock().expect("scores mutex poisoned").clone();
        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(scores)
    }

    async fn add_score(&self, entry: ScoreEntry) -> Result<Vec<ScoreEntry>, BoxError> {
        self.submitted
            .lock()
            .expect("submitted mutex poisoned")
            .push(entry.clone());
        if self.fail {
            return Err("add score unavailable".into());
        }

        let mut scores = self.scores.lock().expect("scores mutex poisoned");
        scores.push(entry);
        scores.sort_by(|a, b| b.score.cmp(&a.score));
        scores.truncate(10);
        Ok(scores.clone())
    }
}
