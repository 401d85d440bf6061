use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::errors::StoreError;
use crate::domain::leaderboard::ScoreEntry;
use crate::domain::ports::ScoreStore;

#[derive(Clone, Copy, Default)]
pub(crate) struct FailureFlags {
    pub missing: bool,
    pub malformed: bool,
    pub save: bool,
}

#[derive(Clone)]
pub(crate) struct RecordingStore {
    entries: Arc<Mutex<Vec<ScoreEntry>>>,
    saves: Arc<Mutex<Vec<Vec<ScoreEntry>>>>,
    failures: FailureFlags,
}

impl RecordingStore {
    pub(crate) fn new() -> Self {
        Self::with_entries(Vec::new())
    }

    pub(crate) fn with_entries(entries: Vec<ScoreEntry>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(entries)),
            saves: Arc::new(Mutex::new(Vec::new())),
            failures: FailureFlags::default(),
        }
    }

    pub(crate) fn with_failures(mut self, failures: FailureFlags) -> Self {
        self.failures = failures;
        self
    }

    pub(crate) fn saved(&self) -> Vec<Vec<ScoreEntry>> {
        self.saves.lock().expect("saves mutex poisoned").clone()
    }
}

#[async_trait]
impl ScoreStore for RecordingStore {
    async fn load(&self) -> Result<Vec<ScoreEntry>, StoreError> {
        if self.failures.missing {
            return Err(StoreError::Missing);
        }
        if self.failures.malformed {
            return Err(StoreError::Malformed("not a score list".to_string()));
        }
        Ok(self.entries.lock().expect("entries mutex poisoned").clone())
    }

    async fn save(&self, entries: &[ScoreEntry]) -> Result<(), StoreError> {
        if self.failures.save {
            return Err(StoreError::Io("disk full".to_string()));
        }
        *self.entries.lock().expect("entries mutex poisoned") = entries.to_vec();
        self.saves
            .lock()
            .expect("saves mutex poisoned")
            .push(entries.to_vec());
        Ok(())
    }
}
