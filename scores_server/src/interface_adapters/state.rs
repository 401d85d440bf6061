use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::errors::StoreError;
use crate::domain::leaderboard::ScoreEntry;
use crate::domain::ports::ScoreStore;

// Shared application state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub store_path: Arc<PathBuf>,
    // Serializes read-modify-write cycles on the store file.
    pub write_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(store_path: PathBuf) -> Self {
        Self {
            store_path: Arc::new(store_path),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn store(&self) -> FileScoreStore {
        FileScoreStore {
            path: self.store_path.clone(),
        }
    }
}

/// JSON file holding the leaderboard as an array of `{initials, score}`.
#[derive(Clone)]
pub struct FileScoreStore {
    pub path: Arc<PathBuf>,
}

impl FileScoreStore {
    /// Creates an empty store file (and its directory) when none exists yet.
    pub async fn ensure_exists(&self) -> Result<bool, StoreError> {
        if tokio::fs::try_exists(self.path.as_ref())
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?
        {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Io(e.to_string()))?;
        }
        self.save(&[]).await?;
        Ok(true)
    }
}

#[async_trait]
impl ScoreStore for FileScoreStore {
    async fn load(&self) -> Result<Vec<ScoreEntry>, StoreError> {
        let raw = match tokio::fs::read(self.path.as_ref()).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(StoreError::Missing),
            Err(e) => return Err(StoreError::Io(e.to_string())),
        };
        serde_json::from_slice(&raw).map_err(|e| StoreError::Malformed(e.to_string()))
    }

    async fn save(&self, entries: &[ScoreEntry]) -> Result<(), StoreError> {
        let body =
            serde_json::to_vec_pretty(entries).map_err(|e| StoreError::Io(e.to_string()))?;
        // Write then rename so readers never observe a partial file.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;
        tokio::fs::rename(&tmp, self.path.as_ref())
            .await
            .map_err(|e| StoreError::Io(e.to_string()))
    }
}
