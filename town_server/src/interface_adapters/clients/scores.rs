use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::domain::{ScoreBoard, ScoreEntry};

// Wire shape of a leaderboard row on the scores service.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScoreEntryDto {
    initials: String,
    score: u32,
}

#[derive(Debug, Deserialize)]
struct ScoresErrorResponse {
    message: String,
}

#[derive(Debug)]
pub enum ScoresClientError {
    Transport(reqwest::Error),
    Upstream {
        status: StatusCode,
        message: Option<String>,
    },
    Decode(reqwest::Error),
}

impl fmt::Display for ScoresClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoresClientError::Transport(err) => write!(f, "scores transport error: {err}"),
            ScoresClientError::Upstream { status, message } => {
                if let Some(message) = message {
                    write!(f, "scores upstream error {status}: {message}")
                } else {
                    write!(f, "scores upstream error {status}")
                }
            }
            ScoresClientError::Decode(err) => write!(f, "scores response decode error: {err}"),
        }
    }
}

impl std::error::Error for ScoresClientError {}

// Thin reqwest client for the remote top-scores leaderboard.
#[derive(Clone)]
pub struct ScoresClient {
    http: Client,
    base_url: String,
}

impl ScoresClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    fn url(&self) -> String {
        format!("{}/topScores", self.base_url.trim_end_matches('/'))
    }

    async fn read_scores(res: reqwest::Response) -> Result<Vec<ScoreEntry>, ScoresClientError> {
        let status = res.status();

        // Keep upstream status/message so callers can log what went wrong.
        if !status.is_success() {
            let message = res
                .json::<ScoresErrorResponse>()
                .await
                .ok()
                .map(|payload| payload.message);
            return Err(ScoresClientError::Upstream { status, message });
        }

        let rows = res
            .json::<Vec<ScoreEntryDto>>()
            .await
            .map_err(ScoresClientError::Decode)?;
        Ok(rows
            .into_iter()
            .map(|row| ScoreEntry {
                initials: row.initials,
                score: row.score,
            })
            .collect())
    }
}

#[async_trait]
impl ScoreBoard for ScoresClient {
    async fn top_scores(&self) -> Result<Vec<ScoreEntry>, Box<dyn std::error::Error + Send + Sync>> {
        let res = self
            .http
            .get(self.url())
            .send()
            .await
            .map_err(ScoresClientError::Transport)?;
        Ok(Self::read_scores(res).await?)
    }

    async fn add_score(
        &self,
        entry: ScoreEntry,
    ) -> Result<Vec<ScoreEntry>, Box<dyn std::error::Error + Send + Sync>> {
        let body = ScoreEntryDto {
            initials: entry.initials,
            score: entry.score,
        };
        let res = self
            .http
            .post(self.url())
            .json(&body)
            .send()
            .await
            .map_err(ScoresClientError::Transport)?;
        Ok(Self::read_scores(res).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn when_service_is_unreachable_then_transport_error_surfaces() {
        // Port 9 (discard) is not expected to run an HTTP server locally.
        let client = ScoresClient::new("http://127.0.0.1:9/", Duration::from_millis(300))
            .expect("client should build");

        let error = client.top_scores().await.expect_err("request should fail");

        assert!(error.to_string().starts_with("scores transport error"));
    }
}
