//! Progress endpoint client.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

/// Progress endpoint errors.
#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Server returned status {0}")]
    Status(u16),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// One progress report for a job.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ProgressUpdate {
    #[serde(default, alias = "completedCount")]
    pub completed: u64,
    #[serde(default, alias = "totalCount")]
    pub total: u64,
    #[serde(default, alias = "statusLabel")]
    pub status: String,
    #[serde(default, alias = "isDone")]
    pub done: bool,
}

impl ProgressUpdate {
    /// Completion as 0-100. Zero while the total is unknown.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let pct = (self.completed as f64 / self.total as f64 * 100.0).round();
        pct.clamp(0.0, 100.0) as u8
    }
}

/// Anything that can report job progress.
pub trait ProgressSource: Send + Sync + 'static {
    fn fetch(&self, job_id: &str) -> impl Future<Output = Result<ProgressUpdate, ProgressError>> + Send;
}

/// HTTP client for `GET {base_url}/progress/{job_id}`.
#[derive(Debug, Clone)]
pub struct ProgressClient {
    client: Client,
    base_url: String,
}

impl ProgressClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProgressError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn progress_url(&self, job_id: &str) -> String {
        format!("{}/progress/{}", self.base_url, urlencoding::encode(job_id))
    }
}

impl ProgressSource for ProgressClient {
    async fn fetch(&self, job_id: &str) -> Result<ProgressUpdate, ProgressError> {
        let url = self.progress_url(job_id);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ProgressError::Status(response.status().as_u16()));
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            ProgressError::InvalidResponse(format!(
                "Failed to parse progress: {}. Body: {}",
                e,
                text.chars().take(200).collect::<String>()
            ))
        })
    }
}
