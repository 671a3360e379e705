/*!
 * Client for the remote translation service.
 *
 * The pipeline talks to the service through the `TranslationRemote` trait so
 * that stages can run against an in-memory remote in tests. `CrowdinClient`
 * is the HTTP implementation:
 * - `export`: ask the service to build a fresh archive
 * - `download`: fetch the archive for one locale or `all`
 * - `status`: per-locale translation progress
 */

use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, warn};
use reqwest::Client;
use std::fmt::Debug;
use std::time::Duration;
use url::Url;

use crate::app_config::CrowdinConfig;
use crate::errors::CrowdinError;
use crate::metadata::RemoteTranslationStatus;

/// Operations the pipeline needs from the translation service
#[async_trait]
pub trait TranslationRemote: Send + Sync + Debug {
    /// Ask the service to rebuild its export archive
    async fn trigger_export(&self) -> Result<(), CrowdinError>;

    /// Download the export archive for `language_filter` (a locale code or `all`)
    async fn download_archive(&self, language_filter: &str) -> Result<Bytes, CrowdinError>;

    /// Fetch translation progress for every locale
    async fn fetch_status(&self) -> Result<Vec<RemoteTranslationStatus>, CrowdinError>;
}

/// HTTP client for the project API
#[derive(Debug)]
pub struct CrowdinClient {
    /// HTTP client for making requests
    client: Client,
    /// Project API root, e.g. `https://api.crowdin.net/api/project`
    endpoint: String,
    project_id: String,
    project_key: String,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
}

impl CrowdinClient {
    /// Create a new client from configuration
    pub fn new(config: &CrowdinConfig) -> Result<Self, CrowdinError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.timeout_secs.min(30)))
            .build()
            .map_err(|e| CrowdinError::ConnectionError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            project_key: config.project_key.clone(),
            max_retries: config.retry_count,
            backoff_base_ms: config.retry_backoff_ms,
        })
    }

    /// Build a project URL; `path` is appended after the project id
    fn project_url(&self, path: &str, extra_query: &[(&str, &str)]) -> Result<Url, CrowdinError> {
        let raw = format!("{}/{}/{}", self.endpoint, self.project_id, path);
        let mut url = Url::parse(&raw)
            .map_err(|e| CrowdinError::RequestFailed(format!("Invalid URL '{}': {}", raw, e)))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("key", &self.project_key);
            for (k, v) in extra_query {
                query.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// URL of the export trigger
    pub fn export_url(&self) -> Result<Url, CrowdinError> {
        self.project_url("export", &[])
    }

    /// URL of the archive download for a language filter
    pub fn download_url(&self, language_filter: &str) -> Result<Url, CrowdinError> {
        self.project_url(&format!("download/{}.zip", language_filter), &[])
    }

    /// URL of the progress report
    pub fn status_url(&self) -> Result<Url, CrowdinError> {
        self.project_url("status", &[("json", "True")])
    }

    /// GET a URL with retry on connection failures and server errors
    async fn get_bytes(&self, url: Url) -> Result<Bytes, CrowdinError> {
        let mut attempt = 0;

        loop {
            match self.get_once(url.clone()).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = self.backoff_base_ms.saturating_mul(1u64 << attempt.min(16));
                    warn!(
                        "Request to {} failed (attempt {}/{}): {}. Retrying in {}ms",
                        url.path(),
                        attempt + 1,
                        self.max_retries + 1,
                        e,
                        delay
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_once(&self, url: Url) -> Result<Bytes, CrowdinError> {
        debug!("GET {}", url.path());
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                CrowdinError::ConnectionError(e.to_string())
            } else {
                CrowdinError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            return Err(CrowdinError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        response
            .bytes()
            .await
            .map_err(|e| CrowdinError::ConnectionError(format!("Failed to read response body: {}", e)))
    }
}

#[async_trait]
impl TranslationRemote for CrowdinClient {
    async fn trigger_export(&self) -> Result<(), CrowdinError> {
        self.get_bytes(self.export_url()?).await.map(|_| ())
    }

    async fn download_archive(&self, language_filter: &str) -> Result<Bytes, CrowdinError> {
        self.get_bytes(self.download_url(language_filter)?).await
    }

    async fn fetch_status(&self) -> Result<Vec<RemoteTranslationStatus>, CrowdinError> {
        let body = self.get_bytes(self.status_url()?).await?;
        serde_json::from_slice(&body).map_err(|e| CrowdinError::ParseError(e.to_string()))
    }
}
