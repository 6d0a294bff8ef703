//! HTTP client for the event search API.
//!
//! Every call is a single request: no retry, no caching. Callers decide what
//! a failure means for their own state.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::ApiError;
use crate::filters::SearchFilters;
use crate::models::dto::{EventFile, SearchResultPage, ServerStats, UploadOutcome};

/// The calls the session needs from the backend.
#[allow(async_fn_in_trait)]
pub trait EventApi {
    /// `POST /files/`, one multipart request for the whole batch.
    async fn upload_files(&self, files: &[PathBuf]) -> Result<Vec<UploadOutcome>, ApiError>;

    /// `POST /events/search/` with the sparse filter set as JSON body.
    async fn search_events(&self, filters: &SearchFilters) -> Result<SearchResultPage, ApiError>;

    /// `GET /events/stats/`
    async fn stats(&self) -> Result<ServerStats, ApiError>;

    /// `GET /files/`
    async fn files(&self) -> Result<Vec<EventFile>, ApiError>;
}

pub struct EventSearchClient {
    client: reqwest::Client,
    api_url: String,
    upload_timeout: Duration,
}

impl EventSearchClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            api_url: config.api_url.clone(),
            upload_timeout: config.upload_timeout,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    async fn file_part(path: &Path) -> Result<Part, ApiError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Part::bytes(bytes).file_name(name))
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ApiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

impl EventApi for EventSearchClient {
    async fn upload_files(&self, files: &[PathBuf]) -> Result<Vec<UploadOutcome>, ApiError> {
        let mut form = Form::new();
        for path in files {
            form = form.part("files", Self::file_part(path).await?);
        }

        tracing::info!(files = files.len(), "uploading log files");
        let response = self
            .client
            .post(self.url("/files/"))
            .multipart(form)
            .timeout(self.upload_timeout)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn search_events(&self, filters: &SearchFilters) -> Result<SearchResultPage, ApiError> {
        tracing::debug!(?filters, "searching events");
        let response = self
            .client
            .post(self.url("/events/search/"))
            .json(filters)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn stats(&self) -> Result<ServerStats, ApiError> {
        let response = self.client.get(self.url("/events/stats/")).send().await?;
        Self::parse_response(response).await
    }

    async fn files(&self) -> Result<Vec<EventFile>, ApiError> {
        let response = self.client.get(self.url("/files/")).send().await?;
        Self::parse_response(response).await
    }
}
