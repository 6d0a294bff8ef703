//! Error types shared by the API client, the upload flow and the search form.

use std::path::PathBuf;

/// Failure of a single call against the event search API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request itself failed (connect, timeout, TLS, decode).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("event search API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// A staged file could not be read before sending.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// Message suitable for showing next to a failed upload or search.
    ///
    /// Prefers the backend's own `{"error": "..."}` payload when there is one.
    pub fn user_message(&self) -> String {
        if let ApiError::Api { body, .. } = self {
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
                if let Some(message) = value.get("error").and_then(|e| e.as_str()) {
                    return message.to_string();
                }
            }
        }
        self.to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("no files selected for upload")]
    NoFilesSelected,
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Rejected edit or submit on the search form. Never reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("unknown search field `{0}`")]
    UnknownField(String),

    #[error("`{field}` must be an integer, got `{value}`")]
    InvalidNumber { field: &'static str, value: String },

    #[error("page size must be one of 25, 50, 100, 200 (got `{0}`)")]
    InvalidPageSize(String),

    #[error("page must be a positive integer (got `{0}`)")]
    InvalidPage(String),
}
