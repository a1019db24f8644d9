use thiserror::Error;

use crate::browser::BrowserError;

/// Errors raised while talking to a remote source
///
/// Most acquisition functions never let these escape: they log and return an
/// empty sequence. The drug-label search is the exception and wraps them in
/// [`DrugSearchError`](crate::fda::DrugSearchError).
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Timed out after {timeout_ms}ms: {context}")]
    Timeout { timeout_ms: u64, context: String },

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("No search results found or page layout changed")]
    NoResults,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SourceError {
    pub fn decode(url: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Decode {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn timeout(timeout_ms: u64, context: impl Into<String>) -> Self {
        Self::Timeout {
            timeout_ms,
            context: context.into(),
        }
    }

    /// HTTP status carried by this error, if the remote answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Implement From<serde_json::Error> for SourceError
impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::decode("<json>", err)
    }
}

pub type SourceResult<T> = Result<T, SourceError>;
