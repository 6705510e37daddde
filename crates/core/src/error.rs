//! Error types for Gleaner operations.
//!
//! [`GleanerError`] covers every failure the engine can produce while
//! querying providers, fetching pages and extracting content. Most of these
//! never reach a caller of [`crate::SearchService`]: provider errors are
//! swallowed by the orchestrator and page errors become a failed
//! [`crate::FetchOutcome`].
//!
//! # Example
//!
//! ```rust
//! use gleaner_core::{GleanerError, Result};
//!
//! fn require_key(key: Option<&str>) -> Result<&str> {
//!     key.ok_or(GleanerError::MissingCredential { provider: "serper" })
//! }
//! ```

use thiserror::Error;

/// Main error type for search and extraction operations.
#[derive(Error, Debug)]
pub enum GleanerError {
    /// HTTP request errors from reqwest.
    ///
    /// Wraps network errors, DNS failures, connection resets and TLS issues.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The page answered with a non-success status after redirects.
    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    /// HTML parsing errors, usually an invalid CSS selector.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// A provider was asked to search without an API credential.
    ///
    /// Fatal for that provider only; the orchestrator moves on to the next one.
    #[error("Missing API credential for provider {provider}")]
    MissingCredential { provider: &'static str },

    /// A provider answered with a non-success status.
    #[error("Provider {provider} returned HTTP {status}")]
    ProviderStatus { provider: &'static str, status: u16 },

    /// A provider answered with a body that could not be decoded.
    #[error("Provider {provider} returned a malformed response: {message}")]
    ProviderResponse { provider: &'static str, message: String },

    /// No content could be extracted from the document.
    #[error("No content could be extracted from the document")]
    NoContent,

    /// Extracted text scored below the acceptance threshold.
    ///
    /// This is a designed outcome rather than a fault: navigation pages,
    /// search results and stubs end up here.
    #[error("Content rejected (score {score} below threshold {threshold}): {reason}")]
    NotReadable { score: u8, threshold: u8, reason: String },

    /// File read errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GleanerError {
    /// Whether this error comes from missing configuration rather than a
    /// misbehaving remote.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingCredential { .. })
    }
}

/// Result type alias for GleanerError.
pub type Result<T> = std::result::Result<T, GleanerError>;
