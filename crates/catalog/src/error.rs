// ABOUTME: Error types for catalog scraping operations.
// ABOUTME: Provides ScrapeError with Fetch, Listing, and Config variants.

use std::fmt;
use thiserror::Error;

/// Errors that can abort a scrape run.
///
/// Expected absences (a selector that matches nothing, a node without the
/// requested attribute) are modeled as `None` at the extraction layer and
/// never surface here.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// A single-attempt HTTP request failed (network error, timeout, non-2xx).
    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The listing body was fetched but unusable (e.g. the AJAX envelope
    /// carried no HTML fragment).
    #[error("unusable listing body: {0}")]
    Listing(String),

    /// The site configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ScrapeError {
    /// Creates a Fetch error from an underlying failure.
    pub fn fetch(url: impl Into<String>, reason: impl fmt::Display) -> Self {
        ScrapeError::Fetch {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a Listing error with a custom message.
    pub fn listing(msg: impl Into<String>) -> Self {
        ScrapeError::Listing(msg.into())
    }

    /// Creates a Config error with a custom message.
    pub fn config(msg: impl Into<String>) -> Self {
        ScrapeError::Config(msg.into())
    }

    /// Returns true if this is a Fetch error.
    pub fn is_fetch(&self) -> bool {
        matches!(self, ScrapeError::Fetch { .. })
    }
}
