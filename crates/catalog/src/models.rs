// ABOUTME: Normalized output model for catalog entries.
// ABOUTME: One Entry per catalog item, handed to the external feed writer.

use serde::{Deserialize, Serialize};

/// A single normalized catalog entry.
///
/// `link` is always absolute and unique within a run's output. `description`
/// is always non-empty; when nothing was extractable it carries the configured
/// placeholder. `image_size` is only meaningful alongside `image_url` and
/// falls back to a sentinel of 1 when the HEAD probe fails.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub title: String,
    pub link: String,
    pub description: String,
    pub image_url: Option<String>,
    pub image_size: Option<u64>,
    /// Derived ordering value, highest first. Pure function of the link and
    /// the item node's attributes; never depends on fetch results.
    pub sort_key: i64,
    /// Long-form detail-page content, distinct from the short description.
    pub enriched_body: Option<String>,
    pub published_ms: u64,
}
