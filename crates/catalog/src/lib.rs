// ABOUTME: Catalog listing extraction and normalization library for vitrine.
// ABOUTME: Turns a shop listing page into ordered, deduplicated syndication entries.

pub mod config;
pub mod enrich;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod order;
pub mod pipeline;
pub mod urls;

pub use config::{AjaxConfig, DetailRules, ExtractRule, ListingRules, SiteConfig};
pub use enrich::{extract_enrichment, release_summary, Enrichment};
pub use error::ScrapeError;
pub use extract::{extract_field, normalize_whitespace};
pub use models::Entry;
pub use order::{dedup_by_link, finalize, sort_key};
pub use pipeline::Scraper;
pub use urls::UrlResolver;
