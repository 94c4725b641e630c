// ABOUTME: Site configuration for the scrape pipeline, loaded once at startup.
// ABOUTME: Maps semantic field names to ordered selector rule sets, no ambient globals.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ScrapeError;

/// One extraction strategy: a CSS selector scoped to the current node, reading
/// either the matched element's text or a named attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractRule {
    pub selector: String,
    /// Attribute to read; element text when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attr: Option<String>,
}

impl ExtractRule {
    /// A rule reading the matched element's trimmed text.
    pub fn text(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            attr: None,
        }
    }

    /// A rule reading a named attribute of the matched element.
    pub fn attr(selector: impl Into<String>, attr: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            attr: Some(attr.into()),
        }
    }
}

/// Selector rule sets for the listing page, one ordered fallback chain per
/// semantic field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingRules {
    /// Selector matching one item node per catalog entry.
    pub item: String,
    #[serde(default)]
    pub title: Vec<ExtractRule>,
    #[serde(default)]
    pub link: Vec<ExtractRule>,
    #[serde(default)]
    pub description: Vec<ExtractRule>,
    #[serde(default)]
    pub image: Vec<ExtractRule>,
    /// Attribute carrying the shop's internal numeric product identifier,
    /// looked up on the item node or any descendant.
    #[serde(default = "default_product_id_attr")]
    pub product_id_attr: String,
}

/// Rules for assembling a richer description from an item's detail page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailRules {
    /// Selector matching the label nodes of release-info pairs; each value is
    /// read from the label's adjacent sibling element.
    #[serde(default = "default_info_label")]
    pub info_label: String,
    /// Release-info keys in summary priority order. Matching against label
    /// text is case-insensitive with a trailing colon ignored.
    #[serde(default = "default_info_keys")]
    pub info_keys: Vec<String>,
    #[serde(default = "default_info_separator")]
    pub info_separator: String,
    /// Long-form content region of the detail page.
    #[serde(default)]
    pub body: Vec<ExtractRule>,
    /// Page-level meta-description fallback.
    #[serde(default = "default_meta_rules")]
    pub meta: Vec<ExtractRule>,
}

impl Default for DetailRules {
    fn default() -> Self {
        Self {
            info_label: default_info_label(),
            info_keys: default_info_keys(),
            info_separator: default_info_separator(),
            body: Vec::new(),
            meta: default_meta_rules(),
        }
    }
}

/// Configuration for listings served as JSON-wrapped HTML from an AJAX
/// endpoint instead of a plain page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AjaxConfig {
    pub endpoint: String,
    /// Form-encoded POST payload.
    #[serde(default)]
    pub form: HashMap<String, String>,
    /// The first JSON key whose name contains this marker holds the listing
    /// HTML fragment.
    pub fragment_marker: String,
}

/// Complete configuration for one site, threaded through every component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub listing_url: String,
    /// Scheme + host used to absolutize relative links and image URLs.
    pub base_origin: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Mandatory politeness pause after each detail-page fetch.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
    #[serde(default)]
    pub ajax: Option<AjaxConfig>,
    pub listing: ListingRules,
    /// Detail-page enrichment rules; omit to skip enrichment entirely.
    #[serde(default)]
    pub detail: Option<DetailRules>,
    #[serde(default = "default_missing_description")]
    pub missing_description: String,
}

impl SiteConfig {
    /// Validates URLs and required selectors before a run starts.
    pub fn validate(&self) -> Result<(), ScrapeError> {
        Url::parse(&self.listing_url)
            .map_err(|e| ScrapeError::config(format!("listing_url: {e}")))?;
        let base = Url::parse(&self.base_origin)
            .map_err(|e| ScrapeError::config(format!("base_origin: {e}")))?;
        if base.host_str().is_none() {
            return Err(ScrapeError::config("base_origin has no host"));
        }
        if self.listing.item.trim().is_empty() {
            return Err(ScrapeError::config("listing.item selector is empty"));
        }
        if let Some(ajax) = &self.ajax {
            Url::parse(&ajax.endpoint)
                .map_err(|e| ScrapeError::config(format!("ajax.endpoint: {e}")))?;
            if ajax.fragment_marker.is_empty() {
                return Err(ScrapeError::config("ajax.fragment_marker is empty"));
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

fn default_product_id_attr() -> String {
    "data-id-product".to_string()
}

fn default_info_label() -> String {
    "dl.product-info dt".to_string()
}

fn default_info_keys() -> Vec<String> {
    ["Label", "Format", "Country", "Released", "Genre", "Style"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_info_separator() -> String {
    " | ".to_string()
}

fn default_meta_rules() -> Vec<ExtractRule> {
    vec![
        ExtractRule::attr("meta[name='description']", "content"),
        ExtractRule::attr("meta[property='og:description']", "content"),
    ]
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/110.0.0.0 Safari/537.36"
        .to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_request_delay_ms() -> u64 {
    1000
}

fn default_missing_description() -> String {
    "No description available.".to_string()
}
