// ABOUTME: The Scraper orchestrator composing fetch, extraction, enrichment, and ordering.
// ABOUTME: Per-item failures drop that item only; a zero-item run yields one diagnostic entry.

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use scraper::{ElementRef, Html};
use tracing::{debug, info, warn};

use crate::config::SiteConfig;
use crate::enrich;
use crate::error::ScrapeError;
use crate::extract::{cached_selector, extract_field};
use crate::fetch;
use crate::models::Entry;
use crate::order;
use crate::urls::UrlResolver;

/// Runs the extraction-and-normalization pipeline for one configured site.
pub struct Scraper {
    cfg: SiteConfig,
    http: reqwest::Client,
    resolver: UrlResolver,
}

impl Scraper {
    /// Validates the configuration and builds the HTTP client (user agent,
    /// timeout, and extra headers applied to every request).
    pub fn new(cfg: SiteConfig) -> Result<Self, ScrapeError> {
        cfg.validate()?;

        let mut default_headers = HeaderMap::new();
        for (name, value) in &cfg.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ScrapeError::config(format!("header {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ScrapeError::config(format!("header {name:?} value: {e}")))?;
            default_headers.insert(name, value);
        }

        let http = reqwest::Client::builder()
            .user_agent(&cfg.user_agent)
            .timeout(cfg.timeout())
            .default_headers(default_headers)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| ScrapeError::config(format!("HTTP client: {e}")))?;

        let resolver = UrlResolver::new(&cfg.base_origin);
        Ok(Self {
            cfg,
            http,
            resolver,
        })
    }

    /// Fetches the listing, normalizes its items, and returns the final
    /// deduplicated sequence in descending sort-key order.
    ///
    /// Only the listing fetch itself can fail the run; everything after is
    /// contained at item scope. A listing with zero extractable items yields
    /// exactly one diagnostic entry so the consumer sees a signal instead of
    /// an empty feed.
    pub async fn run(&self) -> Result<Vec<Entry>, ScrapeError> {
        let listing_html = self.fetch_listing().await?;
        let entries = self.extract_listing(&listing_html);
        info!(count = entries.len(), url = %self.cfg.listing_url, "listing items extracted");

        if entries.is_empty() {
            warn!(url = %self.cfg.listing_url, "no items matched; emitting diagnostic entry");
            return Ok(vec![self.diagnostic_entry()]);
        }

        // Dedup before enrichment so a repeated link is never fetched twice.
        let mut entries = order::dedup_by_link(entries);

        for entry in &mut entries {
            if let Some(detail) = &self.cfg.detail {
                if let Some(enriched) = enrich::enrich(&self.http, detail, &entry.link).await {
                    entry.description = enriched.description;
                    entry.enriched_body = enriched.body;
                }
                // Politeness pause toward the origin, required after every
                // detail fetch regardless of its outcome.
                tokio::time::sleep(self.cfg.request_delay()).await;
            }
            if let Some(image_url) = entry.image_url.clone() {
                let size = fetch::head_content_length(&self.http, &image_url).await;
                entry.image_size = Some(size.unwrap_or(1));
            }
        }

        Ok(order::finalize(entries))
    }

    /// Retrieves the listing HTML, either directly or from the AJAX endpoint
    /// whose JSON body maps opaque keys to embedded HTML fragments.
    async fn fetch_listing(&self) -> Result<String, ScrapeError> {
        let Some(ajax) = &self.cfg.ajax else {
            return Ok(fetch::get(&self.http, &self.cfg.listing_url).await?.text());
        };

        let response = fetch::post_form(&self.http, &ajax.endpoint, &ajax.form).await?;
        let value: serde_json::Value = serde_json::from_str(&response.text())
            .map_err(|e| ScrapeError::listing(format!("AJAX response is not JSON: {e}")))?;
        let object = value
            .as_object()
            .ok_or_else(|| ScrapeError::listing("AJAX response is not a JSON object"))?;
        object
            .iter()
            .find(|(key, _)| key.contains(&ajax.fragment_marker))
            .and_then(|(_, fragment)| fragment.as_str().map(str::to_string))
            .ok_or_else(|| {
                ScrapeError::listing(format!(
                    "no fragment key containing {:?}",
                    ajax.fragment_marker
                ))
            })
    }

    /// Pure pass over the listing document: one partial entry per item node,
    /// items missing a required field dropped in isolation.
    fn extract_listing(&self, html: &str) -> Vec<Entry> {
        let doc = Html::parse_document(html);
        let Some(item_selector) = cached_selector(&self.cfg.listing.item) else {
            warn!(selector = %self.cfg.listing.item, "item selector is invalid");
            return Vec::new();
        };

        let mut entries = Vec::new();
        for node in doc.select(&item_selector) {
            match self.extract_item(node) {
                Some(entry) => entries.push(entry),
                None => debug!("item skipped: required field missing"),
            }
        }
        entries
    }

    /// Normalizes one item node. `None` drops the item without touching the
    /// rest of the run. Title and link are required; everything else is
    /// best-effort.
    fn extract_item(&self, node: ElementRef<'_>) -> Option<Entry> {
        let rules = &self.cfg.listing;

        let title = extract_field(node, &rules.title)?;
        let link = self
            .resolver
            .resolve(&extract_field(node, &rules.link)?);
        let description = extract_field(node, &rules.description)
            .unwrap_or_else(|| self.cfg.missing_description.clone());
        let image_url = extract_field(node, &rules.image)
            .map(|u| self.resolver.resolve(&u));
        let sort_key = order::sort_key(&link, self.product_id(node));

        Some(Entry {
            title,
            link,
            description,
            image_url,
            image_size: None,
            sort_key,
            enriched_body: None,
            published_ms: Utc::now().timestamp_millis() as u64,
        })
    }

    /// Internal numeric product identifier, read off the item node itself or
    /// the first descendant carrying the configured attribute.
    fn product_id(&self, node: ElementRef<'_>) -> Option<i64> {
        let attr = &self.cfg.listing.product_id_attr;
        if let Some(id) = node.value().attr(attr).and_then(|v| v.trim().parse().ok()) {
            return Some(id);
        }
        let selector = cached_selector(&format!("[{attr}]"))?;
        node.select(&selector)
            .find_map(|el| el.value().attr(attr).and_then(|v| v.trim().parse().ok()))
    }

    fn diagnostic_entry(&self) -> Entry {
        Entry {
            title: "No items found".to_string(),
            link: self.cfg.listing_url.clone(),
            description: format!(
                "The listing page at {} matched no item nodes; the site layout may have changed.",
                self.cfg.listing_url
            ),
            sort_key: 0,
            published_ms: Utc::now().timestamp_millis() as u64,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn config() -> SiteConfig {
        serde_json::from_value(serde_json::json!({
            "listing_url": "https://example.test/news",
            "base_origin": "https://example.test",
            "request_delay_ms": 0,
            "listing": {
                "item": ".product_box",
                "title": [{"selector": "h3 a"}],
                "link": [{"selector": "h3 a", "attr": "href"}],
                "description": [{"selector": ".brand a"}],
                "image": [
                    {"selector": "img", "attr": "src"},
                    {"selector": "img", "attr": "data-src"},
                    {"selector": "img", "attr": "data-lazy"}
                ]
            }
        }))
        .unwrap()
    }

    fn scraper() -> Scraper {
        Scraper::new(config()).unwrap()
    }

    const LISTING: &str = r#"
        <div class="product_box">
            <h3><a href="/x-a100.html">First</a></h3>
            <span class="brand"><a>Brand A</a></span>
            <img src="/img/a.jpg">
        </div>
        <div class="product_box">
            <h3><a>No href here</a></h3>
        </div>
        <div class="product_box">
            <h3><a href="/y-a200.html">Second</a></h3>
        </div>
    "#;

    #[test]
    fn extracts_items_and_drops_malformed_in_isolation() {
        let entries = scraper().extract_listing(LISTING);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "First");
        assert_eq!(entries[0].link, "https://example.test/x-a100.html");
        assert_eq!(entries[0].sort_key, 100);
        assert_eq!(
            entries[0].image_url.as_deref(),
            Some("https://example.test/img/a.jpg")
        );
        assert_eq!(entries[1].title, "Second");
        assert_eq!(entries[1].sort_key, 200);
    }

    #[test]
    fn missing_description_uses_placeholder() {
        let entries = scraper().extract_listing(LISTING);
        assert_eq!(entries[1].description, "No description available.");
        assert_eq!(entries[0].description, "Brand A");
    }

    #[test]
    fn image_fallback_chain_reaches_lazy_attributes() {
        let html = r#"
            <div class="product_box">
                <h3><a href="/z-a5.html">Lazy</a></h3>
                <img data-lazy="/img/lazy.jpg">
            </div>
        "#;
        let entries = scraper().extract_listing(html);
        assert_eq!(
            entries[0].image_url.as_deref(),
            Some("https://example.test/img/lazy.jpg")
        );
    }

    #[test]
    fn product_id_attribute_feeds_sort_key() {
        let html = r#"
            <div class="product_box" data-id-product="77">
                <h3><a href="/no-numeric-slug.html">IdOnly</a></h3>
            </div>
        "#;
        let entries = scraper().extract_listing(html);
        assert_eq!(entries[0].sort_key, order::PRODUCT_ID_OFFSET + 77);
    }

    #[test]
    fn product_id_found_on_descendant() {
        let html = r#"
            <div class="product_box">
                <div data-id-product="12"></div>
                <h3><a href="/another-slug.html">Nested</a></h3>
            </div>
        "#;
        let entries = scraper().extract_listing(html);
        assert_eq!(entries[0].sort_key, order::PRODUCT_ID_OFFSET + 12);
    }

    #[test]
    fn rejects_unparseable_header_config() {
        let mut cfg = config();
        cfg.headers = HashMap::from([("bad header".to_string(), "x".to_string())]);
        assert!(Scraper::new(cfg).is_err());
    }

}
