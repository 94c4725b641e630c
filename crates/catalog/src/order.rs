// ABOUTME: Sort-key derivation, deduplication, and final ordering of entries.
// ABOUTME: Highest article identifier first; ties keep first-seen order.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::Entry;

/// Article identifier embedded in a link's trailing path segment: an "a"
/// followed by digits just before the file extension, e.g. `/blue-train-a42.html`.
static ARTICLE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"a(\d+)\.[A-Za-z0-9]+$").unwrap());

/// Offset applied to product-id keys so id-only items always sort below any
/// real article identifier while keeping their relative order.
pub const PRODUCT_ID_OFFSET: i64 = -1_000_000_000;

/// Key for items with neither an article id nor a product id; sorts last.
pub const NO_KEY_SENTINEL: i64 = -2_000_000_000;

/// Derives an entry's sort key from its link and, failing that, the item
/// node's internal product identifier. Pure; never touches the network.
pub fn sort_key(link: &str, product_id: Option<i64>) -> i64 {
    if let Some(caps) = ARTICLE_ID_RE.captures(link) {
        if let Ok(id) = caps[1].parse::<i64>() {
            if id != 0 {
                return id;
            }
        }
    }
    if let Some(id) = product_id {
        return PRODUCT_ID_OFFSET + id;
    }
    NO_KEY_SENTINEL
}

/// Drops later occurrences of an already-seen link, keeping the first.
pub fn dedup_by_link(entries: Vec<Entry>) -> Vec<Entry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|e| seen.insert(e.link.clone()))
        .collect()
}

/// Deduplicates by link and sorts descending by key. The sort is stable, so
/// equal keys retain encounter order.
pub fn finalize(entries: Vec<Entry>) -> Vec<Entry> {
    let mut entries = dedup_by_link(entries);
    entries.sort_by(|a, b| b.sort_key.cmp(&a.sort_key));
    entries
}
