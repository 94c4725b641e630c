// ABOUTME: Selector-based field extraction with ordered fallback chains.
// ABOUTME: First rule yielding a non-empty value wins; misses are skips, not errors.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};

use crate::config::ExtractRule;

/// Thread-safe cache of compiled CSS selectors. Selector parsing is expensive
/// relative to the matching itself; rule sets come from configuration and
/// repeat for every item node.
static SELECTOR_CACHE: Lazy<RwLock<HashMap<String, Option<Selector>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Gets or compiles a CSS selector, caching the result.
///
/// Invalid selectors are cached as `None` so a misconfigured rule is skipped
/// cheaply on every item instead of re-parsed.
pub(crate) fn cached_selector(css: &str) -> Option<Selector> {
    {
        let cache = SELECTOR_CACHE.read().unwrap();
        if let Some(cached) = cache.get(css) {
            return cached.clone();
        }
    }

    let compiled = Selector::parse(css).ok();
    let mut cache = SELECTOR_CACHE.write().unwrap();
    if let Some(cached) = cache.get(css) {
        return cached.clone();
    }
    cache.insert(css.to_string(), compiled.clone());
    compiled
}

/// Collapses runs of whitespace into single spaces and trims the ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The matched element's descendant text, whitespace-normalized.
pub fn element_text(el: ElementRef<'_>) -> String {
    normalize_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

/// Extracts a field from `scope` by trying `rules` in declaration order.
///
/// For each rule, every element matching the selector within `scope` is
/// considered; the first non-empty, non-whitespace value wins. A selector that
/// matches nothing, an element without the requested attribute, and an invalid
/// selector are all skips. Returns `None` only when every rule is exhausted.
pub fn extract_field(scope: ElementRef<'_>, rules: &[ExtractRule]) -> Option<String> {
    rules.iter().find_map(|rule| apply_rule(scope, rule))
}

fn apply_rule(scope: ElementRef<'_>, rule: &ExtractRule) -> Option<String> {
    let selector = cached_selector(&rule.selector)?;
    for el in scope.select(&selector) {
        let value = match &rule.attr {
            Some(attr) => el
                .value()
                .attr(attr)
                .map(|v| v.trim().to_string())
                .unwrap_or_default(),
            None => element_text(el),
        };
        if !value.is_empty() {
            return Some(value);
        }
    }
    None
}

/// The first element matching `css` within `scope`.
pub fn select_first<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = cached_selector(css)?;
    scope.select(&selector).next()
}

/// The next sibling that is an element, skipping text and comment nodes.
/// Used to pair release-info labels with their adjacent value nodes.
pub fn next_sibling_element(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.next_siblings().find_map(ElementRef::wrap)
}
