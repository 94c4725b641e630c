// ABOUTME: Detail-page enrichment via a prioritized content fallback chain.
// ABOUTME: Release-info summary, long-form body, then meta description; failure degrades to None.

use std::collections::HashMap;

use scraper::Html;
use tracing::debug;

use crate::config::DetailRules;
use crate::extract::{cached_selector, element_text, extract_field, next_sibling_element};
use crate::fetch;

/// Content assembled from an item's detail page.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrichment {
    /// Replacement for the listing-level description.
    pub description: String,
    /// The long-form block alone, when the page has one.
    pub body: Option<String>,
}

/// Fetches `link` once and assembles enrichment content. Any failure — network
/// error, timeout, non-2xx, or a page with nothing extractable — yields `None`
/// and the caller keeps the listing-page description.
pub async fn enrich(
    client: &reqwest::Client,
    rules: &DetailRules,
    link: &str,
) -> Option<Enrichment> {
    let result = match fetch::get(client, link).await {
        Ok(r) => r,
        Err(err) => {
            debug!(%link, %err, "detail fetch failed; keeping listing description");
            return None;
        }
    };
    let doc = Html::parse_document(&result.text());
    extract_enrichment(&doc, rules)
}

/// Evaluates the content fallback chain on a parsed detail page:
///
/// 1. Release-info summary joined from labeled key/value pairs.
/// 2. Long-form block from the configured content region; when the summary
///    also exists the two are joined with a blank line, summary first.
/// 3. The summary combined the same way with the page meta description, or
///    alone when the page has no meta description either.
/// 4. The meta description by itself.
/// 5. Nothing extractable: `None`.
pub fn extract_enrichment(doc: &Html, rules: &DetailRules) -> Option<Enrichment> {
    let root = doc.root_element();
    let summary = release_summary(doc, rules);
    let body = extract_field(root, &rules.body);

    let description = match (&summary, &body) {
        (Some(s), Some(b)) => format!("{s}\n\n{b}"),
        (None, Some(b)) => b.clone(),
        (Some(s), None) => match extract_field(root, &rules.meta) {
            Some(m) => format!("{s}\n\n{m}"),
            None => s.clone(),
        },
        (None, None) => extract_field(root, &rules.meta)?,
    };

    Some(Enrichment { description, body })
}

/// Assembles the release-info summary line.
///
/// Label nodes are matched by `rules.info_label`; each value is the adjacent
/// sibling element's text. Only the first occurrence per key counts, pairs
/// with empty values are omitted, and present keys are joined in the
/// configured priority order.
pub fn release_summary(doc: &Html, rules: &DetailRules) -> Option<String> {
    let label_selector = cached_selector(&rules.info_label)?;
    let mut found: HashMap<&str, String> = HashMap::new();

    for label_el in doc.select(&label_selector) {
        let label = element_text(label_el);
        let label = label.trim_end_matches(':').trim();
        let Some(key) = rules
            .info_keys
            .iter()
            .find(|k| k.eq_ignore_ascii_case(label))
        else {
            continue;
        };
        if found.contains_key(key.as_str()) {
            continue;
        }
        let value = next_sibling_element(label_el)
            .map(element_text)
            .unwrap_or_default();
        if !value.is_empty() {
            found.insert(key, value);
        }
    }

    if found.is_empty() {
        return None;
    }
    let parts: Vec<String> = rules
        .info_keys
        .iter()
        .filter_map(|k| found.get(k.as_str()).map(|v| format!("{k}: {v}")))
        .collect();
    Some(parts.join(&rules.info_separator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractRule;
    use pretty_assertions::assert_eq;

    fn rules() -> DetailRules {
        DetailRules {
            info_label: "dl.release dt".into(),
            info_keys: vec!["Label".into(), "Format".into(), "Country".into()],
            info_separator: " | ".into(),
            body: vec![ExtractRule::text("div.long-desc")],
            meta: vec![ExtractRule::attr("meta[name='description']", "content")],
        }
    }

    #[test]
    fn summary_joins_keys_in_priority_order() {
        // Country appears before Format in the document; priority order wins.
        let doc = Html::parse_document(
            r#"<dl class="release">
                <dt>Country:</dt><dd>France</dd>
                <dt>format</dt><dd>12"</dd>
                <dt>Label</dt><dd>Versatile</dd>
            </dl>"#,
        );
        assert_eq!(
            release_summary(&doc, &rules()),
            Some("Label: Versatile | Format: 12\" | Country: France".to_string())
        );
    }

    #[test]
    fn summary_keeps_first_occurrence_and_drops_empty_values() {
        let doc = Html::parse_document(
            r#"<dl class="release">
                <dt>Label</dt><dd>First</dd>
                <dt>Label</dt><dd>Second</dd>
                <dt>Format</dt><dd>  </dd>
            </dl>"#,
        );
        assert_eq!(
            release_summary(&doc, &rules()),
            Some("Label: First".to_string())
        );
    }

    #[test]
    fn unknown_labels_are_ignored() {
        let doc = Html::parse_document(
            r#"<dl class="release"><dt>Barcode</dt><dd>123</dd></dl>"#,
        );
        assert_eq!(release_summary(&doc, &rules()), None);
    }

    #[test]
    fn summary_prefixes_long_form_body() {
        let doc = Html::parse_document(
            r#"<html><body>
                <dl class="release"><dt>Label</dt><dd>Versatile</dd></dl>
                <div class="long-desc">Deep space disco.</div>
            </body></html>"#,
        );
        let e = extract_enrichment(&doc, &rules()).unwrap();
        assert_eq!(e.description, "Label: Versatile\n\nDeep space disco.");
        assert_eq!(e.body.as_deref(), Some("Deep space disco."));
    }

    #[test]
    fn body_alone_when_no_summary() {
        let doc = Html::parse_document(
            r#"<html><body><div class="long-desc">Just a body.</div></body></html>"#,
        );
        let e = extract_enrichment(&doc, &rules()).unwrap();
        assert_eq!(e.description, "Just a body.");
    }

    #[test]
    fn summary_prefixes_meta_description_when_body_absent() {
        let doc = Html::parse_document(
            r#"<html><head><meta name="description" content="Meta text."></head>
               <body><dl class="release"><dt>Label</dt><dd>Versatile</dd></dl></body></html>"#,
        );
        let e = extract_enrichment(&doc, &rules()).unwrap();
        assert_eq!(e.description, "Label: Versatile\n\nMeta text.");
        assert_eq!(e.body, None);
    }

    #[test]
    fn summary_alone_when_nothing_else() {
        let doc = Html::parse_document(
            r#"<html><body><dl class="release"><dt>Label</dt><dd>Versatile</dd></dl></body></html>"#,
        );
        let e = extract_enrichment(&doc, &rules()).unwrap();
        assert_eq!(e.description, "Label: Versatile");
    }

    #[test]
    fn meta_description_is_the_last_resort() {
        let doc = Html::parse_document(
            r#"<html><head><meta name="description" content="Only meta."></head><body></body></html>"#,
        );
        let e = extract_enrichment(&doc, &rules()).unwrap();
        assert_eq!(e.description, "Only meta.");
    }

    #[test]
    fn empty_page_yields_none() {
        let doc = Html::parse_document("<html><body><p>unrelated</p></body></html>");
        assert_eq!(extract_enrichment(&doc, &rules()), None);
    }
}
