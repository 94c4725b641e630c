// ABOUTME: Relative URL resolution against a fixed base origin.
// ABOUTME: Pure string rules, idempotent by construction.

/// Resolves possibly-relative URLs against one site origin.
#[derive(Debug, Clone)]
pub struct UrlResolver {
    base: String,
}

impl UrlResolver {
    /// `base_origin` is scheme + host, e.g. `https://shop.example`. A trailing
    /// slash is dropped so resolution inserts exactly one separator.
    pub fn new(base_origin: &str) -> Self {
        Self {
            base: base_origin.trim_end_matches('/').to_string(),
        }
    }

    /// Returns `candidate` unchanged when it already starts with a scheme
    /// marker, otherwise prepends the base origin with exactly one `/`
    /// between origin and path. Idempotent: resolved output starts with
    /// `http` and passes through unchanged on a second call.
    pub fn resolve(&self, candidate: &str) -> String {
        if candidate.starts_with("http") {
            return candidate.to_string();
        }
        if candidate.starts_with('/') {
            format!("{}{}", self.base, candidate)
        } else {
            format!("{}/{}", self.base, candidate)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn resolver() -> UrlResolver {
        UrlResolver::new("https://example.test")
    }

    #[test]
    fn absolute_urls_pass_through() {
        assert_eq!(
            resolver().resolve("https://other.example/p.html"),
            "https://other.example/p.html"
        );
        assert_eq!(
            resolver().resolve("http://other.example/p.html"),
            "http://other.example/p.html"
        );
    }

    #[test]
    fn rooted_path_concatenates_directly() {
        assert_eq!(
            resolver().resolve("/img/a.jpg"),
            "https://example.test/img/a.jpg"
        );
    }

    #[test]
    fn bare_path_gains_one_separator() {
        assert_eq!(
            resolver().resolve("img/a.jpg"),
            "https://example.test/img/a.jpg"
        );
    }

    #[test]
    fn trailing_slash_on_base_does_not_double() {
        let r = UrlResolver::new("https://example.test/");
        assert_eq!(r.resolve("/x.html"), "https://example.test/x.html");
    }

    #[test]
    fn resolve_is_idempotent() {
        let r = resolver();
        for input in ["/a.html", "a.html", "https://example.test/a.html", ""] {
            let once = r.resolve(input);
            assert_eq!(r.resolve(&once), once);
        }
    }
}
