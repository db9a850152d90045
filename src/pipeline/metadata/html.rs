//! Title and DOI extraction from fetched HTML pages.

use std::sync::LazyLock;

use regex::Regex;

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid regex"));

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// DOI meta tags, in priority order.
static DOI_META: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"(?i)<meta[^>]+name=["']citation_doi["'][^>]+content=["']([^"']+)["'][^>]*>"#,
        r#"(?i)<meta[^>]+name=["']dc\.identifier["'][^>]+content=["'](?:doi:)?\s*([^"']+)["'][^>]*>"#,
        r#"(?i)<meta[^>]+name=["']doi["'][^>]+content=["']([^"']+)["'][^>]*>"#,
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

static BARE_DOI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)10\.\d{4,9}/[-._;()/:A-Z0-9]+").expect("valid regex"));

/// Collapse whitespace and decode the handful of entities page titles use.
pub fn decode_html(raw: &str) -> String {
    WHITESPACE_RE
        .replace_all(raw, " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .trim()
        .to_string()
}

/// First `<title>` element, decoded. Blank titles count as absent.
pub fn extract_title(html: &str) -> Option<String> {
    let raw = TITLE_RE.captures(html)?.get(1)?.as_str();
    let title = decode_html(raw);
    (!title.is_empty()).then_some(title)
}

/// DOI from meta tags, falling back to the first DOI-shaped string.
pub fn extract_doi(html: &str) -> Option<String> {
    for re in DOI_META.iter() {
        if let Some(doi) = re.captures(html).and_then(|c| c.get(1)) {
            let doi = doi.as_str().trim();
            if !doi.is_empty() {
                return Some(doi.to_string());
            }
        }
    }
    BARE_DOI_RE.find(html).map(|m| m.as_str().trim().to_string())
}
