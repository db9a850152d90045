//! Citation extraction from generated text.
//!
//! One left-to-right scan recognises two token kinds: bare http(s) URLs
//! and bracketed `[n]` reference markers. URL tokens go through
//! `sanitize_url`; the surviving URLs, deduplicated in first-seen order,
//! are the citation list that `[n]` markers index into (1-based).

use std::collections::HashSet;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use super::sanitize::sanitize_url;

/// URL run (no whitespace, brackets or quotes) or a `[n]` marker.
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s<>()\[\]{}"']+|\[(\d+)\]"#).expect("valid regex")
});

/// A recognised token with its byte span in the scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Raw URL-like run, not yet sanitized.
    Url { raw: &'a str, span: Range<usize> },
    /// `[n]` reference marker; `number` is the literal n.
    Reference { number: usize, span: Range<usize> },
}

impl Token<'_> {
    pub fn span(&self) -> Range<usize> {
        match self {
            Token::Url { span, .. } | Token::Reference { span, .. } => span.clone(),
        }
    }
}

/// Scan text for URL and reference tokens, in order of appearance.
pub fn scan_tokens(text: &str) -> Vec<Token<'_>> {
    TOKEN_RE
        .captures_iter(text)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            let span = whole.start()..whole.end();
            match cap.get(1) {
                Some(digits) => digits
                    .as_str()
                    .parse()
                    .ok()
                    .map(|number| Token::Reference { number, span }),
                None => Some(Token::Url {
                    raw: whole.as_str(),
                    span,
                }),
            }
        })
        .collect()
}

/// Extract the ordered, deduplicated citation URLs of a text.
///
/// Deterministic: the same text always yields the same list, so citation
/// numbering stays aligned with the in-text `[n]` markers.
pub fn extract_urls(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    for token in scan_tokens(text) {
        let Token::Url { raw, .. } = token else {
            continue;
        };
        let Some(url) = sanitize_url(raw) else {
            continue;
        };
        if seen.insert(url.clone()) {
            urls.push(url);
        }
    }
    urls
}

/// Replace `[n]` markers with links to the n-th citation.
///
/// `render_link(n, url)` produces the replacement for a marker whose
/// citation exists; markers without a citation are passed to
/// `render_dangling(n)`. Text between markers is passed through `escape`.
pub fn link_references<E, L, D>(
    text: &str,
    urls: &[String],
    escape: E,
    mut render_link: L,
    mut render_dangling: D,
) -> String
where
    E: Fn(&str) -> String,
    L: FnMut(usize, &str) -> String,
    D: FnMut(usize) -> String,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for token in scan_tokens(text) {
        let Token::Reference { number, span } = token else {
            continue;
        };
        out.push_str(&escape(&text[last..span.start]));
        let index = number.max(1) - 1;
        match urls.get(index) {
            Some(url) => out.push_str(&render_link(number, url)),
            None => out.push_str(&render_dangling(number)),
        }
        last = span.end;
    }
    out.push_str(&escape(&text[last..]));
    out
}
