//! Citation URL sanitization.
//!
//! Generated answers glue URLs to their surroundings: closing brackets,
//! CJK punctuation, `^3^` footnote markers, sentence-ending dots, and
//! invisible characters copied from rendered pages. `sanitize_url` peels
//! those off and only lets absolute http(s) URLs through.

use reqwest::Url;

/// Characters that never survive inside a citation URL.
const INVISIBLE_CHARS: &[char] = &['\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}', '\u{00A0}'];

/// Closing brackets, quotes and CJK punctuation that trail a URL in prose.
const TRAILING_PUNCTUATION: &[char] = &[
    ')', ']', '}', '>', '"', '\'', '、', '，', '。', '；', '：', '！', '？',
];

/// Normalize a raw URL-like token.
///
/// Returns `None` when the cleaned token is not an absolute http(s) URL.
/// Idempotent: a clean URL comes back unchanged.
pub fn sanitize_url(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !INVISIBLE_CHARS.contains(c))
        .collect();

    let stripped = strip_trailing_noise(&cleaned);

    if !(stripped.starts_with("http://") || stripped.starts_with("https://")) {
        return None;
    }
    Url::parse(stripped).ok()?;

    Some(stripped.to_string())
}

/// Strip trailing punctuation runs, footnote carets and dots until none remain.
///
/// The three strips are repeated together because noise interleaves,
/// e.g. `...page^2^。` or `...page).`.
fn strip_trailing_noise(s: &str) -> &str {
    let mut current = s;
    loop {
        let next = current.trim_end_matches(TRAILING_PUNCTUATION);
        let next = strip_footnote_marker(next);
        let next = next.trim_end_matches('.');
        if next.len() == current.len() {
            return current;
        }
        current = next;
    }
}

/// Remove one trailing `^digits^` marker, if present.
fn strip_footnote_marker(s: &str) -> &str {
    let Some(body) = s.strip_suffix('^') else {
        return s;
    };
    let digits = body.len() - body.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return s;
    }
    match body[..body.len() - digits].strip_suffix('^') {
        Some(rest) => rest,
        None => s,
    }
}
