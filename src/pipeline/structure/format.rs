//! Markdown → plain text normalization for validation and export.

use std::sync::LazyLock;

use regex::Regex;

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex")
}

/// (pattern, replacement) applied in order.
static RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        // fenced code blocks
        (re(r"(?s)```.*?```"), ""),
        (re(r"`([^`]*)`"), "${1}"),
        // bullets before emphasis so a leading `*` is not read as italics
        (re(r"(?m)^[ \t]*[-*+][ \t]+"), "• "),
        (re(r"\*\*([^*\n]+)\*\*"), "${1}"),
        (re(r"\*([^*\n]+)\*"), "${1}"),
        // word-bounded so snake_case and URL underscores survive
        (re(r"\b_([^_\n]+)_\b"), "${1}"),
        (re(r"\^(\d+)\^"), "[${1}]"),
        (re(r"(?m)^#{1,6}[ \t]*"), ""),
        (re(r"(?m)^[ \t]*>+[ \t]?"), ""),
        (re(r"!\[[^\]]*\]\([^)]*\)"), ""),
        (re(r"\[([^\]]+)\]\(([^)]+)\)"), "${1} (${2})"),
        (re(r"\n{3,}"), "\n\n"),
    ]
});

/// Strip markdown decoration, keeping text, `[n]` references and URLs.
pub fn format_plain(content: &str) -> String {
    let mut text = content.to_string();
    for (pattern, replacement) in RULES.iter() {
        text = pattern.replace_all(&text, *replacement).into_owned();
    }
    text.trim().to_string()
}
