//! Source-trust filtering of extracted citations.
//!
//! The allow-list is assembled per query from static tables: a base set of
//! health authorities, topic sets switched on by query keywords, and a
//! fixed set of journals and agencies. Hostnames must match exactly.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;
use serde::Serialize;

/// Health authorities trusted for every query.
const BASE_DOMAINS: &[&str] = &["who.int", "ncbi.nlm.nih.gov", "nih.gov", "mhlw.go.jp"];

/// Major journals and agencies, always trusted.
const EXTRA_DOMAINS: &[&str] = &[
    "escardio.org",
    "acc.org",
    "ahajournals.org",
    "jamanetwork.com",
    "nejm.org",
    "sciencedirect.com",
    "cdc.gov",
];

/// Topic-conditional additions: keyword pattern → society domains.
struct TopicDomains {
    keywords: Regex,
    domains: &'static [&'static str],
}

static TOPIC_DOMAINS: LazyLock<Vec<TopicDomains>> = LazyLock::new(|| {
    vec![
        topic(r"(?i)高血圧|血圧|高血压|血压", &["jpnsh.jp"]),
        topic(r"(?i)糖尿病|血糖|HbA1c", &["jds.or.jp"]),
    ]
});

fn topic(pattern: &str, domains: &'static [&'static str]) -> TopicDomains {
    TopicDomains {
        keywords: Regex::new(pattern).expect("valid regex"),
        domains,
    }
}

/// Whether the returned list passed through the allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustStatus {
    /// Every URL is on the allow-list.
    Filtered,
    /// Nothing matched the allow-list; the input is returned unverified.
    Unfiltered,
}

/// Trust-filtered citation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrustedCitations {
    pub urls: Vec<String>,
    pub status: TrustStatus,
}

/// Assemble the allow-list for a query.
pub fn trusted_domains(query: &str) -> HashSet<&'static str> {
    let mut allow: HashSet<&'static str> = BASE_DOMAINS.iter().copied().collect();
    for topic in TOPIC_DOMAINS.iter() {
        if topic.keywords.is_match(query) {
            allow.extend(topic.domains.iter().copied());
        }
    }
    allow.extend(EXTRA_DOMAINS.iter().copied());
    allow
}

/// Narrow extracted URLs to trusted hosts.
///
/// Order is preserved. If nothing survives, the input is returned as-is
/// with `TrustStatus::Unfiltered`; showing unverified sources is preferred
/// over showing none. URLs without a parseable host never pass the filter.
pub fn filter_trusted(urls: &[String], query: &str) -> TrustedCitations {
    let allow = trusted_domains(query);
    let picked: Vec<String> = urls
        .iter()
        .filter(|u| host_of(u).is_some_and(|h| allow.contains(h.as_str())))
        .cloned()
        .collect();

    if picked.is_empty() && !urls.is_empty() {
        tracing::debug!(
            candidates = urls.len(),
            "No citation on the trust allow-list; returning unfiltered list"
        );
        return TrustedCitations {
            urls: urls.to_vec(),
            status: TrustStatus::Unfiltered,
        };
    }

    TrustedCitations {
        urls: picked,
        status: TrustStatus::Filtered,
    }
}

/// Hostname of a URL, if it parses and has one.
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url).ok()?.host_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn keeps_only_allow_listed_hosts() {
        let input = urls(&[
            "https://who.int/news",
            "https://example.com/blog",
            "https://nejm.org/doi/x",
        ]);
        let out = filter_trusted(&input, "how to lower cholesterol");
        assert_eq!(out.urls, urls(&["https://who.int/news", "https://nejm.org/doi/x"]));
        assert_eq!(out.status, TrustStatus::Filtered);
    }

    #[test]
    fn subdomains_do_not_match() {
        let input = urls(&["https://www.who.int/news", "https://who.int/x"]);
        let out = filter_trusted(&input, "");
        assert_eq!(out.urls, urls(&["https://who.int/x"]));
    }

    #[test]
    fn hypertension_query_enables_jsh() {
        let input = urls(&["https://jpnsh.jp/general/", "https://example.com/"]);
        let out = filter_trusted(&input, "高血圧の治療は？");
        assert_eq!(out.urls, urls(&["https://jpnsh.jp/general/"]));

        let without_topic = filter_trusted(&input, "風邪の治療は？");
        assert_eq!(without_topic.status, TrustStatus::Unfiltered);
    }

    #[test]
    fn diabetes_keyword_case_insensitive() {
        let allow = trusted_domains("hba1c target");
        assert!(allow.contains("jds.or.jp"));
        assert!(!allow.contains("jpnsh.jp"));
    }

    #[test]
    fn empty_result_falls_back_to_input() {
        let input = urls(&["https://example.com/a", "https://blog.example.org/b"]);
        let out = filter_trusted(&input, "高血圧");
        assert_eq!(out.urls, input);
        assert_eq!(out.status, TrustStatus::Unfiltered);
    }

    #[test]
    fn empty_input_stays_empty() {
        let out = filter_trusted(&[], "高血圧");
        assert!(out.urls.is_empty());
        assert_eq!(out.status, TrustStatus::Filtered);
    }

    #[test]
    fn output_is_subset_or_equal() {
        let input = urls(&[
            "https://cdc.gov/a",
            "https://evil.example/",
            "https://mhlw.go.jp/b",
            "not a url",
        ]);
        let out = filter_trusted(&input, "");
        assert!(out.urls.iter().all(|u| input.contains(u)));
        assert!(!out.urls.is_empty());
        assert!(!out.urls.contains(&"not a url".to_string()));
    }

    #[test]
    fn host_of_handles_garbage() {
        assert_eq!(host_of("https://nih.gov/x").as_deref(), Some("nih.gov"));
        assert_eq!(host_of("::nope::"), None);
    }
}
