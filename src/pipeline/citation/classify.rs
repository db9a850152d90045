//! Coarse source-type badges and publication years for citations.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Kind of source a citation points at, derived from host and title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    Guideline,
    Agency,
    Journal,
    Meta,
    PubMed,
    Source,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guideline => "Guideline",
            Self::Agency => "Agency",
            Self::Journal => "Journal",
            Self::Meta => "Meta",
            Self::PubMed => "PubMed",
            Self::Source => "Source",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const GUIDELINE_HOSTS: &[&str] = &["jpnsh.jp", "escardio.org", "acc.org"];
const PUBMED_HOSTS: &[&str] = &["ncbi.nlm.nih.gov"];
const AGENCY_HOSTS: &[&str] = &["who.int", "nih.gov", "mhlw.go.jp", "cdc.gov"];
const JOURNAL_HOSTS: &[&str] = &["jamanetwork.com", "nejm.org", "sciencedirect.com"];

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"20\d{2}").expect("valid regex"));

/// Classify a citation by hostname, refined by title keywords.
///
/// Hosts are matched by substring so that `www.` and regional subdomains
/// classify like their parent. PubMed is checked before the agency list,
/// which would otherwise swallow it through `nih.gov`.
pub fn classify_source(host: &str, title: &str) -> SourceKind {
    let host = host.to_lowercase();
    let title = title.to_lowercase();
    let mentions = |hosts: &[&str]| hosts.iter().any(|h| host.contains(h));
    let is_review = title.contains("meta") || title.contains("systematic");

    if mentions(GUIDELINE_HOSTS) {
        SourceKind::Guideline
    } else if mentions(PUBMED_HOSTS) {
        if is_review {
            SourceKind::Meta
        } else {
            SourceKind::PubMed
        }
    } else if mentions(AGENCY_HOSTS) {
        SourceKind::Agency
    } else if mentions(JOURNAL_HOSTS) {
        if is_review {
            SourceKind::Meta
        } else {
            SourceKind::Journal
        }
    } else {
        SourceKind::Source
    }
}

/// First `20xx` year mentioned in a title.
pub fn extract_year(title: &str) -> Option<u16> {
    YEAR_RE.find(title).and_then(|m| m.as_str().parse().ok())
}

/// Display filter over the citation list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationFilter {
    /// Only show this kind; `None` shows all.
    pub kind: Option<SourceKind>,
    /// Only show citations from this year on. Citations without a year
    /// are hidden while a minimum is set.
    pub min_year: Option<u16>,
}

impl CitationFilter {
    pub fn accepts(&self, kind: SourceKind, year: Option<u16>) -> bool {
        let kind_ok = self.kind.map_or(true, |k| k == kind);
        let year_ok = match self.min_year {
            None => true,
            Some(min) => year.is_some_and(|y| y >= min),
        };
        kind_ok && year_ok
    }
}
