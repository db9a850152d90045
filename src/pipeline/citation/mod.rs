//! Citation handling: URL sanitization, extraction from answer text,
//! source-trust filtering and display classification.

pub mod classify;
pub mod extract;
pub mod sanitize;
pub mod trust;

use std::collections::HashMap;

use serde::Serialize;

pub use classify::{classify_source, extract_year, CitationFilter, SourceKind};
pub use extract::{extract_urls, link_references};
pub use sanitize::sanitize_url;
pub use trust::{filter_trusted, host_of, TrustStatus, TrustedCitations};

use crate::pipeline::metadata::MetadataResponse;

/// A numbered citation ready for display or export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationView {
    /// 1-based position, matching `[n]` references in the answer.
    pub number: usize,
    pub url: String,
    pub host: String,
    /// Translated title, else original title, else the URL itself.
    pub title: String,
    pub origin_title: Option<String>,
    pub translated_title: Option<String>,
    pub kind: SourceKind,
    pub year: Option<u16>,
    pub doi: Option<String>,
}

impl CitationView {
    pub fn doi_link(&self) -> Option<String> {
        self.doi.as_ref().map(|doi| format!("https://doi.org/{doi}"))
    }
}

/// Number the trusted URLs and join them with whatever metadata is known.
pub fn build_views(
    urls: &[String],
    metadata: &HashMap<String, MetadataResponse>,
) -> Vec<CitationView> {
    urls.iter()
        .enumerate()
        .map(|(i, url)| {
            let meta = metadata.get(url);
            let origin_title = meta.and_then(|m| m.origin_title.clone());
            let translated_title = meta.and_then(|m| m.translated_title.clone());
            let title = translated_title
                .clone()
                .or_else(|| origin_title.clone())
                .unwrap_or_else(|| url.clone());
            let host = host_of(url).unwrap_or_default();
            let classify_title = origin_title
                .as_deref()
                .or(translated_title.as_deref())
                .unwrap_or_default();
            CitationView {
                number: i + 1,
                url: url.clone(),
                kind: classify_source(&host, classify_title),
                year: extract_year(classify_title),
                host,
                title,
                origin_title,
                translated_title,
                doi: meta.and_then(|m| m.doi.clone()),
            }
        })
        .collect()
}

/// Apply a display filter, keeping original numbering.
pub fn filter_views(views: Vec<CitationView>, filter: &CitationFilter) -> Vec<CitationView> {
    views
        .into_iter()
        .filter(|v| filter.accepts(v.kind, v.year))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(url: &str, origin: Option<&str>, translated: Option<&str>) -> MetadataResponse {
        MetadataResponse {
            url: url.to_string(),
            origin_title: origin.map(str::to_string),
            translated_title: translated.map(str::to_string),
            doi: None,
        }
    }

    #[test]
    fn views_prefer_translated_title() {
        let urls = vec![
            "https://www.who.int/news-room/fact-sheets/detail/hypertension".to_string(),
            "https://www.nejm.org/doi/full/10.1056/NEJMoa1511939".to_string(),
        ];
        let mut known = HashMap::new();
        known.insert(
            urls[0].clone(),
            meta(&urls[0], Some("Hypertension 2023"), Some("高血圧 2023")),
        );

        let views = build_views(&urls, &known);
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].number, 1);
        assert_eq!(views[0].title, "高血圧 2023");
        assert_eq!(views[0].kind, SourceKind::Agency);
        assert_eq!(views[0].year, Some(2023));
        assert_eq!(views[1].title, urls[1]);
        assert_eq!(views[1].host, "www.nejm.org");
        assert_eq!(views[1].kind, SourceKind::Journal);
    }

    #[test]
    fn filter_keeps_numbering() {
        let urls = vec![
            "https://www.who.int/a".to_string(),
            "https://www.nejm.org/b".to_string(),
        ];
        let views = build_views(&urls, &HashMap::new());
        let journals = filter_views(
            views,
            &CitationFilter {
                kind: Some(SourceKind::Journal),
                min_year: None,
            },
        );
        assert_eq!(journals.len(), 1);
        assert_eq!(journals[0].number, 2);
    }

    #[test]
    fn doi_link_format() {
        let mut known = HashMap::new();
        let url = "https://www.nejm.org/x".to_string();
        known.insert(
            url.clone(),
            MetadataResponse {
                doi: Some("10.1056/NEJMoa1511939".into()),
                ..meta(&url, None, None)
            },
        );
        let views = build_views(&[url], &known);
        assert_eq!(
            views[0].doi_link().as_deref(),
            Some("https://doi.org/10.1056/NEJMoa1511939")
        );
    }
}
