//! Citation metadata: page title, DOI and translated title per URL,
//! memoized in a bounded process-wide cache.

pub mod cache;
pub mod html;
pub mod resolver;
pub mod translate;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cache::{MetadataCache, MetadataEntry};
pub use resolver::{HttpPageFetcher, MetadataResolver, PageFetcher, SharedCache, TitleTranslator};
pub use translate::LlmTitleTranslator;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Invalid URL (http/https only): {0}")]
    InvalidUrl(String),

    #[error("Page fetch failed: {0}")]
    Fetch(String),

    #[error("Page returned HTTP {status}")]
    Status { status: u16 },
}

/// Body of a metadata lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataRequest {
    pub url: String,
    #[serde(default)]
    pub target_lang: Option<String>,
}

/// Result of a metadata lookup. Every field but `url` may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataResponse {
    pub url: String,
    pub origin_title: Option<String>,
    pub translated_title: Option<String>,
    pub doi: Option<String>,
}

impl MetadataResponse {
    /// Response for a page that could not be read.
    pub fn empty(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Default::default()
        }
    }
}
