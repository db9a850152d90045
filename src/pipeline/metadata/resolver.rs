//! Cache-first metadata resolution with degrade-to-partial failures.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::cache::{MetadataCache, MetadataEntry};
use super::html::{extract_doi, extract_title};
use super::{MetadataError, MetadataResponse};
use crate::config::PAGE_FETCH_TIMEOUT_SECS;

/// Language key used when the caller names no target.
const DEFAULT_TARGET_LANG: &str = "en";

/// Process-wide cache handle, injected into the resolver.
pub type SharedCache = Arc<Mutex<MetadataCache>>;

/// Fetches the HTML of a citation page.
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, MetadataError>> + Send;
}

/// Translates a page title. `None` means no translation was produced.
pub trait TitleTranslator: Send + Sync {
    fn translate(&self, title: &str, target_lang: &str)
        -> impl Future<Output = Option<String>> + Send;
}

/// reqwest-backed page fetcher with a hard timeout.
#[derive(Clone)]
pub struct HttpPageFetcher {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpPageFetcher {
    pub fn new(timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            timeout_secs,
        }
    }
}

impl Default for HttpPageFetcher {
    fn default() -> Self {
        Self::new(PAGE_FETCH_TIMEOUT_SECS)
    }
}

impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, MetadataError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                MetadataError::Fetch(format!("timed out after {}s", self.timeout_secs))
            } else {
                MetadataError::Fetch(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetadataError::Status {
                status: status.as_u16(),
            });
        }
        response
            .text()
            .await
            .map_err(|e| MetadataError::Fetch(e.to_string()))
    }
}

/// Resolves title, DOI and translated title for citation URLs.
pub struct MetadataResolver<F, T> {
    cache: SharedCache,
    fetcher: F,
    translator: T,
}

impl<F: PageFetcher, T: TitleTranslator> MetadataResolver<F, T> {
    pub fn new(cache: SharedCache, fetcher: F, translator: T) -> Self {
        Self {
            cache,
            fetcher,
            translator,
        }
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    /// Look up metadata for `url`.
    ///
    /// Only a non-http(s) URL is an error. Fetch failures produce an
    /// empty response that is not cached, so a later call retries.
    pub async fn resolve(
        &self,
        url: &str,
        target_lang: Option<&str>,
    ) -> Result<MetadataResponse, MetadataError> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(MetadataError::InvalidUrl(url.to_string()));
        }
        let lang = target_lang.unwrap_or(DEFAULT_TARGET_LANG);

        if let Some(cached) = self.cached(url) {
            return Ok(self.complete_cached(url, lang, cached).await);
        }

        let html = match self.fetcher.fetch(url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Citation page unavailable");
                return Ok(MetadataResponse::empty(url));
            }
        };

        let origin_title = extract_title(&html);
        let doi = extract_doi(&html);
        let translated_title = self.translate_if_needed(origin_title.as_deref(), lang).await;

        let mut entry = MetadataEntry {
            origin_title: origin_title.clone(),
            doi: doi.clone(),
            ..Default::default()
        };
        entry
            .translations
            .insert(lang.to_string(), translated_title.clone());
        self.store(url, entry);

        tracing::debug!(
            url = %url,
            has_title = origin_title.is_some(),
            has_doi = doi.is_some(),
            "Resolved citation metadata"
        );

        Ok(MetadataResponse {
            url: url.to_string(),
            origin_title,
            translated_title,
            doi,
        })
    }

    /// Serve a cache hit, translating the stored title only when the
    /// target language has never been attempted.
    async fn complete_cached(
        &self,
        url: &str,
        lang: &str,
        cached: MetadataEntry,
    ) -> MetadataResponse {
        let mut translated_title = cached.translation(lang).map(str::to_string);
        if !cached.translations.contains_key(lang) && cached.origin_title.is_some() {
            translated_title = self
                .translate_if_needed(cached.origin_title.as_deref(), lang)
                .await;
            let mut update = MetadataEntry::default();
            update
                .translations
                .insert(lang.to_string(), translated_title.clone());
            self.store(url, update);
        }
        MetadataResponse {
            url: url.to_string(),
            origin_title: cached.origin_title,
            translated_title,
            doi: cached.doi,
        }
    }

    async fn translate_if_needed(&self, title: Option<&str>, lang: &str) -> Option<String> {
        let title = title.filter(|t| !t.is_empty())?;
        if lang == DEFAULT_TARGET_LANG {
            return None;
        }
        self.translator.translate(title, lang).await
    }

    fn cached(&self, url: &str) -> Option<MetadataEntry> {
        self.cache.lock().ok()?.get(url).cloned()
    }

    /// Merge `update` into whatever is cached for `url` now. Lookups for
    /// other languages may have stored since this one read the cache.
    fn store(&self, url: &str, update: MetadataEntry) {
        if let Ok(mut cache) = self.cache.lock() {
            let mut entry = cache.get(url).cloned().unwrap_or_default();
            entry.merge(update);
            cache.put(url, entry);
        }
    }
}
