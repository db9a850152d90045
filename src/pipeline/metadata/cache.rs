//! Bounded URL → metadata cache with least-recently-touched eviction.
//!
//! Recency is refreshed only by `put`; reads leave the order alone.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::config::METADATA_CACHE_CAPACITY;

/// Cached lookup result for one URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataEntry {
    pub origin_title: Option<String>,
    /// Target language code → translated title. `None` records that a
    /// translation was attempted and produced nothing.
    pub translations: BTreeMap<String, Option<String>>,
    pub doi: Option<String>,
}

impl MetadataEntry {
    /// Stored translation for `lang`, if one was produced.
    pub fn translation(&self, lang: &str) -> Option<&str> {
        self.translations.get(lang).and_then(|t| t.as_deref())
    }

    /// Fold `other` into this entry. Known title and DOI are kept; a
    /// produced translation replaces a `None` marker but never the reverse.
    pub fn merge(&mut self, other: MetadataEntry) {
        if self.origin_title.is_none() {
            self.origin_title = other.origin_title;
        }
        if self.doi.is_none() {
            self.doi = other.doi;
        }
        for (lang, translated) in other.translations {
            let slot = self.translations.entry(lang).or_insert(None);
            if slot.is_none() {
                *slot = translated;
            }
        }
    }
}

#[derive(Debug)]
struct Slot {
    entry: MetadataEntry,
    touched: u64,
}

/// In-memory LRU keyed by the literal URL string.
#[derive(Debug)]
pub struct MetadataCache {
    capacity: usize,
    slots: HashMap<String, Slot>,
    /// touch tick → key, oldest first
    recency: BTreeMap<u64, String>,
    tick: u64,
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::with_capacity(METADATA_CACHE_CAPACITY)
    }
}

impl MetadataCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            slots: HashMap::new(),
            recency: BTreeMap::new(),
            tick: 0,
        }
    }

    pub fn get(&self, url: &str) -> Option<&MetadataEntry> {
        self.slots.get(url).map(|slot| &slot.entry)
    }

    /// Insert or replace, mark as most recent, and evict the oldest entry
    /// if the cache grew past capacity.
    pub fn put(&mut self, url: &str, entry: MetadataEntry) {
        self.tick += 1;
        let touched = self.tick;
        if let Some(previous) = self.slots.insert(url.to_string(), Slot { entry, touched }) {
            self.recency.remove(&previous.touched);
        }
        self.recency.insert(touched, url.to_string());

        if self.slots.len() > self.capacity {
            if let Some((_, oldest)) = self.recency.pop_first() {
                self.slots.remove(&oldest);
                tracing::trace!(url = %oldest, "Evicted metadata cache entry");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str) -> MetadataEntry {
        MetadataEntry {
            origin_title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn default_capacity_is_200() {
        assert_eq!(MetadataCache::default().capacity(), 200);
    }

    #[test]
    fn overflow_evicts_oldest() {
        let mut cache = MetadataCache::default();
        for i in 0..201 {
            cache.put(&format!("https://example.org/{i}"), entry(&i.to_string()));
        }
        assert_eq!(cache.len(), 200);
        assert!(cache.get("https://example.org/0").is_none());
        assert!(cache.get("https://example.org/1").is_some());
        assert!(cache.get("https://example.org/200").is_some());
    }

    #[test]
    fn replace_refreshes_recency() {
        let mut cache = MetadataCache::with_capacity(2);
        cache.put("a", entry("a"));
        cache.put("b", entry("b"));
        cache.put("a", entry("a2"));
        cache.put("c", entry("c"));

        assert!(cache.get("b").is_none());
        assert_eq!(cache.get("a").unwrap().origin_title.as_deref(), Some("a2"));
        assert!(cache.get("c").is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn get_does_not_refresh_recency() {
        let mut cache = MetadataCache::with_capacity(2);
        cache.put("a", entry("a"));
        cache.put("b", entry("b"));
        assert!(cache.get("a").is_some());
        cache.put("c", entry("c"));
        assert!(cache.get("a").is_none());
    }

    #[test]
    fn translation_marker() {
        let mut e = entry("Title");
        e.translations.insert("ja".into(), None);
        e.translations.insert("zh".into(), Some("标题".into()));
        assert_eq!(e.translation("ja"), None);
        assert_eq!(e.translation("zh"), Some("标题"));
        assert_eq!(e.translation("ko"), None);
    }

    #[test]
    fn merge_adds_languages_without_dropping_any() {
        let mut current = entry("Title");
        current.translations.insert("ja".into(), Some("タイトル".into()));
        current.translations.insert("ko".into(), None);

        let mut update = MetadataEntry {
            origin_title: Some("Other".into()),
            doi: Some("10.1/abc".into()),
            ..Default::default()
        };
        update.translations.insert("zh".into(), Some("标题".into()));
        update.translations.insert("ko".into(), Some("제목".into()));
        update.translations.insert("ja".into(), None);
        current.merge(update);

        assert_eq!(current.origin_title.as_deref(), Some("Title"));
        assert_eq!(current.doi.as_deref(), Some("10.1/abc"));
        assert_eq!(current.translation("ja"), Some("タイトル"));
        assert_eq!(current.translation("zh"), Some("标题"));
        assert_eq!(current.translation("ko"), Some("제목"));
    }
}
