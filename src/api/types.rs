//! Shared state for the API router.

use std::sync::{Arc, Mutex};

use crate::config::{Environment, METADATA_CACHE_CAPACITY, PAGE_FETCH_TIMEOUT_SECS};
use crate::pipeline::metadata::{HttpPageFetcher, LlmTitleTranslator, MetadataCache, MetadataResolver};
use crate::upstream::{ChatGateway, UpstreamConfig};

pub type ApiResolver = MetadataResolver<HttpPageFetcher, LlmTitleTranslator<ChatGateway>>;

/// Shared context for all API routes.
///
/// The resolver owns the process-wide metadata cache; the gateway is
/// shared with the title translator.
#[derive(Clone)]
pub struct ApiContext {
    pub gateway: Arc<ChatGateway>,
    pub resolver: Arc<ApiResolver>,
}

impl ApiContext {
    pub fn new(upstream: UpstreamConfig, environment: Environment) -> Self {
        Self::with_gateway(ChatGateway::new(upstream, environment))
    }

    pub fn with_gateway(gateway: ChatGateway) -> Self {
        let gateway = Arc::new(gateway);
        let cache = Arc::new(Mutex::new(MetadataCache::with_capacity(METADATA_CACHE_CAPACITY)));
        let resolver = MetadataResolver::new(
            cache,
            HttpPageFetcher::new(PAGE_FETCH_TIMEOUT_SECS),
            LlmTitleTranslator::new(Arc::clone(&gateway)),
        );
        Self {
            gateway,
            resolver: Arc::new(resolver),
        }
    }
}
