use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::{PricingError, PricingResult};

/// Fetch capability for raw pricing documents.
///
/// The engine never performs I/O itself; the binary plugs in an HTTP
/// implementation, tests plug in fixtures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Return the raw text published at `url`
    async fn fetch(&self, url: &str) -> PricingResult<String>;
}

/// In-memory documents keyed by URL
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    documents: HashMap<String, String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.documents.insert(url.into(), body.into());
        self
    }
}

#[async_trait]
impl DocumentSource for StaticSource {
    async fn fetch(&self, url: &str) -> PricingResult<String> {
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| PricingError::fetch_failed(url, "no such document"))
    }
}
