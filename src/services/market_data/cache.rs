use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use super::{errors::FetchError, Quote, RateSource};

const MAX_CACHED_PAIRS: u64 = 256;

/// Wraps a [`RateSource`] and remembers successful quotes per pair code.
///
/// Failures are never cached, so the next call after an error always goes to
/// the inner source.
pub struct CachedSource {
    inner: Arc<dyn RateSource>,
    quotes: Cache<String, Quote>,
}

impl CachedSource {
    pub fn new(inner: Arc<dyn RateSource>, ttl: Duration) -> CachedSource {
        CachedSource {
            inner,
            quotes: Cache::builder()
                .time_to_live(ttl)
                .max_capacity(MAX_CACHED_PAIRS)
                .build(),
        }
    }
}

#[async_trait]
impl RateSource for CachedSource {
    async fn fetch(&self, code: &str) -> Result<Quote, FetchError> {
        if let Some(quote) = self.quotes.get(code).await {
            debug!("Serving {} from quote cache", code);
            return Ok(quote);
        }

        let quote = self.inner.fetch(code).await?;
        self.quotes.insert(code.to_string(), quote.clone()).await;
        Ok(quote)
    }
}
