use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use anyhow::Result;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::application::usecases::payments::RateGateway;

/// A single upstream price feed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rate(&self, from_currency: &str, to_currency: &str) -> Result<BigDecimal>;
}

struct CacheEntry {
    rate: BigDecimal,
    observed_at: Instant,
}

/// Serves exchange rates with a TTL cache over two upstream feeds. Lookup
/// order: fresh cache, primary feed, secondary feed, stale cache, and
/// finally the configured fallback constant, so a quote is always produced.
/// A stale rate only ever skews the quote; correctness of settlement rests
/// on the on-chain verification downstream.
pub struct RateConverter<P, S>
where
    P: RateSource,
    S: RateSource,
{
    primary: P,
    secondary: S,
    ttl: Duration,
    fallback_rate: BigDecimal,
    cache: Mutex<HashMap<(String, String), CacheEntry>>,
}

impl<P, S> RateConverter<P, S>
where
    P: RateSource,
    S: RateSource,
{
    pub fn new(primary: P, secondary: S, ttl: Duration, fallback_rate: BigDecimal) -> Self {
        Self {
            primary,
            secondary,
            ttl,
            fallback_rate,
            cache: Mutex::new(HashMap::new()),
        }
    }

    async fn fetch_and_cache(&self, from_currency: &str, to_currency: &str) -> BigDecimal {
        let pair = (from_currency.to_string(), to_currency.to_string());

        match self.primary.fetch_rate(from_currency, to_currency).await {
            Ok(rate) => {
                self.store(pair, rate.clone()).await;
                return rate;
            }
            Err(err) => {
                warn!(
                    from_currency,
                    to_currency,
                    error = %err,
                    "rates: primary feed failed, trying secondary"
                );
            }
        }

        match self.secondary.fetch_rate(from_currency, to_currency).await {
            Ok(rate) => {
                self.store(pair, rate.clone()).await;
                return rate;
            }
            Err(err) => {
                warn!(
                    from_currency,
                    to_currency,
                    error = %err,
                    "rates: secondary feed failed, falling back to cache"
                );
            }
        }

        // both feeds down: a stale cached rate beats the hardcoded constant
        let cache = self.cache.lock().await;
        if let Some(entry) = cache.get(&pair) {
            warn!(
                from_currency,
                to_currency,
                stale_for_secs = entry.observed_at.elapsed().as_secs(),
                "rates: serving stale cached rate"
            );
            return entry.rate.clone();
        }

        warn!(
            from_currency,
            to_currency,
            fallback_rate = %self.fallback_rate,
            "rates: no feed and no cache, serving fallback constant"
        );
        self.fallback_rate.clone()
    }

    async fn store(&self, pair: (String, String), rate: BigDecimal) {
        info!(
            from_currency = %pair.0,
            to_currency = %pair.1,
            rate = %rate,
            "rates: refreshed rate"
        );
        let mut cache = self.cache.lock().await;
        cache.insert(
            pair,
            CacheEntry {
                rate,
                observed_at: Instant::now(),
            },
        );
    }
}

#[async_trait]
impl<P, S> RateGateway for RateConverter<P, S>
where
    P: RateSource,
    S: RateSource,
{
    async fn get_rate(&self, from_currency: &str, to_currency: &str) -> BigDecimal {
        let pair = (from_currency.to_string(), to_currency.to_string());

        {
            let cache = self.cache.lock().await;
            if let Some(entry) = cache.get(&pair) {
                if entry.observed_at.elapsed() < self.ttl {
                    debug!(from_currency, to_currency, "rates: cache hit");
                    return entry.rate.clone();
                }
            }
        }

        self.fetch_and_cache(from_currency, to_currency).await
    }
}
