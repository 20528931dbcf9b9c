use crate::core::models::publisher::PublisherIdentity;
use moka::future::Cache;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Cache entry for a fully resolved per-bidder parameter set, keyed by
/// `publisher_id|domain|ad_unit_path|bidder_code` (§6.4). `moka`'s
/// `get_with` gives us request-scoped singleflight for free: concurrent
/// misses on the same key block behind one resolution instead of each
/// hitting the backing store.
#[derive(Clone)]
pub struct ResolverCache {
    inner: Cache<String, Arc<Value>>,
}

impl ResolverCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub fn key(publisher_id: &str, domain: &str, ad_unit_path: &str, bidder_code: &str) -> String {
        format!("{publisher_id}|{domain}|{ad_unit_path}|{bidder_code}")
    }

    pub async fn get_with<F, Fut>(&self, key: String, init: F) -> Arc<Value>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Arc<Value>>,
    {
        self.inner.get_with(key, init()).await
    }

    /// Non-populating lookup; used to skip a store round-trip for
    /// bidders already warm in cache before batching the remainder.
    pub async fn get(&self, key: &str) -> Option<Arc<Value>> {
        self.inner.get(key).await
    }

    pub fn invalidate(&self, key: &str) {
        self.inner.invalidate(key);
    }

    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

/// Bounded TTL cache for resolved publisher identity (§4.4 fallback step
/// 3). Populated on every successful KV or relational-store lookup so
/// a subsequent outage of both live stores still serves the last known
/// identity instead of failing the auction outright.
#[derive(Clone)]
pub struct PublisherIdentityCache {
    inner: Cache<String, Arc<PublisherIdentity>>,
}

impl PublisherIdentityCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn get(&self, publisher_id: &str) -> Option<Arc<PublisherIdentity>> {
        self.inner.get(publisher_id).await
    }

    pub fn insert(&self, publisher_id: String, identity: Arc<PublisherIdentity>) {
        self.inner.insert(publisher_id, identity);
    }
}
