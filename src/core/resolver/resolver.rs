use crate::core::models::publisher::{PublisherIdentity, PublisherStatus};
use crate::core::resolver::cache::{PublisherIdentityCache, ResolverCache};
use crate::core::resolver::schema::BidderSchema;
use crate::core::resolver::store::{KvStore, SqlStore, Tier};
use anyhow::bail;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// A missing publisher is a hard 4xx to the caller; a missing per-bidder
/// config is not, and is handled by simply omitting that bidder from
/// the returned map. `DependencyDown` is distinct from `PublisherNotFound`:
/// it means the lookup itself failed (KV and SQL both errored) rather
/// than the publisher genuinely not existing, and maps to a 503 at the
/// HTTP boundary (§7) rather than a 401/403.
#[derive(Debug)]
pub enum ResolverError {
    PublisherNotFound(String),
    DependencyDown(String),
    Conflict { publisher_id: String },
}

impl std::fmt::Display for ResolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolverError::PublisherNotFound(id) => write!(f, "publisher `{id}` not found or inactive"),
            ResolverError::DependencyDown(id) => {
                write!(f, "publisher `{id}` lookup failed: KV and SQL stores both unreachable")
            }
            ResolverError::Conflict { publisher_id } => {
                write!(f, "optimistic-concurrency conflict writing publisher `{publisher_id}`")
            }
        }
    }
}

impl std::error::Error for ResolverError {}

/// Static last-resort allow-list supplied by config, consulted only when
/// every upstream publisher-identity lookup has failed (§4.4 fallback
/// step 4).
#[derive(Debug, Clone, Default)]
pub struct RegisteredPubs {
    pub entries: HashMap<String, PublisherIdentity>,
}

/// Configuration Resolver (C4). Resolves bidder parameter objects and
/// publisher identity through the three-tier hierarchy, backed by a
/// bounded TTL cache with singleflight coalescing on miss.
pub struct ConfigResolver {
    kv: Arc<dyn KvStore>,
    sql: Arc<dyn SqlStore>,
    cache: ResolverCache,
    identity_cache: PublisherIdentityCache,
    schemas: HashMap<String, BidderSchema>,
    registered_pubs: RegisteredPubs,
}

impl ConfigResolver {
    pub fn new(
        kv: Arc<dyn KvStore>,
        sql: Arc<dyn SqlStore>,
        cache: ResolverCache,
        identity_cache: PublisherIdentityCache,
        schemas: HashMap<String, BidderSchema>,
        registered_pubs: RegisteredPubs,
    ) -> Self {
        Self {
            kv,
            sql,
            cache,
            identity_cache,
            schemas,
            registered_pubs,
        }
    }

    /// Builds the minimal identity the KV tier is authoritative for: just
    /// the allowed-domains hint stored at `publishers:allowed_domains`.
    /// Status and multiplier aren't carried by that hash, so a KV hit is
    /// always treated as an active, default-multiplier publisher; the
    /// relational store remains the source of truth for those fields and
    /// is consulted on every KV miss.
    fn identity_from_kv_hint(publisher_id: &str, allowed_domains_csv: &str) -> PublisherIdentity {
        PublisherIdentity {
            id: publisher_id.to_string(),
            allowed_domains: allowed_domains_csv
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            bid_multiplier: 1.0,
            status: PublisherStatus::Active,
            version: 0,
        }
    }

    /// Fallback chain (§4.4): Redis-shaped KV hash, then the relational
    /// store, then the bounded in-memory cache of previously resolved
    /// identities, then the static allow-list. The first two are live
    /// tiers and either can answer authoritatively; the cache only comes
    /// into play once both live tiers fail to reach their backing store
    /// (not merely report a miss), which is also the only case that
    /// surfaces `DependencyDown` (§7's 503 path).
    pub async fn get_publisher(&self, publisher_id: &str) -> Result<PublisherIdentity, ResolverError> {
        let kv_result = self.kv.hget("publishers:allowed_domains", publisher_id).await;
        if let Ok(Some(allowed_domains_csv)) = &kv_result {
            let identity = Self::identity_from_kv_hint(publisher_id, allowed_domains_csv);
            self.identity_cache.insert(publisher_id.to_string(), Arc::new(identity.clone()));
            return Ok(identity);
        }

        let sql_result = self.sql.get_active_publisher(publisher_id).await;
        if let Ok(Some(identity)) = &sql_result {
            self.identity_cache.insert(publisher_id.to_string(), Arc::new(identity.clone()));
            return Ok(identity.clone());
        }

        if kv_result.is_err() && sql_result.is_err() {
            if let Some(identity) = self.identity_cache.get(publisher_id).await {
                return Ok((*identity).clone());
            }
            return Err(ResolverError::DependencyDown(publisher_id.to_string()));
        }

        if let Some(identity) = self.registered_pubs.entries.get(publisher_id) {
            if identity.is_active() {
                return Ok(identity.clone());
            }
        }

        Err(ResolverError::PublisherNotFound(publisher_id.to_string()))
    }

    /// Single batched path: at most one relational-store call per tier
    /// (three total), each covering the whole bidder list via `ANY(...)`
    /// style predicates on the reference store. Entries are cached
    /// individually so a later call with an overlapping bidder list can
    /// reuse warm entries instead of re-querying.
    pub async fn get_all_bidder_configs_batch(
        &self,
        publisher_id: &str,
        domain: &str,
        ad_unit_path: &str,
        bidder_codes: &[String],
    ) -> anyhow::Result<HashMap<String, Value>> {
        let mut resolved: HashMap<String, Value> = HashMap::new();
        let mut remaining: Vec<String> = bidder_codes.to_vec();

        for tier in [Tier::Unit, Tier::Domain, Tier::Publisher] {
            if remaining.is_empty() {
                break;
            }

            let mut still_remaining = Vec::new();

            for bidder in &remaining {
                let key = ResolverCache::key(publisher_id, domain, ad_unit_path, bidder);
                if let Some(cached) = self.cache_peek(&key).await {
                    resolved.insert(bidder.clone(), (*cached).clone());
                    continue;
                }
                still_remaining.push(bidder.clone());
            }

            if still_remaining.is_empty() {
                continue;
            }

            let rows = self
                .sql
                .get_tier_configs(
                    tier,
                    publisher_id,
                    Some(domain),
                    Some(ad_unit_path),
                    &still_remaining,
                )
                .await?;

            let mut hit_this_tier = Vec::new();
            for row in rows {
                let key = ResolverCache::key(publisher_id, domain, ad_unit_path, &row.bidder_code);
                let params = Arc::new(row.params.clone());
                self.cache.get_with(key, || async move { params }).await;
                resolved.insert(row.bidder_code.clone(), row.params);
                hit_this_tier.push(row.bidder_code);
            }

            still_remaining.retain(|b| !hit_this_tier.contains(b));
            remaining = still_remaining;
        }

        Ok(resolved)
    }

    async fn cache_peek(&self, key: &str) -> Option<Arc<Value>> {
        self.cache.get(key).await
    }

    pub fn validate(&self, bidder_code: &str, params: &Value) -> Vec<String> {
        match self.schemas.get(bidder_code) {
            Some(schema) => schema.validate(params),
            None => Vec::new(),
        }
    }

    pub async fn write_publisher(
        &self,
        updated: PublisherIdentity,
        expected_version: i64,
    ) -> Result<PublisherIdentity, ResolverError> {
        let publisher_id = updated.id.clone();
        match self.sql.write_publisher(updated, expected_version).await {
            Ok(Some(row)) => Ok(row),
            Ok(None) => Err(ResolverError::Conflict { publisher_id }),
            Err(_) => Err(ResolverError::Conflict { publisher_id }),
        }
    }
}

/// Builds a resolver from config validation errors into a single
/// aggregated `anyhow::Error`, used at startup (C9) to fail fast if any
/// registered bidder's static params don't satisfy its schema.
pub fn validate_startup_params(
    schemas: &HashMap<String, BidderSchema>,
    startup_params: &HashMap<String, Value>,
) -> anyhow::Result<()> {
    let mut violations = Vec::new();

    for (bidder_code, params) in startup_params {
        if let Some(schema) = schemas.get(bidder_code) {
            for violation in schema.validate(params) {
                violations.push(format!("{bidder_code}: {violation}"));
            }
        }
    }

    if !violations.is_empty() {
        bail!("bidder parameter validation failed: {}", violations.join("; "));
    }

    Ok(())
}
