use crate::core::models::publisher::{PublisherIdentity, PublisherStatus};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Unit,
    Domain,
    Publisher,
}

#[derive(Debug, Clone)]
pub struct BidderConfigRow {
    pub bidder_code: String,
    pub params: Value,
}

/// Narrow key/value cache interface (§6.4): `HGET`/`PING` only, so the
/// resolver depends on external stores through a single-digit-method
/// trait rather than a full client SDK.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn hget(&self, key: &str, field: &str) -> anyhow::Result<Option<String>>;
    async fn ping(&self) -> anyhow::Result<()>;
}

/// Narrow relational-store interface (§6.4): exactly the three read
/// shapes the core needs, plus the optimistic-concurrency write path.
#[async_trait]
pub trait SqlStore: Send + Sync {
    async fn get_active_publisher(&self, publisher_id: &str) -> anyhow::Result<Option<PublisherIdentity>>;

    async fn get_tier_configs(
        &self,
        tier: Tier,
        publisher_id: &str,
        domain: Option<&str>,
        ad_unit_path: Option<&str>,
        bidder_codes: &[String],
    ) -> anyhow::Result<Vec<BidderConfigRow>>;

    async fn get_publisher_bidder_params(&self, publisher_id: &str) -> anyhow::Result<Option<Value>>;

    /// `UPDATE ... WHERE publisher_id=$1 AND version=$expected_version`.
    /// Zero rows affected surfaces as `Ok(None)`, translated by the
    /// resolver into a `ConflictError` (I5).
    async fn write_publisher(
        &self,
        updated: PublisherIdentity,
        expected_version: i64,
    ) -> anyhow::Result<Option<PublisherIdentity>>;
}

/// Reference in-memory implementation of both store traits, used as the
/// default backing store and in tests. Stands in for the relational
/// store and the key/value cache; a production deployment swaps this
/// for real Redis/Postgres clients behind the same traits.
pub struct InMemoryStore {
    publishers: RwLock<HashMap<String, PublisherIdentity>>,
    unit_configs: RwLock<HashMap<(String, String, String, String), Value>>,
    domain_configs: RwLock<HashMap<(String, String, String), Value>>,
    publisher_configs: RwLock<HashMap<(String, String), Value>>,
    allowed_domains_kv: RwLock<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            publishers: RwLock::new(HashMap::new()),
            unit_configs: RwLock::new(HashMap::new()),
            domain_configs: RwLock::new(HashMap::new()),
            publisher_configs: RwLock::new(HashMap::new()),
            allowed_domains_kv: RwLock::new(HashMap::new()),
        }
    }

    pub fn seed_publisher(&self, identity: PublisherIdentity) {
        self.allowed_domains_kv
            .write()
            .unwrap()
            .insert(identity.id.clone(), identity.allowed_domains.join(","));
        self.publishers
            .write()
            .unwrap()
            .insert(identity.id.clone(), identity);
    }

    pub fn seed_unit_config(
        &self,
        publisher: &str,
        domain: &str,
        ad_unit_path: &str,
        bidder: &str,
        params: Value,
    ) {
        self.unit_configs.write().unwrap().insert(
            (
                publisher.to_string(),
                domain.to_string(),
                ad_unit_path.to_string(),
                bidder.to_string(),
            ),
            params,
        );
    }

    pub fn seed_domain_config(&self, publisher: &str, domain: &str, bidder: &str, params: Value) {
        self.domain_configs.write().unwrap().insert(
            (publisher.to_string(), domain.to_string(), bidder.to_string()),
            params,
        );
    }

    pub fn seed_publisher_config(&self, publisher: &str, bidder_params_object: Value) {
        self.publisher_configs.write().unwrap().insert(
            (publisher.to_string(), "default".to_string()),
            bidder_params_object,
        );
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvStore for InMemoryStore {
    async fn hget(&self, key: &str, field: &str) -> anyhow::Result<Option<String>> {
        if key != "publishers:allowed_domains" {
            return Ok(None);
        }
        Ok(self.allowed_domains_kv.read().unwrap().get(field).cloned())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl SqlStore for InMemoryStore {
    async fn get_active_publisher(&self, publisher_id: &str) -> anyhow::Result<Option<PublisherIdentity>> {
        Ok(self
            .publishers
            .read()
            .unwrap()
            .get(publisher_id)
            .filter(|p| p.status == PublisherStatus::Active)
            .cloned())
    }

    async fn get_tier_configs(
        &self,
        tier: Tier,
        publisher_id: &str,
        domain: Option<&str>,
        ad_unit_path: Option<&str>,
        bidder_codes: &[String],
    ) -> anyhow::Result<Vec<BidderConfigRow>> {
        let mut rows = Vec::new();

        match tier {
            Tier::Unit => {
                let Some(domain) = domain else { return Ok(rows) };
                let Some(ad_unit_path) = ad_unit_path else {
                    return Ok(rows);
                };
                let configs = self.unit_configs.read().unwrap();
                for bidder in bidder_codes {
                    let key = (
                        publisher_id.to_string(),
                        domain.to_string(),
                        ad_unit_path.to_string(),
                        bidder.to_string(),
                    );
                    if let Some(params) = configs.get(&key) {
                        rows.push(BidderConfigRow {
                            bidder_code: bidder.clone(),
                            params: params.clone(),
                        });
                    }
                }
            }
            Tier::Domain => {
                let Some(domain) = domain else { return Ok(rows) };
                let configs = self.domain_configs.read().unwrap();
                for bidder in bidder_codes {
                    let key = (publisher_id.to_string(), domain.to_string(), bidder.clone());
                    if let Some(params) = configs.get(&key) {
                        rows.push(BidderConfigRow {
                            bidder_code: bidder.clone(),
                            params: params.clone(),
                        });
                    }
                }
            }
            Tier::Publisher => {
                if let Some(blob) = self.get_publisher_bidder_params(publisher_id).await? {
                    if let Some(obj) = blob.as_object() {
                        for bidder in bidder_codes {
                            if let Some(params) = obj.get(bidder) {
                                rows.push(BidderConfigRow {
                                    bidder_code: bidder.clone(),
                                    params: params.clone(),
                                });
                            }
                        }
                    }
                }
            }
        }

        Ok(rows)
    }

    async fn get_publisher_bidder_params(&self, publisher_id: &str) -> anyhow::Result<Option<Value>> {
        Ok(self
            .publisher_configs
            .read()
            .unwrap()
            .get(&(publisher_id.to_string(), "default".to_string()))
            .cloned())
    }

    async fn write_publisher(
        &self,
        updated: PublisherIdentity,
        expected_version: i64,
    ) -> anyhow::Result<Option<PublisherIdentity>> {
        let mut publishers = self.publishers.write().unwrap();

        match publishers.get(&updated.id) {
            Some(current) if current.version == expected_version => {
                let mut new_row = updated;
                new_row.version = expected_version + 1;
                publishers.insert(new_row.id.clone(), new_row.clone());
                Ok(Some(new_row))
            }
            Some(_) => Ok(None),
            None => Ok(None),
        }
    }
}
