use crate::app::lifecycle::context::StartupContext;
use crate::app::pipeline::core::BlockingTask;
use crate::core::managers::bidders::build_bidder_schemas;
use crate::core::managers::publishers::build_registered_pubs;
use crate::core::resolver::{ConfigResolver, InMemoryStore, PublisherIdentityCache, ResolverCache};
use anyhow::{Error, anyhow};
use std::sync::Arc;

/// Wires the three-tier configuration resolver (C4) from the reference
/// in-memory store. A deployment backed by real Redis/Postgres swaps
/// `InMemoryStore` for clients implementing the same `KvStore`/`SqlStore`
/// traits without touching anything downstream of this task.
pub struct ResolverInitTask;

impl BlockingTask<StartupContext, Error> for ResolverInitTask {
    fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        let config = ctx.config.get().ok_or_else(|| anyhow!("config not loaded before resolver init"))?;

        let store = Arc::new(InMemoryStore::new());
        let cache = ResolverCache::new(config.resolver.cache_capacity as u64, config.resolver.cache_ttl);
        let identity_cache =
            PublisherIdentityCache::new(config.resolver.cache_capacity as u64, config.resolver.cache_ttl);
        let schemas = build_bidder_schemas(&config.bidders);
        let registered_pubs = build_registered_pubs(config);

        let resolver = Arc::new(ConfigResolver::new(
            store.clone(),
            store,
            cache,
            identity_cache,
            schemas,
            registered_pubs,
        ));

        ctx.resolver.set(resolver).map_err(|_| anyhow!("resolver already initialized"))
    }
}
