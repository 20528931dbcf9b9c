use crate::app::pipeline::core::AsyncTask;
use crate::app::pipeline::ortb::context::{AuctionContext, AuctionError};
use crate::core::resolver::ResolverError;
use async_trait::async_trait;
use std::collections::HashMap;

/// Resolves the publisher identity via C4. A missing or inactive
/// publisher is a hard terminal error (§7 PublisherUnknown); a lookup
/// that failed outright (every backing store unreachable) is reported
/// distinctly so the HTTP layer can return 503 instead of 401/403.
pub struct ResolvePublisherTask;

#[async_trait]
impl AsyncTask<AuctionContext, AuctionError> for ResolvePublisherTask {
    async fn run(&self, ctx: &AuctionContext) -> Result<(), AuctionError> {
        let publisher_id = ctx.publisher_id().to_string();
        let identity = ctx.resolver.get_publisher(&publisher_id).await.map_err(|e| match e {
            ResolverError::DependencyDown(id) => AuctionError::DependencyDown(id),
            ResolverError::PublisherNotFound(_) | ResolverError::Conflict { .. } => {
                AuctionError::PublisherUnknown(publisher_id.clone())
            }
        })?;

        if !identity.domain_allowed(ctx.domain()) {
            return Err(AuctionError::PublisherUnknown(publisher_id));
        }

        ctx.publisher
            .set(identity)
            .map_err(|_| AuctionError::Validation("publisher already resolved".to_string()))
    }
}

/// Resolves bidder parameters for every distinct ad-unit (`imp.tag_id`)
/// present on the request, one batched call per tag via C4's
/// three-query-max hierarchy walk. A missing bidder config is not an
/// error (§4.4 failure semantics); that bidder is simply absent from
/// the map and gets excluded downstream.
pub struct ResolveBidderConfigsTask;

#[async_trait]
impl AsyncTask<AuctionContext, AuctionError> for ResolveBidderConfigsTask {
    async fn run(&self, ctx: &AuctionContext) -> Result<(), AuctionError> {
        let publisher_id = ctx.publisher_id().to_string();
        let domain = ctx.domain().to_string();
        let bidder_codes = ctx.adapters.enabled_bidder_ids();

        let mut by_tag: HashMap<String, HashMap<String, serde_json::Value>> = HashMap::new();

        for tag_id in ctx.request.imp.iter().map(|imp| imp.tag_id.clone()).collect::<std::collections::HashSet<_>>() {
            let resolved = ctx
                .resolver
                .get_all_bidder_configs_batch(&publisher_id, &domain, &tag_id, &bidder_codes)
                .await
                .unwrap_or_default();
            by_tag.insert(tag_id, resolved);
        }

        ctx.bidder_params
            .set(by_tag)
            .map_err(|_| AuctionError::Validation("bidder params already resolved".to_string()))
    }
}
