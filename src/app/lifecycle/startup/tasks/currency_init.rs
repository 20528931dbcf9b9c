use crate::app::lifecycle::context::StartupContext;
use crate::app::pipeline::core::AsyncTask;
use crate::core::currency::converter::{AggregateConverter, CurrencyConverter};
use anyhow::{Error, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Builds the currency converter and, when enabled, spawns the
/// background refresher and performs one synchronous fetch so the
/// exchange doesn't serve its first auctions against an empty table.
pub struct CurrencyInitTask;

#[async_trait]
impl AsyncTask<StartupContext, Error> for CurrencyInitTask {
    async fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        let config = ctx.config.get().ok_or_else(|| anyhow!("config not loaded before currency init"))?;

        let converter = Arc::new(CurrencyConverter::new(
            config.currency.rates_url.clone(),
            config.currency.stale_threshold,
        ));

        if config.currency.enabled {
            if let Err(e) = converter.refresh_once().await {
                tracing::warn!("initial currency fetch failed, starting with empty table: {e}");
            }
            let handle = converter.spawn_refresher(config.currency.refresh_interval);
            *ctx.currency_refresher.lock().unwrap() = Some(handle);
        }

        let aggregate = Arc::new(AggregateConverter::new(HashMap::new(), converter.clone()));

        ctx.currency_converter
            .set(converter)
            .map_err(|_| anyhow!("currency converter already initialized"))?;
        ctx.currency
            .set(aggregate)
            .map_err(|_| anyhow!("aggregate converter already initialized"))
    }
}
