use crate::app::lifecycle::context::StartupContext;
use crate::app::pipeline::core::AsyncTask;
use anyhow::Error;
use async_trait::async_trait;
use std::time::Duration;

const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

pub struct FlushAnalyticsTask;

#[async_trait]
impl AsyncTask<StartupContext, Error> for FlushAnalyticsTask {
    async fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        if let Some(worker) = ctx.analytics_worker.lock().unwrap().take() {
            worker.abort();
        }

        if let Some(emitter) = ctx.analytics.get() {
            emitter.shutdown_drain(DRAIN_TIMEOUT).await;
        }

        Ok(())
    }
}
