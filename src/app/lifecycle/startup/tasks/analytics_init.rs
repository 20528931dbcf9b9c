use crate::app::lifecycle::context::StartupContext;
use crate::app::pipeline::core::BlockingTask;
use crate::core::analytics::{AnalyticsEmitter, LoggingSink};
use anyhow::{Error, anyhow};
use std::sync::Arc;
use std::time::Duration;

const DRAIN_INTERVAL: Duration = Duration::from_secs(5);

pub struct AnalyticsInitTask;

impl BlockingTask<StartupContext, Error> for AnalyticsInitTask {
    fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        let config = ctx.config.get().ok_or_else(|| anyhow!("config not loaded before analytics init"))?;

        let emitter = Arc::new(AnalyticsEmitter::new(config.analytics.buffer_size, Arc::new(LoggingSink)));
        let handle = emitter.spawn_worker(DRAIN_INTERVAL);
        *ctx.analytics_worker.lock().unwrap() = Some(handle);

        ctx.analytics.set(emitter).map_err(|_| anyhow!("analytics emitter already initialized"))
    }
}
