use crate::app::lifecycle::context::StartupContext;
use crate::app::lifecycle::shutdown::tasks::flush_analytics::FlushAnalyticsTask;
use crate::app::lifecycle::shutdown::tasks::stop_currency_refresher::StopCurrencyRefresherTask;
use crate::app::lifecycle::shutdown::tasks::stop_server::StopServerTask;
use crate::app::pipeline::core::{Pipeline, PipelineBuilder};

/// Stops accepting new connections first, then drains what's already
/// in flight before tearing down the background workers underneath it.
pub fn build_shutdown_pipeline() -> Pipeline<StartupContext, anyhow::Error> {
    PipelineBuilder::new()
        .with_async(Box::new(StopServerTask))
        .with_async(Box::new(FlushAnalyticsTask))
        .with_blocking(Box::new(StopCurrencyRefresherTask))
        .build()
        .expect("shutdown pipeline always has steps")
}
