use crate::app::lifecycle::context::StartupContext;
use crate::app::lifecycle::startup::tasks::adapters_load::AdapterRegistryLoadTask;
use crate::app::lifecycle::startup::tasks::admin_gate_init::AdminGateInitTask;
use crate::app::lifecycle::startup::tasks::analytics_init::AnalyticsInitTask;
use crate::app::lifecycle::startup::tasks::auction_pipeline_build::AuctionPipelineBuildTask;
use crate::app::lifecycle::startup::tasks::circuit_breakers_init::CircuitBreakerInitTask;
use crate::app::lifecycle::startup::tasks::config_load::ConfigLoadTask;
use crate::app::lifecycle::startup::tasks::currency_init::CurrencyInitTask;
use crate::app::lifecycle::startup::tasks::logging_init::LoggingInitTask;
use crate::app::lifecycle::startup::tasks::privacy_init::PrivacyGateInitTask;
use crate::app::lifecycle::startup::tasks::resolver_init::ResolverInitTask;
use crate::app::lifecycle::startup::tasks::start_server::StartServerTask;
use crate::app::pipeline::core::{Pipeline, PipelineBuilder};
use std::path::PathBuf;

/// Builds the full startup ordering: a boot loader phase that must
/// complete before anything can log or read config, followed by the
/// main phase that wires every exchange component and finally binds
/// the HTTP listener.
pub fn build_start_pipeline(config_path: PathBuf) -> Pipeline<StartupContext, anyhow::Error> {
    let boot_loader = PipelineBuilder::new()
        .with_blocking(Box::new(ConfigLoadTask::new(config_path)))
        .with_blocking(Box::new(LoggingInitTask))
        .build()
        .expect("boot loader always has steps");

    let start_pipeline = PipelineBuilder::new()
        .with_blocking(Box::new(CircuitBreakerInitTask))
        .with_async(Box::new(CurrencyInitTask))
        .with_blocking(Box::new(AdapterRegistryLoadTask))
        .with_blocking(Box::new(ResolverInitTask))
        .with_blocking(Box::new(PrivacyGateInitTask))
        .with_blocking(Box::new(AnalyticsInitTask))
        .with_blocking(Box::new(AdminGateInitTask))
        .with_blocking(Box::new(AuctionPipelineBuildTask))
        .with_async(Box::new(StartServerTask))
        .build()
        .expect("start pipeline always has steps");

    let mut outer_builder = PipelineBuilder::new();
    outer_builder.add_async(Box::new(PhaseRunner(boot_loader)));
    outer_builder.add_async(Box::new(PhaseRunner(start_pipeline)));
    outer_builder
        .build()
        .expect("outer pipeline always has two phases")
}

/// Flattens a sub-pipeline into a single step of the outer pipeline.
/// Config and logging must land before anything else can run or log,
/// so they get their own phase ahead of the rest of startup.
struct PhaseRunner(Pipeline<StartupContext, anyhow::Error>);

#[async_trait::async_trait]
impl crate::app::pipeline::core::AsyncTask<StartupContext, anyhow::Error> for PhaseRunner {
    async fn run(&self, ctx: &StartupContext) -> Result<(), anyhow::Error> {
        self.0.run(ctx).await
    }
}
