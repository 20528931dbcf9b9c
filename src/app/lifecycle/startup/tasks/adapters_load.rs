use crate::app::lifecycle::context::StartupContext;
use crate::app::pipeline::core::BlockingTask;
use crate::core::managers::bidders::build_adapter_registry;
use anyhow::{Error, anyhow};
use std::sync::Arc;

pub struct AdapterRegistryLoadTask;

impl BlockingTask<StartupContext, Error> for AdapterRegistryLoadTask {
    fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        let config = ctx.config.get().ok_or_else(|| anyhow!("config not loaded before adapter load"))?;
        let registry = Arc::new(build_adapter_registry(&config.bidders));
        ctx.adapters.set(registry).map_err(|_| anyhow!("adapters already loaded"))
    }
}
