use crate::app::lifecycle::context::StartupContext;
use crate::app::pipeline::core::BlockingTask;
use anyhow::{Error, anyhow};
use tracing_subscriber::EnvFilter;

/// Initializes the global `tracing` subscriber from `logging.level`,
/// falling back to `RUST_LOG` if set. Must run before the first
/// `child_span!`/event so nothing early gets dropped.
pub struct LoggingInitTask;

impl BlockingTask<StartupContext, Error> for LoggingInitTask {
    fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        let config = ctx.config.get().ok_or_else(|| anyhow!("config not loaded before logging init"))?;

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

        tracing_subscriber::fmt().with_env_filter(filter).json().try_init().ok();

        Ok(())
    }
}
