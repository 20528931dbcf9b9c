use crate::app::lifecycle::context::StartupContext;
use crate::app::pipeline::core::BlockingTask;
use crate::core::circuit::CircuitBreakerRegistry;
use anyhow::{Error, anyhow};
use std::sync::Arc;

pub struct CircuitBreakerInitTask;

impl BlockingTask<StartupContext, Error> for CircuitBreakerInitTask {
    fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        let config = ctx.config.get().ok_or_else(|| anyhow!("config not loaded before breaker init"))?;

        let registry = Arc::new(CircuitBreakerRegistry::new(
            config.circuit_breaker.failure_threshold,
            config.circuit_breaker.cooldown,
        ));

        ctx.breakers.set(registry).map_err(|_| anyhow!("breakers already initialized"))
    }
}
