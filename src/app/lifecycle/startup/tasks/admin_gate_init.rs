use crate::app::lifecycle::context::StartupContext;
use crate::app::pipeline::core::BlockingTask;
use crate::core::admin::AdminAuthGate;
use anyhow::{Error, anyhow};
use std::sync::Arc;

pub struct AdminGateInitTask;

impl BlockingTask<StartupContext, Error> for AdminGateInitTask {
    fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        let config = ctx.config.get().ok_or_else(|| anyhow!("config not loaded before admin gate init"))?;
        let gate = Arc::new(AdminAuthGate::new(config.admin_api_key.clone()));
        ctx.admin_gate.set(gate).map_err(|_| anyhow!("admin gate already initialized"))
    }
}
