use crate::app::lifecycle::context::StartupContext;
use crate::app::pipeline::core::BlockingTask;
use crate::core::models::config::ExchangeConfig;
use anyhow::{Error, anyhow};
use std::path::PathBuf;

pub struct ConfigLoadTask {
    path: PathBuf,
}

impl ConfigLoadTask {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl BlockingTask<StartupContext, Error> for ConfigLoadTask {
    fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        let config = ExchangeConfig::load(&self.path)?;
        ctx.config.set(config).map_err(|_| anyhow!("config already loaded"))
    }
}
