use crate::app::lifecycle::context::StartupContext;
use crate::app::pipeline::core::BlockingTask;
use crate::core::privacy::{PrivacyGate, PrivacyPolicy};
use anyhow::{Error, anyhow};
use std::sync::Arc;

pub struct PrivacyGateInitTask;

impl BlockingTask<StartupContext, Error> for PrivacyGateInitTask {
    fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        let config = ctx.config.get().ok_or_else(|| anyhow!("config not loaded before privacy gate init"))?;

        let policy = PrivacyPolicy {
            strict_mode: config.auction.gdpr_enforcement_enabled,
            ..PrivacyPolicy::default()
        };

        let gate = Arc::new(PrivacyGate::new(policy));
        ctx.privacy_gate.set(gate).map_err(|_| anyhow!("privacy gate already initialized"))
    }
}
