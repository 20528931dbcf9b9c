use crate::app::lifecycle::context::StartupContext;
use crate::app::pipeline::core::BlockingTask;
use crate::app::pipeline::ortb::build_auction_pipeline;
use anyhow::{Error, anyhow};
use std::sync::Arc;

pub struct AuctionPipelineBuildTask;

impl BlockingTask<StartupContext, Error> for AuctionPipelineBuildTask {
    fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        ctx.auction_pipeline
            .set(Arc::new(build_auction_pipeline()))
            .map_err(|_| anyhow!("auction pipeline already built"))
    }
}
