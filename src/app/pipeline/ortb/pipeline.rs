use crate::app::pipeline::core::{Pipeline, PipelineBuilder};
use crate::app::pipeline::ortb::context::AuctionContext;
use crate::app::pipeline::ortb::context::AuctionError;
use crate::app::pipeline::ortb::tasks::analytics::EmitAnalyticsTask;
use crate::app::pipeline::ortb::tasks::auction::RunAuctionTask;
use crate::app::pipeline::ortb::tasks::privacy::PrivacyGateTask;
use crate::app::pipeline::ortb::tasks::resolve::{ResolveBidderConfigsTask, ResolvePublisherTask};
use crate::app::pipeline::ortb::tasks::validate::ValidateRequestTask;

/// Builds the fixed per-request pipeline (§4.6 orchestration steps
/// 1-12). The HTTP layer constructs one `AuctionContext` per request and
/// runs it through this single shared pipeline instance.
pub fn build_auction_pipeline() -> Pipeline<AuctionContext, AuctionError> {
    PipelineBuilder::new()
        .with_blocking(Box::new(ValidateRequestTask))
        .with_blocking(Box::new(PrivacyGateTask))
        .with_async(Box::new(ResolvePublisherTask))
        .with_async(Box::new(ResolveBidderConfigsTask))
        .with_async(Box::new(RunAuctionTask))
        .with_async(Box::new(EmitAnalyticsTask))
        .build()
        .expect("auction pipeline always has steps")
}
