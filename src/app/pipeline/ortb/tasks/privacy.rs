use crate::app::pipeline::core::BlockingTask;
use crate::app::pipeline::ortb::context::{AuctionContext, AuctionError};

/// Invokes the Privacy Gate (C5) before any resolver or bidder work
/// happens. On rejection the pipeline stops here; no outbound call is
/// ever reachable from a later stage (§4.5 invariant).
pub struct PrivacyGateTask;

impl BlockingTask<AuctionContext, AuctionError> for PrivacyGateTask {
    fn run(&self, ctx: &AuctionContext) -> Result<(), AuctionError> {
        let clearance = ctx.privacy_gate.check(&ctx.request).map_err(AuctionError::Privacy)?;
        ctx.clearance
            .set(clearance)
            .map_err(|_| AuctionError::Validation("privacy clearance already set".to_string()))
    }
}
