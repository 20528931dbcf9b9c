use crate::app::pipeline::core::BlockingTask;
use crate::app::pipeline::ortb::context::{AuctionContext, AuctionError};

/// Request-shape checks from §4.6 step 1. Media-type exclusivity (I3) is
/// already enforced at the type level by `MediaType` being an enum, so
/// there is nothing left to check for it here.
pub struct ValidateRequestTask;

impl BlockingTask<AuctionContext, AuctionError> for ValidateRequestTask {
    fn run(&self, ctx: &AuctionContext) -> Result<(), AuctionError> {
        if ctx.request.id.is_empty() {
            return Err(AuctionError::Validation("missing request id".to_string()));
        }

        if ctx.request.imp.is_empty() {
            return Err(AuctionError::Validation("request has no impressions".to_string()));
        }

        if let Some(device) = &ctx.request.device {
            if !device.ip.is_empty() && device.ip.parse::<std::net::Ipv4Addr>().is_err() {
                return Err(AuctionError::Validation("device.ip is malformed".to_string()));
            }
        }

        Ok(())
    }
}
