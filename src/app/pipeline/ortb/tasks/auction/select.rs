use crate::app::pipeline::ortb::context::{AuctionContext, FanoutOutcome};
use crate::core::privacy::PrivacyGate;
use std::time::Duration;

/// One bidder decided out of the fan-out before any network call, paired
/// with the reason. Only breaker-skipped bidders need an outcome record
/// for analytics (§8 scenario 3); consent-filtered bidders are silently
/// excluded the same way a missing config is.
pub struct Selection {
    pub to_fan_out: Vec<String>,
    pub pre_filtered_outcomes: Vec<FanoutOutcome>,
}

/// Applies C5.5 vendor-consent filtering and C3 breaker filtering
/// (§4.6 steps 4-5) over the set of bidders with a resolved config for
/// this impression's ad unit.
pub fn select_bidders(ctx: &AuctionContext, tag_id: &str) -> Selection {
    let by_tag = ctx.bidder_params.get().expect("bidder params resolved before selection");
    let configured: Vec<String> = by_tag.get(tag_id).map(|m| m.keys().cloned().collect()).unwrap_or_default();

    let clearance = ctx.clearance.get().expect("privacy clearance set before selection");

    let mut to_fan_out = Vec::new();
    let mut pre_filtered_outcomes = Vec::new();

    for bidder_id in configured {
        let gvl_vendor_id = ctx.adapters.info(&bidder_id).and_then(|info| info.gvl_vendor_id);
        if !PrivacyGate::vendor_allowed(clearance, gvl_vendor_id) {
            continue;
        }

        if !ctx.breakers.allow(&bidder_id) {
            pre_filtered_outcomes.push(FanoutOutcome {
                bidder_id,
                bids: Vec::new(),
                response_currency: String::new(),
                error: Some("circuit breaker open".to_string()),
                timed_out: false,
                skipped_by_breaker: true,
                latency: Duration::ZERO,
            });
            continue;
        }

        to_fan_out.push(bidder_id);
    }

    Selection {
        to_fan_out,
        pre_filtered_outcomes,
    }
}
