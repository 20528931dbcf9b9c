use crate::app::pipeline::ortb::context::{AuctionContext, FanoutOutcome};
use crate::core::models::bid_response::{Bid, BidResponse, SeatBid};
use crate::core::models::publisher::PublisherIdentity;
use std::collections::HashMap;

/// One surviving, currency-converted bid plus the seat it came from.
struct Candidate {
    bidder_id: String,
    bid: Bid,
}

/// A cleared winner: the response-currency bid alongside the revenue
/// split it produced (§4.6 step 10).
pub struct Winner {
    pub bidder_id: String,
    pub bid: Bid,
    pub clear_price: f64,
    pub platform_cut: f64,
}

/// Converts every surviving bid into the response currency (dropping
/// ones that can't convert), runs first-price selection per impression
/// with the lexicographic-then-bid-id tie-break, and applies the
/// publisher's revenue-share multiplier to each winner.
pub fn settle(ctx: &AuctionContext, outcomes: &[FanoutOutcome], publisher: &PublisherIdentity) -> Vec<Winner> {
    let mut by_imp: HashMap<String, Vec<Candidate>> = HashMap::new();

    for outcome in outcomes {
        for bid in &outcome.converted_bids(ctx) {
            by_imp.entry(bid.imp_id.clone()).or_default().push(Candidate {
                bidder_id: outcome.bidder_id.clone(),
                bid: bid.clone(),
            });
        }
    }

    let mut winners = Vec::new();

    for (_imp_id, mut candidates) in by_imp {
        candidates.sort_by(|a, b| {
            b.bid
                .price
                .partial_cmp(&a.bid.price)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.bidder_id.cmp(&b.bidder_id))
                .then_with(|| a.bid.id.cmp(&b.bid.id))
        });

        let Some(winner) = candidates.into_iter().next() else {
            continue;
        };

        let clear_price = winner.bid.price / publisher.bid_multiplier;
        let platform_cut = winner.bid.price - clear_price;

        winners.push(Winner {
            bidder_id: winner.bidder_id,
            bid: winner.bid,
            clear_price,
            platform_cut,
        });
    }

    winners
}

impl FanoutOutcome {
    /// Per-bid currency conversion into the response currency (§4.6 step
    /// 8). Bids that can't be converted are dropped, not errored; the
    /// auction proceeds with whatever survives.
    fn converted_bids(&self, ctx: &AuctionContext) -> Vec<Bid> {
        if self.response_currency.is_empty() {
            return Vec::new();
        }

        self.bids
            .iter()
            .filter_map(|bid| {
                if bid.price < 0.0 {
                    return None;
                }
                let converted_price = ctx
                    .currency
                    .convert(bid.price, &self.response_currency, &ctx.response_currency)
                    .ok()?;
                Some(Bid {
                    price: converted_price,
                    ..bid.clone()
                })
            })
            .collect()
    }
}

/// Builds the final `BidResponse`: one seat per bidder with at least one
/// surviving winning bid, response currency set, id mirrored from the
/// request (§4.6 step 11). The bid price returned on the wire is the
/// bidder's own converted price, not the publisher's clear price.
/// `clear_price`/`platform_cut` are internal accounting, reported only
/// to analytics (§8 scenario 1).
pub fn build_response(ctx: &AuctionContext, winners: Vec<Winner>) -> BidResponse {
    let mut seats: HashMap<String, Vec<Bid>> = HashMap::new();

    for winner in winners {
        seats.entry(winner.bidder_id).or_default().push(winner.bid);
    }

    BidResponse {
        id: ctx.request.id.clone(),
        cur: ctx.response_currency.clone(),
        seatbid: seats
            .into_iter()
            .map(|(seat, bid)| SeatBid { seat, bid })
            .collect(),
    }
}
