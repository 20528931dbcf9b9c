pub mod fanout;
pub mod select;
pub mod settle;

use crate::app::pipeline::core::AsyncTask;
use crate::app::pipeline::ortb::context::{AuctionContext, AuctionError};
use async_trait::async_trait;
use std::collections::HashSet;

/// Orchestrates C6 steps 4-11 for a single auction: per-ad-unit bidder
/// selection, fan-out, currency conversion and first-price selection,
/// revenue-share, and response construction, storing the final
/// `BidResponse` on the context for the respond task to emit.
pub struct RunAuctionTask;

#[async_trait]
impl AsyncTask<AuctionContext, AuctionError> for RunAuctionTask {
    async fn run(&self, ctx: &AuctionContext) -> Result<(), AuctionError> {
        let distinct_tags: HashSet<String> = ctx.request.imp.iter().map(|imp| imp.tag_id.clone()).collect();

        let mut to_fan_out = HashSet::new();
        let mut pre_filtered = Vec::new();

        for tag_id in &distinct_tags {
            let selection = select::select_bidders(ctx, tag_id);
            to_fan_out.extend(selection.to_fan_out);
            pre_filtered.extend(selection.pre_filtered_outcomes);
        }

        ctx.selected_bidders
            .set(to_fan_out.iter().cloned().collect())
            .map_err(|_| AuctionError::Validation("selected bidders already set".to_string()))?;

        let mut outcomes = fanout::fan_out(ctx, to_fan_out.into_iter().collect()).await;
        outcomes.extend(pre_filtered);

        let (response, winner_records) = match ctx.publisher.get() {
            Some(publisher) => {
                let winners = settle::settle(ctx, &outcomes, publisher);
                let records = winners
                    .iter()
                    .map(|w| crate::app::pipeline::ortb::context::WinnerRecord {
                        bidder_id: w.bidder_id.clone(),
                        imp_id: w.bid.imp_id.clone(),
                        price: w.bid.price,
                        clear_price: w.clear_price,
                        platform_cut: w.platform_cut,
                    })
                    .collect();
                (settle::build_response(ctx, winners), records)
            }
            None => (
                crate::core::models::bid_response::BidResponse {
                    id: ctx.request.id.clone(),
                    cur: ctx.response_currency.clone(),
                    seatbid: Vec::new(),
                },
                Vec::new(),
            ),
        };

        *ctx.fanout_results.lock().await = outcomes;
        *ctx.winner_records.lock().await = winner_records;
        *ctx.response.lock().await = Some(response);

        Ok(())
    }
}
