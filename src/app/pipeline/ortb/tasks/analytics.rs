use crate::app::pipeline::core::AsyncTask;
use crate::app::pipeline::ortb::context::{AuctionContext, AuctionError};
use crate::core::analytics::event::{AuctionOutcomeEvent, BidderOutcomeRecord, WinningBidSummary};
use async_trait::async_trait;

/// Emits the auction's outcome to C7. Runs strictly after the response
/// is built (§5 ordering guarantee) and never fails the pipeline: a
/// sink-side problem is the emitter's concern, not the caller's.
pub struct EmitAnalyticsTask;

#[async_trait]
impl AsyncTask<AuctionContext, AuctionError> for EmitAnalyticsTask {
    async fn run(&self, ctx: &AuctionContext) -> Result<(), AuctionError> {
        let response_guard = ctx.response.lock().await;
        let Some(response) = response_guard.as_ref() else {
            return Ok(());
        };

        let winner_records = ctx.winner_records.lock().await;
        let winners = winner_records
            .iter()
            .map(|w| WinningBidSummary {
                bidder_id: w.bidder_id.clone(),
                imp_id: w.imp_id.clone(),
                price: w.price,
                currency: response.cur.clone(),
                clear_price: w.clear_price,
                platform_cut: w.platform_cut,
            })
            .collect();

        let bidder_outcomes = ctx
            .fanout_results
            .lock()
            .await
            .iter()
            .map(|o| BidderOutcomeRecord {
                bidder_id: o.bidder_id.clone(),
                bid_count: o.bids.len(),
                error: o.error.clone(),
                timed_out: o.timed_out,
                skipped_by_breaker: o.skipped_by_breaker,
                latency_ms: o.latency.as_millis(),
            })
            .collect();

        let event = AuctionOutcomeEvent {
            request_id: ctx.request.id.clone(),
            publisher_id: ctx.publisher_id().to_string(),
            domain: ctx.domain().to_string(),
            response_currency: ctx.response_currency.clone(),
            bidder_outcomes,
            winners,
            wall_time_ms: ctx.started_at.elapsed().as_millis(),
        };

        ctx.analytics.emit(event);

        Ok(())
    }
}
