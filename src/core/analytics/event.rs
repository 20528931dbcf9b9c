use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct BidderOutcomeRecord {
    pub bidder_id: String,
    pub bid_count: usize,
    pub error: Option<String>,
    pub timed_out: bool,
    pub skipped_by_breaker: bool,
    pub latency_ms: u128,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct WinningBidSummary {
    pub bidder_id: String,
    pub imp_id: String,
    pub price: f64,
    pub currency: String,
    pub clear_price: f64,
    pub platform_cut: f64,
}

/// Structured payload pushed to the downstream analytics sink for every
/// auction, win or no-bid (§4.7). Carries the per-bidder breakdown so
/// offline tooling can reconstruct breaker/timeout/consent behavior
/// without replaying traffic.
#[derive(Debug, Clone, Serialize, Default)]
pub struct AuctionOutcomeEvent {
    pub request_id: String,
    pub publisher_id: String,
    pub domain: String,
    pub response_currency: String,
    pub bidder_outcomes: Vec<BidderOutcomeRecord>,
    pub winners: Vec<WinningBidSummary>,
    pub wall_time_ms: u128,
}
