use crate::core::adapters::registry::AdapterRegistry;
use crate::core::analytics::emitter::AnalyticsEmitter;
use crate::core::circuit::CircuitBreakerRegistry;
use crate::core::currency::converter::AggregateConverter;
use crate::core::models::bid_request::BidRequest;
use crate::core::models::bid_response::BidResponse;
use crate::core::models::privacy::PrivacyRejection;
use crate::core::models::publisher::PublisherIdentity;
use crate::core::privacy::{PrivacyClearance, PrivacyGate};
use crate::core::resolver::ConfigResolver;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tokio::sync::Mutex;

/// Outcome of one bidder's participation in the fan-out, kept regardless
/// of whether it actually made a network call, so the analytics event
/// reflects skipped/filtered bidders alongside ones that returned bids
/// (§8 scenario 3: `skipped_by_breaker` must appear in the event).
#[derive(Debug, Clone)]
pub struct FanoutOutcome {
    pub bidder_id: String,
    pub bids: Vec<crate::core::models::bid_response::Bid>,
    pub response_currency: String,
    pub error: Option<String>,
    pub timed_out: bool,
    pub skipped_by_breaker: bool,
    pub latency: std::time::Duration,
}

/// Analytics-facing summary of one winning bid, carrying the revenue
/// split that never appears on the wire response (§8 scenario 1).
#[derive(Debug, Clone)]
pub struct WinnerRecord {
    pub bidder_id: String,
    pub imp_id: String,
    pub price: f64,
    pub clear_price: f64,
    pub platform_cut: f64,
}

/// Terminal conditions that stop the auction pipeline before a response
/// can be built (§7). Everything else (bidder errors, no-bid) is
/// absorbed and represented in the response/analytics instead.
#[derive(Debug)]
pub enum AuctionError {
    Validation(String),
    Privacy(PrivacyRejection),
    PublisherUnknown(String),
    /// A backing dependency the publisher lookup needed (KV, SQL) was
    /// unreachable and no cached identity covered the gap (§7 503 path).
    DependencyDown(String),
}

impl std::fmt::Display for AuctionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuctionError::Validation(msg) => write!(f, "validation error: {msg}"),
            AuctionError::Privacy(rejection) => {
                write!(f, "privacy rejection: {} ({})", rejection.regulation.as_str(), rejection.reason.as_str())
            }
            AuctionError::PublisherUnknown(id) => write!(f, "publisher unknown: {id}"),
            AuctionError::DependencyDown(id) => write!(f, "dependency down resolving publisher: {id}"),
        }
    }
}

impl std::error::Error for AuctionError {}

/// Shared mutable state for one auction, threaded through the pipeline
/// by shared reference. Each field that a later stage depends on is a
/// `OnceLock`, written exactly once by the stage that produces it, so a
/// task can never observe a half-written dependency.
pub struct AuctionContext {
    pub request: BidRequest,
    pub started_at: Instant,
    pub deadline: Instant,

    pub resolver: Arc<ConfigResolver>,
    pub privacy_gate: Arc<PrivacyGate>,
    pub adapters: Arc<AdapterRegistry>,
    pub breakers: Arc<CircuitBreakerRegistry>,
    pub currency: Arc<AggregateConverter>,
    pub analytics: Arc<AnalyticsEmitter>,
    pub response_currency: String,
    pub http_client: Arc<reqwest::Client>,

    pub publisher: OnceLock<PublisherIdentity>,
    pub clearance: OnceLock<PrivacyClearance>,
    /// tag_id -> bidder_code -> params
    pub bidder_params: OnceLock<HashMap<String, HashMap<String, Value>>>,
    pub selected_bidders: OnceLock<Vec<String>>,
    pub fanout_results: Mutex<Vec<FanoutOutcome>>,
    pub winner_records: Mutex<Vec<WinnerRecord>>,
    pub response: Mutex<Option<BidResponse>>,
}

impl AuctionContext {
    pub fn publisher_id(&self) -> &str {
        self.request.publisher_id().unwrap_or("")
    }

    pub fn domain(&self) -> &str {
        self.request.domain().unwrap_or("")
    }

    pub fn remaining_budget(&self) -> std::time::Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
}
