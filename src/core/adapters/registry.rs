use crate::core::adapters::errors::{AdapterError, AdapterErrorKind};
use crate::core::models::bid_request::{BidRequest, MediaKind};
use crate::core::models::bid_response::Bid;
use crate::core::models::bidder::BidderInfo;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: &'static str,
    pub uri: String,
    pub body: Vec<u8>,
    pub headers: Vec<(String, String)>,
    pub gzip: bool,
}

/// Extra bidder-scoped info threaded in alongside the request, e.g.
/// per-bidder basic-auth credentials sourced from the environment
/// (`<BIDDER>_XAPI_USER`/`<BIDDER>_XAPI_PASS`, §6.3).
#[derive(Debug, Clone, Default)]
pub struct ExtraInfo {
    pub basic_auth: Option<(String, String)>,
}

pub struct ResponseData {
    pub status: u16,
    pub content_type: String,
    pub body: Bytes,
}

#[derive(Debug, Default)]
pub struct BidderResponse {
    pub bids: Vec<Bid>,
    /// ISO-4217 code the bidder priced `bids` in, taken from the wire
    /// response's own `cur` field. Empty when the bidder didn't answer
    /// (parse/transport failure) and carries no meaning in that case.
    pub currency: String,
}

/// One bidder's wire contract. Implementations hold no mutable state;
/// everything needed per call arrives as an argument, which is what
/// makes adapters safely shareable across every concurrent auction
/// (§4.1 "State: None").
pub trait BidderAdapter: Send + Sync {
    fn bidder_code(&self) -> &str;

    fn make_requests(
        &self,
        req: &BidRequest,
        extra: &ExtraInfo,
    ) -> (Vec<OutboundRequest>, Vec<AdapterError>);

    fn make_bids(
        &self,
        req: &BidRequest,
        response: &ResponseData,
    ) -> (BidderResponse, Vec<AdapterError>);
}

/// Zeroes the identifiers an adapter must never leak to demand partners
/// (§4.1 security invariant). Adapters call this on their deep-copied
/// request before serializing it.
pub fn clear_internal_ids(req: &mut BidRequest) {
    if let Some(site) = req.site.as_mut() {
        site.publisher_id.clear();
    }
}

/// O(1) bid-type detection: the caller builds `imp_map` once per response
/// and looks up each bid's impression here, per §4.1's key algorithm.
/// `ext_hint`, when present, always wins (an explicit bidder-provided
/// media-type extension takes precedence over the impression shape).
pub fn detect_media_type(
    imp_map: &HashMap<&str, &crate::core::models::bid_request::Impression>,
    bid: &Bid,
    ext_hint: Option<MediaKind>,
) -> Option<MediaKind> {
    if let Some(hint) = ext_hint {
        return Some(hint);
    }

    imp_map
        .get(bid.imp_id.as_str())
        .and_then(|imp| imp.media.as_ref())
        .map(|media| media.discriminant())
}

pub fn build_imp_map(
    req: &BidRequest,
) -> HashMap<&str, &crate::core::models::bid_request::Impression> {
    req.imp.iter().map(|imp| (imp.id.as_str(), imp)).collect()
}

/// Maps a bidder's outer HTTP status to the adapter-level contract in
/// §4.1: 204 is a quiet no-bid, 400 is our own misconfiguration, anything
/// else non-2xx is a server failure.
pub fn classify_status(bidder: &str, status: u16) -> Result<(), Option<AdapterError>> {
    match status {
        204 => Err(None),
        200..=299 => Ok(()),
        400 => Err(Some(AdapterError::new(
            bidder,
            AdapterErrorKind::BadRequest,
            format!("bidder reported bad request (http {status})"),
        ))),
        other => Err(Some(AdapterError::new(
            bidder,
            AdapterErrorKind::BadStatus,
            format!("unexpected status {other}"),
        ))),
    }
}

pub struct AdapterRegistry {
    entries: HashMap<String, (BidderInfo, Arc<dyn BidderAdapter>)>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn register(&mut self, info: BidderInfo, adapter: Arc<dyn BidderAdapter>) {
        self.entries.insert(info.id.clone(), (info, adapter));
    }

    pub fn adapter(&self, bidder_id: &str) -> Option<Arc<dyn BidderAdapter>> {
        self.entries.get(bidder_id).map(|(_, a)| a.clone())
    }

    pub fn info(&self, bidder_id: &str) -> Option<&BidderInfo> {
        self.entries.get(bidder_id).map(|(i, _)| i)
    }

    pub fn enabled_bidder_ids(&self) -> Vec<String> {
        self.entries
            .values()
            .filter(|(info, _)| info.enabled)
            .map(|(info, _)| info.id.clone())
            .collect()
    }

    pub fn all_infos(&self) -> Vec<&BidderInfo> {
        self.entries.values().map(|(info, _)| info).collect()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
