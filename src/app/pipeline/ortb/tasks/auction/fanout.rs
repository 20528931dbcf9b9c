use crate::app::pipeline::ortb::context::{AuctionContext, FanoutOutcome};
use crate::core::adapters::registry::{ExtraInfo, ResponseData};
use crate::core::models::bid_request::BidRequest;
use futures_util::future::join_all;
use std::time::{Duration, Instant};
use tracing::warn;

/// Builds the per-bidder request by injecting each resolved config into
/// the matching impression's `ext[bidder_id]`, clearing any stale entry
/// for impressions the resolver didn't configure this bidder for. Each
/// bidder gets its own clone; adapters additionally deep-copy per
/// impression internally, so no mutation an adapter makes is ever
/// visible to another bidder's task (§4.6 deep-copy discipline).
///
/// Also where the Privacy Gate's IP anonymization (§4.5.6) actually
/// lands on outbound requests: `ctx.request` itself is never mutated,
/// so each per-bidder copy anonymizes its own `device` before it is
/// handed to an adapter.
fn build_bidder_request(
    ctx: &AuctionContext,
    bidder_id: &str,
    by_tag: &std::collections::HashMap<String, std::collections::HashMap<String, serde_json::Value>>,
) -> BidRequest {
    let mut req = ctx.request.clone();

    for imp in req.imp.iter_mut() {
        match by_tag.get(&imp.tag_id).and_then(|m| m.get(bidder_id)) {
            Some(params) => {
                imp.ext.insert(bidder_id.to_string(), params.clone());
            }
            None => {
                imp.ext.remove(bidder_id);
            }
        }
    }

    req.imp.retain(|imp| imp.ext.contains_key(bidder_id));

    if let Some(clearance) = ctx.clearance.get() {
        if let Some(device) = req.device.as_mut() {
            ctx.privacy_gate.anonymize_ip_if_required(clearance.regulation, device);
        }
    }

    req
}

fn extra_info_for(bidder_id: &str) -> ExtraInfo {
    let upper = bidder_id.to_uppercase();
    let user = std::env::var(format!("{upper}_XAPI_USER"));
    let pass = std::env::var(format!("{upper}_XAPI_PASS"));

    ExtraInfo {
        basic_auth: match (user, pass) {
            (Ok(u), Ok(p)) => Some((u, p)),
            _ => None,
        },
    }
}

async fn run_one_bidder(ctx: &AuctionContext, bidder_id: String, per_bidder_timeout: Duration) -> FanoutOutcome {
    let start = Instant::now();
    let by_tag = ctx.bidder_params.get().expect("bidder params resolved before fan-out");
    let bidder_request = build_bidder_request(ctx, &bidder_id, by_tag);

    if bidder_request.imp.is_empty() {
        return FanoutOutcome {
            bidder_id,
            bids: Vec::new(),
            response_currency: ctx.response_currency.clone(),
            error: None,
            timed_out: false,
            skipped_by_breaker: false,
            latency: start.elapsed(),
        };
    }

    let Some(adapter) = ctx.adapters.adapter(&bidder_id) else {
        return FanoutOutcome {
            bidder_id,
            bids: Vec::new(),
            response_currency: ctx.response_currency.clone(),
            error: Some("no adapter registered".to_string()),
            timed_out: false,
            skipped_by_breaker: false,
            latency: start.elapsed(),
        };
    };

    let extra = extra_info_for(&bidder_id);
    let (outbound_requests, build_errors) = adapter.make_requests(&bidder_request, &extra);

    if !build_errors.is_empty() {
        ctx.breakers.record_failure(&bidder_id);
        return FanoutOutcome {
            bidder_id: bidder_id.clone(),
            bids: Vec::new(),
            response_currency: ctx.response_currency.clone(),
            error: Some(format!("{} request-build error(s)", build_errors.len())),
            timed_out: false,
            skipped_by_breaker: false,
            latency: start.elapsed(),
        };
    }

    let mut all_bids = Vec::new();
    let mut any_error = None;
    let mut timed_out = false;
    let mut bid_currency: Option<String> = None;

    for outbound in outbound_requests {
        let call = async {
            let mut builder = match outbound.method {
                "GET" => ctx.http_client.get(&outbound.uri),
                _ => ctx.http_client.post(&outbound.uri).body(outbound.body.clone()),
            };
            for (name, value) in &outbound.headers {
                builder = builder.header(name, value);
            }
            if let Some((user, pass)) = &extra.basic_auth {
                builder = builder.basic_auth(user, Some(pass));
            }
            builder.send().await
        };

        match tokio::time::timeout(per_bidder_timeout, call).await {
            Ok(Ok(response)) => {
                let status = response.status().as_u16();
                let content_type = response
                    .headers()
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("")
                    .to_string();
                match response.bytes().await {
                    Ok(body) => {
                        let response_data = ResponseData { status, content_type, body };
                        let (bidder_response, parse_errors) = adapter.make_bids(&bidder_request, &response_data);
                        if !bidder_response.currency.is_empty() {
                            bid_currency = Some(bidder_response.currency.clone());
                        }
                        all_bids.extend(bidder_response.bids);
                        if !parse_errors.is_empty() {
                            any_error = Some(format!("{} bid-parse error(s)", parse_errors.len()));
                        }
                    }
                    Err(e) => any_error = Some(format!("body read error: {e}")),
                }
            }
            Ok(Err(e)) => any_error = Some(format!("transport error: {e}")),
            Err(_) => {
                timed_out = true;
                any_error = Some("timed out".to_string());
            }
        }
    }

    if timed_out || any_error.is_some() {
        ctx.breakers.record_failure(&bidder_id);
    } else {
        ctx.breakers.record_success(&bidder_id);
    }

    if any_error.is_some() {
        warn!(bidder_id, error = ?any_error, "bidder fan-out recorded an error");
    }

    FanoutOutcome {
        bidder_id,
        bids: all_bids,
        response_currency: bid_currency.unwrap_or_else(|| ctx.response_currency.clone()),
        error: any_error,
        timed_out,
        skipped_by_breaker: false,
        latency: start.elapsed(),
    }
}

/// Runs every selected bidder concurrently, each bound by the parent
/// deadline (§4.6 step 6, §5 cancellation). Polling all bidder futures
/// together on the current task means a slow bidder's HTTP wait never
/// delays the others; `tokio::time::timeout` per call is what enforces
/// that a bidder is never given more than its allotted budget.
pub async fn fan_out(ctx: &AuctionContext, bidder_ids: Vec<String>) -> Vec<FanoutOutcome> {
    let remaining = ctx.remaining_budget();
    let futures = bidder_ids
        .into_iter()
        .map(|bidder_id| run_one_bidder(ctx, bidder_id, remaining));

    join_all(futures).await
}
