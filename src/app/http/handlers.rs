use crate::app::lifecycle::context::StartupContext;
use crate::app::pipeline::core::Pipeline;
use crate::app::pipeline::ortb::{AuctionContext, AuctionError};
use crate::core::adapters::registry::AdapterRegistry;
use crate::core::admin::AdminAuthGate;
use crate::core::analytics::AnalyticsEmitter;
use crate::core::circuit::CircuitBreakerRegistry;
use crate::core::currency::converter::AggregateConverter;
use crate::core::models::bid_request::{
    BidFloor, BidRequest, Device, Geo, Impression, MediaType, Banner, Regs, Site, User,
};
use crate::core::models::bid_response::BidResponse;
use crate::core::models::publisher::PublisherIdentityBuilder;
use crate::core::privacy::PrivacyGate;
use crate::core::resolver::ConfigResolver;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use tracing::Instrument;

/// The auction-relevant slice of `ExchangeConfig` a handler needs per
/// request, copied out once at startup so handlers never reach back
/// into `StartupContext` (and so `AppState` stays `Send + Sync + Clone`
/// without pulling in the whole startup object graph).
#[derive(Clone)]
pub struct AuctionSettings {
    pub server_max_timeout: Duration,
    pub safety_margin: Duration,
    pub default_currency: String,
}

/// Per-process dependency bundle every request handler needs. Built once
/// at startup from `StartupContext`'s fully-populated `OnceLock`s and
/// cloned (cheaply, all `Arc`s) into each worker.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<ConfigResolver>,
    pub privacy_gate: Arc<PrivacyGate>,
    pub adapters: Arc<AdapterRegistry>,
    pub breakers: Arc<CircuitBreakerRegistry>,
    pub currency: Arc<AggregateConverter>,
    pub analytics: Arc<AnalyticsEmitter>,
    pub admin_gate: Arc<AdminAuthGate>,
    pub auction_pipeline: Arc<Pipeline<AuctionContext, AuctionError>>,
    pub settings: AuctionSettings,
    pub http_client: Arc<reqwest::Client>,
}

impl AppState {
    pub fn from_startup(ctx: &StartupContext) -> Self {
        let config = ctx.config.get().expect("config loaded before server starts");
        Self {
            resolver: ctx.resolver.get().expect("resolver initialized").clone(),
            privacy_gate: ctx.privacy_gate.get().expect("privacy gate initialized").clone(),
            adapters: ctx.adapters.get().expect("adapters initialized").clone(),
            breakers: ctx.breakers.get().expect("breakers initialized").clone(),
            currency: ctx.currency.get().expect("currency initialized").clone(),
            analytics: ctx.analytics.get().expect("analytics initialized").clone(),
            admin_gate: ctx.admin_gate.get().expect("admin gate initialized").clone(),
            auction_pipeline: ctx.auction_pipeline.get().expect("auction pipeline built").clone(),
            settings: AuctionSettings {
                server_max_timeout: config.auction.server_max_timeout,
                safety_margin: config.auction.safety_margin,
                default_currency: config.currency.default_currency.clone(),
            },
            http_client: Arc::new(reqwest::Client::new()),
        }
    }
}

fn base_context(state: &AppState, request: BidRequest) -> AuctionContext {
    let tmax = Duration::from_millis(request.tmax.max(1) as u64);
    let effective = tmax.min(state.settings.server_max_timeout);
    let deadline = Instant::now() + effective.saturating_sub(state.settings.safety_margin);
    let response_currency = request.cur.first().cloned().unwrap_or_else(|| state.settings.default_currency.clone());

    AuctionContext {
        request,
        started_at: Instant::now(),
        deadline,
        resolver: state.resolver.clone(),
        privacy_gate: state.privacy_gate.clone(),
        adapters: state.adapters.clone(),
        breakers: state.breakers.clone(),
        currency: state.currency.clone(),
        analytics: state.analytics.clone(),
        response_currency,
        http_client: state.http_client.clone(),
        publisher: OnceLock::new(),
        clearance: OnceLock::new(),
        bidder_params: OnceLock::new(),
        selected_bidders: OnceLock::new(),
        fanout_results: tokio::sync::Mutex::new(Vec::new()),
        winner_records: tokio::sync::Mutex::new(Vec::new()),
        response: tokio::sync::Mutex::new(None),
    }
}

/// OpenRTB 2.x endpoint (§6.1/§6.2): accepts a full `BidRequest`, returns
/// the OpenRTB `BidResponse` JSON on a win or a bare HTTP 204 on no-bid.
pub async fn openrtb_handler(state: web::Data<AppState>, body: web::Json<BidRequest>) -> impl Responder {
    let auction_ctx = base_context(&state, body.into_inner());
    let span = crate::child_span!("auction", request_id = %auction_ctx.request.id);

    if let Err(e) = state.auction_pipeline.run(&auction_ctx).instrument(span).await {
        tracing::debug!(error = %e, "auction pipeline aborted before a response was produced");
        return match e {
            AuctionError::DependencyDown(_) => HttpResponse::ServiceUnavailable().finish(),
            _ => HttpResponse::NoContent().finish(),
        };
    }

    let response = auction_ctx.response.lock().await.take();
    match response {
        Some(resp) if !resp.is_no_bid() => HttpResponse::Ok().json(resp),
        _ => HttpResponse::NoContent().finish(),
    }
}

#[derive(Debug, Deserialize)]
struct CompactSlot {
    #[serde(rename = "divId")]
    div_id: String,
    sizes: Vec<(u32, u32)>,
    #[serde(rename = "adUnitPath")]
    ad_unit_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompactPage {
    domain: String,
    #[serde(default)]
    url: String,
}

#[derive(Debug, Deserialize)]
struct CompactDevice {
    #[serde(rename = "type", default)]
    device_type: String,
    #[serde(default)]
    ua: String,
}

#[derive(Debug, Deserialize)]
struct CompactConsent {
    gdpr: Option<u8>,
    #[serde(rename = "tcString")]
    tc_string: Option<String>,
    #[serde(rename = "usPrivacy")]
    us_privacy: Option<String>,
}

/// Compact vendor request schema (§6.1). The server resolves each slot
/// to a full OpenRTB impression via the resolver before handing the
/// translated request to the same pipeline the OpenRTB endpoint uses.
#[derive(Debug, Deserialize)]
pub struct CompactRequest {
    #[serde(rename = "accountId")]
    account_id: String,
    #[serde(default = "default_compact_timeout")]
    timeout: u32,
    slots: Vec<CompactSlot>,
    page: Option<CompactPage>,
    device: Option<CompactDevice>,
    consent: Option<CompactConsent>,
}

fn default_compact_timeout() -> u32 {
    2800
}

#[derive(Debug, Serialize)]
struct CompactBid {
    #[serde(rename = "divId")]
    div_id: String,
    price: f64,
    currency: String,
    adm: String,
    w: u32,
    h: u32,
}

#[derive(Debug, Serialize)]
struct CompactResponse {
    bids: Vec<CompactBid>,
    #[serde(rename = "responseTime")]
    response_time: u128,
}

fn compact_to_bid_request(req: CompactRequest) -> BidRequest {
    let imp = req
        .slots
        .into_iter()
        .map(|slot| Impression {
            id: slot.div_id.clone(),
            media: Some(MediaType::Banner(Banner { sizes: slot.sizes })),
            bid_floor: None::<BidFloor>,
            tag_id: slot.ad_unit_path.unwrap_or(slot.div_id),
            ext: HashMap::new(),
        })
        .collect();

    let site = req.page.map(|p| Site {
        domain: p.domain,
        page: p.url,
        publisher_id: req.account_id.clone(),
    });

    let device = req.device.map(|d| Device {
        ua: d.ua,
        ip: String::new(),
        ipv6: String::new(),
        geo: None::<Geo>,
    });

    let (user, regs) = match req.consent {
        Some(c) => (
            Some(User {
                id: String::new(),
                consent: c.tc_string.unwrap_or_default(),
                eids: HashMap::new(),
            }),
            Some(Regs {
                gdpr: c.gdpr,
                us_privacy: c.us_privacy.unwrap_or_default(),
                coppa: None,
                dsa: None,
            }),
        ),
        None => (None, None),
    };

    BidRequest {
        id: uuid::Uuid::new_v4().to_string(),
        imp,
        site,
        device,
        user,
        regs,
        cur: Vec::new(),
        tmax: req.timeout,
        ext: HashMap::new(),
    }
}

fn compact_response_from(resp: &BidResponse, wall_time: Duration) -> CompactResponse {
    let bids = resp
        .seatbid
        .iter()
        .flat_map(|sb| sb.bid.iter())
        .map(|bid| CompactBid {
            div_id: bid.imp_id.clone(),
            price: bid.price,
            currency: resp.cur.clone(),
            adm: bid.adm.clone(),
            w: bid.w,
            h: bid.h,
        })
        .collect();

    CompactResponse {
        bids,
        response_time: wall_time.as_millis(),
    }
}

/// Compact vendor endpoint (§6.1/§6.2). No-bid always returns HTTP 200
/// with an empty `bids` array, unlike the OpenRTB endpoint's 204.
pub async fn vendor_handler(state: web::Data<AppState>, body: web::Json<CompactRequest>) -> impl Responder {
    let start = Instant::now();
    let auction_ctx = base_context(&state, compact_to_bid_request(body.into_inner()));
    let span = crate::child_span!("auction", request_id = %auction_ctx.request.id);

    if state.auction_pipeline.run(&auction_ctx).instrument(span).await.is_err() {
        return HttpResponse::Ok().json(CompactResponse { bids: Vec::new(), response_time: start.elapsed().as_millis() });
    }

    let response = auction_ctx.response.lock().await.take().unwrap_or_default();
    HttpResponse::Ok().json(compact_response_from(&response, start.elapsed()))
}

fn admin_authorized(req: &HttpRequest, state: &AppState) -> bool {
    let header = req.headers().get("Authorization").and_then(|v| v.to_str().ok());
    state.admin_gate.authorize(header)
}

#[derive(Debug, Deserialize)]
pub struct PublisherWriteRequest {
    pub id: String,
    pub allowed_domains: Vec<String>,
    pub bid_multiplier: f64,
    pub expected_version: i64,
}

/// Admin publisher-write endpoint (C8/§4.4), gated by the pre-shared
/// admin key. Conflicts surface as 409 so the operator's retry can
/// re-read the current version before trying again.
pub async fn admin_write_publisher(
    http_req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<PublisherWriteRequest>,
) -> impl Responder {
    if !admin_authorized(&http_req, &state) {
        return HttpResponse::Unauthorized().finish();
    }

    let resolver = &state.resolver;
    let body = body.into_inner();

    let identity = match PublisherIdentityBuilder::default()
        .id(body.id.clone())
        .allowed_domains(body.allowed_domains)
        .bid_multiplier(body.bid_multiplier)
        .status(crate::core::models::publisher::PublisherStatus::Active)
        .version(body.expected_version)
        .build()
    {
        Ok(identity) => identity,
        Err(e) => return HttpResponse::BadRequest().body(e.to_string()),
    };

    match resolver.write_publisher(identity, body.expected_version).await {
        Ok(updated) => HttpResponse::Ok().json(UpdatedPublisher::from(&updated)),
        Err(_) => HttpResponse::Conflict().finish(),
    }
}

#[derive(Serialize)]
struct UpdatedPublisher {
    id: String,
    version: i64,
}

impl UpdatedPublisher {
    fn from(identity: &crate::core::models::publisher::PublisherIdentity) -> Self {
        Self { id: identity.id.clone(), version: identity.version }
    }
}

pub async fn healthz() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/healthz", web::get().to(healthz))
        .route("/openrtb2/auction", web::post().to(openrtb_handler))
        .route("/br/vendor", web::post().to(vendor_handler))
        .route("/admin/publishers", web::post().to(admin_write_publisher));
}
