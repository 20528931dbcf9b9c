//! Rubicon adapter. Grounded on the request/ext shape from §8 scenario 1:
//! `imp.ext.rubicon = {accountId, siteId, zoneId}`. The bidder speaks
//! OpenRTB-shaped JSON back at us, so `make_bids` only has to re-tag each
//! bid's media type and adapt field names, not reshape the whole payload.

use crate::core::adapters::errors::{AdapterError, AdapterErrorKind};
use crate::core::adapters::registry::{
    BidderAdapter, BidderResponse, ExtraInfo, OutboundRequest, ResponseData, build_imp_map,
    classify_status, clear_internal_ids, detect_media_type,
};
use crate::core::models::bid_request::BidRequest;
use crate::core::models::bid_response::Bid;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RubiconImpExt {
    #[serde(rename = "accountId")]
    account_id: i64,
    #[serde(rename = "siteId")]
    site_id: i64,
    #[serde(rename = "zoneId")]
    zone_id: i64,
}

#[derive(Debug, Deserialize)]
struct RubiconWireBid {
    id: String,
    impid: String,
    price: f64,
    adm: String,
    crid: String,
    #[serde(default)]
    w: u32,
    #[serde(default)]
    h: u32,
    #[serde(default)]
    adomain: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RubiconWireSeatBid {
    bid: Vec<RubiconWireBid>,
}

#[derive(Debug, Deserialize)]
struct RubiconWireResponse {
    #[serde(default)]
    seatbid: Vec<RubiconWireSeatBid>,
    #[serde(default = "default_wire_currency")]
    cur: String,
}

fn default_wire_currency() -> String {
    "USD".to_string()
}

pub struct RubiconAdapter {
    endpoint: String,
}

impl RubiconAdapter {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

impl BidderAdapter for RubiconAdapter {
    fn bidder_code(&self) -> &str {
        "rubicon"
    }

    fn make_requests(
        &self,
        req: &BidRequest,
        _extra: &ExtraInfo,
    ) -> (Vec<OutboundRequest>, Vec<AdapterError>) {
        let mut errors = Vec::new();
        let mut outbound = Vec::new();

        for imp in &req.imp {
            let Some(ext_value) = imp.ext.get("rubicon") else {
                continue;
            };

            let params: RubiconImpExt = match serde_json::from_value(ext_value.clone()) {
                Ok(p) => p,
                Err(e) => {
                    errors.push(AdapterError::new(
                        self.bidder_code(),
                        AdapterErrorKind::Marshal,
                        format!("imp {} missing/invalid rubicon params: {e}", imp.id),
                    ));
                    continue;
                }
            };

            let mut req_copy = req.clone();
            req_copy.imp = vec![imp.clone()];
            clear_internal_ids(&mut req_copy);

            if let Some(site) = req_copy.site.as_mut() {
                site.publisher_id = params.account_id.to_string();
            }

            let body = match serde_json::to_vec(&req_copy) {
                Ok(b) => b,
                Err(e) => {
                    errors.push(AdapterError::new(
                        self.bidder_code(),
                        AdapterErrorKind::Marshal,
                        format!("failed to marshal request for imp {}: {e}", imp.id),
                    ));
                    continue;
                }
            };

            outbound.push(OutboundRequest {
                method: "POST",
                uri: format!(
                    "{}?siteId={}&zoneId={}",
                    self.endpoint, params.site_id, params.zone_id
                ),
                body,
                headers: vec![
                    ("content-type".into(), "application/json;charset=utf-8".into()),
                    ("accept".into(), "application/json".into()),
                ],
                gzip: false,
            });
        }

        (outbound, errors)
    }

    fn make_bids(
        &self,
        req: &BidRequest,
        response: &ResponseData,
    ) -> (BidderResponse, Vec<AdapterError>) {
        let mut errors = Vec::new();

        if let Err(classify_err) = classify_status(self.bidder_code(), response.status) {
            if let Some(err) = classify_err {
                errors.push(err);
            }
            return (BidderResponse::default(), errors);
        }

        if !response.content_type.contains("json") {
            errors.push(AdapterError::with_body_preview(
                self.bidder_code(),
                AdapterErrorKind::Parse,
                format!("unexpected content-type '{}'", response.content_type),
                &response.body,
            ));
            return (BidderResponse::default(), errors);
        }

        let wire: RubiconWireResponse = match serde_json::from_slice(&response.body) {
            Ok(w) => w,
            Err(e) => {
                errors.push(AdapterError::with_body_preview(
                    self.bidder_code(),
                    AdapterErrorKind::Parse,
                    format!("failed to parse response json: {e}"),
                    &response.body,
                ));
                return (BidderResponse::default(), errors);
            }
        };

        let imp_map = build_imp_map(req);
        let mut bids = Vec::new();

        for seat in wire.seatbid {
            for wire_bid in seat.bid {
                let mtype = detect_media_type(
                    &imp_map,
                    &Bid {
                        imp_id: wire_bid.impid.clone(),
                        ..Default::default()
                    },
                    None,
                );

                bids.push(Bid {
                    id: wire_bid.id,
                    imp_id: wire_bid.impid,
                    price: wire_bid.price,
                    adm: wire_bid.adm,
                    nurl: None,
                    crid: wire_bid.crid,
                    w: wire_bid.w,
                    h: wire_bid.h,
                    mtype,
                    adomain: wire_bid.adomain,
                    dsa: None,
                });
            }
        }

        (BidderResponse { bids, currency: wire.cur }, errors)
    }
}
