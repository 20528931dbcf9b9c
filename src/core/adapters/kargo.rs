//! Second demand adapter, grounded the same way as [`crate::core::adapters::rubicon`]
//! but against a flatter `{placementId}` parameter shape, demonstrating that the
//! registry holds heterogeneous wire contracts behind one trait object.

use crate::core::adapters::errors::{AdapterError, AdapterErrorKind};
use crate::core::adapters::registry::{
    BidderAdapter, BidderResponse, ExtraInfo, OutboundRequest, ResponseData, build_imp_map,
    classify_status, clear_internal_ids, detect_media_type,
};
use crate::core::models::bid_request::BidRequest;
use crate::core::models::bid_response::Bid;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct KargoImpExt {
    #[serde(rename = "placementId")]
    placement_id: String,
}

#[derive(Debug, Deserialize)]
struct KargoWireBid {
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
struct KargoWireResponse {
    #[serde(default)]
    bids: Vec<KargoWireBid>,
    #[serde(default = "default_wire_currency")]
    cur: String,
}

fn default_wire_currency() -> String {
    "USD".to_string()
}

pub struct KargoAdapter {
    endpoint: String,
}

impl KargoAdapter {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

impl BidderAdapter for KargoAdapter {
    fn bidder_code(&self) -> &str {
        "kargo"
    }

    fn make_requests(
        &self,
        req: &BidRequest,
        _extra: &ExtraInfo,
    ) -> (Vec<OutboundRequest>, Vec<AdapterError>) {
        let mut errors = Vec::new();

        let placements: Vec<(String, String)> = req
            .imp
            .iter()
            .filter_map(|imp| {
                let ext_value = imp.ext.get("kargo")?;
                match serde_json::from_value::<KargoImpExt>(ext_value.clone()) {
                    Ok(params) => Some((imp.id.clone(), params.placement_id)),
                    Err(e) => {
                        errors.push(AdapterError::new(
                            self.bidder_code(),
                            AdapterErrorKind::Marshal,
                            format!("imp {} missing/invalid kargo params: {e}", imp.id),
                        ));
                        None
                    }
                }
            })
            .collect();

        if placements.is_empty() {
            return (Vec::new(), errors);
        }

        let mut req_copy = req.clone();
        clear_internal_ids(&mut req_copy);

        let body = match serde_json::to_vec(&req_copy) {
            Ok(b) => b,
            Err(e) => {
                errors.push(AdapterError::new(
                    self.bidder_code(),
                    AdapterErrorKind::Marshal,
                    format!("failed to marshal request: {e}"),
                ));
                return (Vec::new(), errors);
            }
        };

        let outbound = vec![OutboundRequest {
            method: "POST",
            uri: self.endpoint.clone(),
            body,
            headers: vec![
                ("content-type".into(), "application/json;charset=utf-8".into()),
                ("accept".into(), "application/json".into()),
            ],
            gzip: true,
        }];

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

        let wire: KargoWireResponse = match serde_json::from_slice(&response.body) {
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

        let bids = wire
            .bids
            .into_iter()
            .map(|wb| {
                let mtype = detect_media_type(
                    &imp_map,
                    &Bid {
                        imp_id: wb.impid.clone(),
                        ..Default::default()
                    },
                    None,
                );

                Bid {
                    id: wb.id,
                    imp_id: wb.impid,
                    price: wb.price,
                    adm: wb.adm,
                    nurl: None,
                    crid: wb.crid,
                    w: wb.w,
                    h: wb.h,
                    mtype,
                    adomain: wb.adomain,
                    dsa: None,
                }
            })
            .collect();

        (BidderResponse { bids, currency: wire.cur }, errors)
    }
}
