use crate::core::models::bid_request::MediaKind;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct Bid {
    pub id: String,
    /// Must equal some `imp[*].id` on the originating request (I2)
    pub imp_id: String,
    /// Non-negative, expressed in the enclosing BidResponse's currency (I1)
    pub price: f64,
    pub adm: String,
    pub nurl: Option<String>,
    pub crid: String,
    pub w: u32,
    pub h: u32,
    pub mtype: Option<MediaKind>,
    pub adomain: Vec<String>,
    pub dsa: Option<Value>,
}

impl Default for Bid {
    fn default() -> Self {
        Self {
            id: String::new(),
            imp_id: String::new(),
            price: 0.0,
            adm: String::new(),
            nurl: None,
            crid: String::new(),
            w: 0,
            h: 0,
            mtype: None,
            adomain: Vec::new(),
            dsa: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Builder, Default)]
#[builder(setter(into), default)]
pub struct SeatBid {
    pub seat: String,
    pub bid: Vec<Bid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Builder, Default)]
#[builder(setter(into), default)]
pub struct BidResponse {
    pub id: String,
    pub cur: String,
    pub seatbid: Vec<SeatBid>,
}

impl BidResponse {
    pub fn is_no_bid(&self) -> bool {
        self.seatbid.is_empty() || self.seatbid.iter().all(|s| s.bid.is_empty())
    }
}
