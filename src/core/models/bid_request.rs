use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize, Default, Builder)]
#[builder(setter(into), default)]
pub struct Geo {
    /// ISO-3166-1 alpha-3 country code
    pub country: String,
    pub region: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct Device {
    pub ua: String,
    pub ip: String,
    pub ipv6: String,
    pub geo: Option<Geo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct User {
    pub id: String,
    /// Raw TCF v2 consent string, empty if none provided
    pub consent: String,
    /// Extended identifiers keyed by provider name
    pub eids: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct Regs {
    pub gdpr: Option<u8>,
    pub us_privacy: String,
    pub coppa: Option<u8>,
    pub dsa: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct Site {
    pub domain: String,
    pub page: String,
    pub publisher_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidFloor {
    pub price: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Banner {
    pub sizes: Vec<(u32, u32)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub mimes: Vec<String>,
    pub protocols: Vec<u32>,
    pub min_duration: Option<u32>,
    pub max_duration: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Native;

/// An impression carries at most one media-type object. Enforced by
/// construction (an enum, not three `Option` fields) rather than by a
/// runtime check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MediaType {
    Banner(Banner),
    Video(Video),
    Native(Native),
}

impl MediaType {
    pub fn discriminant(&self) -> MediaKind {
        match self {
            MediaType::Banner(_) => MediaKind::Banner,
            MediaType::Video(_) => MediaKind::Video,
            MediaType::Native(_) => MediaKind::Native,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Banner,
    Video,
    Native,
}

#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct Impression {
    pub id: String,
    pub media: Option<MediaType>,
    pub bid_floor: Option<BidFloor>,
    pub tag_id: String,
    /// Bidder-specific parameters keyed by bidder code, e.g.
    /// `{"rubicon": {"accountId": 26298, ...}}`
    pub ext: HashMap<String, Value>,
}

impl Default for Impression {
    fn default() -> Self {
        Self {
            id: String::new(),
            media: None,
            bid_floor: None,
            tag_id: String::new(),
            ext: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct BidRequest {
    pub id: String,
    pub imp: Vec<Impression>,
    pub site: Option<Site>,
    pub device: Option<Device>,
    pub user: Option<User>,
    pub regs: Option<Regs>,
    /// Ordered currency preference, first entry wins under I7
    pub cur: Vec<String>,
    pub tmax: u32,
    /// Opaque blob the resolver may inject onto the request before fan-out,
    /// keyed by bidder code
    pub ext: HashMap<String, Value>,
}

impl Default for BidRequest {
    fn default() -> Self {
        Self {
            id: String::new(),
            imp: Vec::new(),
            site: None,
            device: None,
            user: None,
            regs: None,
            cur: Vec::new(),
            tmax: 0,
            ext: HashMap::new(),
        }
    }
}

impl BidRequest {
    pub fn publisher_id(&self) -> Option<&str> {
        self.site.as_ref().map(|s| s.publisher_id.as_str())
    }

    pub fn domain(&self) -> Option<&str> {
        self.site.as_ref().map(|s| s.domain.as_str())
    }

    pub fn find_imp(&self, imp_id: &str) -> Option<&Impression> {
        self.imp.iter().find(|i| i.id == imp_id)
    }
}
