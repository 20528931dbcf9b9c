use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Static, config-loaded facts about a demand partner. Distinct from the
/// per-bidder [`crate::core::adapters::BidderAdapter`], which holds no
/// state of its own and is looked up by `id` from the registry.
#[derive(Debug, Clone, Serialize, Deserialize, Default, Builder)]
#[builder(setter(into), default)]
pub struct BidderInfo {
    pub id: String,
    pub name: String,
    pub maintainer: String,
    /// IAB Global Vendor List id, used by the privacy gate's per-bidder
    /// consent filter
    pub gvl_vendor_id: Option<u32>,
    pub default_endpoint: String,
    pub enabled: bool,
    pub formats: TargetingFormats,
}

#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[builder(setter(into), default)]
pub struct TargetingFormats {
    pub banner: bool,
    pub video: bool,
    pub native: bool,
}

impl Default for TargetingFormats {
    fn default() -> Self {
        Self {
            banner: true,
            video: true,
            native: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, EnumString, Display, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    Json,
}
