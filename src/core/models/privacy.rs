use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regulation {
    #[serde(rename = "GDPR")]
    Gdpr,
    #[serde(rename = "US_STATE_PRIVACY")]
    UsState,
    #[serde(rename = "NONE")]
    None,
}

impl Regulation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Regulation::Gdpr => "GDPR",
            Regulation::UsState => "US_STATE_PRIVACY",
            Regulation::None => "NONE",
        }
    }
}

/// Purposes required in strict-mode GDPR enforcement (§4.5.2)
pub const REQUIRED_TCF_PURPOSES: [u8; 3] = [1, 2, 7];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcfConsent {
    pub version: u8,
    /// Bitmap-ish record of which purposes have consent, indexed by
    /// purpose id (1-based; index 0 unused)
    pub purposes_consent: [bool; 25],
    pub vendor_consent: Vec<u16>,
    pub vendor_legitimate_interest: Vec<u16>,
}

impl TcfConsent {
    pub fn has_purpose(&self, purpose: u8) -> bool {
        (purpose as usize) < self.purposes_consent.len() && self.purposes_consent[purpose as usize]
    }

    pub fn has_vendor(&self, vendor_id: u32) -> bool {
        let vendor_id = vendor_id as u16;
        self.vendor_consent.contains(&vendor_id)
            || self.vendor_legitimate_interest.contains(&vendor_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    MissingConsent,
    InvalidConsent,
    MissingRequiredPurposes,
    CcpaOptOut,
    Coppa,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::MissingConsent => "missing_consent",
            RejectReason::InvalidConsent => "invalid_consent",
            RejectReason::MissingRequiredPurposes => "missing_required_purposes",
            RejectReason::CcpaOptOut => "ccpa_opt_out",
            RejectReason::Coppa => "coppa",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PrivacyRejection {
    pub regulation: Regulation,
    pub reason: RejectReason,
}
