use crate::core::models::bid_request::{BidRequest, Device};
use crate::core::models::privacy::{PrivacyRejection, RejectReason, Regulation, REQUIRED_TCF_PURPOSES};
use crate::core::privacy::ccpa;
use crate::core::privacy::tcf::{self, TcfConsent};
use dashmap::DashMap;
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};
use tracing::warn;

const EEA_COUNTRIES: &[&str] = &[
    "AUT", "BEL", "BGR", "HRV", "CYP", "CZE", "DNK", "EST", "FIN", "FRA", "DEU", "GRC", "HUN",
    "ISL", "IRL", "ITA", "LVA", "LIE", "LTU", "LUX", "MLT", "NLD", "NOR", "POL", "PRT", "ROU",
    "SVK", "SVN", "ESP", "SWE", "GBR",
];

const US_STATE_PRIVACY_REGIONS: &[&str] = &["CA", "VA", "CO", "CT", "UT"];

#[derive(Debug, Clone, Copy)]
pub struct PrivacyPolicy {
    pub strict_mode: bool,
    pub coppa_child_safe_filtering: bool,
    pub anonymize_ip: bool,
}

impl Default for PrivacyPolicy {
    fn default() -> Self {
        Self {
            strict_mode: true,
            coppa_child_safe_filtering: false,
            anonymize_ip: true,
        }
    }
}

/// Outcome of a passed privacy check: the detected regulation plus an
/// optional parsed TCF consent object the auction engine reuses for the
/// per-bidder vendor-consent filter (§4.6 step 4), avoiding a second
/// parse of the same string.
pub struct PrivacyClearance {
    pub regulation: Regulation,
    pub tcf_consent: Option<TcfConsent>,
}

/// Privacy Gate (C5). Holds no per-request state beyond the rejection
/// rate-limiter; one instance is shared across the whole exchange.
pub struct PrivacyGate {
    policy: PrivacyPolicy,
    last_rejection_logged: DashMap<String, Instant>,
}

impl PrivacyGate {
    pub fn new(policy: PrivacyPolicy) -> Self {
        Self {
            policy,
            last_rejection_logged: DashMap::new(),
        }
    }

    pub fn detect_regulation(request: &BidRequest) -> Regulation {
        let geo = request.device.as_ref().and_then(|d| d.geo.as_ref());

        let country = geo.map(|g| g.country.as_str()).unwrap_or("");
        if EEA_COUNTRIES.contains(&country) {
            return Regulation::Gdpr;
        }

        let region = geo.map(|g| g.region.as_str()).unwrap_or("");
        if country == "USA" && US_STATE_PRIVACY_REGIONS.contains(&region) {
            return Regulation::UsState;
        }

        Regulation::None
    }

    /// Runs the full gate: regulation detection, GDPR/TCF, CCPA, COPPA.
    /// A rejection is reported once per publisher per 60-second window
    /// (§4.5 rate-limited logging); callers still receive every
    /// rejection, only the `tracing::warn!` emission is throttled.
    pub fn check(&self, request: &BidRequest) -> Result<PrivacyClearance, PrivacyRejection> {
        if let Some(regs) = &request.regs {
            if regs.coppa == Some(1) && !self.policy.coppa_child_safe_filtering {
                return self.reject(request, Regulation::None, RejectReason::Coppa);
            }
        }

        let regulation = Self::detect_regulation(request);

        match regulation {
            Regulation::Gdpr => {
                let consent_str = request.user.as_ref().map(|u| u.consent.as_str()).unwrap_or("");
                if consent_str.is_empty() {
                    return self.reject(request, regulation, RejectReason::MissingConsent);
                }

                let consent = match tcf::parse_tcf_v2(consent_str) {
                    Ok(c) => c,
                    Err(_) => return self.reject(request, regulation, RejectReason::InvalidConsent),
                };

                if self.policy.strict_mode
                    && !REQUIRED_TCF_PURPOSES.iter().all(|p| consent.has_purpose(*p))
                {
                    return self.reject(request, regulation, RejectReason::MissingRequiredPurposes);
                }

                Ok(PrivacyClearance {
                    regulation,
                    tcf_consent: Some(consent),
                })
            }
            Regulation::UsState => {
                let us_privacy = request.regs.as_ref().map(|r| r.us_privacy.as_str()).unwrap_or("");
                if ccpa::has_opted_out(us_privacy) {
                    return self.reject(request, regulation, RejectReason::CcpaOptOut);
                }
                Ok(PrivacyClearance {
                    regulation,
                    tcf_consent: None,
                })
            }
            Regulation::None => Ok(PrivacyClearance {
                regulation,
                tcf_consent: None,
            }),
        }
    }

    fn reject(
        &self,
        request: &BidRequest,
        regulation: Regulation,
        reason: RejectReason,
    ) -> Result<PrivacyClearance, PrivacyRejection> {
        let publisher_id = request.publisher_id().unwrap_or("unknown").to_string();
        self.log_rejection_rate_limited(&publisher_id, &regulation, &reason);
        Err(PrivacyRejection { regulation, reason })
    }

    fn log_rejection_rate_limited(&self, publisher_id: &str, regulation: &Regulation, reason: &RejectReason) {
        let now = Instant::now();
        let should_log = match self.last_rejection_logged.get(publisher_id) {
            Some(last) => now.duration_since(*last) >= Duration::from_secs(60),
            None => true,
        };

        if should_log {
            self.last_rejection_logged.insert(publisher_id.to_string(), now);
            warn!(
                publisher_id,
                regulation = regulation.as_str(),
                reason = reason.as_str(),
                "privacy gate rejected request"
            );
        }
    }

    /// Per-bidder vendor-consent filter (§4.5.5): given the bidder's GVL
    /// vendor id, decides whether it may receive this request. Bidders
    /// with no registered vendor id (`None`) are always permitted,
    /// matching adapters that don't participate in TCF vendor listing.
    pub fn vendor_allowed(clearance: &PrivacyClearance, gvl_vendor_id: Option<u32>) -> bool {
        match (&clearance.tcf_consent, gvl_vendor_id) {
            (Some(consent), Some(vendor_id)) => consent.has_vendor(vendor_id),
            _ => true,
        }
    }

    /// Zeroes the last IPv4 octet or the last 80 bits of IPv6, in place,
    /// only when GDPR applies and the policy enables it (§4.5.6).
    pub fn anonymize_ip_if_required(&self, regulation: Regulation, device: &mut Device) {
        if regulation != Regulation::Gdpr || !self.policy.anonymize_ip {
            return;
        }

        if !device.ip.is_empty() {
            if let Ok(addr) = device.ip.parse::<Ipv4Addr>() {
                let octets = addr.octets();
                device.ip = Ipv4Addr::new(octets[0], octets[1], octets[2], 0).to_string();
            }
        }

        if !device.ipv6.is_empty() {
            if let Ok(addr) = device.ipv6.parse::<std::net::Ipv6Addr>() {
                let mut segments = addr.segments();
                // 80 bits = 5 x u16 segments zeroed from the tail.
                for segment in segments.iter_mut().skip(3) {
                    *segment = 0;
                }
                device.ipv6 = std::net::Ipv6Addr::from(segments).to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::bid_request::{BidRequestBuilder, DeviceBuilder, GeoBuilder, RegsBuilder};

    fn gdpr_request(consent: &str) -> BidRequest {
        BidRequestBuilder::default()
            .id("req-1")
            .device(
                DeviceBuilder::default()
                    .geo(GeoBuilder::default().country("DEU").region("").build().unwrap())
                    .build()
                    .unwrap(),
            )
            .user(crate::core::models::bid_request::UserBuilder::default().consent(consent).build().unwrap())
            .regs(RegsBuilder::default().gdpr(1u8).build().unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn detects_gdpr_for_eea_country() {
        let req = gdpr_request("");
        assert_eq!(PrivacyGate::detect_regulation(&req), Regulation::Gdpr);
    }

    #[test]
    fn rejects_gdpr_with_no_consent_string() {
        let gate = PrivacyGate::new(PrivacyPolicy::default());
        let req = gdpr_request("");
        let result = gate.check(&req);
        assert!(matches!(result, Err(PrivacyRejection { reason: RejectReason::MissingConsent, .. })));
    }

    #[test]
    fn anonymizes_ipv4_last_octet() {
        let gate = PrivacyGate::new(PrivacyPolicy::default());
        let mut device = Device {
            ip: "203.0.113.42".to_string(),
            ..Default::default()
        };
        gate.anonymize_ip_if_required(Regulation::Gdpr, &mut device);
        assert_eq!(device.ip, "203.0.113.0");
    }

    #[test]
    fn ccpa_opt_out_detected_for_state_privacy_region() {
        assert!(ccpa::has_opted_out("1YYN"));
    }
}
