use derive_builder::Builder;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublisherStatus {
    Active,
    Archived,
}

/// `clear_price = bid_price / bid_multiplier`. Stored as an `f64` but
/// validated to `[1.0, 10.0]` at every construction site (see
/// [`PublisherIdentity::new`]) since `0.0` would divide-by-zero the
/// revenue-share step.
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct PublisherIdentity {
    pub id: String,
    pub allowed_domains: Vec<String>,
    pub bid_multiplier: f64,
    pub status: PublisherStatus,
    /// Monotonic version for optimistic concurrency (I5)
    pub version: i64,
}

impl PublisherIdentityBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(multiplier) = self.bid_multiplier {
            if !(1.0..=10.0).contains(&multiplier) {
                return Err(format!(
                    "bid_multiplier must be in [1.0, 10.0], got {multiplier}"
                ));
            }
        }
        Ok(())
    }
}

impl PublisherIdentity {
    pub fn is_active(&self) -> bool {
        self.status == PublisherStatus::Active
    }

    /// Returns whether `domain` matches one of the publisher's allowed
    /// glob patterns (`*` matches any run of characters within a single
    /// path segment is not modeled here; we only need the common
    /// `*.example.com` / exact-match shapes this exchange actually uses).
    pub fn domain_allowed(&self, domain: &str) -> bool {
        if self.allowed_domains.is_empty() {
            return true;
        }

        self.allowed_domains
            .iter()
            .any(|pattern| glob_match(pattern, domain))
    }
}

fn glob_match(pattern: &str, candidate: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(suffix) => candidate == suffix || candidate.ends_with(&format!(".{suffix}")),
        None => pattern == candidate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_domain_matches_subdomains() {
        assert!(glob_match("*.example.com", "www.example.com"));
        assert!(glob_match("*.example.com", "example.com"));
        assert!(!glob_match("*.example.com", "example.org"));
    }

    #[test]
    fn multiplier_out_of_range_rejected() {
        let result = PublisherIdentityBuilder::default()
            .id("p1")
            .allowed_domains(vec![])
            .bid_multiplier(0.0)
            .status(PublisherStatus::Active)
            .version(1i64)
            .build();

        assert!(result.is_err());
    }
}
