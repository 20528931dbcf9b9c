use tracing::warn;

/// Admin Authentication Gate (C8). Guards only routes under the
/// administrative prefix; every other route is untouched by this gate.
/// With no configured key, requests pass through and a single startup
/// warning is logged: an explicit dev-only opt-out, never silent.
pub struct AdminAuthGate {
    api_key: Option<String>,
}

impl AdminAuthGate {
    pub fn new(api_key: Option<String>) -> Self {
        if api_key.is_none() {
            warn!("ADMIN_API_KEY not set; admin endpoints are unauthenticated (dev-only)");
        }
        Self { api_key }
    }

    /// Accepts `Authorization: Bearer <key>` or a bare token in the same
    /// header, per §4.8. Comparison is constant-time to avoid a timing
    /// oracle on the shared secret.
    pub fn authorize(&self, authorization_header: Option<&str>) -> bool {
        let Some(expected) = &self.api_key else {
            return true;
        };

        let Some(presented) = authorization_header else {
            return false;
        };

        let token = presented.strip_prefix("Bearer ").unwrap_or(presented);
        constant_time_eq(token.as_bytes(), expected.as_bytes())
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_key_configured_allows_everything() {
        let gate = AdminAuthGate::new(None);
        assert!(gate.authorize(None));
    }

    #[test]
    fn rejects_missing_header_when_key_set() {
        let gate = AdminAuthGate::new(Some("secret".to_string()));
        assert!(!gate.authorize(None));
    }

    #[test]
    fn accepts_bearer_and_bare_token() {
        let gate = AdminAuthGate::new(Some("secret".to_string()));
        assert!(gate.authorize(Some("Bearer secret")));
        assert!(gate.authorize(Some("secret")));
        assert!(!gate.authorize(Some("wrong")));
    }
}
