use std::fmt;

/// Body previews embedded in error messages are bounded to this many bytes
/// (§4.1) so a chatty bidder can't blow up log volume.
pub const BODY_PREVIEW_LIMIT: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterErrorKind {
    Marshal,
    BadRequest,
    BadStatus,
    Parse,
    Timeout,
    Connection,
}

#[derive(Debug, Clone)]
pub struct AdapterError {
    pub bidder: String,
    pub kind: AdapterErrorKind,
    pub message: String,
}

impl AdapterError {
    pub fn new(bidder: impl Into<String>, kind: AdapterErrorKind, message: impl Into<String>) -> Self {
        Self {
            bidder: bidder.into(),
            kind,
            message: message.into(),
        }
    }

    pub fn with_body_preview(
        bidder: impl Into<String>,
        kind: AdapterErrorKind,
        message: impl Into<String>,
        body: &[u8],
    ) -> Self {
        let preview_len = body.len().min(BODY_PREVIEW_LIMIT);
        let preview = String::from_utf8_lossy(&body[..preview_len]);

        Self::new(
            bidder,
            kind,
            format!("{}: body preview: {}", message.into(), preview),
        )
    }

    /// Whether this error should be counted as a circuit-breaker failure.
    /// A bad request from us is not the bidder's fault, so it is excluded
    /// from breaker accounting; everything else is our signal of bidder
    /// health.
    pub fn counts_as_breaker_failure(&self, bad_request_is_failure: bool) -> bool {
        match self.kind {
            AdapterErrorKind::BadRequest => bad_request_is_failure,
            _ => true,
        }
    }
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {:?}: {}", self.bidder, self.kind, self.message)
    }
}

impl std::error::Error for AdapterError {}
