use thiserror::Error;

/// Top-level error type for the `fritzmon-api` crate.
///
/// Mirrors the failure modes a TR-064 client library surfaces to callers.
/// `fritzmon-core` maps these into user-facing diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The router rejected the credentials for a protected action (HTTP 401).
    #[error("Authorization failed for {service} {action}")]
    Authorization { service: String, action: String },

    // ── Transport ───────────────────────────────────────────────────
    /// Connection refused, DNS failure, timeout, etc.
    #[error("Router transport error: {0}")]
    Transport(String),

    // ── Protocol ────────────────────────────────────────────────────
    /// The response body could not be parsed (truncated or corrupt XML).
    #[error("Malformed response from router: {message}")]
    ProtocolCorruption { message: String },

    // ── Capability ──────────────────────────────────────────────────
    /// The router does not advertise the requested service/action.
    #[error("Unsupported action: {service} {action}")]
    UnsupportedAction { service: String, action: String },
}

impl Error {
    /// Returns `true` if the router refused the credentials.
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::Authorization { .. })
    }

    /// Returns `true` if the response was structurally broken, which usually
    /// means the session is out of sync and a fresh connection is needed.
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::ProtocolCorruption { .. })
    }
}
