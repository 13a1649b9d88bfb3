// ── Core error types ──
//
// User-facing errors from fritzmon-core. Transport-level failures from
// `fritzmon_api` are translated by the `From` impl below; the lifecycle
// manager raises the more specific connection variants itself.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Failed to connect to {address}")]
    ConnectionFailed { address: String },

    #[error("Router unreachable: {reason}")]
    Transport { reason: String },

    #[error("Status information via UPnP is not enabled")]
    UpnpStatusDisabled,

    #[error("Allow access for applications is not enabled")]
    ApplicationAccessDisabled,

    #[error("Incorrect password or 'FRITZ!Box Settings' rights for user disabled")]
    IncorrectPassword,

    // ── Read errors ──────────────────────────────────────────────────
    #[error("Invalid data received: {message}")]
    Protocol { message: String },

    #[error("Authorization failed for {action}")]
    Unauthorized { action: String },

    #[error("Unsupported action: {action}")]
    UnsupportedAction { action: String },

    // ── Catalog errors ───────────────────────────────────────────────
    #[error("Catalog inconsistency: {message}")]
    Catalog { message: String },
}

impl CoreError {
    /// Errors that leave a target without a usable connection.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. }
                | Self::Transport { .. }
                | Self::UpnpStatusDisabled
                | Self::ApplicationAccessDisabled
                | Self::IncorrectPassword
        )
    }

    /// Corrupt router responses; recovered by reconnecting before the next read.
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, Self::Protocol { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<fritzmon_api::Error> for CoreError {
    fn from(err: fritzmon_api::Error) -> Self {
        match err {
            fritzmon_api::Error::Authorization { service, action } => CoreError::Unauthorized {
                action: format!("{service} {action}"),
            },
            fritzmon_api::Error::Transport(reason) => CoreError::Transport { reason },
            fritzmon_api::Error::ProtocolCorruption { message } => CoreError::Protocol { message },
            fritzmon_api::Error::UnsupportedAction { service, action } => {
                CoreError::UnsupportedAction {
                    action: format!("{service} {action}"),
                }
            }
        }
    }
}
