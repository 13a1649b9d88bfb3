// ── Connection boundary ──
//
// A `Connector` turns connection parameters into a live `Connection`. The
// connection exposes what the router advertised when its service
// descriptions were fetched, plus a blocking `call_action`.

use std::collections::BTreeSet;

use secrecy::SecretString;

use crate::error::Error;
use crate::value::{ActionName, Fields};

/// Link-local address every FRITZ!Box answers on.
pub const DEFAULT_ADDRESS: &str = "169.254.1.1";
/// TR-064 control port.
pub const DEFAULT_PORT: u16 = 49000;
/// Default user name for TR-064 access.
pub const DEFAULT_USER: &str = "dslf-config";

/// Parameters for opening a connection to one router.
#[derive(Debug, Clone)]
pub struct ConnectionParams {
    pub address: String,
    pub port: u16,
    pub user: String,
    /// `None` opens an unauthenticated session (IGD services only).
    pub password: Option<SecretString>,
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.into(),
            port: DEFAULT_PORT,
            user: DEFAULT_USER.into(),
            password: None,
        }
    }
}

impl ConnectionParams {
    /// Same endpoint and user, but without credentials.
    pub fn without_password(&self) -> Self {
        Self {
            address: self.address.clone(),
            port: self.port,
            user: self.user.clone(),
            password: None,
        }
    }
}

/// A live session with a router.
///
/// Calls block until the router answers or the library's own timeout fires.
pub trait Connection {
    /// Model name from the device description. `None` means the router could
    /// not be reached or is not a supported device.
    fn model_name(&self) -> Option<&str>;

    /// Every `(service, action)` pair the router advertised for this session.
    fn action_names(&self) -> BTreeSet<ActionName>;

    /// Service identifiers advertised for this session. Protected services
    /// only show up when application access is enabled and a password was given.
    fn service_names(&self) -> BTreeSet<String>;

    /// Invoke one action. An empty map means the router returned no data.
    fn call_action(&self, service: &str, action: &str, arguments: &Fields)
    -> Result<Fields, Error>;
}

/// Factory for [`Connection`]s.
pub trait Connector {
    type Connection: Connection;

    fn connect(&self, params: &ConnectionParams) -> Result<Self::Connection, Error>;
}
