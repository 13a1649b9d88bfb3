// ── Connection lifecycle ──
//
// Opens the sessions a target polls through and checks that the router is
// actually willing to report: reachable, UPnP status enabled, and (with a
// password) application access enabled and the credentials accepted. Also
// narrows the catalog down to what the router advertises, once per connect,
// so missing actions never surface as read-time errors.

use std::collections::BTreeSet;

use fritzmon_api::{ActionName, Connection, ConnectionParams, Connector, Fields};
use tracing::{debug, info};

use crate::catalog::{Access, ServiceAction};
use crate::config::TargetConfig;
use crate::error::CoreError;

/// IGD status action; an empty answer means UPnP status reporting is off.
pub const STATUS_SERVICE: &str = "WANIPConn:1";
pub const STATUS_ACTION: &str = "GetStatusInfo";
/// TR-064 service only advertised to sessions with application access.
pub const AUTH_PROBE_SERVICE: &str = "WANIPConnection:1";

/// The sessions held for one target.
#[derive(Debug)]
pub struct Connections<T> {
    primary: T,
    authenticated: Option<T>,
}

impl<T: Connection> Connections<T> {
    pub fn new(primary: T, authenticated: Option<T>) -> Self {
        Self {
            primary,
            authenticated,
        }
    }

    /// The unauthenticated session.
    pub fn primary(&self) -> &T {
        &self.primary
    }

    /// The password session, if a password is configured.
    pub fn authenticated(&self) -> Option<&T> {
        self.authenticated.as_ref()
    }

    /// Session an action with the given access level runs on.
    pub fn for_access(&self, access: Access) -> Option<&T> {
        match access {
            Access::Public => Some(&self.primary),
            Access::Authenticated => self.authenticated.as_ref(),
        }
    }
}

/// Open and validate all sessions for `config`.
pub fn establish<C: Connector>(
    connector: &C,
    config: &TargetConfig,
) -> Result<Connections<C::Connection>, CoreError> {
    let primary = open(connector, &config.connection_params().without_password())?;

    let status = primary.call_action(STATUS_SERVICE, STATUS_ACTION, &Fields::new())?;
    if status.is_empty() {
        return Err(CoreError::UpnpStatusDisabled);
    }

    let authenticated = if config.has_password() {
        Some(authenticate(connector, config)?)
    } else {
        info!("No password configured, some values cannot be queried");
        None
    };

    debug!(
        address = %config.address,
        model = primary.model_name().unwrap_or_default(),
        authenticated = authenticated.is_some(),
        "router connection established"
    );
    Ok(Connections::new(primary, authenticated))
}

fn open<C: Connector>(
    connector: &C,
    params: &ConnectionParams,
) -> Result<C::Connection, CoreError> {
    let connection = connector.connect(params).map_err(|err| {
        debug!(address = %params.address, error = %err, "connect failed");
        CoreError::ConnectionFailed {
            address: params.address.clone(),
        }
    })?;

    if connection.model_name().is_none() {
        return Err(CoreError::ConnectionFailed {
            address: params.address.clone(),
        });
    }
    Ok(connection)
}

fn authenticate<C: Connector>(
    connector: &C,
    config: &TargetConfig,
) -> Result<C::Connection, CoreError> {
    let connection = open(connector, &config.connection_params())?;

    // Without "allow access for applications" the router quietly hands out
    // an anonymous session, which only shows in the advertised services.
    if !connection.service_names().contains(AUTH_PROBE_SERVICE) {
        return Err(CoreError::ApplicationAccessDisabled);
    }

    match connection.call_action(AUTH_PROBE_SERVICE, STATUS_ACTION, &Fields::new()) {
        Ok(_) => Ok(connection),
        Err(err) if err.is_authorization() => Err(CoreError::IncorrectPassword),
        Err(err) => Err(err.into()),
    }
}

// ── Catalog filtering ────────────────────────────────────────────────

fn is_advertised(entry: &ServiceAction, advertised: &BTreeSet<ActionName>) -> bool {
    let supported = advertised.contains(&entry.name());
    if !supported {
        info!(
            "Skipping unsupported service action: {} {}",
            entry.service, entry.action
        );
    }
    supported
}

/// Drop catalog entries the connection does not advertise.
pub fn filter_supported<T: Connection>(
    catalog: &[ServiceAction],
    connection: &T,
) -> Vec<ServiceAction> {
    let advertised = connection.action_names();
    catalog
        .iter()
        .filter(|entry| is_advertised(entry, &advertised))
        .copied()
        .collect()
}

/// Filter every entry against the session it will run on.
///
/// Authenticated entries are kept as-is when there is no password session;
/// the poll session skips them.
pub fn supported_catalog<T: Connection>(
    catalog: &[ServiceAction],
    connections: &Connections<T>,
) -> Vec<ServiceAction> {
    let public = connections.primary().action_names();
    let protected = connections.authenticated().map(Connection::action_names);

    catalog
        .iter()
        .filter(|entry| match (entry.access, &protected) {
            (Access::Public, _) => is_advertised(entry, &public),
            (Access::Authenticated, Some(advertised)) => is_advertised(entry, advertised),
            (Access::Authenticated, None) => true,
        })
        .copied()
        .collect()
}
