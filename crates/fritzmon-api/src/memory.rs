// ── In-memory router ──
//
// A scriptable stand-in for a FRITZ!Box. It follows the access rules of the
// real device closely enough to exercise every lifecycle path:
//
// - protected services are only advertised when a password is supplied and
//   "allow access for applications" is enabled;
// - calls to protected services need the right password;
// - indexed actions answer with an empty response past the last record.
//
// Clones share state, so a test can keep a handle after passing the router
// to the engine and reshape it between poll cycles.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use secrecy::ExposeSecret;
use tracing::debug;

use crate::connection::{Connection, ConnectionParams, Connector};
use crate::error::Error;
use crate::value::{ActionName, FieldValue, Fields};

/// Build a [`Fields`] map from `(name, value)` pairs.
pub fn fields<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Fields
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// One recorded `call_action` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub service: String,
    pub action: String,
    pub arguments: Fields,
    /// Whether the calling session carried a password.
    pub with_password: bool,
}

#[derive(Debug, Clone)]
enum Responses {
    Scalar(Fields),
    Indexed {
        index_field: String,
        records: Vec<Fields>,
    },
}

#[derive(Debug, Default)]
struct RouterState {
    model_name: Option<String>,
    password: Option<String>,
    application_access: bool,
    unreachable: bool,
    actions: BTreeMap<ActionName, Responses>,
    protected_services: BTreeSet<String>,
    pending_failures: VecDeque<Error>,
    calls: Vec<CallRecord>,
    connects: usize,
}

impl RouterState {
    fn is_visible(&self, service: &str, elevated: bool) -> bool {
        elevated || !self.protected_services.contains(service)
    }
}

/// Scriptable in-memory router implementing [`Connector`].
#[derive(Debug, Clone, Default)]
pub struct MemoryRouter {
    state: Arc<Mutex<RouterState>>,
}

impl MemoryRouter {
    /// A reachable router reporting `model_name`, with application access
    /// enabled and no password set.
    pub fn new(model_name: &str) -> Self {
        let router = Self::default();
        {
            let mut state = router.lock();
            state.model_name = Some(model_name.into());
            state.application_access = true;
        }
        router
    }

    fn lock(&self) -> MutexGuard<'_, RouterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Builders ─────────────────────────────────────────────────────

    /// Register a scalar action answering with `response`.
    pub fn with_action(self, service: &str, action: &str, response: Fields) -> Self {
        self.lock()
            .actions
            .insert(ActionName::new(service, action), Responses::Scalar(response));
        self
    }

    /// Register an indexed action. Index `n` answers with `records[n]`,
    /// anything past the end with an empty response.
    pub fn with_indexed_action(
        self,
        service: &str,
        action: &str,
        index_field: &str,
        records: Vec<Fields>,
    ) -> Self {
        self.lock().actions.insert(
            ActionName::new(service, action),
            Responses::Indexed {
                index_field: index_field.into(),
                records,
            },
        );
        self
    }

    /// Mark a service as requiring an authenticated session.
    pub fn with_protected_service(self, service: &str) -> Self {
        self.lock().protected_services.insert(service.into());
        self
    }

    /// Require `password` for protected services.
    pub fn with_password(self, password: &str) -> Self {
        self.lock().password = Some(password.into());
        self
    }

    // ── Runtime knobs ────────────────────────────────────────────────

    pub fn set_model_name(&self, model_name: Option<&str>) {
        self.lock().model_name = model_name.map(Into::into);
    }

    pub fn set_application_access(&self, enabled: bool) {
        self.lock().application_access = enabled;
    }

    /// Make `connect` fail with a transport error.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.lock().unreachable = unreachable;
    }

    /// Replace the response of an existing scalar action, or add it.
    pub fn set_response(&self, service: &str, action: &str, response: Fields) {
        self.lock()
            .actions
            .insert(ActionName::new(service, action), Responses::Scalar(response));
    }

    /// Stop advertising an action, as older firmware does.
    pub fn remove_action(&self, service: &str, action: &str) {
        self.lock().actions.remove(&ActionName::new(service, action));
    }

    /// Queue a failure; the next `call_action` on any session returns it.
    pub fn fail_next_call(&self, error: Error) {
        self.lock().pending_failures.push_back(error);
    }

    // ── Inspection ───────────────────────────────────────────────────

    pub fn calls(&self) -> Vec<CallRecord> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn connect_count(&self) -> usize {
        self.lock().connects
    }
}

impl Connector for MemoryRouter {
    type Connection = MemoryConnection;

    fn connect(&self, params: &ConnectionParams) -> Result<MemoryConnection, Error> {
        let mut state = self.lock();
        state.connects += 1;

        if state.unreachable {
            return Err(Error::Transport(format!(
                "connection refused: {}:{}",
                params.address, params.port
            )));
        }

        // Without application access the router silently downgrades the
        // session to an anonymous one.
        let elevated = params.password.is_some() && state.application_access;
        let authorized = elevated
            && match (&params.password, &state.password) {
                (Some(given), Some(expected)) => given.expose_secret() == expected.as_str(),
                (Some(_), None) => true,
                (None, _) => false,
            };

        debug!(address = %params.address, elevated, authorized, "memory router session opened");

        Ok(MemoryConnection {
            state: Arc::clone(&self.state),
            model_name: state.model_name.clone(),
            elevated,
            authorized,
        })
    }
}

/// Session handed out by [`MemoryRouter`].
#[derive(Debug)]
pub struct MemoryConnection {
    state: Arc<Mutex<RouterState>>,
    model_name: Option<String>,
    elevated: bool,
    authorized: bool,
}

impl MemoryConnection {
    fn lock(&self) -> MutexGuard<'_, RouterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Connection for MemoryConnection {
    fn model_name(&self) -> Option<&str> {
        self.model_name.as_deref()
    }

    fn action_names(&self) -> BTreeSet<ActionName> {
        let state = self.lock();
        state
            .actions
            .keys()
            .filter(|name| state.is_visible(&name.service, self.elevated))
            .cloned()
            .collect()
    }

    fn service_names(&self) -> BTreeSet<String> {
        let state = self.lock();
        state
            .actions
            .keys()
            .filter(|name| state.is_visible(&name.service, self.elevated))
            .map(|name| name.service.clone())
            .collect()
    }

    fn call_action(
        &self,
        service: &str,
        action: &str,
        arguments: &Fields,
    ) -> Result<Fields, Error> {
        let mut state = self.lock();
        state.calls.push(CallRecord {
            service: service.into(),
            action: action.into(),
            arguments: arguments.clone(),
            with_password: self.elevated,
        });

        if let Some(failure) = state.pending_failures.pop_front() {
            return Err(failure);
        }

        let unsupported = || Error::UnsupportedAction {
            service: service.into(),
            action: action.into(),
        };

        if !state.is_visible(service, self.elevated) {
            return Err(unsupported());
        }
        if state.protected_services.contains(service) && !self.authorized {
            return Err(Error::Authorization {
                service: service.into(),
                action: action.into(),
            });
        }

        let responses = state
            .actions
            .get(&ActionName::new(service, action))
            .ok_or_else(unsupported)?;

        let response = match responses {
            Responses::Scalar(response) => response.clone(),
            Responses::Indexed {
                index_field,
                records,
            } => arguments
                .get(index_field)
                .and_then(FieldValue::to_integer)
                .and_then(|index| usize::try_from(index).ok())
                .and_then(|index| records.get(index).cloned())
                .unwrap_or_default(),
        };
        Ok(response)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn params(password: Option<&str>) -> ConnectionParams {
        ConnectionParams {
            password: password.map(|p| SecretString::from(p.to_owned())),
            ..ConnectionParams::default()
        }
    }

    fn router() -> MemoryRouter {
        MemoryRouter::new("FRITZ!Box 7490")
            .with_action(
                "WANIPConn:1",
                "GetStatusInfo",
                fields([("NewConnectionStatus", "Connected")]),
            )
            .with_action("DeviceInfo:1", "GetInfo", fields([("NewUpTime", 42_i64)]))
            .with_protected_service("DeviceInfo:1")
            .with_password("secret")
    }

    #[test]
    fn anonymous_session_hides_protected_services() {
        let conn = router().connect(&params(None)).unwrap();
        assert_eq!(conn.model_name(), Some("FRITZ!Box 7490"));
        assert!(conn.service_names().contains("WANIPConn:1"));
        assert!(!conn.service_names().contains("DeviceInfo:1"));
        assert_eq!(
            conn.call_action("DeviceInfo:1", "GetInfo", &Fields::new()),
            Err(Error::UnsupportedAction {
                service: "DeviceInfo:1".into(),
                action: "GetInfo".into(),
            })
        );
    }

    #[test]
    fn wrong_password_is_rejected_on_protected_calls() {
        let conn = router().connect(&params(Some("nope"))).unwrap();
        assert!(conn.service_names().contains("DeviceInfo:1"));
        let err = conn
            .call_action("DeviceInfo:1", "GetInfo", &Fields::new())
            .unwrap_err();
        assert!(err.is_authorization());
    }

    #[test]
    fn disabled_application_access_downgrades_session() {
        let router = router();
        router.set_application_access(false);
        let conn = router.connect(&params(Some("secret"))).unwrap();
        assert!(!conn.service_names().contains("DeviceInfo:1"));
    }

    #[test]
    fn indexed_action_runs_dry_past_last_record() {
        let router = MemoryRouter::new("FRITZ!Box 7490").with_indexed_action(
            "X_AVM-DE_Homeauto:1",
            "GetGenericDeviceInfos",
            "NewIndex",
            vec![fields([("NewDeviceId", 16_i64)])],
        );
        let conn = router.connect(&params(None)).unwrap();
        let call = |index: i64| {
            conn.call_action(
                "X_AVM-DE_Homeauto:1",
                "GetGenericDeviceInfos",
                &fields([("NewIndex", index)]),
            )
            .unwrap()
        };
        assert_eq!(call(0), fields([("NewDeviceId", 16_i64)]));
        assert!(call(1).is_empty());
        assert_eq!(router.calls().len(), 2);
    }

    #[test]
    fn queued_failure_is_returned_once() {
        let router = router();
        let conn = router.connect(&params(None)).unwrap();
        router.fail_next_call(Error::ProtocolCorruption {
            message: "truncated".into(),
        });
        assert!(
            conn.call_action("WANIPConn:1", "GetStatusInfo", &Fields::new())
                .unwrap_err()
                .is_corruption()
        );
        assert!(
            conn.call_action("WANIPConn:1", "GetStatusInfo", &Fields::new())
                .is_ok()
        );
    }

    #[test]
    fn unreachable_router_fails_to_connect() {
        let router = router();
        router.set_unreachable(true);
        assert!(matches!(
            router.connect(&params(None)),
            Err(Error::Transport(_))
        ));
        assert_eq!(router.connect_count(), 1);
    }
}
