#![allow(clippy::unwrap_used)]
// Contract tests for `MemoryRouter` as seen through the connection traits.

use std::collections::BTreeSet;

use pretty_assertions::assert_eq;
use secrecy::SecretString;

use fritzmon_api::memory::fields;
use fritzmon_api::{
    ActionName, CallRecord, Connection, ConnectionParams, Connector, Error, Fields, MemoryRouter,
};

fn router() -> MemoryRouter {
    MemoryRouter::new("FRITZ!Box 7590")
        .with_action(
            "WANIPConn:1",
            "GetStatusInfo",
            fields([("NewConnectionStatus", "Connected")]),
        )
        .with_action("DeviceInfo:1", "GetInfo", fields([("NewUpTime", 7_i64)]))
        .with_protected_service("DeviceInfo:1")
        .with_password("secret")
}

fn params(password: Option<&str>) -> ConnectionParams {
    ConnectionParams {
        address: "fritz.box".into(),
        password: password.map(|p| SecretString::from(p.to_owned())),
        ..ConnectionParams::default()
    }
}

#[test]
fn test_advertised_actions_depend_on_session() {
    let router = router();
    let anonymous = router.connect(&params(None)).unwrap();
    let elevated = router.connect(&params(Some("secret"))).unwrap();

    assert_eq!(
        anonymous.action_names(),
        BTreeSet::from([ActionName::new("WANIPConn:1", "GetStatusInfo")])
    );
    assert_eq!(
        elevated.service_names(),
        BTreeSet::from(["DeviceInfo:1".to_owned(), "WANIPConn:1".to_owned()])
    );
    assert_eq!(router.connect_count(), 2);
}

#[test]
fn test_calls_are_recorded_in_order() {
    let router = router();
    let conn = router.connect(&params(Some("secret"))).unwrap();

    conn.call_action("WANIPConn:1", "GetStatusInfo", &Fields::new())
        .unwrap();
    let uptime = conn
        .call_action("DeviceInfo:1", "GetInfo", &fields([("NewIndex", 0_i64)]))
        .unwrap();
    assert_eq!(uptime, fields([("NewUpTime", 7_i64)]));

    assert_eq!(
        router.calls(),
        vec![
            CallRecord {
                service: "WANIPConn:1".into(),
                action: "GetStatusInfo".into(),
                arguments: Fields::new(),
                with_password: true,
            },
            CallRecord {
                service: "DeviceInfo:1".into(),
                action: "GetInfo".into(),
                arguments: fields([("NewIndex", 0_i64)]),
                with_password: true,
            },
        ]
    );

    router.clear_calls();
    assert!(router.calls().is_empty());
}

#[test]
fn test_unreachable_router_refuses_connections() {
    let router = router();
    router.set_unreachable(true);
    let err = router.connect(&params(None)).unwrap_err();
    assert_eq!(
        err,
        Error::Transport("connection refused: fritz.box:49000".into())
    );
}

#[test]
fn test_unknown_action_is_unsupported() {
    let conn = router().connect(&params(None)).unwrap();
    let err = conn
        .call_action("WANIPConn:1", "GetExternalIPAddress", &Fields::new())
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedAction { .. }));
}
