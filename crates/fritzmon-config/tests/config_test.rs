#![allow(clippy::unwrap_used)]
// Integration tests for TOML profile loading and translation.

use std::io::Write;

use figment::Jail;

use pretty_assertions::assert_eq;
use secrecy::ExposeSecret;

use fritzmon_config::{
    Config, ConfigError, Defaults, RouterProfile, load_config, profile_to_target_config,
    resolve_password, save_config,
};

// ── Helpers ─────────────────────────────────────────────────────────
//
// Everything that reads the environment runs inside `figment::Jail`, which
// serializes those tests and restores the environment afterwards.

fn jailed(test: impl FnOnce(&mut Jail)) {
    Jail::expect_with(|jail| {
        test(jail);
        Ok(())
    });
}

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

// ── Loading ─────────────────────────────────────────────────────────

#[test]
fn test_load_profiles_with_defaults() {
    jailed(|_| {
        let file = write_config(
            r#"
[defaults]
hostname = "collector"

[routers.home]
address = "fritz.box"
password = "secret"

[routers.office]
address = "192.168.178.1"
port = 49443
instance = "downtown"
verbose = true
"#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.defaults.address, "169.254.1.1");
        assert_eq!(config.defaults.hostname, "collector");
        assert_eq!(config.routers.len(), 2);

        let targets = config.target_configs().unwrap();
        assert_eq!(
            targets
                .iter()
                .map(|t| (t.address.as_str(), t.port, t.plugin_instance.as_str()))
                .collect::<Vec<_>>(),
            [
                ("fritz.box", 49000, "home"),
                ("192.168.178.1", 49443, "downtown"),
            ]
        );
        assert!(targets.iter().all(|t| t.hostname == "collector"));
        assert_eq!(targets[0].user, "dslf-config");
        assert!(targets[0].has_password());
        assert!(!targets[1].has_password());
        assert!(targets[1].verbose);
    });
}

#[test]
fn test_missing_file_yields_defaults() {
    jailed(|_| {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert!(config.routers.is_empty());
        assert_eq!(config.defaults.port, 49000);
    });
}

#[test]
fn test_malformed_port_is_rejected() {
    jailed(|_| {
        let file = write_config(
            r#"
[routers.home]
port = "not-a-port"
"#,
        );
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Load(_))
        ));
    });
}

#[test]
fn test_save_then_load() {
    jailed(|_| {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.routers.insert(
            "home".into(),
            RouterProfile {
                address: Some("fritz.box".into()),
                ..RouterProfile::default()
            },
        );
        save_config(&config, &path).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.routers["home"].address.as_deref(), Some("fritz.box"));
    });
}

#[test]
fn test_save_reports_unwritable_path() {
    let blocker = tempfile::NamedTempFile::new().unwrap();
    let path = blocker.path().join("config.toml");

    let err = save_config(&Config::default(), &path).unwrap_err();
    assert!(matches!(err, ConfigError::Write { path: ref failed, .. } if *failed == path));
    assert!(err.to_string().starts_with("failed to write "));
}

#[test]
fn test_env_overrides_nested_fields() {
    jailed(|jail| {
        let file = write_config(
            r#"
[routers.home]
address = "fritz.box"
password = "from-file"
"#,
        );
        jail.set_env("FRITZMON_DEFAULTS__PORT", "49443");
        jail.set_env("FRITZMON_ROUTERS__HOME__PASSWORD_ENV", "FRITZ_PW");
        jail.set_env("FRITZ_PW", "from-env");

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.defaults.port, 49443);
        assert_eq!(
            config.routers["home"].password_env.as_deref(),
            Some("FRITZ_PW")
        );

        let targets = config.target_configs().unwrap();
        assert_eq!(targets[0].port, 49443);
        assert_eq!(
            targets[0].password.as_ref().unwrap().expose_secret(),
            "from-env"
        );
    });
}

#[test]
fn test_env_defines_profile_with_underscore_name() {
    jailed(|jail| {
        let dir = tempfile::tempdir().unwrap();
        jail.set_env("FRITZMON_ROUTERS__LIVING_ROOM__ADDRESS", "192.168.178.1");

        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        let targets = config.target_configs().unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].address, "192.168.178.1");
        assert_eq!(targets[0].plugin_instance, "living_room");
    });
}

#[test]
fn test_password_env_takes_precedence() {
    jailed(|jail| {
        jail.set_env("FRITZMON_TEST_PASSWORD", "from-env");
        let profile = RouterProfile {
            password: Some("plain".into()),
            password_env: Some("FRITZMON_TEST_PASSWORD".into()),
            ..RouterProfile::default()
        };
        assert_eq!(
            resolve_password(&profile).unwrap().expose_secret(),
            "from-env"
        );
    });
}

// ── Translation ─────────────────────────────────────────────────────

#[test]
fn test_empty_address_is_rejected() {
    let profile = RouterProfile {
        address: Some("  ".into()),
        ..RouterProfile::default()
    };
    let err = profile_to_target_config("home", &profile, &Defaults::default()).unwrap_err();
    assert_eq!(err.to_string(), "invalid routers.home.address: must not be empty");
}

#[test]
fn test_password_falls_back_to_plaintext() {
    jailed(|_| {
        let profile = RouterProfile {
            password: Some("plain".into()),
            password_env: Some("FRITZMON_TEST_UNSET_PASSWORD_VARIABLE".into()),
            ..RouterProfile::default()
        };
        assert_eq!(resolve_password(&profile).unwrap().expose_secret(), "plain");
        assert!(resolve_password(&RouterProfile::default()).is_none());
    });
}
