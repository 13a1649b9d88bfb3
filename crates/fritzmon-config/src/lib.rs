//! Configuration for fritzmon.
//!
//! Two sources produce [`TargetConfig`]s: the metrics host's plugin block
//! (`Key value` nodes, see [`target_from_nodes`]) and a TOML file of named
//! router profiles with environment overrides and password resolution.

mod nodes;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use fritzmon_core::TargetConfig;

pub use nodes::{ConfigNode, ConfigValue, target_from_nodes};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Load(Box<figment::Error>),

    #[error("failed to render config as TOML: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Values every router profile falls back to.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named router profiles.
    #[serde(default)]
    pub routers: BTreeMap<String, RouterProfile>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_address")]
    pub address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_user")]
    pub user: String,

    /// Host name reported with every record.
    #[serde(default)]
    pub hostname: String,

    #[serde(default)]
    pub verbose: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            user: default_user(),
            hostname: String::new(),
            verbose: false,
        }
    }
}

fn default_address() -> String {
    fritzmon_core::config::DEFAULT_ADDRESS.into()
}
fn default_port() -> u16 {
    fritzmon_core::config::DEFAULT_PORT
}
fn default_user() -> String {
    fritzmon_core::config::DEFAULT_USER.into()
}

/// A named router profile. Unset fields fall back to [`Defaults`].
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RouterProfile {
    pub address: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,

    /// Password (plaintext; prefer `password_env`).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    pub hostname: Option<String>,

    /// Plugin instance; defaults to the profile name.
    pub instance: Option<String>,

    pub verbose: Option<bool>,
}

// ── Config file path ────────────────────────────────────────────────

const CONFIG_FILE: &str = "fritzmon.toml";

/// Environment variables overriding file values, e.g.
/// `FRITZMON_ROUTERS__HOME__PASSWORD_ENV` for `routers.home.password_env`.
pub const ENV_PREFIX: &str = "FRITZMON_";

/// Nesting separator within override variable names. Field names contain
/// single underscores, so nesting uses a double one.
pub const ENV_SEPARATOR: &str = "__";

/// Platform config file path, or `fritzmon.toml` in the working directory
/// when no home directory can be determined.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "fritzmon", "fritzmon").map_or_else(
        || PathBuf::from(CONFIG_FILE),
        |dirs| dirs.config_dir().join(CONFIG_FILE),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from `path`, layered over the built-in defaults and
/// under `FRITZMON_*` environment overrides. A missing file is not an error.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split(ENV_SEPARATOR));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load the config from the canonical path. Errors are logged and replaced
/// by an empty config.
pub fn load_config_or_default() -> Config {
    let path = config_path();
    load_config(&path).unwrap_or_else(|err| {
        warn!(path = %path.display(), error = %err, "ignoring unusable config");
        Config::default()
    })
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    let write_error = |source: std::io::Error| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };
    let toml_str = toml::to_string_pretty(cfg)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }
    std::fs::write(path, toml_str).map_err(write_error)
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve a profile's password: `password_env` first, then plaintext.
///
/// `None` means no password, i.e. only unauthenticated values are polled.
pub fn resolve_password(profile: &RouterProfile) -> Option<SecretString> {
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
        debug!(variable = %env_name, "password variable not set");
    }

    profile
        .password
        .as_ref()
        .map(|pw| SecretString::from(pw.clone()))
}

/// Build a [`TargetConfig`] from a profile and the shared defaults.
pub fn profile_to_target_config(
    name: &str,
    profile: &RouterProfile,
    defaults: &Defaults,
) -> Result<TargetConfig, ConfigError> {
    let address = profile
        .address
        .clone()
        .unwrap_or_else(|| defaults.address.clone());
    if address.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: format!("routers.{name}.address"),
            reason: "must not be empty".into(),
        });
    }

    Ok(TargetConfig {
        address,
        port: profile.port.unwrap_or(defaults.port),
        user: profile.user.clone().unwrap_or_else(|| defaults.user.clone()),
        password: resolve_password(profile),
        hostname: profile
            .hostname
            .clone()
            .unwrap_or_else(|| defaults.hostname.clone()),
        plugin_instance: profile.instance.clone().unwrap_or_else(|| name.into()),
        verbose: profile.verbose.unwrap_or(defaults.verbose),
    })
}

impl Config {
    /// One [`TargetConfig`] per router profile, in profile-name order.
    pub fn target_configs(&self) -> Result<Vec<TargetConfig>, ConfigError> {
        self.routers
            .iter()
            .map(|(name, profile)| profile_to_target_config(name, profile, &self.defaults))
            .collect()
    }
}
