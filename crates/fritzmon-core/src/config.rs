// ── Runtime target configuration ──
//
// Describes *how* to reach one router and how to label its readings.
// Carries credentials but never touches disk; `fritzmon-config` builds it
// from host configuration blocks or TOML profiles and hands it in.

use fritzmon_api::ConnectionParams;
pub use fritzmon_api::{DEFAULT_ADDRESS, DEFAULT_PORT, DEFAULT_USER};
use secrecy::{ExposeSecret, SecretString};

/// Configuration for polling a single router.
#[derive(Debug, Clone)]
pub struct TargetConfig {
    /// Router address (IP or host name).
    pub address: String,
    /// TR-064 port.
    pub port: u16,
    /// TR-064 user name.
    pub user: String,
    /// Password for the authenticated session. Empty counts as unset.
    pub password: Option<SecretString>,
    /// Host name reported with every record.
    pub hostname: String,
    /// Plugin instance; prefix of every scope label.
    pub plugin_instance: String,
    /// Log calls and dispatched records at info level.
    pub verbose: bool,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.into(),
            port: DEFAULT_PORT,
            user: DEFAULT_USER.into(),
            password: None,
            hostname: String::new(),
            plugin_instance: String::new(),
            verbose: false,
        }
    }
}

impl TargetConfig {
    /// Whether an authenticated session should be attempted.
    pub fn has_password(&self) -> bool {
        self.password
            .as_ref()
            .is_some_and(|p| !p.expose_secret().is_empty())
    }

    /// Parameters for the authenticated session (password included when set).
    pub fn connection_params(&self) -> ConnectionParams {
        ConnectionParams {
            address: self.address.clone(),
            port: self.port,
            user: self.user.clone(),
            password: if self.has_password() {
                self.password.clone()
            } else {
                None
            },
        }
    }
}
