// ── Host configuration blocks ──
//
// The metrics host hands each plugin block over as an ordered list of
// `Key value...` nodes. One block describes one router.

use std::fmt;

use fritzmon_core::TargetConfig;
use secrecy::SecretString;
use tracing::warn;

use crate::ConfigError;

/// A single value of a host configuration node.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Text(String),
    Number(f64),
    Boolean(bool),
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<u16> for ConfigValue {
    fn from(n: u16) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

/// One `Key value...` line of a host configuration block.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigNode {
    pub key: String,
    pub values: Vec<ConfigValue>,
}

impl ConfigNode {
    pub fn new(key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        Self {
            key: key.into(),
            values: vec![value.into()],
        }
    }
}

/// Build a [`TargetConfig`] from one configuration block.
///
/// Keys are matched exactly. Unknown keys are logged and ignored; only the
/// first value of each node is used.
pub fn target_from_nodes(nodes: &[ConfigNode]) -> Result<TargetConfig, ConfigError> {
    let mut config = TargetConfig::default();

    for node in nodes {
        let Some(value) = node.values.first() else {
            return Err(ConfigError::Validation {
                field: node.key.clone(),
                reason: "missing value".into(),
            });
        };

        match node.key.as_str() {
            "Address" => config.address = value.to_string(),
            "Port" => config.port = parse_port(value)?,
            "User" => config.user = value.to_string(),
            "Password" => config.password = Some(SecretString::from(value.to_string())),
            "Hostname" => config.hostname = value.to_string(),
            "Instance" => config.plugin_instance = value.to_string(),
            "Verbose" => config.verbose = is_truthy(value),
            other => warn!("Unknown config {other}"),
        }
    }

    Ok(config)
}

fn parse_port(value: &ConfigValue) -> Result<u16, ConfigError> {
    let invalid = || ConfigError::Validation {
        field: "Port".into(),
        reason: format!("expected a port number, got '{value}'"),
    };
    match value {
        ConfigValue::Text(s) => s.trim().parse().map_err(|_| invalid()),
        ConfigValue::Number(n) if n.fract() == 0.0 => format!("{n}").parse().map_err(|_| invalid()),
        ConfigValue::Number(_) | ConfigValue::Boolean(_) => Err(invalid()),
    }
}

fn is_truthy(value: &ConfigValue) -> bool {
    match value {
        ConfigValue::Boolean(b) => *b,
        ConfigValue::Text(s) => s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("yes"),
        ConfigValue::Number(_) => false,
    }
}
