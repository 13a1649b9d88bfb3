// ── Raw values crossing the router boundary ──
//
// TR-064 responses are flat argument lists. The router library hands them
// over as field name → value, where numeric arguments (`ui4`, `ui8`, `i4`)
// arrive as integers and everything else as text.

use std::collections::BTreeMap;
use std::fmt;

/// A single raw argument value as returned by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Integer(i64),
    Text(String),
}

impl FieldValue {
    /// The textual payload, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Integer(_) => None,
        }
    }

    /// Integer view of the value. Text is parsed after trimming whitespace;
    /// firmware is inconsistent about typing counters.
    pub fn to_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Arguments of a request or response: field name → value.
pub type Fields = BTreeMap<String, FieldValue>;

/// A `(service, action)` pair as advertised in the router's service descriptions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActionName {
    pub service: String,
    pub action: String,
}

impl ActionName {
    pub fn new(service: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            action: action.into(),
        }
    }
}

impl fmt::Display for ActionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.service, self.action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_view_parses_text_counters() {
        assert_eq!(FieldValue::from(42_i64).to_integer(), Some(42));
        assert_eq!(FieldValue::from(" 225 ").to_integer(), Some(225));
        assert_eq!(FieldValue::from("Up").to_integer(), None);
    }

    #[test]
    fn display_renders_raw_payload() {
        assert_eq!(FieldValue::from(16_u32).to_string(), "16");
        assert_eq!(FieldValue::from("08761 0114116").to_string(), "08761 0114116");
        assert_eq!(
            ActionName::new("WANIPConn:1", "GetStatusInfo").to_string(),
            "WANIPConn:1 GetStatusInfo"
        );
    }
}
