// ── Value conversion ──
//
// Normalizes raw TR-064 field values before they are named and scoped.
// Status strings become 0/1 gauges, byte rates become bit rates, and the
// fixed-point AVM smart-home readings become floats.

use std::fmt;

use fritzmon_api::FieldValue;
use thiserror::Error;

/// Normalized numeric value of a reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Integer(i64),
    Float(f64),
}

impl MetricValue {
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Integer(n) => n as f64,
            Self::Float(x) => x,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("not a number: '{value}'")]
    NotNumeric { value: String },

    #[error("'{value}' overflows when multiplied by {factor}")]
    Overflow { value: i64, factor: i64 },
}

/// How a raw field value becomes a metric value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConversionRule {
    /// Numbers pass through; numeric text is parsed.
    Identity,
    /// 1 when the text equals `on`, 0 otherwise.
    Flag { on: &'static str },
    /// Integer scaling.
    Multiply(i64),
    /// Fixed-point decoding into a float.
    Divide(f64),
}

/// Field name → rule. Fields without an entry use [`ConversionRule::Identity`].
pub type Conversions = [(&'static str, ConversionRule)];

pub const CONVERSIONS: &Conversions = &[
    ("NewPhysicalLinkStatus", ConversionRule::Flag { on: "Up" }),
    ("NewConnectionStatus", ConversionRule::Flag { on: "Connected" }),
    ("NewByteSendRate", ConversionRule::Multiply(8)),
    ("NewByteReceiveRate", ConversionRule::Multiply(8)),
    ("NewTemperatureCelsius", ConversionRule::Divide(10.0)),
    ("NewSwitchState", ConversionRule::Flag { on: "ON" }),
    ("NewMultimeterEnergy", ConversionRule::Divide(1000.0)),
    ("NewMultimeterPower", ConversionRule::Divide(100.0)),
];

impl ConversionRule {
    pub fn apply(self, raw: &FieldValue) -> Result<MetricValue, ConversionError> {
        match self {
            Self::Identity => identity(raw),
            Self::Flag { on } => Ok(MetricValue::Integer(i64::from(raw.as_text() == Some(on)))),
            Self::Multiply(factor) => {
                let value = raw.to_integer().ok_or_else(|| not_numeric(raw))?;
                value
                    .checked_mul(factor)
                    .map(MetricValue::Integer)
                    .ok_or(ConversionError::Overflow { value, factor })
            }
            Self::Divide(divisor) => Ok(MetricValue::Float(to_float(raw)? / divisor)),
        }
    }
}

fn not_numeric(raw: &FieldValue) -> ConversionError {
    ConversionError::NotNumeric {
        value: raw.to_string(),
    }
}

fn identity(raw: &FieldValue) -> Result<MetricValue, ConversionError> {
    if let Some(n) = raw.to_integer() {
        return Ok(MetricValue::Integer(n));
    }
    to_float(raw).map(MetricValue::Float)
}

fn to_float(raw: &FieldValue) -> Result<f64, ConversionError> {
    match raw {
        FieldValue::Integer(n) => Ok(MetricValue::Integer(*n).as_f64()),
        FieldValue::Text(s) => s.trim().parse().map_err(|_| not_numeric(raw)),
    }
}
