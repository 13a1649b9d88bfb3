//! Metric extraction and mapping engine for FRITZ!Box TR-064 telemetry.
//!
//! Polls a router through the `fritzmon-api` connection boundary and turns
//! the answers into collectd-style value records:
//!
//! - **[`catalog`]**: Static table of polled `(service, action)` pairs and
//!   their field → metric mappings, with compile-time duplicate checks.
//!
//! - **[`conversion`]**: Per-field normalization (status flags, byte → bit
//!   rates, fixed-point smart-home readings).
//!
//! - **[`lifecycle`]**: Opens and validates the unauthenticated and password
//!   sessions, filters the catalog to what the router advertises.
//!
//! - **[`PollSession`]**: One read cycle: scalar calls, index enumeration
//!   until the first empty response, scope labelling, flattening.
//!
//! - **[`dispatch`]**: Readings → [`ValueRecord`]s for the host's [`MetricSink`].
//!
//! - **[`Plugin`]**: Registry of configured [`Target`]s driving the host
//!   lifecycle (configure / init / read / shutdown).

pub mod catalog;
pub mod config;
pub mod conversion;
pub mod dispatch;
pub mod error;
pub mod lifecycle;
pub mod plugin;
pub mod reading;
pub mod session;
pub mod target;

// ── Primary re-exports ──────────────────────────────────────────────
pub use catalog::{Access, CATALOG, IndexSpec, MetricKind, MetricMapping, ServiceAction};
pub use config::TargetConfig;
pub use conversion::{CONVERSIONS, ConversionRule, Conversions, MetricValue};
pub use dispatch::{MetricSink, PLUGIN_NAME, ValueRecord};
pub use error::CoreError;
pub use lifecycle::Connections;
pub use plugin::Plugin;
pub use reading::{Reading, Readings};
pub use session::PollSession;
pub use target::Target;
