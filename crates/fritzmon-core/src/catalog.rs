// ── Action catalog ──
//
// Which TR-064 actions are polled and how their response fields map onto
// collectd metrics. The table is plain `const` data; duplicate field keys or
// metric names inside one action are rejected at compile time, the cross
// reference against the conversion table is checked at start-up.

use std::collections::BTreeSet;

use fritzmon_api::ActionName;

use crate::conversion::{ConversionRule, Conversions};
use crate::error::CoreError;

/// Semantic category of a reading, rendered as the collectd type name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum MetricKind {
    Gauge,
    Uptime,
    Bitrate,
    Bytes,
    Power,
    Temperature,
}

/// Which session an action runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// IGD services, available without credentials.
    Public,
    /// TR-064 services behind the password.
    Authenticated,
}

/// Enumeration metadata for actions returning one record per sub-device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSpec {
    /// Integer request argument walked from 0 upwards.
    pub index_field: &'static str,
    /// Response (or request) field naming the instance.
    pub instance_field: &'static str,
    /// Prepended to the instance value in the scope label.
    pub instance_prefix: &'static str,
}

/// One response field → metric mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricMapping {
    pub field: &'static str,
    pub metric: &'static str,
    pub kind: MetricKind,
}

/// A polled `(service, action)` pair with its metric mappings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceAction {
    pub service: &'static str,
    pub action: &'static str,
    pub access: Access,
    /// `None` for scalar actions.
    pub index: Option<IndexSpec>,
    pub metrics: &'static [MetricMapping],
}

impl ServiceAction {
    pub const fn scalar(
        service: &'static str,
        action: &'static str,
        access: Access,
        metrics: &'static [MetricMapping],
    ) -> Self {
        Self {
            service,
            action,
            access,
            index: None,
            metrics,
        }
    }

    pub const fn indexed(
        service: &'static str,
        action: &'static str,
        access: Access,
        index: IndexSpec,
        metrics: &'static [MetricMapping],
    ) -> Self {
        Self {
            service,
            action,
            access,
            index: Some(index),
            metrics,
        }
    }

    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    pub fn name(&self) -> ActionName {
        ActionName::new(self.service, self.action)
    }
}

const fn metric(field: &'static str, metric: &'static str, kind: MetricKind) -> MetricMapping {
    MetricMapping {
        field,
        metric,
        kind,
    }
}

// ── Default catalog ──────────────────────────────────────────────────

const STATUS_INFO: &[MetricMapping] = &[
    metric("NewConnectionStatus", "constatus", MetricKind::Gauge),
    metric("NewUptime", "uptime", MetricKind::Uptime),
];

const LINK_PROPERTIES: &[MetricMapping] = &[
    metric("NewPhysicalLinkStatus", "dslstatus", MetricKind::Gauge),
    metric("NewLayer1DownstreamMaxBitRate", "downstreammax", MetricKind::Bitrate),
    metric("NewLayer1UpstreamMaxBitRate", "upstreammax", MetricKind::Bitrate),
];

const ADDON_INFOS: &[MetricMapping] = &[
    metric("NewByteSendRate", "sendrate", MetricKind::Bitrate),
    metric("NewByteReceiveRate", "receiverate", MetricKind::Bitrate),
    metric("NewTotalBytesSent", "totalbytessent", MetricKind::Bytes),
    metric("NewTotalBytesReceived", "totalbytesreceived", MetricKind::Bytes),
];

const DEVICE_INFO: &[MetricMapping] = &[metric("NewUpTime", "boxuptime", MetricKind::Uptime)];

const LAN_STATISTICS: &[MetricMapping] = &[
    metric("NewBytesSent", "lan_totalbytessent", MetricKind::Bytes),
    metric("NewBytesReceived", "lan_totalbytesreceived", MetricKind::Bytes),
];

const WAN_LINK_PROPERTIES: &[MetricMapping] = &[
    metric("NewLayer1DownstreamMaxBitRate", "linkdownstreammax", MetricKind::Bitrate),
    metric("NewLayer1UpstreamMaxBitRate", "linkupstreammax", MetricKind::Bitrate),
];

const HOMEAUTO_DEVICE: &[MetricMapping] = &[
    metric("NewMultimeterPower", "power", MetricKind::Power),
    metric("NewMultimeterEnergy", "energy", MetricKind::Power),
    metric("NewTemperatureCelsius", "temperature", MetricKind::Temperature),
    metric("NewSwitchState", "switchstate", MetricKind::Gauge),
];

/// Actions polled on every read cycle, in dispatch order.
pub const CATALOG: &[ServiceAction] = &[
    ServiceAction::scalar("WANIPConn:1", "GetStatusInfo", Access::Public, STATUS_INFO),
    ServiceAction::scalar(
        "WANCommonIFC:1",
        "GetCommonLinkProperties",
        Access::Public,
        LINK_PROPERTIES,
    ),
    ServiceAction::scalar("WANCommonIFC:1", "GetAddonInfos", Access::Public, ADDON_INFOS),
    ServiceAction::scalar("DeviceInfo:1", "GetInfo", Access::Authenticated, DEVICE_INFO),
    ServiceAction::scalar(
        "LANEthernetInterfaceConfig:1",
        "GetStatistics",
        Access::Authenticated,
        LAN_STATISTICS,
    ),
    ServiceAction::scalar(
        "WANCommonInterfaceConfig:1",
        "GetCommonLinkProperties",
        Access::Authenticated,
        WAN_LINK_PROPERTIES,
    ),
    ServiceAction::indexed(
        "X_AVM-DE_Homeauto:1",
        "GetGenericDeviceInfos",
        Access::Authenticated,
        IndexSpec {
            index_field: "NewIndex",
            instance_field: "NewIndex",
            instance_prefix: "dect",
        },
        HOMEAUTO_DEVICE,
    ),
];

// ── Integrity checks ─────────────────────────────────────────────────

const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

const fn has_duplicate_mapping(metrics: &[MetricMapping]) -> bool {
    let mut i = 0;
    while i < metrics.len() {
        let mut j = i + 1;
        while j < metrics.len() {
            if str_eq(metrics[i].field, metrics[j].field)
                || str_eq(metrics[i].metric, metrics[j].metric)
            {
                return true;
            }
            j += 1;
        }
        i += 1;
    }
    false
}

const fn catalog_has_duplicate_mapping(catalog: &[ServiceAction]) -> bool {
    let mut i = 0;
    while i < catalog.len() {
        if has_duplicate_mapping(catalog[i].metrics) {
            return true;
        }
        i += 1;
    }
    false
}

const _: () = assert!(
    !catalog_has_duplicate_mapping(CATALOG),
    "duplicate field or metric name within one catalog action"
);

/// Start-up validation of a catalog against a conversion table.
///
/// Rejects duplicate mappings within an action (for catalogs built at
/// runtime), indexed actions with blank index/instance fields, and
/// conversion entries that no catalog action maps (usually a typo).
pub fn validate(catalog: &[ServiceAction], conversions: &Conversions) -> Result<(), CoreError> {
    for entry in catalog {
        if has_duplicate_mapping(entry.metrics) {
            return Err(CoreError::Catalog {
                message: format!(
                    "{} {} maps a field or metric name twice",
                    entry.service, entry.action
                ),
            });
        }
        if let Some(index) = entry.index {
            if index.index_field.is_empty() || index.instance_field.is_empty() {
                return Err(CoreError::Catalog {
                    message: format!(
                        "{} {} is indexed but has no index or instance field",
                        entry.service, entry.action
                    ),
                });
            }
        }
    }

    let mapped: BTreeSet<&str> = catalog
        .iter()
        .flat_map(|entry| entry.metrics.iter().map(|m| m.field))
        .collect();

    let unknown: Vec<&str> = conversions
        .iter()
        .map(|(field, _)| *field)
        .filter(|field| !mapped.contains(field))
        .collect();

    if unknown.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Catalog {
            message: format!(
                "conversion rules for unmapped fields: {}",
                unknown.join(", ")
            ),
        })
    }
}

/// Conversion rule the poll session will apply to `field`.
pub fn rule_for(conversions: &Conversions, field: &str) -> ConversionRule {
    conversions
        .iter()
        .find(|(name, _)| *name == field)
        .map_or(ConversionRule::Identity, |(_, rule)| *rule)
}
