// ── Dispatch adapter ──
//
// Turns readings into the host's value records:
// `host / fritzbox-<plugin_instance> / <type>-<type_instance>`.

use std::fmt;

use tracing::info;

use crate::config::TargetConfig;
use crate::conversion::MetricValue;
use crate::reading::Reading;

/// Plugin name every record is filed under.
pub const PLUGIN_NAME: &str = "fritzbox";

/// A value record as the metrics host expects it.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueRecord {
    pub host: String,
    pub plugin: &'static str,
    pub plugin_instance: String,
    /// Host type name, i.e. the metric kind.
    pub value_type: String,
    /// The metric name.
    pub type_instance: String,
    pub values: Vec<MetricValue>,
}

impl fmt::Display for ValueRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = self.values.iter().map(ToString::to_string).collect();
        write!(
            f,
            "host: '{}', plugin: '{}', plugin_instance: '{}', type: '{}', \
             type_instance: '{}', values: '[{}]'",
            self.host,
            self.plugin,
            self.plugin_instance,
            self.value_type,
            self.type_instance,
            values.join(", ")
        )
    }
}

/// Receiver of value records, provided by the host.
///
/// Submission failures are the host's business; this trait has no error path.
pub trait MetricSink {
    fn dispatch(&mut self, record: ValueRecord);
}

impl MetricSink for Vec<ValueRecord> {
    fn dispatch(&mut self, record: ValueRecord) {
        self.push(record);
    }
}

/// Build the record for `reading` on behalf of `target` and submit it.
pub fn emit(reading: Reading, target: &TargetConfig, sink: &mut (impl MetricSink + ?Sized)) {
    let record = ValueRecord {
        host: target.hostname.clone(),
        plugin: PLUGIN_NAME,
        plugin_instance: reading.scope,
        value_type: reading.kind.to_string(),
        type_instance: reading.metric.to_owned(),
        values: vec![reading.value],
    };
    if target.verbose {
        info!("Dispatching: {record}");
    }
    sink.dispatch(record);
}
