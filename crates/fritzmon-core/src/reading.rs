// ── Readings ──
//
// The output of one poll cycle. Readings are keyed by scope label and metric
// name; a later write under the same key replaces the earlier value but keeps
// its position, so dispatch order stays the catalog order.

use std::hash::{Hash, Hasher};

use indexmap::{Equivalent, IndexMap};

use crate::catalog::MetricKind;
use crate::conversion::MetricValue;

/// One normalized value, scoped to a target and optionally a sub-device.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub scope: String,
    pub metric: &'static str,
    pub kind: MetricKind,
    pub value: MetricValue,
}

type Key = (String, &'static str);
type Entry = (MetricKind, MetricValue);

/// Borrowed lookup key; hashes exactly like [`Key`].
struct KeyRef<'a>(&'a str, &'a str);

impl Hash for KeyRef<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
        self.1.hash(state);
    }
}

impl Equivalent<Key> for KeyRef<'_> {
    fn equivalent(&self, key: &Key) -> bool {
        self.0 == key.0 && self.1 == key.1
    }
}

fn to_reading(((scope, metric), (kind, value)): (Key, Entry)) -> Reading {
    Reading {
        scope,
        metric,
        kind,
        value,
    }
}

/// Flattened readings of one poll cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Readings {
    entries: IndexMap<Key, Entry>,
}

impl Readings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a reading, returning `true` if it replaced an earlier one.
    pub fn insert(&mut self, reading: Reading) -> bool {
        self.entries
            .insert((reading.scope, reading.metric), (reading.kind, reading.value))
            .is_some()
    }

    pub fn get(&self, scope: &str, metric: &str) -> Option<MetricValue> {
        self.entries
            .get(&KeyRef(scope, metric))
            .map(|(_, value)| *value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Reading> + '_ {
        self.entries
            .iter()
            .map(|((scope, metric), (kind, value))| Reading {
                scope: scope.clone(),
                metric: *metric,
                kind: *kind,
                value: *value,
            })
    }
}

impl IntoIterator for Readings {
    type Item = Reading;
    type IntoIter = std::iter::Map<indexmap::map::IntoIter<Key, Entry>, fn((Key, Entry)) -> Reading>;

    fn into_iter(self) -> Self::IntoIter {
        let convert: fn((Key, Entry)) -> Reading = to_reading;
        self.entries.into_iter().map(convert)
    }
}

/// Join the target's plugin instance and an optional sub-device label with
/// `-`, leaving out empty segments.
pub fn scope_label(plugin_instance: &str, sub_instance: Option<&str>) -> String {
    [Some(plugin_instance), sub_instance]
        .into_iter()
        .flatten()
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(scope: &str, metric: &'static str, value: i64) -> Reading {
        Reading {
            scope: scope.into(),
            metric,
            kind: MetricKind::Gauge,
            value: MetricValue::Integer(value),
        }
    }

    #[test]
    fn scope_label_joins_non_empty_segments() {
        assert_eq!(scope_label("instance", Some("dect16")), "instance-dect16");
        assert_eq!(scope_label("", Some("dect16")), "dect16");
        assert_eq!(scope_label("instance", None), "instance");
        assert_eq!(scope_label("", None), "");
    }

    #[test]
    fn later_write_wins_but_keeps_position() {
        let mut readings = Readings::new();
        assert!(!readings.insert(reading("", "a", 1)));
        assert!(!readings.insert(reading("", "b", 2)));
        assert!(readings.insert(reading("", "a", 3)));

        let order: Vec<(&str, MetricValue)> =
            readings.iter().map(|r| (r.metric, r.value)).collect();
        assert_eq!(
            order,
            [("a", MetricValue::Integer(3)), ("b", MetricValue::Integer(2))]
        );
    }

    #[test]
    fn into_iter_yields_insertion_order() {
        let mut readings = Readings::new();
        readings.insert(reading("dect16", "power", 1));
        readings.insert(reading("", "uptime", 2));
        readings.insert(reading("dect16", "power", 3));

        let drained: Vec<Reading> = readings.into_iter().collect();
        assert_eq!(drained, [reading("dect16", "power", 3), reading("", "uptime", 2)]);
    }

    #[test]
    fn lookup_accepts_borrowed_metric_names() {
        let mut readings = Readings::new();
        readings.insert(reading("dect16", "power", 1));
        let metric = String::from("power");
        assert_eq!(readings.get("dect16", &metric), Some(MetricValue::Integer(1)));
        assert_eq!(readings.get("dect17", &metric), None);
    }

    #[test]
    fn same_metric_in_different_scopes_is_kept_apart() {
        let mut readings = Readings::new();
        readings.insert(reading("dect16", "power", 1));
        readings.insert(reading("dect17", "power", 2));
        assert_eq!(readings.len(), 2);
        assert_eq!(readings.get("dect17", "power"), Some(MetricValue::Integer(2)));
    }
}
