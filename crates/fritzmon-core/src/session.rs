// ── Poll session ──
//
// Runs the (filtered) catalog against a target's sessions once and flattens
// the answers into `Readings`. Indexed actions are enumerated by walking the
// index argument from 0 until the router answers with an empty response;
// there is no separate count query and no other upper bound.

use fritzmon_api::{Connection, FieldValue, Fields};
use tracing::{info, warn};

use crate::catalog::{IndexSpec, ServiceAction, rule_for};
use crate::conversion::Conversions;
use crate::error::CoreError;
use crate::lifecycle::Connections;
use crate::reading::{Reading, Readings, scope_label};

/// One read cycle over one target.
pub struct PollSession<'a, T> {
    connections: Option<&'a Connections<T>>,
    catalog: &'a [ServiceAction],
    conversions: &'a Conversions,
    plugin_instance: &'a str,
    verbose: bool,
}

impl<'a, T: Connection> PollSession<'a, T> {
    pub fn new(
        connections: Option<&'a Connections<T>>,
        catalog: &'a [ServiceAction],
        conversions: &'a Conversions,
        plugin_instance: &'a str,
    ) -> Self {
        Self {
            connections,
            catalog,
            conversions,
            plugin_instance,
            verbose: false,
        }
    }

    /// Log every call and empty response at info level.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Query every catalog action and collect the converted readings.
    ///
    /// A target without connections yields no readings. Any failed call
    /// aborts the whole cycle; corrupt responses surface as
    /// [`CoreError::Protocol`].
    pub fn read(&self) -> Result<Readings, CoreError> {
        let mut readings = Readings::new();
        let Some(connections) = self.connections else {
            return Ok(readings);
        };

        for entry in self.catalog {
            let Some(connection) = connections.for_access(entry.access) else {
                continue;
            };
            match entry.index {
                None => {
                    if let Some(response) = self.call(connection, entry, &Fields::new())? {
                        self.collect(&mut readings, entry, &response, self.plugin_instance);
                    }
                }
                Some(index) => self.enumerate(&mut readings, connection, entry, index)?,
            }
        }

        Ok(readings)
    }

    fn enumerate(
        &self,
        readings: &mut Readings,
        connection: &T,
        entry: &ServiceAction,
        index: IndexSpec,
    ) -> Result<(), CoreError> {
        let mut position: i64 = 0;
        loop {
            let arguments = Fields::from([(
                index.index_field.to_owned(),
                FieldValue::Integer(position),
            )]);
            let Some(mut response) = self.call(connection, entry, &arguments)? else {
                break;
            };

            // Request arguments take part in the instance lookup; the index
            // itself usually names the instance.
            response.extend(arguments);

            match response.get(index.instance_field) {
                Some(instance) => {
                    let sub_instance = format!("{}{}", index.instance_prefix, instance);
                    let scope = scope_label(self.plugin_instance, Some(&sub_instance));
                    self.collect(readings, entry, &response, &scope);
                }
                None => warn!(
                    service = entry.service,
                    action = entry.action,
                    field = index.instance_field,
                    position,
                    "instance field missing from response, skipping record"
                ),
            }
            position += 1;
        }
        Ok(())
    }

    /// Issue one call; `None` for an empty response.
    fn call(
        &self,
        connection: &T,
        entry: &ServiceAction,
        arguments: &Fields,
    ) -> Result<Option<Fields>, CoreError> {
        if self.verbose {
            info!(
                "Calling action: {} {} {:?}",
                entry.service, entry.action, arguments
            );
        }
        let response = connection.call_action(entry.service, entry.action, arguments)?;
        if response.is_empty() {
            if self.verbose {
                info!("No readings received");
            }
            return Ok(None);
        }
        Ok(Some(response))
    }

    fn collect(&self, readings: &mut Readings, entry: &ServiceAction, response: &Fields, scope: &str) {
        for mapping in entry.metrics {
            let Some(raw) = response.get(mapping.field) else {
                continue;
            };
            match rule_for(self.conversions, mapping.field).apply(raw) {
                Ok(value) => {
                    readings.insert(Reading {
                        scope: scope.to_owned(),
                        metric: mapping.metric,
                        kind: mapping.kind,
                        value,
                    });
                }
                Err(err) => warn!(
                    field = mapping.field,
                    error = %err,
                    "skipping value that cannot be converted"
                ),
            }
        }
    }
}
