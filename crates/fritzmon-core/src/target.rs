// ── Target ──
//
// One configured router: its settings, its live sessions, and the catalog
// narrowed to what the router advertised when those sessions were opened.

use fritzmon_api::{Connection, Connector};
use tracing::info;

use crate::catalog::ServiceAction;
use crate::config::TargetConfig;
use crate::conversion::Conversions;
use crate::dispatch::{self, MetricSink};
use crate::error::CoreError;
use crate::lifecycle::{self, Connections};
use crate::reading::{Reading, Readings};
use crate::session::PollSession;

pub struct Target<T> {
    config: TargetConfig,
    connections: Option<Connections<T>>,
    catalog: Vec<ServiceAction>,
    reconnect_pending: bool,
}

impl<T: Connection> Target<T> {
    /// Create an unconnected target. Call [`connect()`](Self::connect) before reading.
    pub fn new(config: TargetConfig) -> Self {
        if config.verbose {
            info!("Verbose logging enabled");
        }
        Self {
            config,
            connections: None,
            catalog: Vec::new(),
            reconnect_pending: false,
        }
    }

    pub fn config(&self) -> &TargetConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.connections.is_some()
    }

    pub fn connections(&self) -> Option<&Connections<T>> {
        self.connections.as_ref()
    }

    /// Whether the last reconnect failed and should be retried.
    pub fn reconnect_pending(&self) -> bool {
        self.reconnect_pending
    }

    /// Catalog entries this target polls.
    pub fn catalog(&self) -> &[ServiceAction] {
        &self.catalog
    }

    /// Open and validate the sessions, then filter `catalog` down to the
    /// supported actions. On failure the target is left without connections.
    pub fn connect<C>(&mut self, connector: &C, catalog: &[ServiceAction]) -> Result<(), CoreError>
    where
        C: Connector<Connection = T>,
    {
        self.connections = None;
        self.catalog.clear();
        self.reconnect_pending = false;

        let connections = lifecycle::establish(connector, &self.config)?;
        self.catalog = lifecycle::supported_catalog(catalog, &connections);
        self.connections = Some(connections);
        Ok(())
    }

    /// Replace the sessions after a corrupt response. A failed attempt is
    /// remembered so the next poll cycle can retry.
    pub fn reconnect<C>(&mut self, connector: &C, catalog: &[ServiceAction]) -> Result<(), CoreError>
    where
        C: Connector<Connection = T>,
    {
        info!(address = %self.config.address, "reconnecting");
        let result = self.connect(connector, catalog);
        self.reconnect_pending = result.is_err();
        result
    }

    /// Run one poll cycle.
    pub fn read(&self, conversions: &Conversions) -> Result<Readings, CoreError> {
        PollSession::new(
            self.connections.as_ref(),
            &self.catalog,
            conversions,
            &self.config.plugin_instance,
        )
        .verbose(self.config.verbose)
        .read()
    }

    /// Hand one reading to the host sink.
    pub fn emit(&self, reading: Reading, sink: &mut (impl MetricSink + ?Sized)) {
        dispatch::emit(reading, &self.config, sink);
    }
}
