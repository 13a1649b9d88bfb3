// ── Plugin registry ──
//
// Owns every configured target and implements the host lifecycle:
// configure (append), init (connect all), read (poll + dispatch, with
// reconnect on corrupt data), shutdown (clear). The host serializes these
// calls; nothing here is shared across threads.

use fritzmon_api::Connector;
use tracing::{error, warn};

use crate::catalog::{self, CATALOG, ServiceAction};
use crate::config::TargetConfig;
use crate::conversion::{CONVERSIONS, Conversions};
use crate::dispatch::MetricSink;
use crate::error::CoreError;
use crate::target::Target;

pub struct Plugin<C: Connector> {
    connector: C,
    catalog: &'static [ServiceAction],
    conversions: &'static Conversions,
    targets: Vec<Target<C::Connection>>,
}

impl<C: Connector> Plugin<C> {
    /// Plugin with the built-in catalog and conversion table.
    pub fn new(connector: C) -> Result<Self, CoreError> {
        Self::with_tables(connector, CATALOG, CONVERSIONS)
    }

    /// Plugin with custom tables, validated against each other.
    pub fn with_tables(
        connector: C,
        catalog: &'static [ServiceAction],
        conversions: &'static Conversions,
    ) -> Result<Self, CoreError> {
        catalog::validate(catalog, conversions)?;
        Ok(Self {
            connector,
            catalog,
            conversions,
            targets: Vec::new(),
        })
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub fn targets(&self) -> &[Target<C::Connection>] {
        &self.targets
    }

    // ── Host lifecycle ───────────────────────────────────────────

    /// Register one router.
    pub fn configure(&mut self, config: TargetConfig) {
        self.targets.push(Target::new(config));
    }

    /// Connect every target.
    ///
    /// A failing target does not stop the others; the first failure is
    /// returned once all targets were attempted.
    pub fn init(&mut self) -> Result<(), CoreError> {
        let mut first_error = None;
        for target in &mut self.targets {
            if let Err(err) = target.connect(&self.connector, self.catalog) {
                error!(address = %target.config().address, error = %err, "init failed");
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Poll every target and dispatch its readings.
    ///
    /// Corrupt data drops the target's readings for this cycle and triggers
    /// a reconnect, so the next scheduled read starts from fresh sessions. A
    /// reconnect that fails is retried at the start of the following cycles.
    /// Other failures are logged; the first one is returned after all
    /// targets were processed.
    pub fn read(&mut self, sink: &mut (impl MetricSink + ?Sized)) -> Result<(), CoreError> {
        let mut first_error = None;
        for target in &mut self.targets {
            if target.reconnect_pending() {
                if let Err(err) = target.reconnect(&self.connector, self.catalog) {
                    error!(address = %target.config().address, error = %err, "reconnect failed");
                    first_error.get_or_insert(err);
                    continue;
                }
            }
            match target.read(self.conversions) {
                Ok(readings) => {
                    for reading in readings {
                        target.emit(reading, sink);
                    }
                }
                Err(err) if err.is_protocol_error() => {
                    warn!(
                        address = %target.config().address,
                        error = %err,
                        "Invalid data received, attempting to reconnect"
                    );
                    if let Err(err) = target.reconnect(&self.connector, self.catalog) {
                        error!(address = %target.config().address, error = %err, "reconnect failed");
                        first_error.get_or_insert(err);
                    }
                }
                Err(err) => {
                    error!(address = %target.config().address, error = %err, "read failed");
                    first_error.get_or_insert(err);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Drop every target and its sessions.
    pub fn shutdown(&mut self) {
        self.targets.clear();
    }
}
