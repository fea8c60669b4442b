// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer registry and liveness reconciliation.
//
// Liveness is advisory.  A probe that fails to get a JSON answer (connection
// refused, timeout, non-2xx, undecodable body) records the printer as OFFLINE
// and hands back a degraded report rather than an error.  An answer without a
// `status` key is passed through and the recorded status is left alone.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use smartprint_core::error::{Result, SmartprintError};
use smartprint_core::types::{NewPrinter, PrintJob, Printer, PrinterId, PrinterStatus};

use crate::client::AgentClient;
use crate::store::Store;

/// Outcome of asking a printer agent for its status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeReport {
    pub printer_id: PrinterId,
    /// Whether the agent answered with a JSON payload.
    pub online: bool,
    /// Status recorded for the printer after the probe.
    pub status: PrinterStatus,
    /// Agent payload, when one was received.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    /// Why the printer is considered unreachable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Printer management on top of the record store and the agent client.
#[derive(Clone)]
pub struct PrinterService {
    store: Arc<Store>,
    client: AgentClient,
}

impl PrinterService {
    pub fn new(store: Arc<Store>, client: AgentClient) -> Self {
        Self { store, client }
    }

    #[instrument(skip_all, fields(address = %printer.address))]
    pub fn add_printer(&self, printer: &NewPrinter) -> Result<Printer> {
        self.store.insert_printer(printer)
    }

    pub fn get_printer(&self, id: PrinterId) -> Result<Printer> {
        self.store
            .find_printer_by_id(id)?
            .ok_or_else(|| SmartprintError::not_found("printer", id))
    }

    pub fn list_printers(&self) -> Result<Vec<Printer>> {
        self.store.list_printers()
    }

    /// Remove a printer and its jobs.
    #[instrument(skip(self))]
    pub fn delete_printer(&self, id: PrinterId) -> Result<()> {
        self.get_printer(id)?;
        self.store.delete_printer(id)
    }

    /// Manual status override.
    #[instrument(skip(self))]
    pub fn set_status(&self, id: PrinterId, status: PrinterStatus) -> Result<Printer> {
        self.store.update_printer_status(id, status)?;
        info!(printer_id = %id, ?status, "printer status set");
        self.get_printer(id)
    }

    /// Online printers that have an owner, as shown to anonymous visitors.
    pub fn landing_printers(&self) -> Result<Vec<Printer>> {
        Ok(self
            .store
            .printers_by_status(PrinterStatus::Online)?
            .into_iter()
            .filter(|printer| printer.owner_id.is_some())
            .collect())
    }

    /// Distinct printer locations, sorted.
    pub fn locations(&self) -> Result<Vec<String>> {
        let locations: BTreeSet<String> = self
            .store
            .list_printers()?
            .into_iter()
            .map(|printer| printer.location)
            .collect();
        Ok(locations.into_iter().collect())
    }

    /// Jobs sent to a printer, newest first.
    pub fn jobs_for_printer(&self, id: PrinterId) -> Result<Vec<PrintJob>> {
        self.get_printer(id)?;
        self.store.jobs_by_printer(id)
    }

    /// Probe the agent and record the result as the printer's status.
    ///
    /// A payload with a `status` key records ONLINE and a failed request
    /// records OFFLINE.  Any other payload leaves the recorded status as it
    /// was.  Only an unknown printer id or a store failure is an error.
    #[instrument(skip(self))]
    pub async fn probe_status(&self, id: PrinterId) -> Result<ProbeReport> {
        let printer = self.get_printer(id)?;

        let report = match self.client.probe(&printer).await {
            Ok(payload) if payload.get("status").is_some() => {
                self.store.update_printer_status(id, PrinterStatus::Online)?;
                answered(&printer, PrinterStatus::Online, payload)
            }
            Ok(payload) => {
                debug!(printer_id = %id, "agent payload has no status; recorded status kept");
                answered(&printer, printer.status, payload)
            }
            Err(err) => {
                self.store.update_printer_status(id, PrinterStatus::Offline)?;
                degraded(&printer, PrinterStatus::Offline, &err)
            }
        };
        info!(printer_id = %id, online = report.online, status = ?report.status, "printer status reconciled");
        Ok(report)
    }

    /// Probe the agent and mark the printer ONLINE if it answers at all.
    ///
    /// A failed probe is reported but leaves the recorded status unchanged.
    #[instrument(skip(self))]
    pub async fn connect(&self, id: PrinterId) -> Result<ProbeReport> {
        let printer = self.get_printer(id)?;

        match self.client.probe(&printer).await {
            Ok(payload) => {
                self.store.update_printer_status(id, PrinterStatus::Online)?;
                info!(printer_id = %id, "printer connected");
                Ok(answered(&printer, PrinterStatus::Online, payload))
            }
            Err(err) => Ok(degraded(&printer, printer.status, &err)),
        }
    }
}

fn answered(printer: &Printer, status: PrinterStatus, payload: serde_json::Value) -> ProbeReport {
    ProbeReport {
        printer_id: printer.id,
        online: true,
        status,
        payload: Some(payload),
        error: None,
    }
}

fn degraded(printer: &Printer, status: PrinterStatus, err: &SmartprintError) -> ProbeReport {
    warn!(printer_id = %printer.id, error = %err, "printer agent unreachable");
    ProbeReport {
        printer_id: printer.id,
        online: false,
        status,
        payload: None,
        error: Some(err.to_string()),
    }
}
