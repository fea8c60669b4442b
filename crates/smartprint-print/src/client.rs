// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP client for printer agents.
//
// Every printer runs a small agent on a fixed port:
//   - GET  /status  -> JSON, `{"status": ...}` when healthy or `{"error": ...}`
//   - POST /print   -> raw PDF bytes, opaque acknowledgement
//
// Files are sent one request each, in job order.  Nothing is retried here;
// a failed dispatch is reported and the job is left for the caller to decide.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info, instrument, warn};

use smartprint_core::config::AppConfig;
use smartprint_core::error::{Result, SmartprintError};
use smartprint_core::types::{PrintJob, Printer};
use smartprint_document::PDF_MIME;

/// Client for the HTTP agent running next to each printer.
#[derive(Debug, Clone)]
pub struct AgentClient {
    http: Client,
    port: u16,
}

impl AgentClient {
    /// Build a client from the configured port and timeouts.
    pub fn new(config: &AppConfig) -> Result<Self> {
        Self::with_timeouts(
            config.agent_port,
            config.connect_timeout(),
            config.request_timeout(),
        )
    }

    pub fn with_timeouts(port: u16, connect_timeout: Duration, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| SmartprintError::Dispatch(format!("build HTTP client: {e}")))?;
        Ok(Self { http, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Agent URL for `path` on `printer`.
    fn url(&self, printer: &Printer, path: &str) -> String {
        let host = printer.address.trim();
        if host.contains(':') && !host.starts_with('[') {
            format!("http://[{host}]:{}/{path}", self.port)
        } else {
            format!("http://{host}:{}/{path}", self.port)
        }
    }

    /// Send every stored file of `job` to the printer agent, in order.
    ///
    /// Stops at the first file that cannot be read or is not accepted with a
    /// 2xx status.  Files after that one are not sent.
    #[instrument(skip_all, fields(job_id = %job.id, printer_id = %printer.id, files = job.file_paths.len()))]
    pub async fn send(&self, job: &PrintJob, printer: &Printer) -> Result<()> {
        let url = self.url(printer, "print");

        for (index, path) in job.file_paths.iter().enumerate() {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| SmartprintError::Dispatch(format!("read {path}: {e}")))?;
            let len = bytes.len();

            let response = self
                .http
                .post(&url)
                .header(CONTENT_TYPE, PDF_MIME)
                .body(bytes)
                .send()
                .await
                .and_then(|response| response.error_for_status())
                .map_err(|e| {
                    warn!(file = index, error = %e, "printer agent rejected file");
                    SmartprintError::Dispatch(format!("POST {url} (file {}): {e}", index + 1))
                })?;

            debug!(file = index, bytes_len = len, status = %response.status(), "file delivered");
        }

        info!("job delivered to printer agent");
        Ok(())
    }

    /// Fetch the agent's status payload.
    #[instrument(skip_all, fields(printer_id = %printer.id, address = %printer.address))]
    pub async fn probe(&self, printer: &Printer) -> Result<serde_json::Value> {
        let url = self.url(printer, "status");

        let payload = self
            .http
            .get(&url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| SmartprintError::Dispatch(format!("GET {url}: {e}")))?
            .json::<serde_json::Value>()
            .await
            .map_err(|e| SmartprintError::Dispatch(format!("decode status from {url}: {e}")))?;

        debug!(%payload, "agent status received");
        Ok(payload)
    }
}
