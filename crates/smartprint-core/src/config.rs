// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Port every printer agent listens on.
pub const DEFAULT_AGENT_PORT: u16 = 5000;

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Port of the HTTP agent on each printer host.
    pub agent_port: u16,
    /// Time allowed to open a connection to a printer agent.
    pub connect_timeout_secs: u64,
    /// Upper bound on a single request to a printer agent.
    pub request_timeout_secs: u64,
    /// Label of the single currency costs are expressed in.
    pub currency: String,
    /// Where uploaded documents are written.  Defaults to `<data dir>/uploads`.
    pub uploads_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            agent_port: DEFAULT_AGENT_PORT,
            connect_timeout_secs: 5,
            request_timeout_secs: 30,
            currency: "BDT".into(),
            uploads_dir: None,
        }
    }
}
