// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// SmartPrint Print. Record store, printer agent client, and the job pipeline
// that ties uploads, pricing and dispatch together.

pub mod client;
pub mod orchestrator;
pub mod printers;
pub mod stats;
pub mod store;

pub use client::AgentClient;
pub use orchestrator::{DispatchOutcome, JobOrchestrator, SubmitRequest, Submission};
pub use printers::{PrinterService, ProbeReport};
pub use stats::{DashboardStats, dashboard};
pub use store::Store;
