// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// SmartPrint. Core types, pricing, and error definitions shared across all crates.

pub mod config;
pub mod error;
pub mod failure;
pub mod pricing;
pub mod types;

pub use config::AppConfig;
pub use error::{ErrorKind, SmartprintError};
pub use failure::Failure;
pub use types::*;
