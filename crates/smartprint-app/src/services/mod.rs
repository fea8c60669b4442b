// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer. Wires the store, intake, agent client and orchestrator
// together from the on-disk configuration.

pub mod app_services;
pub mod data_dir;
