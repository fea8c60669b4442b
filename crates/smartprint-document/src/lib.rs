// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// smartprint-document. Document handling for the SmartPrint job pipeline.
//
// Provides upload intake (durable storage of submitted files under unique
// paths) and PDF inspection (page counting with `lopdf`).

pub mod inspector;
pub mod intake;
pub mod mime;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use inspector::DocumentInspector;
pub use intake::{FileIntake, StoredFile};
pub use mime::{DocumentType, PDF_MIME};
