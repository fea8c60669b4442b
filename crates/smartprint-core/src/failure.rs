// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Structured failure reports.
//
// Every error leaving the core is reported as a kind plus a plain message,
// with a hint on what the requester can do about it.

use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, SmartprintError};

/// A failure as presented to the caller of a core operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: ErrorKind,
    /// Human-readable summary including the underlying cause.
    pub message: String,
    /// What the requester should try next.
    pub suggestion: String,
}

impl From<&SmartprintError> for Failure {
    fn from(err: &SmartprintError) -> Self {
        let suggestion = match err {
            SmartprintError::Validation(detail) if detail.contains("no files") => {
                "Attach at least one PDF document and submit again."
            }
            SmartprintError::Validation(detail) if detail.contains("application/pdf") => {
                "Only PDF documents are accepted. Save the file as a PDF first."
            }
            SmartprintError::Validation(_) => "Check the request fields and submit again.",
            SmartprintError::InvalidTransition { .. } => {
                "The job is no longer in a state that allows this change."
            }
            SmartprintError::NotFound { entity, .. } => match *entity {
                "printer" => "Choose a printer from the current printer list.",
                "user" => "Register the account before submitting jobs.",
                _ => "Refresh the listing; the record may have been removed.",
            },
            SmartprintError::Authorization(_) => "Sign in with an active account.",
            SmartprintError::Storage(_) => {
                "The server could not save your upload. Try again in a moment."
            }
            SmartprintError::InvalidDocument(_) => {
                "The file could not be read as a PDF. Re-export it and try again."
            }
            SmartprintError::Dispatch(_) => {
                "The printer could not be reached. Check that it is switched on."
            }
            SmartprintError::Database(_) | SmartprintError::Serialization(_) => {
                "Something went wrong on our side. Try again later."
            }
        };

        Self {
            kind: err.kind(),
            message: err.to_string(),
            suggestion: suggestion.to_string(),
        }
    }
}

impl From<SmartprintError> for Failure {
    fn from(err: SmartprintError) -> Self {
        Self::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_submission_asks_for_a_file() {
        let failure = Failure::from(SmartprintError::Validation("no files".into()));
        assert_eq!(failure.kind, ErrorKind::Validation);
        assert!(failure.suggestion.contains("at least one"));
    }

    #[test]
    fn missing_printer_points_at_the_list() {
        let failure = Failure::from(SmartprintError::not_found("printer", 9));
        assert_eq!(failure.kind, ErrorKind::NotFound);
        assert_eq!(failure.message, "printer not found: 9");
        assert!(failure.suggestion.contains("printer list"));
    }

    #[test]
    fn serialises_kind_in_screaming_case() {
        let failure = Failure::from(SmartprintError::Dispatch("connection refused".into()));
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["kind"], "DISPATCH");
        assert!(json["message"].as_str().unwrap().contains("connection refused"));
    }
}
