// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for SmartPrint.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::JobStatus;

/// Top-level error type for all SmartPrint operations.
#[derive(Debug, Error)]
pub enum SmartprintError {
    // -- Caller errors --
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("not authorized: {0}")]
    Authorization(String),

    #[error("job cannot move from {from:?} to {to:?}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    // -- Pipeline errors --
    #[error("file storage failed: {0}")]
    Storage(#[from] std::io::Error),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("dispatch to printer failed: {0}")]
    Dispatch(String),

    // -- Persistence --
    #[error("database error: {0}")]
    Database(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SmartprintError {
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Project the error onto the coarse taxonomy reported to callers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::InvalidTransition { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Authorization(_) => ErrorKind::Authorization,
            Self::Storage(_) => ErrorKind::Storage,
            Self::InvalidDocument(_) => ErrorKind::InvalidDocument,
            Self::Dispatch(_) => ErrorKind::Dispatch,
            Self::Database(_) | Self::Serialization(_) => ErrorKind::Internal,
        }
    }
}

/// Failure classes surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Bad or missing input.  Retrying the same request will not help.
    Validation,
    /// Unknown printer, user or job.
    NotFound,
    /// Missing, unknown or deactivated identity.
    Authorization,
    /// An uploaded file could not be written.
    Storage,
    /// An uploaded file could not be parsed as a document.
    InvalidDocument,
    /// The printer agent could not be reached or refused the document.
    Dispatch,
    /// Store or encoding failure inside the service.
    Internal,
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SmartprintError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_are_storage_errors() {
        let err: SmartprintError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into();
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(err.to_string().contains("read-only"));
    }

    #[test]
    fn invalid_transition_is_a_validation_error() {
        let err = SmartprintError::InvalidTransition {
            from: JobStatus::Completed,
            to: JobStatus::Pending,
        };
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn not_found_names_the_entity() {
        let err = SmartprintError::not_found("printer", 42);
        assert_eq!(err.to_string(), "printer not found: 42");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
