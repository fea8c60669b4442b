// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document MIME types.

use std::path::Path;

/// The only content type accepted for printing.
pub const PDF_MIME: &str = "application/pdf";

/// Document kinds a client may declare when uploading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentType {
    Pdf,
    Jpeg,
    Png,
    PlainText,
    /// Anything else; sent as `application/octet-stream`.
    Other,
}

impl DocumentType {
    /// MIME type string used as the declared content type.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => PDF_MIME,
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::PlainText => "text/plain",
            Self::Other => "application/octet-stream",
        }
    }

    /// Infer document type from file extension.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "jpg" | "jpeg" => Self::Jpeg,
            "png" => Self::Png,
            "txt" => Self::PlainText,
            _ => Self::Other,
        }
    }

    /// Infer document type from a path's extension.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Other)
    }
}
