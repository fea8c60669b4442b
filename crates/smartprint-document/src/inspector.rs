// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document inspector. Opens a stored PDF with `lopdf` and reports its page
// count.  The parsed document only lives for the duration of one call.

use std::path::Path;

use lopdf::Document;
use smartprint_core::error::{Result, SmartprintError};
use tracing::{debug, instrument};

/// Counts the pages of stored documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentInspector;

impl DocumentInspector {
    pub fn new() -> Self {
        Self
    }

    /// Open the PDF at `path` and return its page count.
    ///
    /// Fails with `InvalidDocument` for empty files, files that do not parse
    /// as PDF, and PDFs whose page tree holds no pages.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn count_pages(&self, path: impl AsRef<Path>) -> Result<u32> {
        let path_ref = path.as_ref();

        let metadata = std::fs::metadata(path_ref).map_err(|err| {
            SmartprintError::InvalidDocument(format!("cannot open {}: {err}", path_ref.display()))
        })?;
        if metadata.len() == 0 {
            return Err(SmartprintError::InvalidDocument(format!(
                "{} is empty",
                path_ref.display()
            )));
        }

        let document = Document::load(path_ref).map_err(|err| {
            SmartprintError::InvalidDocument(format!("failed to parse {}: {err}", path_ref.display()))
        })?;

        let pages = page_count(&document, &path_ref.display().to_string())?;
        debug!(pages, "PDF inspected");
        Ok(pages)
    }

    /// Page count of a PDF already held in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn count_pages_in(&self, data: &[u8]) -> Result<u32> {
        if data.is_empty() {
            return Err(SmartprintError::InvalidDocument("document is empty".into()));
        }

        let document = Document::load_mem(data).map_err(|err| {
            SmartprintError::InvalidDocument(format!("failed to parse PDF from memory: {err}"))
        })?;

        page_count(&document, "in-memory document")
    }
}

fn page_count(document: &Document, label: &str) -> Result<u32> {
    let pages = document.get_pages().len();
    if pages == 0 {
        return Err(SmartprintError::InvalidDocument(format!("{label} has no pages")));
    }
    u32::try_from(pages)
        .map_err(|_| SmartprintError::InvalidDocument(format!("{label} has too many pages")))
}
