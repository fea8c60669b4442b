// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// File intake. Writes uploaded documents to the uploads directory.
//
// Every stored file gets a fresh UUID prefix, so two uploads with the same
// name (or the same bytes) never share a path.  Files are created with
// `create_new` and synced before the path is handed back.

use std::io::Write;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use smartprint_core::error::{Result, SmartprintError};
use smartprint_core::types::UploadedFile;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::mime::PDF_MIME;

/// Longest sanitised original name kept in a stored file name.
const MAX_NAME_LEN: usize = 96;

/// A document written to durable storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub path: PathBuf,
    pub original_name: String,
    pub size: u64,
    /// SHA-256 of the stored bytes, lowercase hex.
    pub sha256: String,
}

/// Durable storage for uploaded documents.
#[derive(Debug, Clone)]
pub struct FileIntake {
    root: PathBuf,
}

impl FileIntake {
    /// Use `root` as the uploads directory, creating it if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reject uploads whose declared content type is not exactly PDF.
    pub fn ensure_pdf(file: &UploadedFile) -> Result<()> {
        if file.content_type == PDF_MIME {
            Ok(())
        } else {
            Err(SmartprintError::Validation(format!(
                "{} has content type {:?}; only {PDF_MIME} is accepted",
                file.name, file.content_type
            )))
        }
    }

    /// Write `file` under a new unique path.
    #[instrument(skip_all, fields(name = %file.name, bytes_len = file.bytes.len()))]
    pub fn store(&self, file: &UploadedFile) -> Result<StoredFile> {
        Self::ensure_pdf(file)?;

        let file_name = format!("{}-{}", Uuid::new_v4(), sanitize_name(&file.name));
        let path = self.root.join(file_name);

        let mut handle = std::fs::File::options()
            .write(true)
            .create_new(true)
            .open(&path)?;
        handle.write_all(&file.bytes)?;
        handle.sync_all()?;

        let stored = StoredFile {
            path,
            original_name: file.name.clone(),
            size: file.bytes.len() as u64,
            sha256: hash_bytes(&file.bytes),
        };
        info!(path = %stored.path.display(), sha256 = %stored.sha256, "document stored");
        Ok(stored)
    }

    /// Delete a stored document.  Missing files are not an error.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn remove(&self, path: impl AsRef<Path>) -> Result<()> {
        match std::fs::remove_file(path.as_ref()) {
            Ok(()) => {
                debug!("stored document removed");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(SmartprintError::Storage(err)),
        }
    }
}

/// SHA-256 of `data` as lowercase hex.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Reduce a client-supplied name to a safe single path component.
fn sanitize_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_NAME_LEN)
        .collect();

    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "document.pdf".to_string()
    } else {
        trimmed.to_string()
    }
}
