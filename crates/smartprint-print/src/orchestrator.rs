// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Job orchestration. Turns a set of uploads into a priced, persisted job and
// hands it to the printer agent.
//
// Pipeline: validate -> resolve printer and requester -> store files ->
// count pages -> price -> persist (PENDING) -> dispatch.
//
// Everything up to the insert either succeeds or leaves no trace: files
// written by a call that aborts are removed again.  Dispatch happens after
// the job is persisted and its failure never removes the job.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use smartprint_core::error::{Result, SmartprintError};
use smartprint_core::pricing::{self, CostEstimate};
use smartprint_core::types::{
    DeliveryOption, JobId, JobStatus, NewPrintJob, Orientation, PaperSize, PrintJob, PrintMode,
    Printer, PrinterId, PrinterStatus, RequesterIdentity, UploadedFile, User, document_name,
};
use smartprint_document::{DocumentInspector, FileIntake, StoredFile};

use crate::client::AgentClient;
use crate::store::Store;

/// Everything a requester supplies when submitting a job.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub files: Vec<UploadedFile>,
    pub printer_id: PrinterId,
    pub delivery_option: DeliveryOption,
    pub print_mode: PrintMode,
    /// Defaults to A4.
    pub paper_size: Option<PaperSize>,
    /// Defaults to portrait.
    pub orientation: Option<Orientation>,
}

/// What happened when the persisted job was handed to the printer agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DispatchOutcome {
    /// Every file was accepted; the job is PROCESSING.
    Delivered,
    /// The agent could not be reached or refused a file; the job stays
    /// PENDING and the printer is recorded as OFFLINE.
    Failed { reason: String },
}

/// Result of a successful submit: the job as persisted after dispatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub job: PrintJob,
    pub dispatch: DispatchOutcome,
}

/// Composes intake, inspection, pricing, persistence and dispatch.
pub struct JobOrchestrator {
    store: Arc<Store>,
    intake: FileIntake,
    inspector: DocumentInspector,
    client: AgentClient,
    currency: String,
}

impl JobOrchestrator {
    pub fn new(
        store: Arc<Store>,
        intake: FileIntake,
        client: AgentClient,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            store,
            intake,
            inspector: DocumentInspector::new(),
            client,
            currency: currency.into(),
        }
    }

    /// Create, price, persist and dispatch a print job.
    ///
    /// Validation, lookup, storage and document errors abort the call with no
    /// job persisted.  Once the job is persisted the call succeeds: a dispatch
    /// failure is reported in the returned [`Submission`].
    #[instrument(skip_all, fields(requester = %requester, printer_id = %request.printer_id, files = request.files.len()))]
    pub async fn submit(
        &self,
        requester: &RequesterIdentity,
        request: SubmitRequest,
    ) -> Result<Submission> {
        check_uploads(&request.files)?;
        let printer = self.resolve_printer(request.printer_id)?;
        let user = self.resolve_requester(requester)?;

        let (stored, total_pages) = self.intake_and_count(&request.files)?;
        let total_cost = pricing::price(&printer, request.print_mode, total_pages);

        let names: Vec<&str> = request.files.iter().map(|f| f.name.as_str()).collect();
        let new_job = NewPrintJob {
            user_id: user.id,
            printer_id: printer.id,
            file_paths: stored
                .iter()
                .map(|file| file.path.to_string_lossy().into_owned())
                .collect(),
            document_name: document_name(&names),
            print_mode: request.print_mode,
            paper_size: request.paper_size.unwrap_or_default(),
            orientation: request.orientation.unwrap_or_default(),
            delivery_option: request.delivery_option,
            total_pages,
            total_cost,
            created_at: Utc::now(),
        };

        let job = match self.store.insert_job(&new_job) {
            Ok(job) => job,
            Err(err) => {
                self.discard(&stored);
                return Err(err);
            }
        };
        info!(job_id = %job.id, total_pages, total_cost, "job created");

        // The job is persisted: store failures past this point are logged,
        // not returned.
        let dispatch = match self.client.send(&job, &printer).await {
            Ok(()) => DispatchOutcome::Delivered,
            Err(err) => {
                warn!(job_id = %job.id, error = %err, "dispatch failed; job left pending");
                DispatchOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        };

        let job = match dispatch {
            DispatchOutcome::Delivered => {
                match self
                    .store
                    .transition_job(job.id, JobStatus::Processing, Utc::now())
                {
                    Ok(processing) => processing,
                    Err(err) => {
                        error!(job_id = %job.id, error = %err, "delivered job could not be marked processing");
                        job
                    }
                }
            }
            DispatchOutcome::Failed { .. } => {
                if let Err(err) = self
                    .store
                    .update_printer_status(printer.id, PrinterStatus::Offline)
                {
                    error!(printer_id = %printer.id, error = %err, "printer could not be marked offline");
                }
                job
            }
        };

        Ok(Submission { job, dispatch })
    }

    /// Preview the cost of printing `files` without creating a job.
    ///
    /// Files are stored only for the duration of the page count.
    #[instrument(skip_all, fields(printer_id = %printer_id, files = files.len()))]
    pub fn calculate(
        &self,
        files: &[UploadedFile],
        printer_id: PrinterId,
        print_mode: PrintMode,
    ) -> Result<CostEstimate> {
        check_uploads(files)?;
        let printer = self.resolve_printer(printer_id)?;

        let (stored, total_pages) = self.intake_and_count(files)?;
        self.discard(&stored);

        Ok(CostEstimate::new(
            &printer,
            print_mode,
            total_pages,
            &self.currency,
        ))
    }

    /// The requester's jobs, newest first.
    pub fn jobs_for_user(&self, requester: &RequesterIdentity) -> Result<Vec<PrintJob>> {
        let user = self.resolve_requester(requester)?;
        self.store.jobs_by_user(user.id)
    }

    /// The agent reported the job as printed.
    #[instrument(skip(self))]
    pub fn complete_job(&self, id: JobId) -> Result<PrintJob> {
        self.store.transition_job(id, JobStatus::Completed, Utc::now())
    }

    /// Give up on a pending job.
    #[instrument(skip(self))]
    pub fn fail_job(&self, id: JobId) -> Result<PrintJob> {
        self.store.transition_job(id, JobStatus::Failed, Utc::now())
    }

    fn resolve_printer(&self, id: PrinterId) -> Result<Printer> {
        self.store
            .find_printer_by_id(id)?
            .ok_or_else(|| SmartprintError::not_found("printer", id))
    }

    fn resolve_requester(&self, requester: &RequesterIdentity) -> Result<User> {
        let user = self
            .store
            .find_user_by_email(requester.as_str())?
            .ok_or_else(|| {
                SmartprintError::Authorization(format!("unknown requester {requester}"))
            })?;
        if !user.active {
            return Err(SmartprintError::Authorization(format!(
                "account {requester} is deactivated"
            )));
        }
        Ok(user)
    }

    /// Store every upload, then count pages across all of them.
    ///
    /// On failure the files written so far are removed.
    fn intake_and_count(&self, files: &[UploadedFile]) -> Result<(Vec<StoredFile>, u32)> {
        let mut stored = Vec::with_capacity(files.len());
        for file in files {
            match self.intake.store(file) {
                Ok(file) => stored.push(file),
                Err(err) => {
                    self.discard(&stored);
                    return Err(err);
                }
            }
        }

        match self.count_pages(&stored) {
            Ok(total) => Ok((stored, total)),
            Err(err) => {
                self.discard(&stored);
                Err(err)
            }
        }
    }

    fn count_pages(&self, stored: &[StoredFile]) -> Result<u32> {
        stored.iter().try_fold(0u32, |total, file| {
            let pages = self.inspector.count_pages(&file.path)?;
            total.checked_add(pages).ok_or_else(|| {
                SmartprintError::InvalidDocument("total page count is too large".into())
            })
        })
    }

    fn discard(&self, stored: &[StoredFile]) {
        for file in stored {
            if let Err(err) = self.intake.remove(&file.path) {
                error!(path = %file.path.display(), error = %err, "failed to remove stored upload");
            }
        }
    }
}

/// Request-shape checks that need no I/O.
fn check_uploads(files: &[UploadedFile]) -> Result<()> {
    if files.is_empty() {
        return Err(SmartprintError::Validation("no files".into()));
    }
    files.iter().try_for_each(FileIntake::ensure_pdf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartprint_core::ErrorKind;

    #[test]
    fn empty_upload_list_is_rejected() {
        let err = check_uploads(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "invalid request: no files");
    }

    #[test]
    fn one_non_pdf_rejects_the_whole_set() {
        let files = [
            UploadedFile::new("a.pdf", "application/pdf", vec![1]),
            UploadedFile::new("b.docx", "application/msword", vec![2]),
        ];
        let err = check_uploads(&files).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn dispatch_outcome_is_tagged() {
        let failed = DispatchOutcome::Failed {
            reason: "connection refused".into(),
        };
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["outcome"], "FAILED");
        assert_eq!(json["reason"], "connection refused");
        assert_eq!(
            serde_json::to_value(DispatchOutcome::Delivered).unwrap()["outcome"],
            "DELIVERED"
        );
    }
}
