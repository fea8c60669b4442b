// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the SmartPrint job pipeline.
//
// Records reference each other only through numeric ids.  A printer does not
// hold its jobs and a user does not hold its printers; those collections are
// answered by store queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Store-assigned identifier of a user.
    UserId
);
numeric_id!(
    /// Store-assigned identifier of a printer.
    PrinterId
);
numeric_id!(
    /// Store-assigned identifier of a print job.
    JobId
);

/// The resolved principal handed to the core by the identity provider.
///
/// The core treats it as an opaque lookup key into the user records (an
/// email address in practice).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequesterIdentity(pub String);

impl RequesterIdentity {
    pub fn new(principal: impl Into<String>) -> Self {
        Self(principal.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequesterIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    User,
    Admin,
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    /// Account balance in the configured currency.  Informational only.
    pub balance: f64,
    pub active: bool,
}

/// Fields needed to register a user; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

// ---------------------------------------------------------------------------
// Printers
// ---------------------------------------------------------------------------

/// Advisory liveness of a printer agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrinterStatus {
    Online,
    Offline,
}

impl std::str::FromStr for PrinterStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ONLINE" => Ok(Self::Online),
            "OFFLINE" => Ok(Self::Offline),
            other => Err(format!("invalid printer status: {other}")),
        }
    }
}

/// A registered printer and the network address of its agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Printer {
    pub id: PrinterId,
    pub name: String,
    pub location: String,
    /// Host name or IP of the printer agent.  Unique across printers.
    pub address: String,
    pub black_and_white_rate: f64,
    pub color_rate: f64,
    pub status: PrinterStatus,
    pub owner_id: Option<UserId>,
    pub queue_length: u32,
}

/// Fields needed to register a printer; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewPrinter {
    pub name: String,
    pub location: String,
    pub address: String,
    pub black_and_white_rate: f64,
    pub color_rate: f64,
    pub owner_id: Option<UserId>,
    pub status: PrinterStatus,
}

impl NewPrinter {
    /// Check the rate and address invariants before the record is written.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::SmartprintError;

        if self.name.trim().is_empty() {
            return Err(SmartprintError::Validation("printer name is empty".into()));
        }
        if self.address.trim().is_empty() {
            return Err(SmartprintError::Validation("printer address is empty".into()));
        }
        for (label, rate) in [
            ("black-and-white", self.black_and_white_rate),
            ("color", self.color_rate),
        ] {
            if !rate.is_finite() || rate < 0.0 {
                return Err(SmartprintError::Validation(format!(
                    "{label} rate must be a non-negative number, got {rate}"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

/// Colour mode a job is printed (and priced) in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrintMode {
    Color,
    BlackAndWhite,
}

impl std::str::FromStr for PrintMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "COLOR" | "COLOUR" => Ok(Self::Color),
            "BLACK_AND_WHITE" | "BW" | "MONO" => Ok(Self::BlackAndWhite),
            other => Err(format!("invalid print mode: {other}")),
        }
    }
}

/// Lifecycle states of a print job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Persisted, not yet accepted by the printer agent.
    Pending,
    /// Delivered to the printer agent.
    Processing,
    /// The agent reported the job as printed.
    Completed,
    /// Given up on; reported to the requester.
    Failed,
}

impl JobStatus {
    /// Whether the state machine allows moving from `self` to `next`.
    ///
    /// `Pending -> Pending` is the "left for an external retry" edge.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        match (self, next) {
            (Self::Pending, Self::Pending | Self::Processing | Self::Failed) => true,
            (Self::Pending, Self::Completed) => false,
            (Self::Processing, Self::Completed) => true,
            (Self::Processing, Self::Pending | Self::Processing | Self::Failed) => false,
            (Self::Completed | Self::Failed, _) => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        match self {
            Self::Completed | Self::Failed => true,
            Self::Pending | Self::Processing => false,
        }
    }
}

/// Standard paper sizes.  Recorded on the job for presentation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaperSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
    Legal,
}

impl std::str::FromStr for PaperSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A4" => Ok(Self::A4),
            "A3" => Ok(Self::A3),
            "A5" => Ok(Self::A5),
            "LETTER" => Ok(Self::Letter),
            "LEGAL" => Ok(Self::Legal),
            other => Err(format!("invalid page size: {other}")),
        }
    }
}

/// Page orientation.  Recorded on the job for presentation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl std::str::FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PORTRAIT" => Ok(Self::Portrait),
            "LANDSCAPE" => Ok(Self::Landscape),
            other => Err(format!("invalid orientation: {other}")),
        }
    }
}

/// How the printed output reaches the requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryOption {
    SelfPickup,
    ClassDelivery,
}

impl std::str::FromStr for DeliveryOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "SELF_PICKUP" | "SELF" | "PICKUP" => Ok(Self::SelfPickup),
            "CLASS_DELIVERY" | "CLASS" => Ok(Self::ClassDelivery),
            other => Err(format!("invalid delivery option: {other}")),
        }
    }
}

/// A persisted print job.
///
/// `total_pages` and `total_cost` are fixed when the job is created and are
/// never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintJob {
    pub id: JobId,
    pub user_id: UserId,
    pub printer_id: PrinterId,
    /// Stored document paths, in submission order.
    pub file_paths: Vec<String>,
    pub document_name: String,
    pub print_mode: PrintMode,
    pub paper_size: PaperSize,
    pub orientation: Orientation,
    pub delivery_option: DeliveryOption,
    pub total_pages: u32,
    pub total_cost: f64,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// A job that has been priced but not yet written to the store.
#[derive(Debug, Clone)]
pub struct NewPrintJob {
    pub user_id: UserId,
    pub printer_id: PrinterId,
    pub file_paths: Vec<String>,
    pub document_name: String,
    pub print_mode: PrintMode,
    pub paper_size: PaperSize,
    pub orientation: Orientation,
    pub delivery_option: DeliveryOption,
    pub total_pages: u32,
    pub total_cost: f64,
    pub created_at: DateTime<Utc>,
}

/// Build the display name of a job from the uploaded file names.
pub fn document_name<S: AsRef<str>>(names: &[S]) -> String {
    match names {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [first, ..] => format!("{} and others", first.as_ref()),
    }
}

/// An uploaded document as received from a client.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Original file name supplied by the client.
    pub name: String,
    /// Declared MIME type.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [JobStatus; 4] = [
        JobStatus::Pending,
        JobStatus::Processing,
        JobStatus::Completed,
        JobStatus::Failed,
    ];

    #[test]
    fn pending_moves_to_processing_or_failed() {
        assert!(JobStatus::Pending.can_transition_to(JobStatus::Processing));
        assert!(JobStatus::Pending.can_transition_to(JobStatus::Failed));
        assert!(JobStatus::Pending.can_transition_to(JobStatus::Pending));
        assert!(!JobStatus::Pending.can_transition_to(JobStatus::Completed));
    }

    #[test]
    fn processing_only_completes() {
        for next in ALL {
            assert_eq!(
                JobStatus::Processing.can_transition_to(next),
                next == JobStatus::Completed
            );
        }
    }

    #[test]
    fn terminal_states_are_final() {
        for from in [JobStatus::Completed, JobStatus::Failed] {
            assert!(from.is_terminal());
            for next in ALL {
                assert!(!from.can_transition_to(next));
            }
        }
    }

    #[test]
    fn document_name_marks_multiple_files() {
        assert_eq!(document_name(&["a.pdf"]), "a.pdf");
        assert_eq!(document_name(&["a.pdf", "b.pdf"]), "a.pdf and others");
        assert_eq!(document_name::<&str>(&[]), "");
    }

    #[test]
    fn enums_use_screaming_snake_case_on_the_wire() {
        assert_eq!(
            serde_json::to_string(&PrintMode::BlackAndWhite).unwrap(),
            "\"BLACK_AND_WHITE\""
        );
        assert_eq!(
            serde_json::to_string(&DeliveryOption::ClassDelivery).unwrap(),
            "\"CLASS_DELIVERY\""
        );
        assert_eq!(serde_json::to_string(&JobId(7)).unwrap(), "7");
    }

    #[test]
    fn parse_cli_spellings() {
        assert_eq!("color".parse::<PrintMode>(), Ok(PrintMode::Color));
        assert_eq!("black-and-white".parse::<PrintMode>(), Ok(PrintMode::BlackAndWhite));
        assert_eq!("letter".parse::<PaperSize>(), Ok(PaperSize::Letter));
        assert_eq!("self".parse::<DeliveryOption>(), Ok(DeliveryOption::SelfPickup));
        assert!("sepia".parse::<PrintMode>().is_err());
    }

    fn new_printer(bw: f64, color: f64) -> NewPrinter {
        NewPrinter {
            name: "Library".into(),
            location: "Ground floor".into(),
            address: "10.0.0.5".into(),
            black_and_white_rate: bw,
            color_rate: color,
            owner_id: None,
            status: PrinterStatus::Online,
        }
    }

    #[test]
    fn printer_rates_must_be_non_negative() {
        assert!(new_printer(1.0, 2.0).validate().is_ok());
        assert!(new_printer(0.0, 0.0).validate().is_ok());
        assert!(new_printer(-1.0, 2.0).validate().is_err());
        assert!(new_printer(1.0, f64::NAN).validate().is_err());
    }
}
