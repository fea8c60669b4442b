// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use smartprint_core::types::{DeliveryOption, Orientation, PaperSize, PrintMode, PrinterStatus};

#[derive(Debug, Parser)]
#[command(
    name = "smartprint",
    about = "Submit print jobs and manage networked printers",
    author,
    version
)]
pub struct Cli {
    /// Data directory (defaults to $SMARTPRINT_DATA_DIR, then the XDG data dir).
    #[arg(long, global = true, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage user accounts.
    #[command(subcommand)]
    User(UserCommand),
    /// Manage printers and check their agents.
    #[command(subcommand)]
    Printer(PrinterCommand),
    /// Preview the cost of printing documents.
    Calculate(CalculateArgs),
    /// Submit documents as a print job.
    Submit(SubmitArgs),
    /// List a user's jobs, newest first.
    Jobs {
        /// Email of the requesting user.
        #[arg(long = "as", value_name = "EMAIL")]
        requester: String,
    },
    /// Record job outcomes reported by a printer agent.
    #[command(subcommand)]
    Job(JobCommand),
    /// Dashboard totals.
    Stats,
    /// Show or change the persisted configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    Show,
    /// Change settings; they take effect on the next run.
    Set {
        #[arg(long)]
        agent_port: Option<u16>,
        #[arg(long)]
        connect_timeout_secs: Option<u64>,
        #[arg(long)]
        request_timeout_secs: Option<u64>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long, value_name = "PATH")]
        uploads_dir: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Register a user.
    Add {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        /// Grant the admin role.
        #[arg(long)]
        admin: bool,
    },
    List,
    /// Add to (or, with a negative amount, deduct from) a balance.
    Balance {
        id: i64,
        #[arg(allow_negative_numbers = true)]
        amount: f64,
    },
    Deactivate { id: i64 },
    Activate { id: i64 },
    Delete { id: i64 },
}

#[derive(Debug, Subcommand)]
pub enum PrinterCommand {
    /// Register a printer agent.
    Add(AddPrinterArgs),
    List {
        /// Only online printers with an owner.
        #[arg(long)]
        landing: bool,
    },
    /// Distinct printer locations.
    Locations,
    /// Probe the agent and record the printer as online or offline.
    Status { id: i64 },
    /// Probe the agent; mark online only if it answers.
    Connect { id: i64 },
    /// Override the recorded status.
    SetStatus { id: i64, status: PrinterStatus },
    /// Jobs sent to the printer, newest first.
    Jobs { id: i64 },
    Delete { id: i64 },
}

#[derive(Debug, Args)]
pub struct AddPrinterArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub location: String,
    /// Host name or IP of the printer agent.
    #[arg(long)]
    pub address: String,
    #[arg(long = "bw-rate")]
    pub black_and_white_rate: f64,
    #[arg(long = "color-rate")]
    pub color_rate: f64,
    /// Owning user id.
    #[arg(long)]
    pub owner: Option<i64>,
    /// Register as offline instead of online.
    #[arg(long)]
    pub offline: bool,
}

#[derive(Debug, Args)]
pub struct CalculateArgs {
    #[arg(long)]
    pub printer: i64,
    #[arg(long, default_value = "black-and-white")]
    pub mode: PrintMode,
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SubmitArgs {
    /// Email of the requesting user.
    #[arg(long = "as", value_name = "EMAIL")]
    pub requester: String,
    #[arg(long)]
    pub printer: i64,
    #[arg(long, default_value = "black-and-white")]
    pub mode: PrintMode,
    #[arg(long, default_value = "self-pickup")]
    pub delivery: DeliveryOption,
    #[arg(long)]
    pub paper_size: Option<PaperSize>,
    #[arg(long)]
    pub orientation: Option<Orientation>,
    /// Documents to print.  Zero files is rejected by the pipeline.
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum JobCommand {
    /// The agent finished printing the job.
    Complete { id: i64 },
    /// Give up on a pending job.
    Fail { id: i64 },
}
