// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// SmartPrint. Print job submission and printer administration.
//
// Entry point.  Initialises logging, resolves the data directory, builds the
// backend services and runs one command.  Results go to stdout as JSON;
// failures go to stderr as a JSON `Failure` with a non-zero exit status.

mod cli;
mod commands;
mod services;

use std::process::ExitCode;

use clap::Parser;

use smartprint_core::Failure;
use smartprint_core::error::Result;

use cli::Cli;
use services::app_services::AppServices;
use services::data_dir;

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout carries nothing but the JSON result.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            let failure = Failure::from(&err);
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&failure).unwrap_or_else(|_| failure.message.clone())
            );
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<String> {
    let dir = data_dir::data_dir(cli.data_dir.as_deref())?;
    let services = AppServices::init(&dir)?;
    let output = commands::execute(&services, cli.command).await?;
    Ok(serde_json::to_string_pretty(&output)?)
}
