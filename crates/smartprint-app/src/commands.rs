// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command execution.  Every command answers with a JSON document.

use serde::Serialize;
use serde_json::{Value, json};

use smartprint_core::error::Result;
use smartprint_core::types::{JobId, NewPrinter, PrinterId, PrinterStatus, RequesterIdentity, UserId};
use smartprint_print::SubmitRequest;

use crate::cli::{Command, ConfigCommand, JobCommand, PrinterCommand, UserCommand};
use crate::services::app_services::{AppServices, read_uploads};

pub async fn execute(services: &AppServices, command: Command) -> Result<Value> {
    match command {
        Command::User(cmd) => user(services, cmd),
        Command::Printer(cmd) => printer(services, cmd).await,
        Command::Calculate(args) => {
            let files = read_uploads(&args.files)?;
            to_value(services.orchestrator().calculate(
                &files,
                PrinterId(args.printer),
                args.mode,
            )?)
        }
        Command::Submit(args) => {
            let request = SubmitRequest {
                files: read_uploads(&args.files)?,
                printer_id: PrinterId(args.printer),
                delivery_option: args.delivery,
                print_mode: args.mode,
                paper_size: args.paper_size,
                orientation: args.orientation,
            };
            let requester = RequesterIdentity::new(args.requester);
            to_value(services.orchestrator().submit(&requester, request).await?)
        }
        Command::Jobs { requester } => to_value(
            services
                .orchestrator()
                .jobs_for_user(&RequesterIdentity::new(requester))?,
        ),
        Command::Job(JobCommand::Complete { id }) => {
            to_value(services.orchestrator().complete_job(JobId(id))?)
        }
        Command::Job(JobCommand::Fail { id }) => {
            to_value(services.orchestrator().fail_job(JobId(id))?)
        }
        Command::Stats => to_value(services.stats()?),
        Command::Config(cmd) => config(services, cmd),
    }
}

fn user(services: &AppServices, cmd: UserCommand) -> Result<Value> {
    match cmd {
        UserCommand::Add { email, name, admin } => to_value(services.add_user(&email, &name, admin)?),
        UserCommand::List => to_value(services.list_users()?),
        UserCommand::Balance { id, amount } => to_value(services.adjust_balance(UserId(id), amount)?),
        UserCommand::Deactivate { id } => to_value(services.set_user_active(UserId(id), false)?),
        UserCommand::Activate { id } => to_value(services.set_user_active(UserId(id), true)?),
        UserCommand::Delete { id } => {
            services.delete_user(UserId(id))?;
            Ok(json!({ "deleted": id }))
        }
    }
}

async fn printer(services: &AppServices, cmd: PrinterCommand) -> Result<Value> {
    let printers = services.printers();
    match cmd {
        PrinterCommand::Add(args) => to_value(printers.add_printer(&NewPrinter {
            name: args.name,
            location: args.location,
            address: args.address,
            black_and_white_rate: args.black_and_white_rate,
            color_rate: args.color_rate,
            owner_id: args.owner.map(UserId),
            status: if args.offline {
                PrinterStatus::Offline
            } else {
                PrinterStatus::Online
            },
        })?),
        PrinterCommand::List { landing: true } => to_value(printers.landing_printers()?),
        PrinterCommand::List { landing: false } => to_value(printers.list_printers()?),
        PrinterCommand::Locations => to_value(printers.locations()?),
        PrinterCommand::Status { id } => to_value(printers.probe_status(PrinterId(id)).await?),
        PrinterCommand::Connect { id } => to_value(printers.connect(PrinterId(id)).await?),
        PrinterCommand::SetStatus { id, status } => {
            to_value(printers.set_status(PrinterId(id), status)?)
        }
        PrinterCommand::Jobs { id } => to_value(printers.jobs_for_printer(PrinterId(id))?),
        PrinterCommand::Delete { id } => {
            printers.delete_printer(PrinterId(id))?;
            Ok(json!({ "deleted": id }))
        }
    }
}

fn config(services: &AppServices, cmd: ConfigCommand) -> Result<Value> {
    match cmd {
        ConfigCommand::Show => Ok(json!({
            "data_dir": services.data_dir(),
            "config": services.config(),
        })),
        ConfigCommand::Set {
            agent_port,
            connect_timeout_secs,
            request_timeout_secs,
            currency,
            uploads_dir,
        } => {
            let mut config = services.config().clone();
            if let Some(port) = agent_port {
                config.agent_port = port;
            }
            if let Some(secs) = connect_timeout_secs {
                config.connect_timeout_secs = secs;
            }
            if let Some(secs) = request_timeout_secs {
                config.request_timeout_secs = secs;
            }
            if let Some(currency) = currency {
                config.currency = currency;
            }
            if uploads_dir.is_some() {
                config.uploads_dir = uploads_dir;
            }
            services.save_config(&config)?;
            to_value(config)
        }
    }
}

fn to_value<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    async fn run(services: &AppServices, args: &[&str]) -> Result<Value> {
        let cli = Cli::try_parse_from(std::iter::once("smartprint").chain(args.iter().copied()))
            .expect("parse");
        execute(services, cli.command).await
    }

    #[tokio::test]
    async fn register_user_and_printer() {
        let tmp = tempfile::tempdir().unwrap();
        let services = AppServices::init(tmp.path()).unwrap();

        let user = run(&services, &["user", "add", "--email", "o@example.edu", "--name", "Owner"])
            .await
            .unwrap();
        assert_eq!(user["role"], "USER");
        assert_eq!(user["active"], true);

        let printer = run(
            &services,
            &[
                "printer", "add", "--name", "Lab", "--location", "Room 1", "--address",
                "10.0.0.8", "--bw-rate", "1", "--color-rate", "2.5", "--owner", "1",
            ],
        )
        .await
        .unwrap();
        assert_eq!(printer["status"], "ONLINE");
        assert_eq!(printer["color_rate"], 2.5);

        let landing = run(&services, &["printer", "list", "--landing"]).await.unwrap();
        assert_eq!(landing.as_array().unwrap().len(), 1);

        let stats = run(&services, &["stats"]).await.unwrap();
        assert_eq!(stats["total_users"], 1);
        assert_eq!(stats["online_printers"], 1);
    }

    #[tokio::test]
    async fn submit_without_files_fails_validation() {
        let tmp = tempfile::tempdir().unwrap();
        let services = AppServices::init(tmp.path()).unwrap();
        let err = run(&services, &["submit", "--as", "x@example.edu", "--printer", "1"])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), smartprint_core::ErrorKind::Validation);
    }

    #[tokio::test]
    async fn config_set_is_persisted() {
        let tmp = tempfile::tempdir().unwrap();
        let services = AppServices::init(tmp.path()).unwrap();

        let config = run(&services, &["config", "set", "--agent-port", "9100", "--currency", "USD"])
            .await
            .unwrap();
        assert_eq!(config["agent_port"], 9100);

        let restarted = AppServices::init(tmp.path()).unwrap();
        let shown = run(&restarted, &["config", "show"]).await.unwrap();
        assert_eq!(shown["config"]["currency"], "USD");
        assert_eq!(shown["config"]["request_timeout_secs"], 30);
    }
}
