// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer. Opens the record store, builds the agent client and
// job orchestrator from the persisted configuration, and exposes the
// operations the CLI commands call.
//
// The store serialises its own access, so everything here is shared through
// plain `Arc`s.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use smartprint_core::AppConfig;
use smartprint_core::error::{Result, SmartprintError};
use smartprint_core::types::{NewUser, UploadedFile, User, UserId, UserRole};
use smartprint_document::{DocumentType, FileIntake};
use smartprint_print::{
    AgentClient, DashboardStats, JobOrchestrator, PrinterService, Store, dashboard,
};

use super::data_dir;

const CONFIG_FILE: &str = "config.json";
const DATABASE_FILE: &str = "smartprint.db";
const UPLOADS_DIR: &str = "uploads";

/// Everything a command needs, built once per process.
#[derive(Clone)]
pub struct AppServices {
    store: Arc<Store>,
    orchestrator: Arc<JobOrchestrator>,
    printers: PrinterService,
    data_dir: PathBuf,
    config: AppConfig,
}

impl AppServices {
    /// Initialise all services rooted at `dir`.
    ///
    /// Writes a default `config.json` on first run so it can be edited.
    pub fn init(dir: &Path) -> Result<Self> {
        info!(path = %dir.display(), "initialising app services");

        let config = load_config(dir)?;
        let uploads = match &config.uploads_dir {
            Some(path) => path.clone(),
            None => data_dir::data_subdir(dir, UPLOADS_DIR)?,
        };

        let store = Arc::new(Store::open(dir.join(DATABASE_FILE))?);
        let client = AgentClient::new(&config)?;
        let intake = FileIntake::new(uploads)?;

        let orchestrator = Arc::new(JobOrchestrator::new(
            Arc::clone(&store),
            intake,
            client.clone(),
            config.currency.clone(),
        ));
        let printers = PrinterService::new(Arc::clone(&store), client);

        info!("app services initialised");
        Ok(Self {
            store,
            orchestrator,
            printers,
            data_dir: dir.to_path_buf(),
            config,
        })
    }

    pub fn orchestrator(&self) -> &JobOrchestrator {
        &self.orchestrator
    }

    pub fn printers(&self) -> &PrinterService {
        &self.printers
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    // -- Users ----------------------------------------------------------------

    pub fn add_user(&self, email: &str, name: &str, admin: bool) -> Result<User> {
        self.store.insert_user(&NewUser {
            email: email.to_string(),
            name: name.to_string(),
            role: if admin { UserRole::Admin } else { UserRole::User },
        })
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        self.store.list_users()
    }

    pub fn adjust_balance(&self, id: UserId, amount: f64) -> Result<User> {
        self.store.adjust_balance(id, amount)
    }

    pub fn set_user_active(&self, id: UserId, active: bool) -> Result<User> {
        self.store.set_user_active(id, active)
    }

    /// Delete a user along with their printers and jobs.
    pub fn delete_user(&self, id: UserId) -> Result<()> {
        self.store
            .find_user_by_id(id)?
            .ok_or_else(|| SmartprintError::not_found("user", id))?;
        self.store.delete_user(id)
    }

    // -- Dashboard ------------------------------------------------------------

    pub fn stats(&self) -> Result<DashboardStats> {
        dashboard(&self.store, Utc::now())
    }

    // -- Config ---------------------------------------------------------------

    /// Persist a new configuration.  Takes effect on the next start.
    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        persist_config(&self.data_dir, config)
    }
}

/// Read documents from disk as uploads, declaring a content type from each
/// file's extension.
pub fn read_uploads(paths: &[PathBuf]) -> Result<Vec<UploadedFile>> {
    paths
        .iter()
        .map(|path| {
            let bytes = std::fs::read(path).map_err(|err| read_error(path, err))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            Ok(UploadedFile::new(
                name,
                DocumentType::from_path(path).mime_type(),
                bytes,
            ))
        })
        .collect()
}

/// Classify a failed read of a local input file.
fn read_error(path: &Path, err: std::io::Error) -> SmartprintError {
    match err.kind() {
        std::io::ErrorKind::NotFound => SmartprintError::not_found("file", path.display()),
        _ => SmartprintError::Validation(format!("cannot read {}: {err}", path.display())),
    }
}

// ---------------------------------------------------------------------------
// Config persistence
// ---------------------------------------------------------------------------

fn load_config(data_dir: &Path) -> Result<AppConfig> {
    let path = data_dir.join(CONFIG_FILE);
    match std::fs::read_to_string(&path) {
        Ok(data) => Ok(serde_json::from_str(&data)?),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            let config = AppConfig::default();
            persist_config(data_dir, &config)?;
            Ok(config)
        }
        Err(err) => Err(err.into()),
    }
}

fn persist_config(data_dir: &Path, config: &AppConfig) -> Result<()> {
    let path = data_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}
