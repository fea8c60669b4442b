// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Persistent user, printer and job records backed by SQLite.
//
// The store holds metadata only.  Document bytes live in the uploads
// directory and jobs reference them by path.  Enumerations are written as
// their serde JSON encoding and timestamps as fixed-width RFC 3339 strings so
// that text ordering matches chronological ordering.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use smartprint_core::error::{Result, SmartprintError};
use smartprint_core::types::{
    JobId, JobStatus, NewPrintJob, NewPrinter, NewUser, PrintJob, Printer, PrinterId,
    PrinterStatus, User, UserId,
};

/// SQLite schema.  Deleting a user removes their printers and jobs; deleting
/// a printer removes its jobs.
const CREATE_TABLES_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        role TEXT NOT NULL,
        balance REAL NOT NULL DEFAULT 0,
        active INTEGER NOT NULL DEFAULT 1
    );

    CREATE TABLE IF NOT EXISTS printers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        location TEXT NOT NULL,
        address TEXT NOT NULL UNIQUE,
        black_and_white_rate REAL NOT NULL CHECK (black_and_white_rate >= 0),
        color_rate REAL NOT NULL CHECK (color_rate >= 0),
        status TEXT NOT NULL,
        owner_id INTEGER REFERENCES users(id) ON DELETE CASCADE,
        queue_length INTEGER NOT NULL DEFAULT 0
    );

    CREATE TABLE IF NOT EXISTS jobs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        printer_id INTEGER NOT NULL REFERENCES printers(id) ON DELETE CASCADE,
        file_paths TEXT NOT NULL,
        document_name TEXT NOT NULL,
        print_mode TEXT NOT NULL,
        paper_size TEXT NOT NULL,
        orientation TEXT NOT NULL,
        delivery_option TEXT NOT NULL,
        total_pages INTEGER NOT NULL,
        total_cost REAL NOT NULL,
        status TEXT NOT NULL,
        created_at TEXT NOT NULL,
        completed_at TEXT
    );

    CREATE INDEX IF NOT EXISTS jobs_by_user ON jobs (user_id, created_at);
    CREATE INDEX IF NOT EXISTS jobs_by_printer ON jobs (printer_id, created_at);
"#;

const USER_COLUMNS: &str = "id, email, name, role, balance, active";

const PRINTER_COLUMNS: &str = "id, name, location, address, black_and_white_rate, color_rate, \
                               status, owner_id, queue_length";

const JOB_COLUMNS: &str = "id, user_id, printer_id, file_paths, document_name, print_mode, \
                           paper_size, orientation, delivery_option, total_pages, total_cost, \
                           status, created_at, completed_at";

/// SQLite-backed record store.
///
/// Methods are synchronous and serialised through an internal mutex, so a
/// single `Store` can be shared behind an `Arc` by every service.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) the database at `path` in WAL mode.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| SmartprintError::Database(format!("open: {e}")))?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| SmartprintError::Database(format!("WAL pragma: {e}")))?;

        Self::init(conn).inspect(|_| info!("record store opened"))
    }

    /// Open an in-memory database (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| SmartprintError::Database(format!("open in-memory: {e}")))?;

        Self::init(conn).inspect(|_| debug!("in-memory record store opened"))
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|e| SmartprintError::Database(format!("foreign_keys pragma: {e}")))?;
        conn.execute_batch(CREATE_TABLES_SQL)
            .map_err(|e| SmartprintError::Database(format!("create tables: {e}")))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| SmartprintError::Database("connection mutex poisoned".into()))
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    /// Register a user.  New users start active with a zero balance.
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub fn insert_user(&self, user: &NewUser) -> Result<User> {
        if user.email.trim().is_empty() {
            return Err(SmartprintError::Validation("user email is empty".into()));
        }
        let role_json = to_json(&user.role, "role")?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO users (email, name, role, balance, active) VALUES (?1, ?2, ?3, 0, 1)",
            params![user.email, user.name, role_json],
        )
        .map_err(|e| constraint_error(e, "insert user", "email already registered"))?;

        let id = UserId(conn.last_insert_rowid());
        info!(user_id = %id, "user registered");
        fetch_user(&conn, id)?.ok_or_else(|| SmartprintError::not_found("user", id))
    }

    #[instrument(skip(self))]
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            params![email],
            row_to_user,
        )
        .optional()
        .map_err(|e| SmartprintError::Database(format!("find user by email: {e}")))
    }

    #[instrument(skip(self))]
    pub fn find_user_by_id(&self, id: UserId) -> Result<Option<User>> {
        fetch_user(&*self.conn()?, id)
    }

    #[instrument(skip(self))]
    pub fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn()?;
        let users = query_all(
            &conn,
            &format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"),
            [],
            row_to_user,
            "list users",
        )?;
        debug!(count = users.len(), "retrieved users");
        Ok(users)
    }

    /// Add `delta` (possibly negative) to a user's balance.
    #[instrument(skip(self))]
    pub fn adjust_balance(&self, id: UserId, delta: f64) -> Result<User> {
        if !delta.is_finite() {
            return Err(SmartprintError::Validation(format!(
                "balance adjustment must be a finite number, got {delta}"
            )));
        }
        let conn = self.conn()?;
        let rows = conn
            .execute(
                "UPDATE users SET balance = balance + ?1 WHERE id = ?2",
                params![delta, id.0],
            )
            .map_err(|e| SmartprintError::Database(format!("adjust balance: {e}")))?;
        if rows == 0 {
            return Err(SmartprintError::not_found("user", id));
        }
        info!(user_id = %id, delta, "balance adjusted");
        fetch_user(&conn, id)?.ok_or_else(|| SmartprintError::not_found("user", id))
    }

    #[instrument(skip(self))]
    pub fn set_user_active(&self, id: UserId, active: bool) -> Result<User> {
        let conn = self.conn()?;
        let rows = conn
            .execute(
                "UPDATE users SET active = ?1 WHERE id = ?2",
                params![active, id.0],
            )
            .map_err(|e| SmartprintError::Database(format!("set user active: {e}")))?;
        if rows == 0 {
            return Err(SmartprintError::not_found("user", id));
        }
        info!(user_id = %id, active, "user activation changed");
        fetch_user(&conn, id)?.ok_or_else(|| SmartprintError::not_found("user", id))
    }

    /// Delete a user together with their printers and jobs.
    ///
    /// Returns `Ok(())` even if the user did not exist (idempotent).
    #[instrument(skip(self))]
    pub fn delete_user(&self, id: UserId) -> Result<()> {
        self.conn()?
            .execute("DELETE FROM users WHERE id = ?1", params![id.0])
            .map_err(|e| SmartprintError::Database(format!("delete user: {e}")))?;
        info!(user_id = %id, "user deleted");
        Ok(())
    }

    pub fn count_users(&self) -> Result<u64> {
        count(&*self.conn()?, "SELECT COUNT(*) FROM users", [])
    }

    // -----------------------------------------------------------------------
    // Printers
    // -----------------------------------------------------------------------

    /// Register a printer.  The address must not already be in use.
    #[instrument(skip(self, printer), fields(address = %printer.address))]
    pub fn insert_printer(&self, printer: &NewPrinter) -> Result<Printer> {
        printer.validate()?;
        let status_json = to_json(&printer.status, "printer status")?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO printers (name, location, address, black_and_white_rate, color_rate,
             status, owner_id, queue_length)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0)",
            params![
                printer.name,
                printer.location,
                printer.address,
                printer.black_and_white_rate,
                printer.color_rate,
                status_json,
                printer.owner_id.map(|id| id.0),
            ],
        )
        .map_err(|e| constraint_error(e, "insert printer", "printer address already registered"))?;

        let id = PrinterId(conn.last_insert_rowid());
        info!(printer_id = %id, "printer registered");
        fetch_printer(&conn, id)?.ok_or_else(|| SmartprintError::not_found("printer", id))
    }

    #[instrument(skip(self))]
    pub fn find_printer_by_id(&self, id: PrinterId) -> Result<Option<Printer>> {
        fetch_printer(&*self.conn()?, id)
    }

    #[instrument(skip(self))]
    pub fn list_printers(&self) -> Result<Vec<Printer>> {
        let conn = self.conn()?;
        let printers = query_all(
            &conn,
            &format!("SELECT {PRINTER_COLUMNS} FROM printers ORDER BY id"),
            [],
            row_to_printer,
            "list printers",
        )?;
        debug!(count = printers.len(), "retrieved printers");
        Ok(printers)
    }

    #[instrument(skip(self))]
    pub fn printers_by_status(&self, status: PrinterStatus) -> Result<Vec<Printer>> {
        let status_json = to_json(&status, "printer status")?;
        let conn = self.conn()?;
        query_all(
            &conn,
            &format!("SELECT {PRINTER_COLUMNS} FROM printers WHERE status = ?1 ORDER BY id"),
            params![status_json],
            row_to_printer,
            "printers by status",
        )
    }

    /// Overwrite a printer's liveness status.  Last write wins.
    #[instrument(skip(self))]
    pub fn update_printer_status(&self, id: PrinterId, status: PrinterStatus) -> Result<()> {
        let status_json = to_json(&status, "printer status")?;
        let rows = self
            .conn()?
            .execute(
                "UPDATE printers SET status = ?1 WHERE id = ?2",
                params![status_json, id.0],
            )
            .map_err(|e| SmartprintError::Database(format!("update printer status: {e}")))?;

        if rows == 0 {
            return Err(SmartprintError::not_found("printer", id));
        }
        debug!(printer_id = %id, ?status, "printer status updated");
        Ok(())
    }

    /// Delete a printer together with its jobs (idempotent).
    #[instrument(skip(self))]
    pub fn delete_printer(&self, id: PrinterId) -> Result<()> {
        self.conn()?
            .execute("DELETE FROM printers WHERE id = ?1", params![id.0])
            .map_err(|e| SmartprintError::Database(format!("delete printer: {e}")))?;
        info!(printer_id = %id, "printer deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Jobs
    // -----------------------------------------------------------------------

    /// Persist a new job in the `Pending` state.
    ///
    /// The returned record carries the store-assigned id and the timestamp as
    /// stored (microsecond precision).
    #[instrument(skip(self, job), fields(user_id = %job.user_id, printer_id = %job.printer_id))]
    pub fn insert_job(&self, job: &NewPrintJob) -> Result<PrintJob> {
        let paths_json = to_json(&job.file_paths, "file paths")?;
        let mode_json = to_json(&job.print_mode, "print mode")?;
        let size_json = to_json(&job.paper_size, "paper size")?;
        let orientation_json = to_json(&job.orientation, "orientation")?;
        let delivery_json = to_json(&job.delivery_option, "delivery option")?;
        let status_json = to_json(&JobStatus::Pending, "job status")?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO jobs (user_id, printer_id, file_paths, document_name, print_mode,
             paper_size, orientation, delivery_option, total_pages, total_cost, status,
             created_at, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, NULL)",
            params![
                job.user_id.0,
                job.printer_id.0,
                paths_json,
                job.document_name,
                mode_json,
                size_json,
                orientation_json,
                delivery_json,
                job.total_pages,
                job.total_cost,
                status_json,
                timestamp(&job.created_at),
            ],
        )
        .map_err(|e| constraint_error(e, "insert job", "job references an unknown user or printer"))?;

        let id = JobId(conn.last_insert_rowid());
        info!(job_id = %id, pages = job.total_pages, cost = job.total_cost, "job persisted");
        fetch_job(&conn, id)?.ok_or_else(|| SmartprintError::not_found("job", id))
    }

    #[instrument(skip(self))]
    pub fn find_job(&self, id: JobId) -> Result<Option<PrintJob>> {
        fetch_job(&*self.conn()?, id)
    }

    /// A user's jobs, newest first.
    #[instrument(skip(self))]
    pub fn jobs_by_user(&self, user_id: UserId) -> Result<Vec<PrintJob>> {
        let conn = self.conn()?;
        query_all(
            &conn,
            &format!(
                "SELECT {JOB_COLUMNS} FROM jobs WHERE user_id = ?1
                 ORDER BY created_at DESC, id DESC"
            ),
            params![user_id.0],
            row_to_job,
            "jobs by user",
        )
    }

    /// A printer's jobs, newest first.
    #[instrument(skip(self))]
    pub fn jobs_by_printer(&self, printer_id: PrinterId) -> Result<Vec<PrintJob>> {
        let conn = self.conn()?;
        query_all(
            &conn,
            &format!(
                "SELECT {JOB_COLUMNS} FROM jobs WHERE printer_id = ?1
                 ORDER BY created_at DESC, id DESC"
            ),
            params![printer_id.0],
            row_to_job,
            "jobs by printer",
        )
    }

    /// Jobs in `status`, oldest first.
    #[instrument(skip(self))]
    pub fn jobs_by_status(&self, status: JobStatus) -> Result<Vec<PrintJob>> {
        let status_json = to_json(&status, "job status")?;
        let conn = self.conn()?;
        let jobs = query_all(
            &conn,
            &format!(
                "SELECT {JOB_COLUMNS} FROM jobs WHERE status = ?1
                 ORDER BY created_at ASC, id ASC"
            ),
            params![status_json],
            row_to_job,
            "jobs by status",
        )?;
        debug!(count = jobs.len(), ?status, "retrieved jobs by status");
        Ok(jobs)
    }

    /// The `limit` most recently created jobs.
    #[instrument(skip(self))]
    pub fn recent_jobs(&self, limit: u32) -> Result<Vec<PrintJob>> {
        let conn = self.conn()?;
        query_all(
            &conn,
            &format!("SELECT {JOB_COLUMNS} FROM jobs ORDER BY created_at DESC, id DESC LIMIT ?1"),
            params![limit],
            row_to_job,
            "recent jobs",
        )
    }

    /// Number of jobs created at or after `since`.
    pub fn count_jobs_since(&self, since: DateTime<Utc>) -> Result<u64> {
        count(
            &*self.conn()?,
            "SELECT COUNT(*) FROM jobs WHERE created_at >= ?1",
            params![timestamp(&since)],
        )
    }

    /// Move a job to `next`, enforcing the job state machine.
    ///
    /// Entering a terminal state stamps `completed_at` with `now`.
    #[instrument(skip(self, now))]
    pub fn transition_job(&self, id: JobId, next: JobStatus, now: DateTime<Utc>) -> Result<PrintJob> {
        let conn = self.conn()?;
        let job = fetch_job(&conn, id)?.ok_or_else(|| SmartprintError::not_found("job", id))?;

        if !job.status.can_transition_to(next) {
            return Err(SmartprintError::InvalidTransition {
                from: job.status,
                to: next,
            });
        }

        let status_json = to_json(&next, "job status")?;
        let completed_at = next.is_terminal().then(|| timestamp(&now));
        conn.execute(
            "UPDATE jobs SET status = ?1, completed_at = COALESCE(?2, completed_at) WHERE id = ?3",
            params![status_json, completed_at, id.0],
        )
        .map_err(|e| SmartprintError::Database(format!("transition job: {e}")))?;

        info!(job_id = %id, from = ?job.status, to = ?next, "job status changed");
        fetch_job(&conn, id)?.ok_or_else(|| SmartprintError::not_found("job", id))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fixed-width UTC timestamp; lexical order equals chronological order.
fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn to_json<T: Serialize>(value: &T, what: &str) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| SmartprintError::Database(format!("serialize {what}: {e}")))
}

/// Constraint violations are the caller's fault; everything else is ours.
fn constraint_error(err: rusqlite::Error, context: &str, violation: &str) -> SmartprintError {
    match err {
        rusqlite::Error::SqliteFailure(code, _)
            if code.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            SmartprintError::Validation(violation.to_string())
        }
        other => SmartprintError::Database(format!("{context}: {other}")),
    }
}

fn count<P: rusqlite::Params>(conn: &Connection, sql: &str, params: P) -> Result<u64> {
    let n: i64 = conn
        .query_row(sql, params, |row| row.get(0))
        .map_err(|e| SmartprintError::Database(format!("count: {e}")))?;
    Ok(u64::try_from(n).unwrap_or_default())
}

fn query_all<T, P, F>(conn: &Connection, sql: &str, params: P, map: F, what: &str) -> Result<Vec<T>>
where
    P: rusqlite::Params,
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| SmartprintError::Database(format!("prepare {what}: {e}")))?;
    stmt.query_map(params, map)
        .map_err(|e| SmartprintError::Database(format!("query {what}: {e}")))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| SmartprintError::Database(format!("collect {what}: {e}")))
}

fn fetch_user(conn: &Connection, id: UserId) -> Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
        params![id.0],
        row_to_user,
    )
    .optional()
    .map_err(|e| SmartprintError::Database(format!("find user: {e}")))
}

fn fetch_printer(conn: &Connection, id: PrinterId) -> Result<Option<Printer>> {
    conn.query_row(
        &format!("SELECT {PRINTER_COLUMNS} FROM printers WHERE id = ?1"),
        params![id.0],
        row_to_printer,
    )
    .optional()
    .map_err(|e| SmartprintError::Database(format!("find printer: {e}")))
}

fn fetch_job(conn: &Connection, id: JobId) -> Result<Option<PrintJob>> {
    conn.query_row(
        &format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?1"),
        params![id.0],
        row_to_job,
    )
    .optional()
    .map_err(|e| SmartprintError::Database(format!("find job: {e}")))
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------
//
// Column indices must match the *_COLUMNS constants above.

fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn time_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let Some(text) = row.get::<_, Option<String>>(idx)? else {
        return Ok(None);
    };
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| Some(dt.with_timezone(&Utc)))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: UserId(row.get(0)?),
        email: row.get(1)?,
        name: row.get(2)?,
        role: json_column(row, 3)?,
        balance: row.get(4)?,
        active: row.get(5)?,
    })
}

fn row_to_printer(row: &Row<'_>) -> rusqlite::Result<Printer> {
    Ok(Printer {
        id: PrinterId(row.get(0)?),
        name: row.get(1)?,
        location: row.get(2)?,
        address: row.get(3)?,
        black_and_white_rate: row.get(4)?,
        color_rate: row.get(5)?,
        status: json_column(row, 6)?,
        owner_id: row.get::<_, Option<i64>>(7)?.map(UserId),
        queue_length: row.get(8)?,
    })
}

fn row_to_job(row: &Row<'_>) -> rusqlite::Result<PrintJob> {
    let created_at = time_column(row, 12)?.ok_or(rusqlite::Error::InvalidColumnType(
        12,
        "created_at".into(),
        rusqlite::types::Type::Null,
    ))?;

    Ok(PrintJob {
        id: JobId(row.get(0)?),
        user_id: UserId(row.get(1)?),
        printer_id: PrinterId(row.get(2)?),
        file_paths: json_column(row, 3)?,
        document_name: row.get(4)?,
        print_mode: json_column(row, 5)?,
        paper_size: json_column(row, 6)?,
        orientation: json_column(row, 7)?,
        delivery_option: json_column(row, 8)?,
        total_pages: row.get(9)?,
        total_cost: row.get(10)?,
        status: json_column(row, 11)?,
        created_at,
        completed_at: time_column(row, 13)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use smartprint_core::ErrorKind;
    use smartprint_core::types::{DeliveryOption, Orientation, PaperSize, PrintMode, UserRole};

    fn store() -> Store {
        Store::open_in_memory().expect("open in-memory db")
    }

    fn alice(store: &Store) -> User {
        store
            .insert_user(&NewUser {
                email: "alice@example.edu".into(),
                name: "Alice".into(),
                role: UserRole::User,
            })
            .expect("insert user")
    }

    fn new_printer(address: &str, owner: Option<UserId>) -> NewPrinter {
        NewPrinter {
            name: "Library".into(),
            location: "Ground floor".into(),
            address: address.into(),
            black_and_white_rate: 1.0,
            color_rate: 2.0,
            owner_id: owner,
            status: PrinterStatus::Online,
        }
    }

    fn new_job(user: UserId, printer: PrinterId, created_at: DateTime<Utc>) -> NewPrintJob {
        NewPrintJob {
            user_id: user,
            printer_id: printer,
            file_paths: vec!["/uploads/a.pdf".into(), "/uploads/b.pdf".into()],
            document_name: "a.pdf and others".into(),
            print_mode: PrintMode::Color,
            paper_size: PaperSize::A4,
            orientation: Orientation::Portrait,
            delivery_option: DeliveryOption::SelfPickup,
            total_pages: 7,
            total_cost: 14.0,
            created_at,
        }
    }

    #[test]
    fn insert_and_find_user() {
        let store = store();
        let user = alice(&store);
        assert!(user.active);
        assert_eq!(user.balance, 0.0);

        let by_email = store
            .find_user_by_email("alice@example.edu")
            .expect("find")
            .expect("found");
        assert_eq!(by_email, user);
        assert_eq!(store.find_user_by_id(user.id).unwrap(), Some(user));
        assert!(store.find_user_by_email("bob@example.edu").unwrap().is_none());
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let store = store();
        alice(&store);
        let err = store
            .insert_user(&NewUser {
                email: "alice@example.edu".into(),
                name: "Other Alice".into(),
                role: UserRole::Admin,
            })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(store.count_users().unwrap(), 1);
    }

    #[test]
    fn balance_and_activation_updates() {
        let store = store();
        let user = alice(&store);

        let topped_up = store.adjust_balance(user.id, 50.0).expect("credit");
        let charged = store.adjust_balance(user.id, -12.5).expect("debit");
        assert_eq!(topped_up.balance, 50.0);
        assert_eq!(charged.balance, 37.5);

        let inactive = store.set_user_active(user.id, false).expect("deactivate");
        assert!(!inactive.active);

        let err = store.adjust_balance(UserId(999), 1.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn printer_address_is_unique() {
        let store = store();
        store.insert_printer(&new_printer("10.0.0.5", None)).expect("first");
        let err = store
            .insert_printer(&new_printer("10.0.0.5", None))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(store.list_printers().unwrap().len(), 1);
    }

    #[test]
    fn negative_rates_never_reach_the_table() {
        let store = store();
        let mut printer = new_printer("10.0.0.6", None);
        printer.color_rate = -0.5;
        assert!(store.insert_printer(&printer).is_err());
        assert!(store.list_printers().unwrap().is_empty());
    }

    #[test]
    fn printer_status_updates_and_filters() {
        let store = store();
        let a = store.insert_printer(&new_printer("10.0.0.1", None)).unwrap();
        let b = store.insert_printer(&new_printer("10.0.0.2", None)).unwrap();
        assert_eq!(a.queue_length, 0);

        store
            .update_printer_status(a.id, PrinterStatus::Offline)
            .expect("update");

        let online = store.printers_by_status(PrinterStatus::Online).unwrap();
        assert_eq!(online.len(), 1);
        assert_eq!(online[0].id, b.id);

        let err = store
            .update_printer_status(PrinterId(404), PrinterStatus::Online)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn insert_and_retrieve_job() {
        let store = store();
        let user = alice(&store);
        let printer = store.insert_printer(&new_printer("10.0.0.5", None)).unwrap();
        let now = Utc::now();

        let job = store
            .insert_job(&new_job(user.id, printer.id, now))
            .expect("insert job");
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.file_paths.len(), 2);
        assert!((job.created_at - now).num_milliseconds().abs() < 1);
        assert!(job.completed_at.is_none());

        let found = store.find_job(job.id).expect("find").expect("found");
        assert_eq!(found, job);
    }

    #[test]
    fn job_for_unknown_printer_is_rejected() {
        let store = store();
        let user = alice(&store);
        let err = store
            .insert_job(&new_job(user.id, PrinterId(77), Utc::now()))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn job_listings_are_newest_first() {
        let store = store();
        let user = alice(&store);
        let printer = store.insert_printer(&new_printer("10.0.0.5", None)).unwrap();
        let earlier = Utc::now() - Duration::hours(2);

        let old = store.insert_job(&new_job(user.id, printer.id, earlier)).unwrap();
        let new = store.insert_job(&new_job(user.id, printer.id, Utc::now())).unwrap();

        let by_user = store.jobs_by_user(user.id).unwrap();
        assert_eq!(by_user.iter().map(|j| j.id).collect::<Vec<_>>(), [new.id, old.id]);

        let by_printer = store.jobs_by_printer(printer.id).unwrap();
        assert_eq!(by_printer[0].id, new.id);

        assert_eq!(store.recent_jobs(1).unwrap()[0].id, new.id);
        assert_eq!(store.count_jobs_since(earlier + Duration::hours(1)).unwrap(), 1);
    }

    #[test]
    fn transition_enforces_the_state_machine() {
        let store = store();
        let user = alice(&store);
        let printer = store.insert_printer(&new_printer("10.0.0.5", None)).unwrap();
        let job = store.insert_job(&new_job(user.id, printer.id, Utc::now())).unwrap();

        let err = store
            .transition_job(job.id, JobStatus::Completed, Utc::now())
            .unwrap_err();
        assert!(matches!(err, SmartprintError::InvalidTransition { .. }));

        let processing = store
            .transition_job(job.id, JobStatus::Processing, Utc::now())
            .expect("to processing");
        assert!(processing.completed_at.is_none());

        let done = store
            .transition_job(job.id, JobStatus::Completed, Utc::now())
            .expect("to completed");
        assert_eq!(done.status, JobStatus::Completed);
        assert!(done.completed_at.is_some());

        assert_eq!(store.jobs_by_status(JobStatus::Completed).unwrap().len(), 1);
        assert!(store.jobs_by_status(JobStatus::Pending).unwrap().is_empty());
    }

    #[test]
    fn transition_of_missing_job_is_not_found() {
        let err = store()
            .transition_job(JobId(1), JobStatus::Failed, Utc::now())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn deleting_a_user_cascades() {
        let store = store();
        let user = alice(&store);
        let printer = store
            .insert_printer(&new_printer("10.0.0.5", Some(user.id)))
            .unwrap();
        store.insert_job(&new_job(user.id, printer.id, Utc::now())).unwrap();

        store.delete_user(user.id).expect("delete");
        store.delete_user(user.id).expect("delete again (idempotent)");

        assert!(store.list_printers().unwrap().is_empty());
        assert!(store.recent_jobs(10).unwrap().is_empty());
    }

    #[test]
    fn file_database_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("smartprint.db");
        {
            let store = Store::open(&path).expect("open");
            alice(&store);
        }
        let reopened = Store::open(&path).expect("reopen");
        assert_eq!(reopened.count_users().unwrap(), 1);
    }
}
