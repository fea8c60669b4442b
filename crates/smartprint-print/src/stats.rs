// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Admin dashboard figures.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::instrument;

use smartprint_core::error::Result;
use smartprint_core::types::{JobStatus, PrintJob, PrinterStatus};

use crate::store::Store;

/// Number of jobs listed under "recent activity".
pub const RECENT_JOBS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_printers: u64,
    pub online_printers: u64,
    /// Jobs created since midnight UTC of `now`.
    pub jobs_today: u64,
    pub completed_jobs: u64,
    /// Sum of `total_cost` over completed jobs.
    pub revenue: f64,
    pub recent_jobs: Vec<PrintJob>,
}

/// Collect the dashboard figures as of `now`.
#[instrument(skip(store))]
pub fn dashboard(store: &Store, now: DateTime<Utc>) -> Result<DashboardStats> {
    let printers = store.list_printers()?;
    let online_printers = printers
        .iter()
        .filter(|printer| printer.status == PrinterStatus::Online)
        .count();

    let completed = store.jobs_by_status(JobStatus::Completed)?;
    let revenue = completed.iter().map(|job| job.total_cost).sum::<f64>();

    let midnight = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|start| start.and_utc())
        .unwrap_or(now);

    Ok(DashboardStats {
        total_users: store.count_users()?,
        total_printers: printers.len() as u64,
        online_printers: online_printers as u64,
        jobs_today: store.count_jobs_since(midnight)?,
        completed_jobs: completed.len() as u64,
        revenue,
        recent_jobs: store.recent_jobs(RECENT_JOBS)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use smartprint_core::types::{
        DeliveryOption, NewPrintJob, NewPrinter, NewUser, Orientation, PaperSize, PrintMode,
        UserRole,
    };

    #[test]
    fn empty_store_reports_zeroes() {
        let store = Store::open_in_memory().unwrap();
        let stats = dashboard(&store, Utc::now()).unwrap();
        assert_eq!(stats.total_users, 0);
        assert_eq!(stats.revenue, 0.0);
        assert!(stats.recent_jobs.is_empty());
    }

    #[test]
    fn revenue_counts_completed_jobs_only() {
        let store = Store::open_in_memory().unwrap();
        let user = store
            .insert_user(&NewUser {
                email: "ops@example.edu".into(),
                name: "Ops".into(),
                role: UserRole::Admin,
            })
            .unwrap();
        let printer = store
            .insert_printer(&NewPrinter {
                name: "Hall".into(),
                location: "Block B".into(),
                address: "10.1.1.1".into(),
                black_and_white_rate: 1.0,
                color_rate: 2.0,
                owner_id: None,
                status: PrinterStatus::Online,
            })
            .unwrap();

        let now = Utc.with_ymd_and_hms(2026, 3, 14, 15, 0, 0).unwrap();
        let job = |cost: f64, created_at: DateTime<Utc>| NewPrintJob {
            user_id: user.id,
            printer_id: printer.id,
            file_paths: vec!["/uploads/x.pdf".into()],
            document_name: "x.pdf".into(),
            print_mode: PrintMode::BlackAndWhite,
            paper_size: PaperSize::A4,
            orientation: Orientation::Portrait,
            delivery_option: DeliveryOption::SelfPickup,
            total_pages: 4,
            total_cost: cost,
            created_at,
        };

        let yesterday = store.insert_job(&job(4.0, now - Duration::days(1))).unwrap();
        let today = store.insert_job(&job(6.0, now - Duration::hours(1))).unwrap();
        store.insert_job(&job(100.0, now - Duration::minutes(5))).unwrap();

        for id in [yesterday.id, today.id] {
            store.transition_job(id, JobStatus::Processing, now).unwrap();
            store.transition_job(id, JobStatus::Completed, now).unwrap();
        }

        let stats = dashboard(&store, now).unwrap();
        assert_eq!(stats.total_users, 1);
        assert_eq!(stats.total_printers, 1);
        assert_eq!(stats.online_printers, 1);
        assert_eq!(stats.jobs_today, 2);
        assert_eq!(stats.completed_jobs, 2);
        assert_eq!(stats.revenue, 10.0);
        assert_eq!(stats.recent_jobs.len(), 3);
    }
}
