//! Expiration sweep — one full pass over all service assignments.
//!
//! Each assignment is an independent unit of work: a bad record or a failed
//! insert is logged and counted, never allowed to abort the rest of the
//! sweep. Only failing to read the source table is sweep-fatal.

use chrono::NaiveDateTime;
use rusqlite::Connection;
use serde::Serialize;

use crate::config::EngineConfig;
use crate::db::repository::{alert, assignment};
use crate::db::DatabaseError;
use crate::models::enums::Audience;
use crate::models::ServiceAssignment;

use super::evaluator::evaluate_assignment;

/// Observability counters for one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepSummary {
    /// Alerts emitted this pass.
    pub created: u32,
    /// Active conditions already covered by an existing alert.
    pub skipped: u32,
    /// Assignments that could not be evaluated or persisted.
    pub failed: u32,
}

/// Scan all service assignments, evaluate their time-window conditions and
/// emit deduplicated alerts for the `clients` audience.
pub fn run_expiration_sweep(
    conn: &Connection,
    now: NaiveDateTime,
    config: &EngineConfig,
) -> Result<SweepSummary, DatabaseError> {
    let rows = assignment::list_all_assignments(conn)?;
    let mut summary = SweepSummary::default();

    for row in rows {
        let assignment = match row {
            Ok(a) => a,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed service assignment");
                summary.failed += 1;
                continue;
            }
        };
        if let Err(e) = sweep_one(conn, &assignment, now, config, &mut summary) {
            tracing::warn!(
                assignment_id = %assignment.id,
                client_id = %assignment.client_id,
                error = %e,
                "Assignment sweep failed"
            );
            summary.failed += 1;
        }
    }

    tracing::info!(
        created = summary.created,
        skipped = summary.skipped,
        failed = summary.failed,
        "Expiration sweep complete"
    );
    Ok(summary)
}

fn sweep_one(
    conn: &Connection,
    assignment: &ServiceAssignment,
    now: NaiveDateTime,
    config: &EngineConfig,
    summary: &mut SweepSummary,
) -> Result<(), DatabaseError> {
    for event in evaluate_assignment(assignment, now.date(), config) {
        let created = alert::insert_alert_if_absent(
            conn,
            &assignment.client_id,
            Audience::Clients,
            event.kind.message(),
            event.effective_date,
            now,
        )?;
        if created {
            tracing::debug!(
                client_id = %assignment.client_id,
                kind = ?event.kind,
                effective_date = %event.effective_date,
                "Alert emitted"
            );
            summary.created += 1;
        } else {
            summary.skipped += 1;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::models::NewServiceAssignment;
    use chrono::{Duration, NaiveDate};
    use rusqlite::params;
    use uuid::Uuid;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(6, 0, 0).unwrap()
    }

    fn seed(conn: &Connection, new: &NewServiceAssignment) {
        assignment::insert_assignment(conn, new, now()).unwrap();
    }

    fn plain(client_id: Uuid) -> NewServiceAssignment {
        NewServiceAssignment {
            client_id,
            client_name: "Ada".into(),
            expiration_date: None,
            care_completion_date: None,
            personal_care_plan_date: None,
            review_date: None,
        }
    }

    #[test]
    fn sweep_emits_for_active_conditions() {
        let conn = open_memory_database().unwrap();
        let client = Uuid::new_v4();
        let mut new = plain(client);
        new.expiration_date = Some(now().date() + Duration::days(15));
        new.review_date = Some(now().date() - Duration::days(1));
        seed(&conn, &new);

        let summary = run_expiration_sweep(&conn, now(), &EngineConfig::default()).unwrap();
        assert_eq!(summary, SweepSummary { created: 2, skipped: 0, failed: 0 });

        let alerts = alert::alerts_for_subject(&conn, &client, Audience::Clients).unwrap();
        assert_eq!(alerts.len(), 2);
        assert!(alerts.iter().all(|a| !a.read));
    }

    #[test]
    fn second_sweep_is_idempotent() {
        let conn = open_memory_database().unwrap();
        let mut new = plain(Uuid::new_v4());
        new.expiration_date = Some(now().date() + Duration::days(10));
        new.care_completion_date = Some(now().date() + Duration::days(20));
        seed(&conn, &new);

        let first = run_expiration_sweep(&conn, now(), &EngineConfig::default()).unwrap();
        assert_eq!(first.created, 2);

        let second = run_expiration_sweep(&conn, now(), &EngineConfig::default()).unwrap();
        assert_eq!(second, SweepSummary { created: 0, skipped: 2, failed: 0 });
    }

    #[test]
    fn review_due_next_day_creates_nothing_new() {
        let conn = open_memory_database().unwrap();
        let client = Uuid::new_v4();
        let mut new = plain(client);
        new.review_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        seed(&conn, &new);

        let day1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(6, 0, 0).unwrap();
        let day2 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(6, 0, 0).unwrap();

        assert_eq!(run_expiration_sweep(&conn, day1, &EngineConfig::default()).unwrap().created, 1);
        let second = run_expiration_sweep(&conn, day2, &EngineConfig::default()).unwrap();
        assert_eq!(second.created, 0);
        assert_eq!(second.skipped, 1);
    }

    #[test]
    fn changed_deadline_emits_a_fresh_alert_and_keeps_history() {
        let conn = open_memory_database().unwrap();
        let client = Uuid::new_v4();
        let mut new = plain(client);
        new.expiration_date = Some(now().date() + Duration::days(5));
        seed(&conn, &new);
        run_expiration_sweep(&conn, now(), &EngineConfig::default()).unwrap();

        // Admin moves the deadline inside a later window
        conn.execute(
            "UPDATE service_assignments SET expiration_date = ?1",
            params![(now().date() + Duration::days(25)).format("%Y-%m-%d").to_string()],
        )
        .unwrap();

        let summary = run_expiration_sweep(&conn, now(), &EngineConfig::default()).unwrap();
        assert_eq!(summary.created, 1);
        let alerts = alert::alerts_for_subject(&conn, &client, Audience::Clients).unwrap();
        assert_eq!(alerts.len(), 2, "old alert preserved as audit trail");
    }

    #[test]
    fn assignments_with_no_dates_produce_nothing() {
        let conn = open_memory_database().unwrap();
        seed(&conn, &plain(Uuid::new_v4()));

        let summary = run_expiration_sweep(&conn, now(), &EngineConfig::default()).unwrap();
        assert_eq!(summary, SweepSummary::default());
    }

    #[test]
    fn bad_record_does_not_abort_the_sweep() {
        let conn = open_memory_database().unwrap();
        conn.execute(
            "INSERT INTO service_assignments
             (id, client_id, client_name, review_date, created_at)
             VALUES (?1, ?2, 'Bad', 'not-a-date', '2024-03-01 06:00:00')",
            params![Uuid::new_v4().to_string(), Uuid::new_v4().to_string()],
        )
        .unwrap();
        let good = Uuid::new_v4();
        let mut new = plain(good);
        new.review_date = Some(now().date());
        seed(&conn, &new);

        let summary = run_expiration_sweep(&conn, now(), &EngineConfig::default()).unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.created, 1, "good assignment still processed");
    }
}
