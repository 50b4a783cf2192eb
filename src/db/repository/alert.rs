use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::Audience;
use crate::models::{Alert, AlertPatch};

const DATE_FMT: &str = "%Y-%m-%d";
const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

const ALERT_COLUMNS: &str = "id, subject_id, audience, message, effective_date, read, created_at";

fn read_alert(row: &Row<'_>) -> rusqlite::Result<(String, String, String, String, String, i32, String)> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn build_alert(
    (id, subject_id, audience, message, effective_date, read, created_at): (
        String,
        String,
        String,
        String,
        String,
        i32,
        String,
    ),
) -> Result<Alert, DatabaseError> {
    Ok(Alert {
        id: Uuid::parse_str(&id).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        subject_id: Uuid::parse_str(&subject_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        audience: Audience::from_str(&audience)?,
        message,
        effective_date: NaiveDate::parse_from_str(&effective_date, DATE_FMT)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        read: read != 0,
        created_at: NaiveDateTime::parse_from_str(&created_at, DATETIME_FMT).unwrap_or_default(),
    })
}

/// Atomic insert-if-absent on the condition key (subject, audience, message,
/// effective date). Returns `true` if a new alert row was created, `false`
/// if one already existed — a racing duplicate collapses to the same `false`
/// through the unique index.
pub fn insert_alert_if_absent(
    conn: &Connection,
    subject_id: &Uuid,
    audience: Audience,
    message: &str,
    effective_date: NaiveDate,
    now: NaiveDateTime,
) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO alerts (id, subject_id, audience, message, effective_date, read, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
        params![
            Uuid::new_v4().to_string(),
            subject_id.to_string(),
            audience.as_str(),
            message,
            effective_date.format(DATE_FMT).to_string(),
            now.format(DATETIME_FMT).to_string(),
        ],
    )?;
    Ok(changed > 0)
}

/// All alerts for one subject and audience, newest first.
pub fn alerts_for_subject(
    conn: &Connection,
    subject_id: &Uuid,
    audience: Audience,
) -> Result<Vec<Alert>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ALERT_COLUMNS} FROM alerts
         WHERE subject_id = ?1 AND audience = ?2
         ORDER BY created_at DESC, rowid DESC"
    ))?;
    let rows = stmt.query_map(params![subject_id.to_string(), audience.as_str()], read_alert)?;

    let mut alerts = Vec::new();
    for row in rows {
        alerts.push(build_alert(row?)?);
    }
    Ok(alerts)
}

/// Paginated admin listing across all subjects and audiences, newest first.
/// Returns the page plus the total row count.
pub fn list_alerts(
    conn: &Connection,
    page: u32,
    limit: u32,
) -> Result<(Vec<Alert>, i64), DatabaseError> {
    let total: i64 = conn.query_row("SELECT COUNT(*) FROM alerts", [], |row| row.get(0))?;

    let offset = (page.saturating_sub(1)) as i64 * limit as i64;
    let mut stmt = conn.prepare(&format!(
        "SELECT {ALERT_COLUMNS} FROM alerts
         ORDER BY created_at DESC, rowid DESC
         LIMIT ?1 OFFSET ?2"
    ))?;
    let rows = stmt.query_map(params![limit as i64, offset], read_alert)?;

    let mut alerts = Vec::new();
    for row in rows {
        alerts.push(build_alert(row?)?);
    }
    Ok((alerts, total))
}

pub fn get_alert(conn: &Connection, id: &Uuid) -> Result<Alert, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {ALERT_COLUMNS} FROM alerts WHERE id = ?1"),
            params![id.to_string()],
            read_alert,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => DatabaseError::not_found("alert", id),
            other => DatabaseError::Sqlite(other),
        })?;
    build_alert(row)
}

/// Flip read status to true. Audience-agnostic at the storage level — the
/// audience scoping lives in which listing surfaced the id to the caller.
pub fn mark_alert_read(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE alerts SET read = 1 WHERE id = ?1",
        params![id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::not_found("alert", id));
    }
    Ok(())
}

/// Admin corrective edit of an existing alert. Bypasses dedup; a patch that
/// lands on another alert's condition key surfaces as a duplicate-key
/// conflict.
pub fn update_alert(conn: &Connection, id: &Uuid, patch: &AlertPatch) -> Result<Alert, DatabaseError> {
    let current = get_alert(conn, id)?;

    let audience = patch.audience.unwrap_or(current.audience);
    let message = patch.message.as_deref().unwrap_or(&current.message);
    let effective_date = patch.effective_date.unwrap_or(current.effective_date);

    conn.execute(
        "UPDATE alerts SET audience = ?1, message = ?2, effective_date = ?3 WHERE id = ?4",
        params![
            audience.as_str(),
            message,
            effective_date.format(DATE_FMT).to_string(),
            id.to_string(),
        ],
    )?;

    get_alert(conn, id)
}
