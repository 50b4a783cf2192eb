use std::str::FromStr;

use chrono::{Duration, NaiveDateTime};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::{AppointmentStatus, ReminderStage};
use crate::models::{Appointment, NewAppointment};

const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// How far past the scheduled instant an appointment still counts as due for
/// its start-of-session reminder. Anything older is stale and left alone.
const START_GRACE_HOURS: i64 = 1;

type AppointmentRow = (
    String,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    String,
    String,
    i32,
    String,
);

fn read_appointment(row: &Row<'_>) -> rusqlite::Result<AppointmentRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
        row.get(10)?,
    ))
}

fn build_appointment(row: AppointmentRow) -> Result<Appointment, DatabaseError> {
    let (
        id,
        client_id,
        client_name,
        client_contact,
        therapist_id,
        therapist_name,
        therapist_contact,
        scheduled_at,
        status,
        video,
        created_at,
    ) = row;
    let parse_uuid = |s: &str| {
        Uuid::parse_str(s).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
    };
    Ok(Appointment {
        id: parse_uuid(&id)?,
        client_id: parse_uuid(&client_id)?,
        client_name,
        client_contact,
        therapist_id: therapist_id.as_deref().map(parse_uuid).transpose()?,
        therapist_name,
        therapist_contact,
        scheduled_at: NaiveDateTime::parse_from_str(&scheduled_at, DATETIME_FMT)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        status: AppointmentStatus::from_str(&status)?,
        video: video != 0,
        created_at: NaiveDateTime::parse_from_str(&created_at, DATETIME_FMT).unwrap_or_default(),
    })
}

const APPOINTMENT_COLUMNS: &str = "id, client_id, client_name, client_contact, therapist_id, \
     therapist_name, therapist_contact, scheduled_at, status, video, created_at";

pub fn insert_appointment(
    conn: &Connection,
    new: &NewAppointment,
    now: NaiveDateTime,
) -> Result<Appointment, DatabaseError> {
    let id = Uuid::new_v4();
    conn.execute(
        &format!(
            "INSERT INTO appointments ({APPOINTMENT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
        ),
        params![
            id.to_string(),
            new.client_id.to_string(),
            new.client_name,
            new.client_contact,
            new.therapist_id.map(|t| t.to_string()),
            new.therapist_name,
            new.therapist_contact,
            new.scheduled_at.format(DATETIME_FMT).to_string(),
            AppointmentStatus::Pending.as_str(),
            new.video as i32,
            now.format(DATETIME_FMT).to_string(),
        ],
    )?;
    get_appointment(conn, &id)
}

pub fn get_appointment(conn: &Connection, id: &Uuid) -> Result<Appointment, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1"),
            params![id.to_string()],
            read_appointment,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => DatabaseError::not_found("appointment", id),
            other => DatabaseError::Sqlite(other),
        })?;
    build_appointment(row)
}

/// Upcoming, non-cancelled appointments, soonest first.
pub fn upcoming_appointments(
    conn: &Connection,
    from: NaiveDateTime,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE scheduled_at >= ?1 AND status != 'cancelled'
         ORDER BY scheduled_at ASC"
    ))?;
    let rows = stmt.query_map(params![from.format(DATETIME_FMT).to_string()], read_appointment)?;

    let mut appointments = Vec::new();
    for row in rows {
        appointments.push(build_appointment(row?)?);
    }
    Ok(appointments)
}

/// Appointments that may have a due reminder stage: non-cancelled, scheduled
/// within the next 24 hours or started within the last grace hour. Which
/// stages are actually unfired is decided against the reminder log.
pub fn due_appointments(
    conn: &Connection,
    now: NaiveDateTime,
) -> Result<Vec<Appointment>, DatabaseError> {
    let upper = now + Duration::hours(24);
    let lower = now - Duration::hours(START_GRACE_HOURS);
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE scheduled_at <= ?1 AND scheduled_at >= ?2 AND status != 'cancelled'
         ORDER BY scheduled_at ASC"
    ))?;
    let rows = stmt.query_map(
        params![
            upper.format(DATETIME_FMT).to_string(),
            lower.format(DATETIME_FMT).to_string(),
        ],
        read_appointment,
    )?;

    let mut appointments = Vec::new();
    for row in rows {
        appointments.push(build_appointment(row?)?);
    }
    Ok(appointments)
}

/// Atomically claim a (appointment, stage) reminder slot. Returns `true`
/// when this caller won the claim; `false` means the stage already fired.
pub fn claim_reminder(
    conn: &Connection,
    appointment_id: &Uuid,
    stage: ReminderStage,
    now: NaiveDateTime,
) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO reminder_log (appointment_id, stage, sent_at)
         VALUES (?1, ?2, ?3)",
        params![
            appointment_id.to_string(),
            stage.as_str(),
            now.format(DATETIME_FMT).to_string(),
        ],
    )?;
    Ok(changed > 0)
}

/// Release a claim after a failed dispatch so the next driver pass retries.
pub fn release_reminder(
    conn: &Connection,
    appointment_id: &Uuid,
    stage: ReminderStage,
) -> Result<(), DatabaseError> {
    conn.execute(
        "DELETE FROM reminder_log WHERE appointment_id = ?1 AND stage = ?2",
        params![appointment_id.to_string(), stage.as_str()],
    )?;
    Ok(())
}

/// Stages already sent for one appointment.
pub fn sent_stages(
    conn: &Connection,
    appointment_id: &Uuid,
) -> Result<Vec<ReminderStage>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT stage FROM reminder_log WHERE appointment_id = ?1")?;
    let rows = stmt.query_map(params![appointment_id.to_string()], |row| {
        row.get::<_, String>(0)
    })?;

    let mut stages = Vec::new();
    for row in rows {
        stages.push(ReminderStage::from_str(&row?)?);
    }
    Ok(stages)
}
