use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{NewServiceAssignment, ServiceAssignment};

const DATE_FMT: &str = "%Y-%m-%d";
const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";

type AssignmentRow = (
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    String,
);

fn read_assignment(row: &Row<'_>) -> rusqlite::Result<AssignmentRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn parse_date(field: &str, value: Option<String>) -> Result<Option<NaiveDate>, DatabaseError> {
    match value {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, DATE_FMT)
            .map(Some)
            .map_err(|_| DatabaseError::ConstraintViolation(format!("Invalid {field}: {s}"))),
    }
}

fn build_assignment(row: AssignmentRow) -> Result<ServiceAssignment, DatabaseError> {
    let (id, client_id, client_name, expiration, care, pcp, review, created_at) = row;
    Ok(ServiceAssignment {
        id: Uuid::parse_str(&id).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        client_id: Uuid::parse_str(&client_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        client_name,
        expiration_date: parse_date("expiration_date", expiration)?,
        care_completion_date: parse_date("care_completion_date", care)?,
        personal_care_plan_date: parse_date("personal_care_plan_date", pcp)?,
        review_date: parse_date("review_date", review)?,
        created_at: NaiveDateTime::parse_from_str(&created_at, DATETIME_FMT).unwrap_or_default(),
    })
}

pub fn insert_assignment(
    conn: &Connection,
    new: &NewServiceAssignment,
    now: NaiveDateTime,
) -> Result<ServiceAssignment, DatabaseError> {
    let id = Uuid::new_v4();
    let fmt = |d: Option<NaiveDate>| d.map(|d| d.format(DATE_FMT).to_string());
    conn.execute(
        "INSERT INTO service_assignments
         (id, client_id, client_name, expiration_date, care_completion_date,
          personal_care_plan_date, review_date, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            id.to_string(),
            new.client_id.to_string(),
            new.client_name,
            fmt(new.expiration_date),
            fmt(new.care_completion_date),
            fmt(new.personal_care_plan_date),
            fmt(new.review_date),
            now.format(DATETIME_FMT).to_string(),
        ],
    )?;
    get_assignment(conn, &id)
}

pub fn get_assignment(conn: &Connection, id: &Uuid) -> Result<ServiceAssignment, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, client_id, client_name, expiration_date, care_completion_date,
                    personal_care_plan_date, review_date, created_at
             FROM service_assignments WHERE id = ?1",
            params![id.to_string()],
            read_assignment,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => DatabaseError::not_found("service_assignment", id),
            other => DatabaseError::Sqlite(other),
        })?;
    build_assignment(row)
}

/// Assignments for one client, newest first.
pub fn assignments_for_client(
    conn: &Connection,
    client_id: &Uuid,
) -> Result<Vec<ServiceAssignment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, client_id, client_name, expiration_date, care_completion_date,
                personal_care_plan_date, review_date, created_at
         FROM service_assignments WHERE client_id = ?1
         ORDER BY created_at DESC, rowid DESC",
    )?;
    let rows = stmt.query_map(params![client_id.to_string()], read_assignment)?;

    let mut assignments = Vec::new();
    for row in rows {
        assignments.push(build_assignment(row?)?);
    }
    Ok(assignments)
}

/// Full scan for the sweep. A row with a malformed date is returned as an
/// error entry so the sweep can count it as failed without losing the rest.
pub fn list_all_assignments(
    conn: &Connection,
) -> Result<Vec<Result<ServiceAssignment, DatabaseError>>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, client_id, client_name, expiration_date, care_completion_date,
                personal_care_plan_date, review_date, created_at
         FROM service_assignments",
    )?;
    let rows = stmt.query_map([], read_assignment)?;

    let mut assignments = Vec::new();
    for row in rows {
        assignments.push(build_assignment(row?));
    }
    Ok(assignments)
}
