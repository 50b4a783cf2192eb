//! Appointment reminder scheduler.
//!
//! Stages are not persisted as appointment state; they are computed at
//! dispatch time from `now` relative to the scheduled instant. The durable
//! `reminder_log` claim is what makes repeated driver passes at-most-once
//! per (appointment, stage). A claim is taken before dispatch and released
//! on failure so the stage retries on the next pass.

use chrono::{Duration, NaiveDateTime};
use rusqlite::Connection;
use serde::Serialize;
use thiserror::Error;

use crate::db::repository::appointment as appointment_repo;
use crate::db::DatabaseError;
use crate::models::enums::ReminderStage;
use crate::models::Appointment;

#[derive(Error, Debug)]
#[error("Notification channel unavailable: {0}")]
pub struct DispatchError(pub String);

/// Structured fields handed to the notification channel. The engine never
/// formats the transport message body, it only selects the stage template.
#[derive(Debug, Clone, Serialize)]
pub struct ReminderPayload {
    pub client_name: String,
    pub date_time: String,
    pub therapist_name: Option<String>,
    pub video: bool,
}

/// Outbound notification channel. The production implementation hands off to
/// the mail service; tests record calls.
pub trait ReminderDispatcher: Send + Sync {
    fn send(
        &self,
        contact: &str,
        stage: ReminderStage,
        payload: &ReminderPayload,
    ) -> Result<(), DispatchError>;
}

/// Dispatcher that logs the handoff. Stands in for the transport collaborator
/// when no mail channel is wired up.
pub struct LogDispatcher;

impl ReminderDispatcher for LogDispatcher {
    fn send(
        &self,
        contact: &str,
        stage: ReminderStage,
        payload: &ReminderPayload,
    ) -> Result<(), DispatchError> {
        tracing::info!(
            contact,
            stage = stage.as_str(),
            client = %payload.client_name,
            when = %payload.date_time,
            "Reminder dispatched"
        );
        Ok(())
    }
}

/// Counters for one reminder pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    pub sent: u32,
    /// Stages whose claim was already taken by an earlier pass.
    pub skipped: u32,
    /// Dispatch failures; the claim was released for retry.
    pub failed: u32,
}

/// Timed stages currently due for an appointment. The booking-confirmation
/// stage is excluded: it fires synchronously at creation, never from the
/// driver.
pub fn due_stages(appointment: &Appointment, now: NaiveDateTime) -> Vec<ReminderStage> {
    let scheduled = appointment.scheduled_at;
    let mut stages = Vec::new();

    if now < scheduled {
        let until_start = scheduled - now;
        if until_start <= Duration::hours(24) {
            stages.push(ReminderStage::Before24Hrs);
        }
        if until_start <= Duration::hours(1) {
            stages.push(ReminderStage::Before1Hr);
        }
    } else {
        stages.push(ReminderStage::OnStart);
    }

    stages
}

/// One reminder pass over all due appointments. Per-stage failures are
/// isolated and counted, never escalated.
pub fn dispatch_due_reminders(
    conn: &Connection,
    dispatcher: &dyn ReminderDispatcher,
    now: NaiveDateTime,
) -> Result<DispatchSummary, DatabaseError> {
    let appointments = appointment_repo::due_appointments(conn, now)?;
    let mut summary = DispatchSummary::default();

    for appointment in &appointments {
        for stage in due_stages(appointment, now) {
            match dispatch_stage(conn, dispatcher, appointment, stage, now) {
                Ok(true) => summary.sent += 1,
                Ok(false) => summary.skipped += 1,
                Err(e) => {
                    tracing::warn!(
                        appointment_id = %appointment.id,
                        stage = stage.as_str(),
                        error = %e,
                        "Reminder dispatch failed, released for retry"
                    );
                    summary.failed += 1;
                }
            }
        }
    }

    tracing::info!(
        sent = summary.sent,
        skipped = summary.skipped,
        failed = summary.failed,
        "Reminder pass complete"
    );
    Ok(summary)
}

/// The synchronous on-booking stage, invoked by the booking path right after
/// the appointment is created. Goes through the same claim so a double
/// submit cannot double-send the confirmation.
pub fn send_booking_confirmation(
    conn: &Connection,
    dispatcher: &dyn ReminderDispatcher,
    appointment: &Appointment,
    now: NaiveDateTime,
) -> Result<bool, ReminderError> {
    dispatch_stage(conn, dispatcher, appointment, ReminderStage::OnBooking, now)
}

/// Claim-then-send as one unit per (appointment, stage). Returns Ok(true)
/// when sent, Ok(false) when the stage had already fired.
fn dispatch_stage(
    conn: &Connection,
    dispatcher: &dyn ReminderDispatcher,
    appointment: &Appointment,
    stage: ReminderStage,
    now: NaiveDateTime,
) -> Result<bool, ReminderError> {
    if !appointment_repo::claim_reminder(conn, &appointment.id, stage, now)? {
        return Ok(false);
    }

    let payload = ReminderPayload {
        client_name: appointment.client_name.clone(),
        date_time: appointment.formatted_schedule(),
        therapist_name: appointment.therapist_name.clone(),
        video: appointment.video,
    };

    if let Err(e) = dispatcher.send(&appointment.client_contact, stage, &payload) {
        appointment_repo::release_reminder(conn, &appointment.id, stage)?;
        return Err(ReminderError::Dispatch(e));
    }

    // Therapist copy is best-effort: the client send already satisfied the
    // stage, so a failed copy is logged without releasing the claim.
    if let Some(contact) = &appointment.therapist_contact {
        if let Err(e) = dispatcher.send(contact, stage, &payload) {
            tracing::warn!(
                appointment_id = %appointment.id,
                stage = stage.as_str(),
                error = %e,
                "Therapist copy failed"
            );
        }
    }

    Ok(true)
}

#[derive(Error, Debug)]
pub enum ReminderError {
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
