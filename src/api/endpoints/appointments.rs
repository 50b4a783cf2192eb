//! Appointment endpoints. Booking fires the confirmation stage
//! synchronously; the timed stages are the background driver's job.

use axum::extract::State;
use axum::Json;
use chrono::Local;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::db::repository::appointment;
use crate::engine::reminders::send_booking_confirmation;
use crate::models::{Appointment, NewAppointment};
use crate::state::AppState;

#[derive(Serialize)]
pub struct AppointmentResponse {
    pub appointment: Appointment,
    pub confirmation_sent: bool,
}

/// `POST /api/appointments` — book a session and send the confirmation.
pub async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewAppointment>,
) -> Result<Json<AppointmentResponse>, ApiError> {
    let conn = state.conn()?;
    let now = Local::now().naive_local();
    let booked = appointment::insert_appointment(&conn, &new, now)?;

    // The booking itself is committed either way; a failed confirmation is
    // logged and left for the operator, not surfaced as a booking error.
    let confirmation_sent =
        match send_booking_confirmation(&conn, state.dispatcher.as_ref(), &booked, now) {
            Ok(sent) => sent,
            Err(e) => {
                tracing::warn!(appointment_id = %booked.id, error = %e, "Booking confirmation failed");
                false
            }
        };

    Ok(Json(AppointmentResponse {
        appointment: booked,
        confirmation_sent,
    }))
}

#[derive(Serialize)]
pub struct AppointmentListResponse {
    pub appointments: Vec<Appointment>,
}

/// `GET /api/appointments` — upcoming, soonest first.
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<AppointmentListResponse>, ApiError> {
    let conn = state.conn()?;
    let appointments = appointment::upcoming_appointments(&conn, Local::now().naive_local())?;
    Ok(Json(AppointmentListResponse { appointments }))
}
