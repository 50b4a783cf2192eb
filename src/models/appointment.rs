use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::AppointmentStatus;

/// A scheduled session. The reminder scheduler only reads the scheduling
/// fields; appointment state itself is owned by the booking subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub client_id: Uuid,
    pub client_name: String,
    /// Contact channel handle for the client (email address).
    pub client_contact: String,
    pub therapist_id: Option<Uuid>,
    pub therapist_name: Option<String>,
    pub therapist_contact: Option<String>,
    pub scheduled_at: NaiveDateTime,
    pub status: AppointmentStatus,
    pub video: bool,
    pub created_at: NaiveDateTime,
}

impl Appointment {
    /// "January 5, 2024 at 2:30 PM" — the formatted date/time handed to the
    /// notification channel as a payload field.
    pub fn formatted_schedule(&self) -> String {
        let time = self.scheduled_at.time();
        format!(
            "{} at {}",
            self.scheduled_at.format("%B %-d, %Y"),
            non_military_time(time)
        )
    }
}

fn non_military_time(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

/// Payload for the booking endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAppointment {
    pub client_id: Uuid,
    pub client_name: String,
    pub client_contact: String,
    pub therapist_id: Option<Uuid>,
    pub therapist_name: Option<String>,
    pub therapist_contact: Option<String>,
    pub scheduled_at: NaiveDateTime,
    #[serde(default)]
    pub video: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn schedule_formats_in_non_military_time() {
        let appt = Appointment {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            client_name: "Ada".into(),
            client_contact: "ada@example.com".into(),
            therapist_id: None,
            therapist_name: None,
            therapist_contact: None,
            scheduled_at: NaiveDate::from_ymd_opt(2024, 1, 5)
                .unwrap()
                .and_hms_opt(14, 30, 0)
                .unwrap(),
            status: AppointmentStatus::Pending,
            video: false,
            created_at: NaiveDateTime::default(),
        };
        assert_eq!(appt.formatted_schedule(), "January 5, 2024 at 2:30 PM");
    }
}
