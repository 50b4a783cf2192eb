use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A client's enrollment in a care program. Written by administrative CRUD;
/// read-only to the alert engine. Every date field is a calendar date —
/// time-of-day plays no part in the window math.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceAssignment {
    pub id: Uuid,
    pub client_id: Uuid,
    pub client_name: String,
    pub expiration_date: Option<NaiveDate>,
    pub care_completion_date: Option<NaiveDate>,
    pub personal_care_plan_date: Option<NaiveDate>,
    pub review_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
}

/// Payload for the admin create/replace path.
#[derive(Debug, Clone, Deserialize)]
pub struct NewServiceAssignment {
    pub client_id: Uuid,
    pub client_name: String,
    pub expiration_date: Option<NaiveDate>,
    pub care_completion_date: Option<NaiveDate>,
    pub personal_care_plan_date: Option<NaiveDate>,
    pub review_date: Option<NaiveDate>,
}
