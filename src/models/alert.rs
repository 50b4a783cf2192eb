use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Audience;

/// One notification instance. The tuple (subject_id, audience, message,
/// effective_date) is unique; the emitter relies on that to stay idempotent
/// across sweeps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    /// The client the alert concerns.
    pub subject_id: Uuid,
    pub audience: Audience,
    pub message: String,
    /// The deadline the alert is about.
    pub effective_date: NaiveDate,
    pub read: bool,
    pub created_at: NaiveDateTime,
}

/// Admin corrective edit. Absent fields are left untouched. This path edits
/// an existing record directly and does not go through deduplication.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertPatch {
    pub audience: Option<Audience>,
    pub message: Option<String>,
    pub effective_date: Option<NaiveDate>,
}
