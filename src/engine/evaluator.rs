//! Time-window evaluator — pure condition detection over a service
//! assignment's dated fields.
//!
//! No storage access here: given a reference `today` and the configured lead
//! time, report which conditions are currently active. Deduplication against
//! previously emitted alerts is the emitter's job.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::config::EngineConfig;
use crate::models::ServiceAssignment;

/// The closed vocabulary of time-based conditions. The rendered message is
/// the externally visible identity of an alert and feeds the dedup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    AgreementExpiration,
    CarePlanCompletion,
    PersonalCarePlanCompletion,
    ReviewDue,
}

impl ConditionKind {
    pub fn message(&self) -> &'static str {
        match self {
            Self::AgreementExpiration => "This client's service agreement is about to expire",
            Self::CarePlanCompletion => "This client's care plan is about to expire",
            Self::PersonalCarePlanCompletion => "This client's personal care plan is about to expire",
            Self::ReviewDue => "This client's service agreement needs to be reviewed",
        }
    }
}

/// A detected trigger: condition kind plus the deadline it is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConditionEvent {
    pub kind: ConditionKind,
    pub effective_date: NaiveDate,
}

/// Evaluate all conditions for one assignment. Rules are independent and
/// non-exclusive; one assignment can report several events per sweep.
pub fn evaluate_assignment(
    assignment: &ServiceAssignment,
    today: NaiveDate,
    config: &EngineConfig,
) -> Vec<ConditionEvent> {
    let mut events = Vec::new();

    let pending = [
        (ConditionKind::AgreementExpiration, assignment.expiration_date),
        (ConditionKind::CarePlanCompletion, assignment.care_completion_date),
        (
            ConditionKind::PersonalCarePlanCompletion,
            assignment.personal_care_plan_date,
        ),
    ];
    for (kind, deadline) in pending {
        if let Some(deadline) = deadline {
            if in_lead_window(today, deadline, config.lead_time_days) {
                events.push(ConditionEvent { kind, effective_date: deadline });
            }
        }
    }

    // Review has no upper bound: it stays active every sweep until the
    // underlying record changes. Dedup keeps it to one alert per date.
    if let Some(review_date) = assignment.review_date {
        if today >= review_date {
            events.push(ConditionEvent {
                kind: ConditionKind::ReviewDue,
                effective_date: review_date,
            });
        }
    }

    events
}

/// Day-granularity check: `today ∈ [deadline − lead_days, deadline]`,
/// inclusive on both ends.
fn in_lead_window(today: NaiveDate, deadline: NaiveDate, lead_days: i64) -> bool {
    let window_start = deadline - Duration::days(lead_days);
    today >= window_start && today <= deadline
}
