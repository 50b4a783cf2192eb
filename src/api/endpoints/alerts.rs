//! Alert endpoints.
//!
//! Three surfaces over the same alert collection: the admin listing/edit
//! path and the two audience-scoped read surfaces. Clinician and client
//! routes share one parameterized handler pair — the audience is an
//! argument, not a second code path.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::db::repository::alert;
use crate::models::enums::Audience;
use crate::models::{Alert, AlertPatch};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

#[derive(Serialize)]
pub struct AlertListResponse {
    pub alerts: Vec<Alert>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
}

/// `GET /api/admin/alerts` — paginated listing across all subjects.
pub async fn admin_list(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<AlertListResponse>, ApiError> {
    let conn = state.conn()?;
    let (alerts, total) = alert::list_alerts(&conn, pagination.page, pagination.limit)?;
    Ok(Json(AlertListResponse {
        alerts,
        page: pagination.page,
        limit: pagination.limit,
        total,
    }))
}

#[derive(Serialize)]
pub struct AlertResponse {
    pub alert: Alert,
}

/// `PUT /api/admin/alerts/:id` — corrective edit, bypasses dedup.
pub async fn admin_update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<AlertPatch>,
) -> Result<Json<AlertResponse>, ApiError> {
    let conn = state.conn()?;
    let alert = alert::update_alert(&conn, &id, &patch)?;
    Ok(Json(AlertResponse { alert }))
}

#[derive(Serialize)]
pub struct SubjectAlertsResponse {
    pub alerts: Vec<Alert>,
}

async fn audience_alerts(
    state: AppState,
    subject_id: Uuid,
    audience: Audience,
) -> Result<Json<SubjectAlertsResponse>, ApiError> {
    let conn = state.conn()?;
    let alerts = alert::alerts_for_subject(&conn, &subject_id, audience)?;
    Ok(Json(SubjectAlertsResponse { alerts }))
}

/// `GET /api/clinician/alerts/:subject_id`
pub async fn clinician_list(
    State(state): State<AppState>,
    Path(subject_id): Path<Uuid>,
) -> Result<Json<SubjectAlertsResponse>, ApiError> {
    audience_alerts(state, subject_id, Audience::Clinicians).await
}

/// `GET /api/client/alerts/:subject_id`
pub async fn client_list(
    State(state): State<AppState>,
    Path(subject_id): Path<Uuid>,
) -> Result<Json<SubjectAlertsResponse>, ApiError> {
    audience_alerts(state, subject_id, Audience::Clients).await
}

#[derive(Serialize)]
pub struct MarkReadResponse {
    pub updated: bool,
}

/// `PUT /api/clinician/alerts/:id/read` and `PUT /api/client/alerts/:id/read`.
/// Audience-agnostic at the storage level; the audience scoping is which
/// listing surfaced the id to the caller.
pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MarkReadResponse>, ApiError> {
    let conn = state.conn()?;
    alert::mark_alert_read(&conn, &id)?;
    Ok(Json(MarkReadResponse { updated: true }))
}
