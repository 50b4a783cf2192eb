//! Admin service-assignment endpoints — the CRUD surface that feeds the
//! alert engine. The engine itself only ever reads these records.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Local;
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::db::repository::assignment;
use crate::models::{NewServiceAssignment, ServiceAssignment};
use crate::state::AppState;

#[derive(Serialize)]
pub struct AssignmentResponse {
    pub assignment: ServiceAssignment,
}

/// `POST /api/admin/service-assignments`
pub async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewServiceAssignment>,
) -> Result<Json<AssignmentResponse>, ApiError> {
    let conn = state.conn()?;
    let assignment = assignment::insert_assignment(&conn, &new, Local::now().naive_local())?;
    Ok(Json(AssignmentResponse { assignment }))
}

#[derive(Serialize)]
pub struct AssignmentListResponse {
    pub assignments: Vec<ServiceAssignment>,
}

/// `GET /api/admin/service-assignments/:client_id`
pub async fn for_client(
    State(state): State<AppState>,
    Path(client_id): Path<Uuid>,
) -> Result<Json<AssignmentListResponse>, ApiError> {
    let conn = state.conn()?;
    let assignments = assignment::assignments_for_client(&conn, &client_id)?;
    Ok(Json(AssignmentListResponse { assignments }))
}
