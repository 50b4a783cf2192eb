//! External trigger surface for the engine: run a sweep or a reminder pass
//! on demand and get the summary counters back. The same pipelines the
//! background driver runs on its interval.

use axum::extract::State;
use axum::Json;
use chrono::Local;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::engine::reminders::dispatch_due_reminders;
use crate::engine::sweep::run_expiration_sweep;
use crate::engine::{DispatchSummary, SweepSummary};
use crate::state::AppState;

#[derive(Serialize)]
pub struct SweepResponse {
    pub summary: SweepSummary,
}

/// `POST /api/engine/sweep`
pub async fn sweep(State(state): State<AppState>) -> Result<Json<SweepResponse>, ApiError> {
    let conn = state.conn()?;
    let summary = run_expiration_sweep(&conn, Local::now().naive_local(), &state.config)?;
    Ok(Json(SweepResponse { summary }))
}

#[derive(Serialize)]
pub struct RemindersResponse {
    pub summary: DispatchSummary,
}

/// `POST /api/engine/reminders`
pub async fn reminders(
    State(state): State<AppState>,
) -> Result<Json<RemindersResponse>, ApiError> {
    let conn = state.conn()?;
    let summary =
        dispatch_due_reminders(&conn, state.dispatcher.as_ref(), Local::now().naive_local())?;
    Ok(Json(RemindersResponse { summary }))
}
