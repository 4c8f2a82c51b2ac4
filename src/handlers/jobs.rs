use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::jobs::run_import_job;
use crate::models::*;
use crate::AppState;

/// POST /api/jobs/import-device-type: body is the raw YAML file
pub async fn import_device_type(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> (StatusCode, Json<JobResult>) {
    let result = run_import_job(&state.store, &body).await;

    let status = match result.status.as_str() {
        job_status::COMPLETED => StatusCode::OK,
        job_status::ABORTED => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(result))
}
