// handlers/hod/reports.rs - Report downloads for the department
//
// GET /api/hod/report/students?format=excel|pdf
// GET /api/hod/report/student/:id?format=excel|pdf
// GET /api/hod/report/subject/:id?format=excel|pdf
//
// Responses are file attachments, not JSON envelopes. Errors still use the
// JSON error body.

use axum::extract::{Path, Query, State};
use axum::response::Response;

use crate::error::ApiError;
use crate::handlers::{attachment, ReportQuery};
use crate::state::AppState;

pub async fn all_students(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ApiError> {
    let format = query.format()?;
    let report = state.reports().all_students(format).await?;
    Ok(attachment(report))
}

pub async fn student(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ApiError> {
    let format = query.format()?;
    let report = state.reports().student(id, format).await?;
    Ok(attachment(report))
}

pub async fn subject(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ApiError> {
    let format = query.format()?;
    let report = state.reports().subject(id, format).await?;
    Ok(attachment(report))
}
