// handlers/teacher/reports.rs - GET /api/teacher/report/subject?format=excel|pdf

use axum::extract::{Extension, Query, State};
use axum::response::Response;

use crate::error::ApiError;
use crate::handlers::{attachment, ReportQuery};
use crate::middleware::AuthUser;
use crate::state::AppState;

use super::own_subject;

/// Cohort report for the teacher's own subject
pub async fn subject(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, ApiError> {
    let format = query.format()?;
    let subject = own_subject(&state, &auth).await?;
    let report = state.reports().subject(subject.subject_id, format).await?;
    Ok(attachment(report))
}
