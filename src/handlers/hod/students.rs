// handlers/hod/students.rs - Student management and the marks overview
//
// GET|POST /api/hod/students, GET|PUT|DELETE /api/hod/students/:id,
// GET /api/hod/students/:id/marks

use axum::extract::{Path, State};

use crate::database::models::{NewStudent, Student, StudentPatch, SubjectMarks};
use crate::database::repository::not_found;
use crate::middleware::{ApiResponse, ApiResult, JsonBody, Message};
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Student>> {
    Ok(ApiResponse::success(state.students().list_all().await?))
}

/**
 * POST /api/hod/students - Enrol a student
 *
 * Expected Input:
 * ```json
 * {
 *   "name": "string",
 *   "email": "string",
 *   "phone": "string",
 *   "dob": "YYYY-MM-DD",
 *   "gender": "string",
 *   "address": "string",
 *   "admission_year": 2023,
 *   "current_year": 2
 * }
 * ```
 */
pub async fn create(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<NewStudent>,
) -> ApiResult<Student> {
    Ok(ApiResponse::created(state.students().create(payload).await?))
}

pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Student> {
    let student = state.students().get_by_id(id).await?.ok_or_else(not_found::<Student>)?;
    Ok(ApiResponse::success(student))
}

/// PUT /api/hod/students/:id - Partial update; promoting `current_year`
/// locks further mark changes for subjects of the old year.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(patch): JsonBody<StudentPatch>,
) -> ApiResult<Student> {
    let student = state.students().update(id, patch).await?.ok_or_else(not_found::<Student>)?;
    Ok(ApiResponse::success(student))
}

/// DELETE /api/hod/students/:id - Removes the student and all of their marks
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Message> {
    if !state.students().delete(id).await? {
        return Err(not_found::<Student>().into());
    }
    Ok(ApiResponse::success(Message::new("Student deleted")))
}

/// GET /api/hod/students/:id/marks - Every category, grouped per subject, with totals
pub async fn marks(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<SubjectMarks>> {
    Ok(ApiResponse::success(state.marks().student_marks(id).await?))
}
