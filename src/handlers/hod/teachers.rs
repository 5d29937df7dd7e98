// handlers/hod/teachers.rs - Teacher management
//
// GET|POST /api/hod/teachers, GET|PUT|DELETE /api/hod/teachers/:id

use axum::extract::{Path, State};

use crate::auth::Role;
use crate::database::models::{NewTeacher, Teacher, TeacherPatch, TeacherProfile};
use crate::database::repository::not_found;
use crate::middleware::{ApiResponse, ApiResult, JsonBody, Message};
use crate::state::AppState;

/// GET /api/hod/teachers - Every teacher with their subject inlined
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<TeacherProfile>> {
    Ok(ApiResponse::success(state.teachers().list_profiles().await?))
}

/**
 * POST /api/hod/teachers - Create a teacher bound to one subject
 *
 * Expected Input:
 * ```json
 * {
 *   "name": "string",
 *   "email": "string",
 *   "phone": "string",
 *   "password": "string",
 *   "subject_id": 1
 * }
 * ```
 *
 * Expected Output: 201 with the teacher and `subject` object.
 * Unknown `subject_id` → 404 "Subject not found".
 */
pub async fn create(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<NewTeacher>,
) -> ApiResult<TeacherProfile> {
    let teachers = state.teachers();
    let teacher = teachers.create(payload).await?;
    Ok(ApiResponse::created(teachers.profile(teacher).await?))
}

pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<TeacherProfile> {
    let teachers = state.teachers();
    let teacher = teachers.get_by_id(id).await?.ok_or_else(not_found::<Teacher>)?;
    Ok(ApiResponse::success(teachers.profile(teacher).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(patch): JsonBody<TeacherPatch>,
) -> ApiResult<TeacherProfile> {
    let teachers = state.teachers();
    let teacher = teachers.update(id, patch).await?.ok_or_else(not_found::<Teacher>)?;
    Ok(ApiResponse::success(teachers.profile(teacher).await?))
}

/// DELETE /api/hod/teachers/:id - Also ends the teacher's session
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Message> {
    if !state.teachers().delete(id).await? {
        return Err(not_found::<Teacher>().into());
    }
    state.sessions.revoke_user(Role::Teacher, id).await;
    Ok(ApiResponse::success(Message::new("Teacher deleted")))
}
