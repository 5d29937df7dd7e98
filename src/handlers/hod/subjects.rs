// handlers/hod/subjects.rs - Subject management
//
// GET|POST /api/hod/subjects, GET|PUT|DELETE /api/hod/subjects/:id

use axum::extract::{Path, State};

use crate::database::models::{NewSubject, Subject, SubjectPatch};
use crate::database::repository::not_found;
use crate::middleware::{ApiResponse, ApiResult, JsonBody, Message};
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Subject>> {
    Ok(ApiResponse::success(state.subjects().list_all().await?))
}

/// POST /api/hod/subjects - `{ "subject_name": "string", "year": 2 }`
pub async fn create(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<NewSubject>,
) -> ApiResult<Subject> {
    Ok(ApiResponse::created(state.subjects().create(payload).await?))
}

pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Subject> {
    let subject = state.subjects().get_by_id(id).await?.ok_or_else(not_found::<Subject>)?;
    Ok(ApiResponse::success(subject))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(patch): JsonBody<SubjectPatch>,
) -> ApiResult<Subject> {
    let subject = state.subjects().update(id, patch).await?.ok_or_else(not_found::<Subject>)?;
    Ok(ApiResponse::success(subject))
}

/// DELETE /api/hod/subjects/:id - Drops the subject's marks; refused while a teacher owns it
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Message> {
    if !state.subjects().delete(id).await? {
        return Err(not_found::<Subject>().into());
    }
    Ok(ApiResponse::success(Message::new("Subject deleted")))
}
