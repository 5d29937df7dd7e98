// handlers/teacher/profile.rs - GET /api/teacher/me, /subject, /students

use axum::extract::{Extension, State};

use crate::database::models::{Student, Subject, Teacher, TeacherProfile};
use crate::database::repository::not_found;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

use super::own_subject;

pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<TeacherProfile> {
    let teachers = state.teachers();
    let teacher = teachers
        .get_by_id(auth.user_id)
        .await?
        .ok_or_else(not_found::<Teacher>)?;
    Ok(ApiResponse::success(teachers.profile(teacher).await?))
}

pub async fn subject(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Subject> {
    Ok(ApiResponse::success(own_subject(&state, &auth).await?))
}

/// GET /api/teacher/students - All students; marks can only be entered for
/// those whose current year matches the teacher's subject.
pub async fn students(State(state): State<AppState>) -> ApiResult<Vec<Student>> {
    Ok(ApiResponse::success(state.students().list_all().await?))
}
