// handlers/teacher/mod.rs - Teacher handlers (teacher session required)
//
// Route Prefix: /api/teacher
// Middleware: require_teacher (injects AuthUser)
//
// Every mark operation is scoped to the one subject the teacher owns.
pub mod marks;
pub mod profile;
pub mod reports;

use crate::database::models::Subject;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

/// The subject owned by the authenticated teacher
pub(crate) async fn own_subject(state: &AppState, auth: &AuthUser) -> Result<Subject, ApiError> {
    Ok(state.teachers().subject_of(auth.user_id).await?)
}
