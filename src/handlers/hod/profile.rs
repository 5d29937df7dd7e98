// handlers/hod/profile.rs - GET /api/hod/me

use axum::extract::{Extension, State};

use crate::database::models::Hod;
use crate::database::repository::not_found;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// GET /api/hod/me - The HOD behind the current session
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Hod> {
    let hod = state
        .hods()
        .get_by_id(auth.user_id)
        .await?
        .ok_or_else(not_found::<Hod>)?;
    Ok(ApiResponse::success(hod))
}
