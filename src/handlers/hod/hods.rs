// handlers/hod/hods.rs - HOD account management
//
// GET|POST /api/hod/hods, GET|PUT|DELETE /api/hod/hods/:id

use axum::extract::{Extension, Path, State};

use crate::auth::Role;
use crate::database::models::{Hod, HodPatch, NewHod};
use crate::database::repository::not_found;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody, Message};
use crate::state::AppState;

/// GET /api/hod/hods - All HOD accounts (password hashes are never serialized)
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Hod>> {
    Ok(ApiResponse::success(state.hods().list_all().await?))
}

/**
 * POST /api/hod/hods - Create another HOD account
 *
 * Expected Input:
 * ```json
 * { "name": "string", "email": "string", "phone": "string", "password": "string" }
 * ```
 *
 * Duplicate email or phone → 400 CONFLICT.
 */
pub async fn create(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<NewHod>,
) -> ApiResult<Hod> {
    let hod = state.hods().create(payload).await?;
    Ok(ApiResponse::created(hod))
}

pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Hod> {
    let hod = state.hods().get_by_id(id).await?.ok_or_else(not_found::<Hod>)?;
    Ok(ApiResponse::success(hod))
}

/// PUT /api/hod/hods/:id - Partial update; unknown fields are rejected
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(patch): JsonBody<HodPatch>,
) -> ApiResult<Hod> {
    let hod = state.hods().update(id, patch).await?.ok_or_else(not_found::<Hod>)?;
    Ok(ApiResponse::success(hod))
}

/// DELETE /api/hod/hods/:id - Also ends that HOD's session
///
/// The signed-in HOD cannot delete their own account, so at least one HOD
/// always remains.
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<Message> {
    if id == auth.user_id {
        return Err(ApiError::conflict("Cannot delete your own HOD account"));
    }
    if !state.hods().delete(id).await? {
        return Err(not_found::<Hod>().into());
    }
    state.sessions.revoke_user(Role::Hod, id).await;
    Ok(ApiResponse::success(Message::new("HOD deleted")))
}
