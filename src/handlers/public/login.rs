// handlers/public/login.rs - Session acquisition and release
//
// POST /api/hod/login, POST /api/teacher/login, POST /api/logout
// GET  /login/hod, GET /login/teacher

use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{verify_password, Role};
use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::middleware::auth::session_token;
use crate::middleware::{ApiResponse, JsonBody, Message};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    fn check_present(&self) -> Result<(), ApiError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(ApiError::validation_error("Email and password are required"));
        }
        Ok(())
    }
}

fn invalid_credentials(role: Role, email: &str) -> ApiError {
    tracing::warn!("Failed {} login for {}", role, email);
    ApiError::unauthorized("Invalid credentials")
}

fn session_cookie(security: &SecurityConfig, token: &str) -> Cookie<'static> {
    Cookie::build((security.session_cookie.clone(), token.to_string()))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .secure(security.secure_cookie)
        .build()
}

fn expired_cookie(security: &SecurityConfig) -> Cookie<'static> {
    let mut cookie = session_cookie(security, "");
    cookie.make_removal();
    cookie
}

/**
 * POST /api/hod/login - Authenticate a HOD and start a session
 *
 * Expected Input:
 * ```json
 * { "email": "hod@example.com", "password": "secret" }
 * ```
 *
 * Expected Output (Success), with `Set-Cookie: session_id=<token>; HttpOnly`:
 * ```json
 * { "success": true, "data": { "role": "hod", "user": { "hod_id": 1, "name": "...", ... } } }
 * ```
 *
 * Failure: 401 `{ "success": false, "error": "Invalid credentials" }`
 */
pub async fn hod_login(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.check_present()?;

    let Some(hod) = state.hods().get_by_email(&payload.email).await? else {
        return Err(invalid_credentials(Role::Hod, &payload.email));
    };
    if !verify_password(&hod, &payload.password).await {
        return Err(invalid_credentials(Role::Hod, &payload.email));
    }

    let token = state.sessions.create_session(hod.hod_id, Role::Hod).await;
    tracing::info!("HOD {} logged in", hod.hod_id);

    Ok((
        jar.add(session_cookie(&state.config.security, &token)),
        ApiResponse::success(json!({ "role": Role::Hod, "user": hod })),
    ))
}

/**
 * POST /api/teacher/login - Authenticate a teacher and start a session
 *
 * Same input and failure shape as the HOD login; `data.user` carries the
 * teacher together with their subject.
 */
pub async fn teacher_login(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.check_present()?;

    let teachers = state.teachers();
    let Some(teacher) = teachers.get_by_email(&payload.email).await? else {
        return Err(invalid_credentials(Role::Teacher, &payload.email));
    };
    if !verify_password(&teacher, &payload.password).await {
        return Err(invalid_credentials(Role::Teacher, &payload.email));
    }

    let token = state.sessions.create_session(teacher.teacher_id, Role::Teacher).await;
    tracing::info!("Teacher {} logged in", teacher.teacher_id);
    let profile = teachers.profile(teacher).await?;

    Ok((
        jar.add(session_cookie(&state.config.security, &token)),
        ApiResponse::success(json!({ "role": Role::Teacher, "user": profile })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginPageQuery {
    pub redirect: Option<String>,
}

fn login_page(role: Role, query: LoginPageQuery) -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "role": role,
        "login": format!("/api/{}/login", role),
        "redirect": query.redirect,
    }))
}

/// GET /login/hod - Target of the gate's redirect for HOD reads; names the
/// endpoint to POST credentials to and echoes the decoded `redirect`
pub async fn hod_login_page(Query(query): Query<LoginPageQuery>) -> ApiResponse<Value> {
    login_page(Role::Hod, query)
}

/// GET /login/teacher - Same as the HOD page for the teacher area
pub async fn teacher_login_page(Query(query): Query<LoginPageQuery>) -> ApiResponse<Value> {
    login_page(Role::Teacher, query)
}

/// POST /api/logout - Revoke the cookie's session (if any) and clear the cookie
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let security = &state.config.security;
    if let Some(token) = session_token(&jar, &security.session_cookie) {
        if let Some(session) = state.sessions.revoke(&token).await {
            tracing::info!("{} {} logged out", session.role, session.user_id);
        }
    }

    (
        jar.add(expired_cookie(security)),
        ApiResponse::success(Message::new("Logged out")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn cookie_flags_follow_config() {
        let mut security = AppConfig::development().security;
        let cookie = session_cookie(&security, "tok");
        assert_eq!(cookie.name(), "session_id");
        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.secure(), Some(false));

        security.secure_cookie = true;
        assert_eq!(session_cookie(&security, "tok").secure(), Some(true));
        assert!(expired_cookie(&security).to_string().contains("Max-Age=0"));
    }
}
