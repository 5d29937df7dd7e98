use axum::{
    extract::{OriginalUri, Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::Role;
use crate::error::ApiError;
use crate::session::SessionError;
use crate::state::AppState;

/// Authenticated principal injected into request extensions by the gate
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: i64,
    pub role: Role,
    pub token: String,
}

/// Route layer for the `/api/hod` group
pub async fn require_hod(State(state): State<AppState>, request: Request, next: Next) -> Response {
    session_gate(state, Role::Hod, request, next).await
}

/// Route layer for the `/api/teacher` group
pub async fn require_teacher(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    session_gate(state, Role::Teacher, request, next).await
}

/// Resolve the session cookie for `role`. Reads without a session are sent
/// to the role's login page, every other method gets a 401.
async fn session_gate(state: AppState, role: Role, mut request: Request, next: Next) -> Response {
    let jar = CookieJar::from_headers(request.headers());
    let token = session_token(&jar, &state.config.security.session_cookie);

    let outcome = state.sessions.authenticate(token.as_deref(), role).await;
    match outcome {
        Ok(user_id) => {
            request.extensions_mut().insert(AuthUser {
                user_id,
                role,
                token: token.unwrap_or_default(),
            });
            next.run(request).await
        }
        Err(reason) => reject(role, &request, reason),
    }
}

fn reject(role: Role, request: &Request, reason: SessionError) -> Response {
    let path = request
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.0.clone())
        .unwrap_or_else(|| request.uri().clone());

    tracing::warn!("Rejected {} {} for {} area: {}", request.method(), path, role, reason);

    if request.method() == Method::GET {
        let target = path
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| path.path());
        Redirect::to(&login_redirect(role, target)).into_response()
    } else {
        ApiError::unauthorized("Unauthorized").into_response()
    }
}

/// Login page URL carrying the original target as `redirect`
pub fn login_redirect(role: Role, target: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
    format!("{}?redirect={}", role.login_path(), encoded)
}

/// Value of the session cookie, with any surrounding quotes removed
pub fn session_token(jar: &CookieJar, cookie_name: &str) -> Option<String> {
    jar.get(cookie_name)
        .map(|cookie| cookie.value_trimmed().to_string())
        .filter(|token| !token.is_empty())
}
