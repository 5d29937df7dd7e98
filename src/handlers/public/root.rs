// handlers/public/root.rs - GET / and GET /health

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::database::DatabaseManager;
use crate::state::AppState;

/// GET / - Service banner listing the route groups
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Markbook API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Department marks register for HODs and teachers",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "login": "/api/hod/login, /api/teacher/login (public)",
                "logout": "/api/logout (public)",
                "hod": "/api/hod/* (HOD session)",
                "teacher": "/api/teacher/* (teacher session)",
            }
        }
    }))
}

/// GET /health - Database liveness
///
/// Expected Output (Success):
/// ```json
/// { "success": true, "data": { "status": "ok", "timestamp": "...", "database": "ok" } }
/// ```
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
