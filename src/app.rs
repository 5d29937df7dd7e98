use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{hod, public, teacher};
use crate::middleware::{require_hod, require_teacher};
use crate::state::AppState;

/// Full router: public routes plus the two session-gated groups
pub fn app(state: AppState) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(auth_public_routes())
        // Session-gated
        .merge(hod_routes(state.clone()))
        .merge(teacher_routes(state.clone()))
        .layer(TraceLayer::new_for_http());

    let router = if state.config.security.enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/hod/login", post(public::hod_login))
        .route("/api/teacher/login", post(public::teacher_login))
        .route("/api/logout", post(public::logout))
        .route("/login/hod", get(public::hod_login_page))
        .route("/login/teacher", get(public::teacher_login_page))
}

fn hod_routes(state: AppState) -> Router<AppState> {
    use hod::{hods, profile, reports, students, subjects, teachers};

    Router::new()
        .route("/api/hod/me", get(profile::me))
        // HOD accounts
        .route("/api/hod/hods", get(hods::list).post(hods::create))
        .route(
            "/api/hod/hods/:id",
            get(hods::show).put(hods::update).delete(hods::delete),
        )
        // Teachers
        .route("/api/hod/teachers", get(teachers::list).post(teachers::create))
        .route(
            "/api/hod/teachers/:id",
            get(teachers::show).put(teachers::update).delete(teachers::delete),
        )
        // Subjects
        .route("/api/hod/subjects", get(subjects::list).post(subjects::create))
        .route(
            "/api/hod/subjects/:id",
            get(subjects::show).put(subjects::update).delete(subjects::delete),
        )
        // Students
        .route("/api/hod/students", get(students::list).post(students::create))
        .route(
            "/api/hod/students/:id",
            get(students::show).put(students::update).delete(students::delete),
        )
        .route("/api/hod/students/:id/marks", get(students::marks))
        // Reports
        .route("/api/hod/report/students", get(reports::all_students))
        .route("/api/hod/report/student/:id", get(reports::student))
        .route("/api/hod/report/subject/:id", get(reports::subject))
        .route_layer(from_fn_with_state(state, require_hod))
}

fn teacher_routes(state: AppState) -> Router<AppState> {
    use teacher::{marks, profile, reports};

    Router::new()
        .route("/api/teacher/me", get(profile::me))
        .route("/api/teacher/subject", get(profile::subject))
        .route("/api/teacher/students", get(profile::students))
        // Mark entry for one student
        .route(
            "/api/teacher/students/:student_id/marks/experiments",
            get(marks::experiments_list).post(marks::experiments_create),
        )
        .route(
            "/api/teacher/students/:student_id/marks/practical",
            get(marks::practical_get).post(marks::practical_create),
        )
        .route(
            "/api/teacher/students/:student_id/marks/class-test",
            get(marks::class_test_get).post(marks::class_test_create),
        )
        .route(
            "/api/teacher/students/:student_id/marks/sla",
            get(marks::sla_get).post(marks::sla_create),
        )
        // Individual mark rows
        .route(
            "/api/teacher/marks/experiments/:id",
            put(marks::experiment_update).delete(marks::experiment_delete),
        )
        .route(
            "/api/teacher/marks/practical/:id",
            put(marks::practical_update).delete(marks::practical_delete),
        )
        .route(
            "/api/teacher/marks/class-test/:id",
            put(marks::class_test_update).delete(marks::class_test_delete),
        )
        .route(
            "/api/teacher/marks/sla/:id",
            put(marks::sla_update).delete(marks::sla_delete),
        )
        .route("/api/teacher/report/subject", get(reports::subject))
        .route_layer(from_fn_with_state(state, require_teacher))
}
