// handlers/teacher/marks.rs - Mark entry for the teacher's subject
//
// GET|POST   /api/teacher/students/:student_id/marks/{experiments,practical,class-test,sla}
// PUT|DELETE /api/teacher/marks/{experiments,practical,class-test,sla}/:id
//
// Writes are refused with 400 VALIDATION_ERROR when the student's current
// year differs from the subject's year. Rows from another subject are
// reported as not found.

use axum::extract::{Extension, Path, State};

use crate::database::models::{
    ClassTestInput, ClassTestMark, ExperimentInput, ExperimentMark, ExperimentUpdate,
    PracticalInput, PracticalMark, SlaInput, SlaMark,
};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, JsonBody, Message};
use crate::state::AppState;

use super::own_subject;

// -------------------- Experiments --------------------

/// GET .../marks/experiments - All experiment rows, ordered by experiment number
pub async fn experiments_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(student_id): Path<i64>,
) -> ApiResult<Vec<ExperimentMark>> {
    let subject = own_subject(&state, &auth).await?;
    let rows = state.marks().get_experiments(student_id, subject.subject_id).await?;
    Ok(ApiResponse::success(rows))
}

/**
 * POST .../marks/experiments - Record one experiment
 *
 * Expected Input:
 * ```json
 * { "experiment_number": 1, "marks_obtained": 8 }
 * ```
 *
 * A repeated experiment number for the same student → 400 CONFLICT.
 */
pub async fn experiments_create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(student_id): Path<i64>,
    JsonBody(payload): JsonBody<ExperimentInput>,
) -> ApiResult<ExperimentMark> {
    let subject = own_subject(&state, &auth).await?;
    let row = state
        .marks()
        .assign_experiment(student_id, subject.subject_id, payload)
        .await?;
    Ok(ApiResponse::created(row))
}

/// PUT /api/teacher/marks/experiments/:id - `{ "marks_obtained": 9 }`
pub async fn experiment_update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<ExperimentUpdate>,
) -> ApiResult<ExperimentMark> {
    let subject = own_subject(&state, &auth).await?;
    let row = state
        .marks()
        .update_experiment(id, payload, Some(subject.subject_id))
        .await?;
    Ok(ApiResponse::success(row))
}

pub async fn experiment_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<Message> {
    let subject = own_subject(&state, &auth).await?;
    state.marks().delete_experiment(id, Some(subject.subject_id)).await?;
    Ok(ApiResponse::success(Message::new("Experiment mark deleted")))
}

// -------------------- Practical exam --------------------

pub async fn practical_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(student_id): Path<i64>,
) -> ApiResult<PracticalMark> {
    let subject = own_subject(&state, &auth).await?;
    let row = state.marks().get_practical(student_id, subject.subject_id).await?;
    Ok(ApiResponse::success(row))
}

/// POST .../marks/practical - `{ "practical_exam_marks": 42 }`
pub async fn practical_create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(student_id): Path<i64>,
    JsonBody(payload): JsonBody<PracticalInput>,
) -> ApiResult<PracticalMark> {
    let subject = own_subject(&state, &auth).await?;
    let row = state
        .marks()
        .assign_practical(student_id, subject.subject_id, payload)
        .await?;
    Ok(ApiResponse::created(row))
}

pub async fn practical_update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<PracticalInput>,
) -> ApiResult<PracticalMark> {
    let subject = own_subject(&state, &auth).await?;
    let row = state
        .marks()
        .update_practical(id, payload, Some(subject.subject_id))
        .await?;
    Ok(ApiResponse::success(row))
}

pub async fn practical_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<Message> {
    let subject = own_subject(&state, &auth).await?;
    state.marks().delete_practical(id, Some(subject.subject_id)).await?;
    Ok(ApiResponse::success(Message::new("Practical marks deleted")))
}

// -------------------- Class tests --------------------

pub async fn class_test_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(student_id): Path<i64>,
) -> ApiResult<ClassTestMark> {
    let subject = own_subject(&state, &auth).await?;
    let row = state.marks().get_class_test(student_id, subject.subject_id).await?;
    Ok(ApiResponse::success(row))
}

/**
 * POST .../marks/class-test - Record both class tests
 *
 * Expected Input:
 * ```json
 * { "class_test_1": 70, "class_test_2": 80 }
 * ```
 *
 * Expected Output: the stored row with `"average_marks": 75.0`.
 */
pub async fn class_test_create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(student_id): Path<i64>,
    JsonBody(payload): JsonBody<ClassTestInput>,
) -> ApiResult<ClassTestMark> {
    let subject = own_subject(&state, &auth).await?;
    let row = state
        .marks()
        .assign_class_test(student_id, subject.subject_id, payload)
        .await?;
    Ok(ApiResponse::created(row))
}

pub async fn class_test_update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<ClassTestInput>,
) -> ApiResult<ClassTestMark> {
    let subject = own_subject(&state, &auth).await?;
    let row = state
        .marks()
        .update_class_test(id, payload, Some(subject.subject_id))
        .await?;
    Ok(ApiResponse::success(row))
}

pub async fn class_test_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<Message> {
    let subject = own_subject(&state, &auth).await?;
    state.marks().delete_class_test(id, Some(subject.subject_id)).await?;
    Ok(ApiResponse::success(Message::new("Class test marks deleted")))
}

// -------------------- SLA --------------------

pub async fn sla_get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(student_id): Path<i64>,
) -> ApiResult<SlaMark> {
    let subject = own_subject(&state, &auth).await?;
    let row = state.marks().get_sla(student_id, subject.subject_id).await?;
    Ok(ApiResponse::success(row))
}

/// POST .../marks/sla - `{ "micro_project": 30, "assignment": 20, "other_marks": 15 }`
pub async fn sla_create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(student_id): Path<i64>,
    JsonBody(payload): JsonBody<SlaInput>,
) -> ApiResult<SlaMark> {
    let subject = own_subject(&state, &auth).await?;
    let row = state.marks().assign_sla(student_id, subject.subject_id, payload).await?;
    Ok(ApiResponse::created(row))
}

pub async fn sla_update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    JsonBody(payload): JsonBody<SlaInput>,
) -> ApiResult<SlaMark> {
    let subject = own_subject(&state, &auth).await?;
    let row = state.marks().update_sla(id, payload, Some(subject.subject_id)).await?;
    Ok(ApiResponse::success(row))
}

pub async fn sla_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<Message> {
    let subject = own_subject(&state, &auth).await?;
    state.marks().delete_sla(id, Some(subject.subject_id)).await?;
    Ok(ApiResponse::success(Message::new("SLA marks deleted")))
}
