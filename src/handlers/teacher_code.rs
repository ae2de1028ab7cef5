use axum::{
    extract::{Extension, Path, State},
    Json,
};
use tracing::info;

use crate::auth::auth;
use crate::models::{ApiError, AuthUser, CodeType, EmptyCode, TeacherCodeBody, TeacherCodeResponse, UpdateCodeRequest};
use crate::state::AppState;
use super::extract::JsonBody;

/// Get the teacher code of a session
pub async fn get_teacher_code(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Extension(_user): Extension<AuthUser>,
) -> Result<Json<TeacherCodeResponse>, ApiError> {
    let teacher_code = match state.store.get_teacher_code(&session_id).await? {
        Some(code) => TeacherCodeBody::Stored(code),
        None => TeacherCodeBody::Empty(EmptyCode::now()),
    };

    Ok(Json(TeacherCodeResponse {
        message: "Success".to_string(),
        teacher_code,
    }))
}

/// Replace the teacher code of a session and push it to every live connection
pub async fn put_teacher_code(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<UpdateCodeRequest>,
) -> Result<Json<TeacherCodeResponse>, ApiError> {

    // 1. The session must exist and belong to the caller
    let session = state
        .store
        .get_session_detail(&session_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Session not found"))?;
    auth::ensure_session_teacher(&session, &user)?;

    // 2. Persist
    let code = state.store.upsert_teacher_code(&session_id, &body.content).await?;
    info!("Teacher code of session {} updated by {}", session_id, user.uid);

    // 3. Fan out, delivery failures stay with the recipients
    state
        .broadcaster
        .broadcast_code_update(&session_id, CodeType::Teacher, &code.content, None);

    Ok(Json(TeacherCodeResponse {
        message: "Success".to_string(),
        teacher_code: TeacherCodeBody::Stored(code),
    }))
}
