use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use tracing::info;

use crate::auth::auth;
use crate::models::{
    ApiError, AuthUser, CodeType, EmptyCode, Role, StudentCodeBody, StudentCodeQuery, StudentCodeResponse,
    UpdateCodeRequest, UserSummary,
};
use crate::state::AppState;
use super::extract::JsonBody;

/// Get a student's code in a session.
///
/// Without `studentId` the caller's own document is returned. Reading another
/// student's document is reserved to the session teacher.
pub async fn get_student_code(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<StudentCodeQuery>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StudentCodeResponse>, ApiError> {
    let student_id = match query.student_id {
        Some(student_id) if student_id != user.uid => {
            let session = state
                .store
                .get_session_detail(&session_id)
                .await?
                .ok_or_else(|| ApiError::not_found("Session not found"))?;
            auth::ensure_session_teacher(&session, &user)?;
            student_id
        }
        _ => user.uid.clone(),
    };

    let student_code = match state.store.get_student_code(&session_id, &student_id).await? {
        Some(code) => StudentCodeBody::Stored(code),
        None => StudentCodeBody::Empty(EmptyCode::now()),
    };

    Ok(Json(StudentCodeResponse {
        message: "Success".to_string(),
        student_code,
    }))
}

/// Replace the caller's own code in a session and push it to every live connection
pub async fn put_student_code(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<UpdateCodeRequest>,
) -> Result<Json<StudentCodeResponse>, ApiError> {

    // 1. The session must exist
    if state.store.get_session(&session_id).await?.is_none() {
        return Err(ApiError::not_found("Session not found"));
    }

    // 2. First contact creates the user as a student
    let student = state.store.ensure_user(user.new_user(Role::Student)).await?;

    // 3. Persist the caller's document
    let (code, created) = state
        .store
        .upsert_student_code(&session_id, &student.id, &body.content)
        .await?;
    info!("Student code of {} in session {} updated", student.id, session_id);

    // 4. Fan out, delivery failures stay with the recipients
    if created {
        state
            .broadcaster
            .broadcast_student_joined(&session_id, UserSummary::from(&student));
    }
    state
        .broadcaster
        .broadcast_code_update(&session_id, CodeType::Student, &code.content, Some(&student.id));

    Ok(Json(StudentCodeResponse {
        message: "Success".to_string(),
        student_code: StudentCodeBody::Stored(code),
    }))
}
