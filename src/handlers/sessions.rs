use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::auth::auth;
use crate::models::{
    ApiError, AuthUser, CreateSessionRequest, NewUser, Role, SessionListResponse, SessionResponse,
    StudentListResponse,
};
use crate::state::AppState;
use super::extract::JsonBody;

const INITIAL_TEACHER_CODE: &str = "// Write your code here";
const TEST_SESSION_TITLE: &str = "Test Session";

/// List all sessions, newest first
pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(_user): Extension<AuthUser>,
) -> Result<Json<SessionListResponse>, ApiError> {
    let sessions = state.store.list_sessions().await?;
    Ok(Json(SessionListResponse {
        message: "Success".to_string(),
        sessions,
    }))
}

/// Create a session owned by the caller
pub async fn create_session(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let title = body
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::bad_request("Title is required"))?;

    // The creator becomes a teacher on first contact
    let teacher = state.store.ensure_user(user.new_user(Role::Teacher)).await?;
    let session = state
        .store
        .create_session(title, &teacher.id, INITIAL_TEACHER_CODE)
        .await?;
    info!("Session {} created by {}", session.id, teacher.id);

    Ok((StatusCode::CREATED, Json(SessionResponse {
        message: "Success".to_string(),
        session,
    })))
}

/// Get a session with its teacher.
///
/// Asking for the sentinel session provisions it on the fly, owned by the caller.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = if state.is_test_session(&session_id) {
        let email = format!("test-user-{}@example.com", user.uid);
        let teacher = state
            .store
            .ensure_user(NewUser::placeholder(&user.uid, Some(&email), Role::Teacher))
            .await?;
        state
            .store
            .ensure_session(&session_id, TEST_SESSION_TITLE, &teacher.id)
            .await?
    } else {
        state
            .store
            .get_session_detail(&session_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Session not found"))?
    };

    Ok(Json(SessionResponse {
        message: "Success".to_string(),
        session,
    }))
}

/// List students with a code document in the session. Teachers only.
pub async fn list_session_students(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StudentListResponse>, ApiError> {
    let caller = state.store.get_user(&user.uid).await?;
    auth::ensure_teacher_role(caller.as_ref())?;

    if state.store.get_session(&session_id).await?.is_none() {
        return Err(ApiError::not_found("Session not found"));
    }

    let students = state.store.list_session_students(&session_id).await?;
    Ok(Json(StudentListResponse {
        message: "Success".to_string(),
        students,
    }))
}
