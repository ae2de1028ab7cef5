use axum::{
    extract::{Extension, State},
    Json,
};
use tracing::{info, warn};

use crate::models::{
    ApiError, AssignTeacherRequest, AssignTeacherResponse, AuthUser, CurrentTeacherResponse, Role, UserSummary,
};
use crate::state::AppState;
use super::extract::JsonBody;

/// Make the caller the one and only teacher
pub async fn assign_teacher(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<AssignTeacherRequest>,
) -> Result<Json<AssignTeacherResponse>, ApiError> {
    match body.email.as_deref() {
        Some(email) if email == state.config.teacher_email => {}
        _ => {
            warn!("Rejected teacher claim from {}", user.uid);
            return Err(ApiError::bad_request("Invalid teacher email"));
        }
    }

    state.store.ensure_user(user.new_user(Role::Student)).await?;
    let teacher = state.store.assign_teacher(&user.uid).await?;
    info!("Teacher role assigned to {}", teacher.id);

    Ok(Json(AssignTeacherResponse {
        message: "Teacher role assigned successfully".to_string(),
        teacher_id: teacher.id,
    }))
}

/// Current teacher, if any, and the address allowed to claim the role
pub async fn current_teacher(State(state): State<AppState>) -> Result<Json<CurrentTeacherResponse>, ApiError> {
    let teacher = state.store.find_teacher().await?;
    Ok(Json(CurrentTeacherResponse {
        teacher: teacher.as_ref().map(UserSummary::from),
        teacher_email: state.config.teacher_email.clone(),
    }))
}
