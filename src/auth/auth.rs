use crate::models::{ApiError, AuthUser, Role, SessionDetail, User};

const ADMIN_ROLE: &str = "admin";

pub fn is_admin(user: &AuthUser) -> bool {
    user.has_role(ADMIN_ROLE)
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), ApiError> {
    if is_admin(user) {
        return Ok(());
    }
    Err(ApiError::forbidden("Admin access required"))
}

pub fn is_session_teacher(session: &SessionDetail, user: &AuthUser) -> bool {
    session.teacher_id == user.uid
}

/// Only the owning teacher may write a session's teacher code
pub fn ensure_session_teacher(session: &SessionDetail, user: &AuthUser) -> Result<(), ApiError> {
    if is_session_teacher(session, user) {
        return Ok(());
    }
    Err(ApiError::forbidden("Forbidden - Not the session teacher"))
}

/// Checks the stored role, not token claims
pub fn ensure_teacher_role(user: Option<&User>) -> Result<(), ApiError> {
    match user {
        Some(u) if u.role == Role::Teacher => Ok(()),
        _ => Err(ApiError::forbidden("Forbidden - Teachers only")),
    }
}

pub fn ensure_author(author_id: &str, user: &AuthUser) -> Result<(), ApiError> {
    if author_id == user.uid {
        return Ok(());
    }
    Err(ApiError::forbidden("Forbidden - Not the author"))
}
