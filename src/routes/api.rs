use crate::{
    handlers::*,
    routes::{auth_middleware::auth_middleware, error_middleware::redact_error_details},
    state::AppState,
};
use axum::{routing::{get, post}, Router, middleware};

/// Create API routes
pub fn create_api_routes(state: AppState) -> Router {
    let public = Router::<AppState>::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
        .route("/v1/code-diff/diff", post(diff_code))
        .route("/v1/blog", get(list_posts))
        .route("/v1/blog/:id", get(get_post))
        .route("/v1/admin/teacher", get(current_teacher))
        .route("/v1/realtime-sync", get(text_sync_stream).post(update_text).put(text_snapshot));

    let protected = Router::<AppState>::new()
        .route("/v1/diagnostics", get(diagnostics))
        .route("/v1/code-diff/sessions", get(list_sessions).post(create_session))
        .route("/v1/code-diff/sessions/:id", get(get_session))
        .route("/v1/code-diff/sessions/:id/live", get(live_stream))
        .route("/v1/code-diff/sessions/:id/teacher-code", get(get_teacher_code).put(put_teacher_code))
        .route("/v1/code-diff/sessions/:id/student-code", get(get_student_code).put(put_student_code))
        .route("/v1/code-diff/sessions/:id/students", get(list_session_students))
        .route("/v1/blog", post(create_post))
        .route("/v1/blog/:id", axum::routing::put(update_post).delete(delete_post))
        .route("/v1/admin/teacher", post(assign_teacher))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)); // Applies to all routes added above

    public
        .merge(protected)
        .layer(middleware::map_response_with_state(state.clone(), redact_error_details))
        .with_state(state)
}
