use axum::{
    body::Body,
    extract::{Extension, Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use tracing::info;

use crate::live::stream::{self, LiveStream};
use crate::models::{ApiError, AuthUser};
use crate::state::AppState;

/// Open a server-sent event stream for a session
pub async fn live_stream(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, ApiError> {

    // The sentinel session is exempt from the existence check
    if !state.is_test_session(&session_id) && state.store.get_session(&session_id).await?.is_none() {
        return Err(ApiError::not_found("Session not found"));
    }

    let stream = stream::open(&state.registry, &session_id, &user.uid, state.stream_settings());
    info!("User {} subscribed to session {} as {}", user.uid, session_id, stream.id());

    Ok(event_stream_response(stream))
}

pub(crate) fn event_stream_response(stream: LiveStream) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Cache-Control"),
        ],
        Body::from_stream(stream),
    )
        .into_response()
}
