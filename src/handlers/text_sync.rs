use axum::{extract::State, response::Response, Json};
use tracing::{info, warn};

use super::extract::JsonBody;
use super::live::event_stream_response;
use crate::models::{ApiError, TextSnapshot, TextType, TextUpdateRequest, TextUpdateResponse};
use crate::state::AppState;

/// Open the shared text stream. The first event carries both texts.
pub async fn text_sync_stream(State(state): State<AppState>) -> Response {
    let stream = state.texts.open_stream(&state.registry, state.stream_settings());
    info!("Text sync connection opened: {}", stream.id());
    event_stream_response(stream)
}

/// Replace one of the shared texts and push it to every text sync connection
pub async fn update_text(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<TextUpdateRequest>,
) -> Result<Json<TextUpdateResponse>, ApiError> {
    let Some(text_type) = body.text_type.as_deref().and_then(TextType::parse) else {
        warn!("Rejected text update with type {:?}", body.text_type);
        return Err(ApiError::bad_request("Invalid type"));
    };

    let (texts, report) = state.texts.update(&state.broadcaster, text_type, &body.content);
    info!("Text update pushed to {} connections", report.delivered());

    Ok(Json(TextUpdateResponse {
        message: "Success".to_string(),
        original_text: texts.original_text,
        changed_text: texts.changed_text,
    }))
}

/// Current value of both shared texts
pub async fn text_snapshot(State(state): State<AppState>) -> Json<TextSnapshot> {
    Json(state.texts.snapshot())
}
