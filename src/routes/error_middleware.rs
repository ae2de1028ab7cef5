use axum::{extract::State, response::Response};
use tracing::debug;

use crate::models::{error_response, InternalDetail};
use crate::state::AppState;

/// Replace internal failure detail with a generic message in production
pub async fn redact_error_details(State(state): State<AppState>, response: Response) -> Response {
    if !state.config.is_production() || response.extensions().get::<InternalDetail>().is_none() {
        return response;
    }
    debug!("Redacting error detail from {} response", response.status());
    error_response(response.status(), "Error")
}
