use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use crate::models::{error_response, ApiError};
use crate::services::auth_service::get_auth_token;
use crate::state::AppState;

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {

    // 1+2. Get the auth token from the request
    let token = match get_auth_token(&req) {
        Ok(token) => token,
        Err(e) => {
            debug!("No auth token: {}", e);
            return ApiError::unauthorized().into_response();
        }
    };

    // 3. Validate Token
    let secret = match &state.config.auth_jwt_secret {
        Some(secret) => secret,
        None => {
            error!("Auth JWT secret not configured");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Authentication is not configured");
        }
    };

    // 4. Resolve the caller identity, reusing a cached one when possible
    let user = match state.identities.resolve(&token, secret) {
        Ok(user) => user,
        Err(e) => {
            error!("{}", e);
            return ApiError::unauthorized().into_response();
        }
    };

    // 5. Set the identity into request extensions for downstream handlers
    req.extensions_mut().insert(user);

    next.run(req).await
}
