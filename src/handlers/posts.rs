use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::auth::auth;
use crate::models::{ApiError, AuthUser, PostListResponse, PostRequest, PostResponse, Role};
use crate::state::AppState;
use super::extract::JsonBody;

/// List blog posts, newest first
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<PostListResponse>, ApiError> {
    let posts = state.store.list_posts().await?;
    Ok(Json(PostListResponse {
        message: "Success".to_string(),
        posts,
    }))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = state
        .store
        .get_post(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Not Found"))?;
    Ok(Json(PostResponse {
        message: "Success".to_string(),
        post,
    }))
}

pub async fn create_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<PostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    state.store.ensure_user(user.new_user(Role::Student)).await?;
    let post = state.store.create_post(&user.uid, &body.title, &body.description).await?;
    info!("Post {} created by {}", post.id, user.uid);
    Ok((StatusCode::CREATED, Json(PostResponse {
        message: "Success".to_string(),
        post,
    })))
}

/// Only the author may edit
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(user): Extension<AuthUser>,
    JsonBody(body): JsonBody<PostRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    let existing = state
        .store
        .get_post(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Not Found"))?;
    auth::ensure_author(&existing.author_id, &user)?;

    let post = state
        .store
        .update_post(id, &body.title, &body.description)
        .await?
        .ok_or_else(|| ApiError::not_found("Not Found"))?;
    Ok(Json(PostResponse {
        message: "Success".to_string(),
        post,
    }))
}

/// Only the author may delete
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<PostResponse>, ApiError> {
    let existing = state
        .store
        .get_post(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Not Found"))?;
    auth::ensure_author(&existing.author_id, &user)?;

    let post = state
        .store
        .delete_post(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Not Found"))?;
    info!("Post {} deleted by {}", id, user.uid);
    Ok(Json(PostResponse {
        message: "Success".to_string(),
        post,
    }))
}
