use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::UserSummary;

/// A blog post with its author
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub author_id: String,
    pub author: Option<UserSummary>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct PostRequest {
    pub title: String,
    pub description: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct PostResponse {
    pub message: String,
    pub post: Post,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct PostListResponse {
    pub message: String,
    pub posts: Vec<Post>,
}
