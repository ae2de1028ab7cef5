use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::UserSummary;

/// A classroom session owned by one teacher
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub title: String,
    pub teacher_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Session together with its teacher
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetail {
    pub id: String,
    pub title: String,
    pub teacher_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub teacher: Option<UserSummary>,
}

impl SessionDetail {
    pub fn session(&self) -> Session {
        Session {
            id: self.id.clone(),
            title: self.title.clone(),
            teacher_id: self.teacher_id.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Request body for creating a session
#[derive(Serialize, Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    pub title: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub message: String,
    pub session: SessionDetail,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct SessionListResponse {
    pub message: String,
    pub sessions: Vec<SessionDetail>,
}
