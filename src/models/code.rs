use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Which side of the comparison a code document belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CodeType {
    Teacher,
    Student,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeacherCode {
    pub id: String,
    pub session_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentCode {
    pub id: String,
    pub session_id: String,
    pub student_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stand-in returned while no document exists yet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmptyCode {
    pub content: String,
    pub updated_at: DateTime<Utc>,
}

impl EmptyCode {
    pub fn now() -> Self {
        Self {
            content: String::new(),
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(untagged)]
pub enum TeacherCodeBody {
    Stored(TeacherCode),
    Empty(EmptyCode),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(untagged)]
pub enum StudentCodeBody {
    Stored(StudentCode),
    Empty(EmptyCode),
}

/// Request body for a code write
#[derive(Serialize, Deserialize, ToSchema)]
pub struct UpdateCodeRequest {
    pub content: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentCodeQuery {
    pub student_id: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeacherCodeResponse {
    pub message: String,
    pub teacher_code: TeacherCodeBody,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentCodeResponse {
    pub message: String,
    pub student_code: StudentCodeBody,
}
