use axum::Json;

use crate::models::{DiffRequest, DiffResponse};
use crate::services::diff_service;
use super::extract::JsonBody;

/// Compare teacher and student code line by line
pub async fn diff_code(JsonBody(body): JsonBody<DiffRequest>) -> Json<DiffResponse> {
    let lines = diff_service::diff_lines(&body.teacher, &body.student, body.policy.unwrap_or_default());
    let summary = diff_service::summarize(&lines);
    Json(DiffResponse {
        message: "Success".to_string(),
        lines,
        summary,
    })
}
