use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use futures_util::FutureExt;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::config::Config;
use crate::db::MemoryStore;
use crate::routes::create_api_routes;
use crate::services::auth_service::test_tokens::{token_for, SECRET};
use crate::state::AppState;

fn app() -> (Router, AppState) {
    let config = Config {
        auth_jwt_secret: Some(SECRET.to_string()),
        ..Config::default()
    };
    let state = AppState::new(config, Arc::new(MemoryStore::new()));
    (create_api_routes(state.clone()), state)
}

async fn send(app: &Router, method: Method, uri: &str, uid: Option<&str>, body: Option<Value>) -> Response {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(uid) = uid {
        req = req.header(header::AUTHORIZATION, format!("Bearer {}", token_for(uid, &[])));
    }
    let req = match body {
        Some(body) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(req).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn next_event(body: &mut Body) -> Value {
    let frame = body.frame().await.unwrap().unwrap();
    let data = frame.into_data().unwrap();
    let text = std::str::from_utf8(&data).unwrap();
    let payload = text.strip_prefix("data: ").unwrap().strip_suffix("\n\n").unwrap();
    serde_json::from_str(payload).unwrap()
}

fn nothing_pending(body: &mut Body) -> bool {
    body.frame().now_or_never().is_none()
}

async fn create_session(app: &Router, teacher: &str, title: &str) -> String {
    let response = send(app, Method::POST, "/v1/code-diff/sessions", Some(teacher), Some(json!({ "title": title }))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response).await["session"]["id"].as_str().unwrap().to_string()
}

async fn open_live(app: &Router, session_id: &str, uid: &str) -> Body {
    let uri = format!("/v1/code-diff/sessions/{}/live", session_id);
    let response = send(app, Method::GET, &uri, Some(uid), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    response.into_body()
}

#[tokio::test]
async fn health_is_public() {
    let (app, _) = app();
    let response = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");

    let response = send(&app, Method::GET, "/ready", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_routes_need_a_token() {
    let (app, _) = app();
    let response = send(&app, Method::GET, "/v1/code-diff/sessions/abc/live", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["code"], 401);
    assert_eq!(body["error"], "Unauthorized");
}

#[tokio::test]
async fn forged_token_is_rejected() {
    let (app, _) = app();
    let req = Request::builder()
        .uri("/v1/code-diff/sessions")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn stream_starts_with_connected_event_and_sse_headers() {
    let (app, state) = app();
    let session_id = create_session(&app, "t1", "Loops").await;

    let uri = format!("/v1/code-diff/sessions/{}/live", session_id);
    let response = send(&app, Method::GET, &uri, Some("s1"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let mut body = response.into_body();
    let event = next_event(&mut body).await;
    assert_eq!(event["type"], "connected");
    assert_eq!(event["sessionId"], session_id.as_str());
    assert_eq!(event["userId"], "s1");
    assert_eq!(state.registry.session_len(&session_id), 1);

    drop(body);
    assert!(state.registry.is_empty());
}

#[tokio::test]
async fn stream_for_unknown_session_is_not_found() {
    let (app, state) = app();
    let response = send(&app, Method::GET, "/v1/code-diff/sessions/missing/live", Some("s1"), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(state.registry.is_empty());
}

#[tokio::test]
async fn sentinel_session_streams_without_existing() {
    let (app, _) = app();
    let mut body = open_live(&app, "test-session-123", "s1").await;
    assert_eq!(next_event(&mut body).await["type"], "connected");
}

#[tokio::test]
async fn teacher_update_reaches_students_of_that_session_only() {
    let (app, _) = app();
    let s1 = create_session(&app, "t1", "Loops").await;
    let s2 = create_session(&app, "t2", "Recursion").await;

    let mut student = open_live(&app, &s1, "alice").await;
    let mut other = open_live(&app, &s2, "bob").await;
    next_event(&mut student).await;
    next_event(&mut other).await;

    let uri = format!("/v1/code-diff/sessions/{}/teacher-code", s1);
    let response = send(&app, Method::PUT, &uri, Some("t1"), Some(json!({ "content": "let x = 1;" }))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["teacherCode"]["content"], "let x = 1;");

    let event = next_event(&mut student).await;
    assert_eq!(event["type"], "code_update");
    assert_eq!(event["codeType"], "teacher");
    assert_eq!(event["content"], "let x = 1;");
    assert!(event.get("studentId").is_none());

    assert!(nothing_pending(&mut other));
}

#[tokio::test]
async fn only_the_owner_writes_teacher_code() {
    let (app, _) = app();
    let session_id = create_session(&app, "t1", "Loops").await;
    let uri = format!("/v1/code-diff/sessions/{}/teacher-code", session_id);

    let response = send(&app, Method::PUT, &uri, Some("intruder"), Some(json!({ "content": "x" }))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(&app, Method::PUT, "/v1/code-diff/sessions/nope/teacher-code", Some("t1"), Some(json!({ "content": "x" }))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn new_session_carries_initial_teacher_code() {
    let (app, _) = app();
    let session_id = create_session(&app, "t1", "Loops").await;
    let uri = format!("/v1/code-diff/sessions/{}/teacher-code", session_id);
    let body = json_body(send(&app, Method::GET, &uri, Some("s1"), None).await).await;
    assert_eq!(body["teacherCode"]["content"], "// Write your code here");
}

#[tokio::test]
async fn missing_code_reads_as_empty_placeholder() {
    let (app, _) = app();
    let session_id = create_session(&app, "t1", "Loops").await;
    let uri = format!("/v1/code-diff/sessions/{}/student-code", session_id);
    let response = send(&app, Method::GET, &uri, Some("s1"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["studentCode"]["content"], "");
    assert!(body["studentCode"]["updatedAt"].is_string());
    assert!(body["studentCode"].get("id").is_none());
}

#[tokio::test]
async fn first_student_write_announces_join_once() {
    let (app, _) = app();
    let session_id = create_session(&app, "t1", "Loops").await;
    let mut teacher = open_live(&app, &session_id, "t1").await;
    next_event(&mut teacher).await;

    let uri = format!("/v1/code-diff/sessions/{}/student-code", session_id);
    let response = send(&app, Method::PUT, &uri, Some("alice"), Some(json!({ "content": "a" }))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let joined = next_event(&mut teacher).await;
    assert_eq!(joined["type"], "student_joined");
    assert_eq!(joined["student"]["id"], "alice");
    assert_eq!(joined["student"]["email"], "alice@school.test");

    let update = next_event(&mut teacher).await;
    assert_eq!(update["type"], "code_update");
    assert_eq!(update["codeType"], "student");
    assert_eq!(update["studentId"], "alice");

    send(&app, Method::PUT, &uri, Some("alice"), Some(json!({ "content": "ab" }))).await;
    let update = next_event(&mut teacher).await;
    assert_eq!(update["type"], "code_update");
    assert_eq!(update["content"], "ab");
    assert!(nothing_pending(&mut teacher));
}

#[tokio::test]
async fn teacher_reads_a_students_code_others_cannot() {
    let (app, _) = app();
    let session_id = create_session(&app, "t1", "Loops").await;
    let uri = format!("/v1/code-diff/sessions/{}/student-code", session_id);
    send(&app, Method::PUT, &uri, Some("alice"), Some(json!({ "content": "mine" }))).await;

    let peek = format!("{}?studentId=alice", uri);
    let body = json_body(send(&app, Method::GET, &peek, Some("t1"), None).await).await;
    assert_eq!(body["studentCode"]["content"], "mine");

    let response = send(&app, Method::GET, &peek, Some("bob"), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn students_list_is_for_teachers() {
    let (app, _) = app();
    let session_id = create_session(&app, "t1", "Loops").await;
    let code_uri = format!("/v1/code-diff/sessions/{}/student-code", session_id);
    send(&app, Method::PUT, &code_uri, Some("alice"), Some(json!({ "content": "a" }))).await;

    let uri = format!("/v1/code-diff/sessions/{}/students", session_id);
    let response = send(&app, Method::GET, &uri, Some("alice"), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(response).await["error"], "Forbidden - Teachers only");

    let body = json_body(send(&app, Method::GET, &uri, Some("t1"), None).await).await;
    assert_eq!(body["students"].as_array().unwrap().len(), 1);
    assert_eq!(body["students"][0]["id"], "alice");

    let response = send(&app, Method::GET, "/v1/code-diff/sessions/nope/students", Some("t1"), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_title_is_rejected() {
    let (app, _) = app();
    let response = send(&app, Method::POST, "/v1/code-diff/sessions", Some("t1"), Some(json!({ "title": "  " }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sentinel_session_is_provisioned_on_read() {
    let (app, _) = app();
    let response = send(&app, Method::GET, "/v1/code-diff/sessions/test-session-123", Some("t9"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["session"]["title"], "Test Session");
    assert_eq!(body["session"]["teacherId"], "t9");
    assert_eq!(body["session"]["teacher"]["email"], "test-user-t9@example.com");

    let response = send(&app, Method::GET, "/v1/code-diff/sessions/other", Some("t9"), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn diff_endpoint_applies_policy() {
    let (app, _) = app();
    let body = json!({ "teacher": "a\nb", "student": "a\nc" });
    let result = json_body(send(&app, Method::POST, "/v1/code-diff/diff", None, Some(body)).await).await;
    assert_eq!(result["lines"][1]["type"], "modified");
    assert_eq!(result["summary"]["modified"], 1);

    let body = json!({ "teacher": "a\nb", "student": "a\nc", "policy": "collapse-modified" });
    let result = json_body(send(&app, Method::POST, "/v1/code-diff/diff", None, Some(body)).await).await;
    assert_eq!(result["lines"][1]["type"], "added");
}

#[tokio::test]
async fn blog_posts_are_edited_by_their_author_only() {
    let (app, _) = app();
    let response = send(&app, Method::POST, "/v1/blog", Some("alice"), Some(json!({ "title": "Hi", "description": "First" }))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = json_body(response).await["post"]["id"].as_i64().unwrap();
    let uri = format!("/v1/blog/{}", id);

    let public = json_body(send(&app, Method::GET, &uri, None, None).await).await;
    assert_eq!(public["post"]["author"]["id"], "alice");

    let edit = json!({ "title": "Hi", "description": "Edited" });
    let response = send(&app, Method::PUT, &uri, Some("bob"), Some(edit.clone())).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = send(&app, Method::PUT, &uri, Some("alice"), Some(edit)).await;
    assert_eq!(json_body(response).await["post"]["description"], "Edited");

    let response = send(&app, Method::DELETE, &uri, Some("alice"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = send(&app, Method::GET, &uri, None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, Method::POST, "/v1/blog", None, Some(json!({ "title": "x", "description": "y" }))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn teacher_role_is_claimed_with_the_configured_email() {
    let (app, _) = app();
    let response = send(&app, Method::POST, "/v1/admin/teacher", Some("alice"), Some(json!({ "email": "nope@example.com" }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Invalid teacher email");

    let response = send(&app, Method::POST, "/v1/admin/teacher", Some("alice"), Some(json!({ "email": "teacher@example.com" }))).await;
    assert_eq!(json_body(response).await["teacherId"], "alice");

    send(&app, Method::POST, "/v1/admin/teacher", Some("bob"), Some(json!({ "email": "teacher@example.com" }))).await;
    let current = json_body(send(&app, Method::GET, "/v1/admin/teacher", None, None).await).await;
    assert_eq!(current["teacher"]["id"], "bob");
    assert_eq!(current["teacherEmail"], "teacher@example.com");
}

#[tokio::test]
async fn diagnostics_need_admin_role() {
    let (app, _) = app();
    let response = send(&app, Method::GET, "/v1/diagnostics", Some("alice"), None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let req = Request::builder()
        .uri("/v1/diagnostics")
        .header(header::AUTHORIZATION, format!("Bearer {}", token_for("root", &["admin"])))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["n_conn"], 0);
}

async fn send_raw(app: &Router, method: Method, uri: &str, uid: &str, body: &str) -> Response {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token_for(uid, &[])))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(req).await.unwrap()
}

#[tokio::test]
async fn malformed_json_is_an_error_response() {
    let (app, _) = app();
    let session_id = create_session(&app, "t1", "Loops").await;

    let uri = format!("/v1/code-diff/sessions/{}/teacher-code", session_id);
    let response = send_raw(&app, Method::PUT, &uri, "t1", "{bad").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    let body = json_body(response).await;
    assert_eq!(body["code"], 400);
    assert_eq!(body["status"], "400 Bad Request");
    assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn wrong_shape_and_missing_content_type_are_error_responses() {
    let (app, _) = app();
    let response = send(&app, Method::POST, "/v1/code-diff/diff", None, Some(json!({ "teacher": 5 }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["code"], 400);
    assert!(body["error"].as_str().unwrap().contains("teacher"));

    let req = Request::builder()
        .method(Method::POST)
        .uri("/v1/realtime-sync")
        .body(Body::from(r#"{"type":"original","content":"x"}"#))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], 400);
}

#[tokio::test]
async fn realtime_sync_needs_no_token() {
    let (app, _) = app();
    let response = send(&app, Method::PUT, "/v1/realtime-sync", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "originalText": "", "changedText": "" }));
}

#[tokio::test]
async fn realtime_sync_connect_sends_current_texts() {
    let (app, state) = app();
    let response = send(&app, Method::POST, "/v1/realtime-sync", None, Some(json!({ "type": "original", "content": "a = 1" }))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Success");
    assert_eq!(body["originalText"], "a = 1");
    assert_eq!(body["changedText"], "");

    let response = send(&app, Method::GET, "/v1/realtime-sync", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");
    let mut stream = response.into_body();
    let event = next_event(&mut stream).await;
    assert_eq!(event["type"], "connected");
    assert_eq!(event["originalText"], "a = 1");
    assert_eq!(event["changedText"], "");
    assert!(event["timestamp"].is_string());
    assert_eq!(state.registry.session_len(crate::live::TEXT_SYNC_CHANNEL), 1);

    drop(stream);
    assert!(state.registry.is_empty());
}

#[tokio::test]
async fn realtime_sync_rejects_unknown_type() {
    let (app, state) = app();
    for body in [json!({ "type": "draft", "content": "x" }), json!({ "content": "x" })] {
        let response = send(&app, Method::POST, "/v1/realtime-sync", None, Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["code"], 400);
        assert_eq!(body["error"], "Invalid type");
    }
    assert_eq!(state.texts.snapshot().original_text, "");
}

#[tokio::test]
async fn realtime_sync_update_reaches_every_connection() {
    let (app, _) = app();
    let mut first = send(&app, Method::GET, "/v1/realtime-sync", None, None).await.into_body();
    let mut second = send(&app, Method::GET, "/v1/realtime-sync", None, None).await.into_body();
    assert_eq!(next_event(&mut first).await["type"], "connected");
    assert_eq!(next_event(&mut second).await["type"], "connected");

    let session_id = create_session(&app, "t1", "Loops").await;
    let mut session = open_live(&app, &session_id, "s1").await;
    next_event(&mut session).await;

    let response = send(&app, Method::POST, "/v1/realtime-sync", None, Some(json!({ "type": "changed", "content": "b = 2" }))).await;
    assert_eq!(response.status(), StatusCode::OK);

    for body in [&mut first, &mut second] {
        let event = next_event(body).await;
        assert_eq!(event["type"], "text_update");
        assert_eq!(event["textType"], "changed");
        assert_eq!(event["content"], "b = 2");
        assert!(event["timestamp"].is_string());
    }
    assert!(nothing_pending(&mut session));

    let response = send(&app, Method::PUT, "/v1/realtime-sync", None, None).await;
    assert_eq!(json_body(response).await, json!({ "originalText": "", "changedText": "b = 2" }));
}
