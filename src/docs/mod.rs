use utoipa::OpenApi;
use crate::models::*;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[allow(dead_code)]
pub async fn health_check_doc() {}

/// Readiness check endpoint
#[utoipa::path(
    get,
    path = "/api/ready",
    responses(
        (status = 200, description = "Service is ready", body = HealthResponse),
        (status = 503, description = "Store is not reachable", body = HealthResponse)
    )
)]
#[allow(dead_code)]
pub async fn ready_check_doc() {}

/// Process and live connection statistics
#[utoipa::path(
    get,
    path = "/api/v1/diagnostics",
    responses(
        (status = 200, description = "Diagnostics", body = DiagnosticsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Admin access required", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn diagnostics_doc() {}

/// List sessions
#[utoipa::path(
    get,
    path = "/api/v1/code-diff/sessions",
    responses(
        (status = 200, description = "All sessions, newest first", body = SessionListResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn list_sessions_doc() {}

/// Create a session
#[utoipa::path(
    post,
    path = "/api/v1/code-diff/sessions",
    request_body = CreateSessionRequest,
    responses(
        (status = 201, description = "Session created", body = SessionResponse),
        (status = 400, description = "Title is required", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn create_session_doc() {}

/// Get a session
#[utoipa::path(
    get,
    path = "/api/v1/code-diff/sessions/{id}",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session with its teacher", body = SessionResponse),
        (status = 404, description = "Session not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn get_session_doc() {}

/// Server-sent event stream of a session
#[utoipa::path(
    get,
    path = "/api/v1/code-diff/sessions/{id}/live",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "text/event-stream of connected, heartbeat, code_update and student_joined events"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn live_stream_doc() {}

/// Get the teacher code
#[utoipa::path(
    get,
    path = "/api/v1/code-diff/sessions/{id}/teacher-code",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Teacher code, or an empty placeholder", body = TeacherCodeResponse)
    )
)]
#[allow(dead_code)]
pub async fn get_teacher_code_doc() {}

/// Replace the teacher code
#[utoipa::path(
    put,
    path = "/api/v1/code-diff/sessions/{id}/teacher-code",
    params(("id" = String, Path, description = "Session id")),
    request_body = UpdateCodeRequest,
    responses(
        (status = 200, description = "Stored and broadcast", body = TeacherCodeResponse),
        (status = 403, description = "Not the session teacher", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn put_teacher_code_doc() {}

/// Get a student's code
#[utoipa::path(
    get,
    path = "/api/v1/code-diff/sessions/{id}/student-code",
    params(
        ("id" = String, Path, description = "Session id"),
        ("studentId" = Option<String>, Query, description = "Another student's id, session teacher only")
    ),
    responses(
        (status = 200, description = "Student code, or an empty placeholder", body = StudentCodeResponse),
        (status = 403, description = "Not the session teacher", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn get_student_code_doc() {}

/// Replace the caller's student code
#[utoipa::path(
    put,
    path = "/api/v1/code-diff/sessions/{id}/student-code",
    params(("id" = String, Path, description = "Session id")),
    request_body = UpdateCodeRequest,
    responses(
        (status = 200, description = "Stored and broadcast", body = StudentCodeResponse),
        (status = 404, description = "Session not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn put_student_code_doc() {}

/// Students of a session
#[utoipa::path(
    get,
    path = "/api/v1/code-diff/sessions/{id}/students",
    params(("id" = String, Path, description = "Session id")),
    responses(
        (status = 200, description = "Students by first then last name", body = StudentListResponse),
        (status = 403, description = "Teachers only", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn list_session_students_doc() {}

/// Line diff of two texts
#[utoipa::path(
    post,
    path = "/api/v1/code-diff/diff",
    request_body = DiffRequest,
    responses(
        (status = 200, description = "Positional diff", body = DiffResponse)
    )
)]
#[allow(dead_code)]
pub async fn diff_code_doc() {}

/// List blog posts
#[utoipa::path(
    get,
    path = "/api/v1/blog",
    responses(
        (status = 200, description = "Posts, newest first", body = PostListResponse)
    )
)]
#[allow(dead_code)]
pub async fn list_posts_doc() {}

/// Create a blog post
#[utoipa::path(
    post,
    path = "/api/v1/blog",
    request_body = PostRequest,
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn create_post_doc() {}

/// Get a blog post
#[utoipa::path(
    get,
    path = "/api/v1/blog/{id}",
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post with its author", body = PostResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn get_post_doc() {}

/// Edit a blog post
#[utoipa::path(
    put,
    path = "/api/v1/blog/{id}",
    params(("id" = i64, Path, description = "Post id")),
    request_body = PostRequest,
    responses(
        (status = 200, description = "Post updated", body = PostResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn update_post_doc() {}

/// Delete a blog post
#[utoipa::path(
    delete,
    path = "/api/v1/blog/{id}",
    params(("id" = i64, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post deleted", body = PostResponse),
        (status = 403, description = "Not the author", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn delete_post_doc() {}

/// Current teacher
#[utoipa::path(
    get,
    path = "/api/v1/admin/teacher",
    responses(
        (status = 200, description = "Current teacher and the claimable address", body = CurrentTeacherResponse)
    )
)]
#[allow(dead_code)]
pub async fn current_teacher_doc() {}

/// Claim the teacher role
#[utoipa::path(
    post,
    path = "/api/v1/admin/teacher",
    request_body = AssignTeacherRequest,
    responses(
        (status = 200, description = "Teacher role assigned", body = AssignTeacherResponse),
        (status = 400, description = "Invalid teacher email", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn assign_teacher_doc() {}

/// Server-sent event stream of the shared texts
#[utoipa::path(
    get,
    path = "/api/v1/realtime-sync",
    responses(
        (status = 200, description = "text/event-stream; `connected` with both texts, then `text_update` and `heartbeat` events")
    )
)]
#[allow(dead_code)]
pub async fn text_sync_stream_doc() {}

/// Replace one shared text
#[utoipa::path(
    post,
    path = "/api/v1/realtime-sync",
    request_body = TextUpdateRequest,
    responses(
        (status = 200, description = "Text stored and pushed to every connection", body = TextUpdateResponse),
        (status = 400, description = "Invalid type", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn update_text_doc() {}

/// Current shared texts
#[utoipa::path(
    put,
    path = "/api/v1/realtime-sync",
    responses(
        (status = 200, description = "Both texts", body = TextSnapshot)
    )
)]
#[allow(dead_code)]
pub async fn text_snapshot_doc() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check_doc,
        ready_check_doc,
        diagnostics_doc,
        list_sessions_doc,
        create_session_doc,
        get_session_doc,
        live_stream_doc,
        get_teacher_code_doc,
        put_teacher_code_doc,
        get_student_code_doc,
        put_student_code_doc,
        list_session_students_doc,
        diff_code_doc,
        list_posts_doc,
        create_post_doc,
        get_post_doc,
        update_post_doc,
        delete_post_doc,
        current_teacher_doc,
        assign_teacher_doc,
        text_sync_stream_doc,
        update_text_doc,
        text_snapshot_doc,
    ),
    components(
        schemas(
            HealthResponse, ErrorResponse, DiagnosticsResponse,
            Session, SessionDetail, UserSummary, Role, CreateSessionRequest, SessionResponse, SessionListResponse,
            StudentListResponse, CodeType, TeacherCode, StudentCode, EmptyCode, TeacherCodeBody, StudentCodeBody,
            UpdateCodeRequest, TeacherCodeResponse, StudentCodeResponse,
            DiffKind, DiffPolicy, DiffLine, DiffSummary, DiffRequest, DiffResponse,
            Post, PostRequest, PostResponse, PostListResponse,
            AssignTeacherRequest, AssignTeacherResponse, CurrentTeacherResponse,
            TextType, TextSnapshot, TextUpdateRequest, TextUpdateResponse
        )
    ),
    tags(
        (name = "api", description = "API endpoints")
    )
)]
pub struct ApiDoc;
