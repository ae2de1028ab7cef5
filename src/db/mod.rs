pub mod dbclassroom;
pub mod memstore;

use async_trait::async_trait;

use crate::models::{NewUser, Post, Session, SessionDetail, StudentCode, TeacherCode, User, UserSummary};

pub use dbclassroom::DbClassroom;
pub use memstore::MemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0} not found")]
    Missing(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for users, sessions, code documents and blog posts
#[async_trait]
pub trait ClassroomStore: Send + Sync {
    /// Round trip used by the readiness check
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn get_user(&self, id: &str) -> StoreResult<Option<User>>;

    /// Returns the existing user untouched, or creates it from `user`
    async fn ensure_user(&self, user: NewUser) -> StoreResult<User>;

    async fn find_teacher(&self) -> StoreResult<Option<User>>;

    /// Demotes every teacher to student, then promotes `user_id`
    async fn assign_teacher(&self, user_id: &str) -> StoreResult<User>;

    /// Newest first
    async fn list_sessions(&self) -> StoreResult<Vec<SessionDetail>>;

    async fn get_session(&self, id: &str) -> StoreResult<Option<Session>>;

    async fn get_session_detail(&self, id: &str) -> StoreResult<Option<SessionDetail>>;

    /// Creates the session and its teacher code document
    async fn create_session(&self, title: &str, teacher_id: &str, initial_code: &str) -> StoreResult<SessionDetail>;

    /// Creates the session with a fixed id unless it already exists
    async fn ensure_session(&self, id: &str, title: &str, teacher_id: &str) -> StoreResult<SessionDetail>;

    async fn get_teacher_code(&self, session_id: &str) -> StoreResult<Option<TeacherCode>>;

    async fn upsert_teacher_code(&self, session_id: &str, content: &str) -> StoreResult<TeacherCode>;

    async fn get_student_code(&self, session_id: &str, student_id: &str) -> StoreResult<Option<StudentCode>>;

    /// The flag is true when the document did not exist before
    async fn upsert_student_code(&self, session_id: &str, student_id: &str, content: &str) -> StoreResult<(StudentCode, bool)>;

    /// Users with a code document in the session, by first then last name
    async fn list_session_students(&self, session_id: &str) -> StoreResult<Vec<UserSummary>>;

    /// Newest first
    async fn list_posts(&self) -> StoreResult<Vec<Post>>;

    async fn get_post(&self, id: i64) -> StoreResult<Option<Post>>;

    async fn create_post(&self, author_id: &str, title: &str, description: &str) -> StoreResult<Post>;

    async fn update_post(&self, id: i64, title: &str, description: &str) -> StoreResult<Option<Post>>;

    async fn delete_post(&self, id: i64) -> StoreResult<Option<Post>>;
}
