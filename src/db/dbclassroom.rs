use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Error as SqlxError;
use std::time::Duration;
use tracing::{error, info};
use uuid::Uuid;

use super::{ClassroomStore, StoreError, StoreResult};
use crate::models::{NewUser, Post, Role, Session, SessionDetail, StudentCode, TeacherCode, User, UserSummary};

const SCHEMA_SQL: &str = include_str!("schema.sql");

const SESSION_SELECT: &str = r#"
    SELECT
        s.id, s.title, s.teacher_id, s.created_at, s.updated_at,
        u.email AS teacher_email,
        u.first_name AS teacher_first_name,
        u.last_name AS teacher_last_name,
        u.image_url AS teacher_image_url
    FROM sessions s
        LEFT JOIN users u ON u.id = s.teacher_id
"#;

const POST_SELECT: &str = r#"
    SELECT
        p.id, p.title, p.description, p.date, p.author_id,
        u.email AS author_email,
        u.first_name AS author_first_name,
        u.last_name AS author_last_name,
        u.image_url AS author_image_url
    FROM posts p
        LEFT JOIN users u ON u.id = p.author_id
"#;

/// User Row from database
#[derive(Debug, Clone, sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    image_url: Option<String>,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            image_url: row.image_url,
            role: Role::parse(&row.role),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Session Row joined with its teacher
#[derive(Debug, Clone, sqlx::FromRow)]
struct SessionRow {
    id: String,
    title: String,
    teacher_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    teacher_email: Option<String>,
    teacher_first_name: Option<String>,
    teacher_last_name: Option<String>,
    teacher_image_url: Option<String>,
}

impl From<SessionRow> for SessionDetail {
    fn from(row: SessionRow) -> Self {
        let teacher = row.teacher_email.map(|email| UserSummary {
            id: row.teacher_id.clone(),
            email,
            first_name: row.teacher_first_name,
            last_name: row.teacher_last_name,
            image_url: row.teacher_image_url,
        });
        SessionDetail {
            id: row.id,
            title: row.title,
            teacher_id: row.teacher_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            teacher,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct TeacherCodeRow {
    id: String,
    session_id: String,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TeacherCodeRow> for TeacherCode {
    fn from(row: TeacherCodeRow) -> Self {
        TeacherCode {
            id: row.id,
            session_id: row.session_id,
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct StudentCodeRow {
    id: String,
    session_id: String,
    student_id: String,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<StudentCodeRow> for StudentCode {
    fn from(row: StudentCodeRow) -> Self {
        StudentCode {
            id: row.id,
            session_id: row.session_id,
            student_id: row.student_id,
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct UpsertedStudentCodeRow {
    #[sqlx(flatten)]
    code: StudentCodeRow,
    inserted: bool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct SummaryRow {
    id: String,
    email: String,
    first_name: Option<String>,
    last_name: Option<String>,
    image_url: Option<String>,
}

/// Post Row joined with its author
#[derive(Debug, Clone, sqlx::FromRow)]
struct PostRow {
    id: i64,
    title: String,
    description: String,
    date: DateTime<Utc>,
    author_id: String,
    author_email: Option<String>,
    author_first_name: Option<String>,
    author_last_name: Option<String>,
    author_image_url: Option<String>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        let author = row.author_email.map(|email| UserSummary {
            id: row.author_id.clone(),
            email,
            first_name: row.author_first_name,
            last_name: row.author_last_name,
            image_url: row.author_image_url,
        });
        Post {
            id: row.id,
            title: row.title,
            description: row.description,
            date: row.date,
            author_id: row.author_id,
            author,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct BarePostRow {
    id: i64,
    title: String,
    description: String,
    date: DateTime<Utc>,
    author_id: String,
}

/// Database connection pool
pub struct DbClassroom {
    pool: PgPool,
}

impl DbClassroom {
    /// Create a new database connection pool
    ///
    /// # Arguments
    /// * `database_url` - PostgreSQL connection string
    pub async fn new(database_url: &str) -> Result<Self, SqlxError> {
        info!("Connecting to database...");

        let pool = PgPoolOptions::new()
            .max_connections(20)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600)) // Close idle connections after 10 minutes
            .max_lifetime(Duration::from_secs(1800)) // Recycle connections after 30 minutes
            .connect(database_url)
            .await?;

        info!("Database connection pool created successfully");

        Ok(Self { pool })
    }

    /// Create missing tables
    pub async fn init_schema(&self) -> Result<(), SqlxError> {
        sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
        info!("Database schema ready");
        Ok(())
    }

    async fn fetch_session_detail(&self, id: &str) -> Result<Option<SessionDetail>, SqlxError> {
        let query_sql = format!("{} WHERE s.id = $1", SESSION_SELECT);
        let row = sqlx::query_as::<_, SessionRow>(&query_sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(SessionDetail::from))
    }

    async fn fetch_post(&self, id: i64) -> Result<Option<Post>, SqlxError> {
        let query_sql = format!("{} WHERE p.id = $1", POST_SELECT);
        let row = sqlx::query_as::<_, PostRow>(&query_sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Post::from))
    }
}

#[async_trait]
impl ClassroomStore for DbClassroom {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn get_user(&self, id: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn ensure_user(&self, user: NewUser) -> StoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, first_name, last_name, role)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET id = users.id
            RETURNING *
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn find_teacher(&self) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE role = 'teacher' ORDER BY updated_at DESC LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn assign_teacher(&self, user_id: &str) -> StoreResult<User> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE users SET role = 'student', updated_at = now() WHERE role = 'teacher' AND id <> $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query_as::<_, UserRow>("UPDATE users SET role = 'teacher', updated_at = now() WHERE id = $1 RETURNING *")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;

        match row {
            Some(row) => {
                tx.commit().await?;
                info!("User {} is now the teacher", user_id);
                Ok(row.into())
            }
            None => {
                tx.rollback().await?;
                error!("Cannot assign teacher role, user {} not found", user_id);
                Err(StoreError::Missing(format!("user {}", user_id)))
            }
        }
    }

    async fn list_sessions(&self) -> StoreResult<Vec<SessionDetail>> {
        let query_sql = format!("{} ORDER BY s.created_at DESC", SESSION_SELECT);
        let rows = sqlx::query_as::<_, SessionRow>(&query_sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(SessionDetail::from).collect())
    }

    async fn get_session(&self, id: &str) -> StoreResult<Option<Session>> {
        Ok(self.fetch_session_detail(id).await?.map(|detail| detail.session()))
    }

    async fn get_session_detail(&self, id: &str) -> StoreResult<Option<SessionDetail>> {
        Ok(self.fetch_session_detail(id).await?)
    }

    async fn create_session(&self, title: &str, teacher_id: &str, initial_code: &str) -> StoreResult<SessionDetail> {
        let session_id = Uuid::new_v4().to_string();
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO sessions (id, title, teacher_id) VALUES ($1, $2, $3)")
            .bind(&session_id)
            .bind(title)
            .bind(teacher_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO teacher_codes (id, session_id, content) VALUES ($1, $2, $3)")
            .bind(Uuid::new_v4().to_string())
            .bind(&session_id)
            .bind(initial_code)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!("Session {} created for teacher {}", session_id, teacher_id);

        self.fetch_session_detail(&session_id)
            .await?
            .ok_or_else(|| StoreError::Missing(format!("session {}", session_id)))
    }

    async fn ensure_session(&self, id: &str, title: &str, teacher_id: &str) -> StoreResult<SessionDetail> {
        sqlx::query("INSERT INTO sessions (id, title, teacher_id) VALUES ($1, $2, $3) ON CONFLICT (id) DO NOTHING")
            .bind(id)
            .bind(title)
            .bind(teacher_id)
            .execute(&self.pool)
            .await?;

        self.fetch_session_detail(id)
            .await?
            .ok_or_else(|| StoreError::Missing(format!("session {}", id)))
    }

    async fn get_teacher_code(&self, session_id: &str) -> StoreResult<Option<TeacherCode>> {
        let row = sqlx::query_as::<_, TeacherCodeRow>("SELECT * FROM teacher_codes WHERE session_id = $1")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(TeacherCode::from))
    }

    async fn upsert_teacher_code(&self, session_id: &str, content: &str) -> StoreResult<TeacherCode> {
        let row = sqlx::query_as::<_, TeacherCodeRow>(
            r#"
            INSERT INTO teacher_codes (id, session_id, content)
            VALUES ($1, $2, $3)
            ON CONFLICT (session_id) DO UPDATE SET content = EXCLUDED.content, updated_at = now()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(session_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn get_student_code(&self, session_id: &str, student_id: &str) -> StoreResult<Option<StudentCode>> {
        let row = sqlx::query_as::<_, StudentCodeRow>("SELECT * FROM student_codes WHERE session_id = $1 AND student_id = $2")
            .bind(session_id)
            .bind(student_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(StudentCode::from))
    }

    async fn upsert_student_code(&self, session_id: &str, student_id: &str, content: &str) -> StoreResult<(StudentCode, bool)> {
        // xmax is zero only for a row inserted by this statement
        let row = sqlx::query_as::<_, UpsertedStudentCodeRow>(
            r#"
            INSERT INTO student_codes (id, session_id, student_id, content)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (session_id, student_id) DO UPDATE SET content = EXCLUDED.content, updated_at = now()
            RETURNING id, session_id, student_id, content, created_at, updated_at, (xmax = 0) AS inserted
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(session_id)
        .bind(student_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;
        Ok((row.code.into(), row.inserted))
    }

    async fn list_session_students(&self, session_id: &str) -> StoreResult<Vec<UserSummary>> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT u.id, u.email, u.first_name, u.last_name, u.image_url
            FROM users u
            WHERE EXISTS (
                SELECT 1 FROM student_codes sc WHERE sc.student_id = u.id AND sc.session_id = $1
            )
            ORDER BY u.first_name ASC, u.last_name ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| UserSummary {
                id: row.id,
                email: row.email,
                first_name: row.first_name,
                last_name: row.last_name,
                image_url: row.image_url,
            })
            .collect())
    }

    async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        let query_sql = format!("{} ORDER BY p.date DESC, p.id DESC", POST_SELECT);
        let rows = sqlx::query_as::<_, PostRow>(&query_sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn get_post(&self, id: i64) -> StoreResult<Option<Post>> {
        Ok(self.fetch_post(id).await?)
    }

    async fn create_post(&self, author_id: &str, title: &str, description: &str) -> StoreResult<Post> {
        let id: i64 = sqlx::query_scalar("INSERT INTO posts (title, description, author_id) VALUES ($1, $2, $3) RETURNING id")
            .bind(title)
            .bind(description)
            .bind(author_id)
            .fetch_one(&self.pool)
            .await?;

        self.fetch_post(id)
            .await?
            .ok_or_else(|| StoreError::Missing(format!("post {}", id)))
    }

    async fn update_post(&self, id: i64, title: &str, description: &str) -> StoreResult<Option<Post>> {
        let updated: Option<i64> = sqlx::query_scalar("UPDATE posts SET title = $2, description = $3 WHERE id = $1 RETURNING id")
            .bind(id)
            .bind(title)
            .bind(description)
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(id) => Ok(self.fetch_post(id).await?),
            None => Ok(None),
        }
    }

    async fn delete_post(&self, id: i64) -> StoreResult<Option<Post>> {
        let row = sqlx::query_as::<_, BarePostRow>("DELETE FROM posts WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| Post {
            id: row.id,
            title: row.title,
            description: row.description,
            date: row.date,
            author_id: row.author_id,
            author: None,
        }))
    }
}
