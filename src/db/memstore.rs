use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ClassroomStore, StoreError, StoreResult};
use crate::models::{NewUser, Post, Role, Session, SessionDetail, StudentCode, TeacherCode, User, UserSummary};

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    sessions: Vec<Session>,
    teacher_codes: HashMap<String, TeacherCode>,
    student_codes: HashMap<(String, String), StudentCode>,
    posts: Vec<Post>,
    next_post_id: i64,
}

impl Tables {
    fn summary(&self, user_id: &str) -> Option<UserSummary> {
        self.users.get(user_id).map(UserSummary::from)
    }

    fn detail(&self, session: &Session) -> SessionDetail {
        SessionDetail {
            id: session.id.clone(),
            title: session.title.clone(),
            teacher_id: session.teacher_id.clone(),
            created_at: session.created_at,
            updated_at: session.updated_at,
            teacher: self.summary(&session.teacher_id),
        }
    }

    fn with_author(&self, post: &Post) -> Post {
        Post {
            author: self.summary(&post.author_id),
            ..post.clone()
        }
    }
}

/// Process-local store used when no database is configured
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClassroomStore for MemoryStore {
    async fn get_user(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(id).cloned())
    }

    async fn ensure_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let stored = tables.users.entry(user.id.clone()).or_insert_with(|| User {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            image_url: None,
            role: user.role,
            created_at: now,
            updated_at: now,
        });
        Ok(stored.clone())
    }

    async fn find_teacher(&self) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.role == Role::Teacher).cloned())
    }

    async fn assign_teacher(&self, user_id: &str) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(user_id) {
            return Err(StoreError::Missing(format!("user {}", user_id)));
        }
        let now = Utc::now();
        for user in tables.users.values_mut() {
            let role = if user.id == user_id { Role::Teacher } else if user.role == Role::Teacher { Role::Student } else { continue };
            user.role = role;
            user.updated_at = now;
        }
        tables
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| StoreError::Missing(format!("user {}", user_id)))
    }

    async fn list_sessions(&self) -> StoreResult<Vec<SessionDetail>> {
        let tables = self.tables.read().await;
        let mut sessions: Vec<SessionDetail> = tables.sessions.iter().map(|s| tables.detail(s)).collect();
        sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sessions)
    }

    async fn get_session(&self, id: &str) -> StoreResult<Option<Session>> {
        let tables = self.tables.read().await;
        Ok(tables.sessions.iter().find(|s| s.id == id).cloned())
    }

    async fn get_session_detail(&self, id: &str) -> StoreResult<Option<SessionDetail>> {
        let tables = self.tables.read().await;
        Ok(tables.sessions.iter().find(|s| s.id == id).map(|s| tables.detail(s)))
    }

    async fn create_session(&self, title: &str, teacher_id: &str, initial_code: &str) -> StoreResult<SessionDetail> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            teacher_id: teacher_id.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.teacher_codes.insert(session.id.clone(), TeacherCode {
            id: Uuid::new_v4().to_string(),
            session_id: session.id.clone(),
            content: initial_code.to_string(),
            created_at: now,
            updated_at: now,
        });
        tables.sessions.push(session.clone());
        Ok(tables.detail(&session))
    }

    async fn ensure_session(&self, id: &str, title: &str, teacher_id: &str) -> StoreResult<SessionDetail> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.sessions.iter().find(|s| s.id == id) {
            return Ok(tables.detail(existing));
        }
        let now = Utc::now();
        let session = Session {
            id: id.to_string(),
            title: title.to_string(),
            teacher_id: teacher_id.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.sessions.push(session.clone());
        Ok(tables.detail(&session))
    }

    async fn get_teacher_code(&self, session_id: &str) -> StoreResult<Option<TeacherCode>> {
        Ok(self.tables.read().await.teacher_codes.get(session_id).cloned())
    }

    async fn upsert_teacher_code(&self, session_id: &str, content: &str) -> StoreResult<TeacherCode> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let code = tables
            .teacher_codes
            .entry(session_id.to_string())
            .or_insert_with(|| TeacherCode {
                id: Uuid::new_v4().to_string(),
                session_id: session_id.to_string(),
                content: String::new(),
                created_at: now,
                updated_at: now,
            });
        code.content = content.to_string();
        code.updated_at = now;
        Ok(code.clone())
    }

    async fn get_student_code(&self, session_id: &str, student_id: &str) -> StoreResult<Option<StudentCode>> {
        let key = (session_id.to_string(), student_id.to_string());
        Ok(self.tables.read().await.student_codes.get(&key).cloned())
    }

    async fn upsert_student_code(&self, session_id: &str, student_id: &str, content: &str) -> StoreResult<(StudentCode, bool)> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let key = (session_id.to_string(), student_id.to_string());
        let created = !tables.student_codes.contains_key(&key);
        let code = tables.student_codes.entry(key).or_insert_with(|| StudentCode {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            student_id: student_id.to_string(),
            content: String::new(),
            created_at: now,
            updated_at: now,
        });
        code.content = content.to_string();
        code.updated_at = now;
        Ok((code.clone(), created))
    }

    async fn list_session_students(&self, session_id: &str) -> StoreResult<Vec<UserSummary>> {
        let tables = self.tables.read().await;
        let mut students: Vec<UserSummary> = tables
            .student_codes
            .values()
            .filter(|code| code.session_id == session_id)
            .filter_map(|code| tables.summary(&code.student_id))
            .collect();
        // Nulls sort last, as in Postgres
        students.sort_by(|a, b| {
            (a.first_name.is_none(), &a.first_name, a.last_name.is_none(), &a.last_name)
                .cmp(&(b.first_name.is_none(), &b.first_name, b.last_name.is_none(), &b.last_name))
        });
        Ok(students)
    }

    async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        let tables = self.tables.read().await;
        let mut posts: Vec<Post> = tables.posts.iter().map(|p| tables.with_author(p)).collect();
        posts.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(posts)
    }

    async fn get_post(&self, id: i64) -> StoreResult<Option<Post>> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.id == id).map(|p| tables.with_author(p)))
    }

    async fn create_post(&self, author_id: &str, title: &str, description: &str) -> StoreResult<Post> {
        let mut tables = self.tables.write().await;
        tables.next_post_id += 1;
        let post = Post {
            id: tables.next_post_id,
            title: title.to_string(),
            description: description.to_string(),
            date: Utc::now(),
            author_id: author_id.to_string(),
            author: None,
        };
        tables.posts.push(post.clone());
        Ok(tables.with_author(&post))
    }

    async fn update_post(&self, id: i64, title: &str, description: &str) -> StoreResult<Option<Post>> {
        let mut tables = self.tables.write().await;
        let updated = match tables.posts.iter_mut().find(|p| p.id == id) {
            Some(post) => {
                post.title = title.to_string();
                post.description = description.to_string();
                post.clone()
            }
            None => return Ok(None),
        };
        Ok(Some(tables.with_author(&updated)))
    }

    async fn delete_post(&self, id: i64) -> StoreResult<Option<Post>> {
        let mut tables = self.tables.write().await;
        let position = tables.posts.iter().position(|p| p.id == id);
        Ok(position.map(|i| tables.posts.remove(i)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn user(store: &MemoryStore, id: &str, first: Option<&str>, role: Role) -> User {
        store
            .ensure_user(NewUser {
                id: id.to_string(),
                email: format!("{}@example.com", id),
                first_name: first.map(str::to_string),
                last_name: None,
                role,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn student_code_upsert_reports_first_creation_only() {
        let store = MemoryStore::new();
        user(&store, "t", None, Role::Teacher).await;
        let session = store.create_session("Intro", "t", "// start").await.unwrap();

        let (first, created) = store.upsert_student_code(&session.id, "s", "a").await.unwrap();
        assert!(created);
        let (second, created) = store.upsert_student_code(&session.id, "s", "b").await.unwrap();
        assert!(!created);
        assert_eq!(first.id, second.id);
        assert_eq!(second.content, "b");
    }

    #[tokio::test]
    async fn create_session_seeds_teacher_code() {
        let store = MemoryStore::new();
        user(&store, "t", None, Role::Teacher).await;
        let session = store.create_session("Intro", "t", "// start").await.unwrap();
        assert_eq!(session.teacher.unwrap().id, "t");
        let code = store.get_teacher_code(&session.id).await.unwrap().unwrap();
        assert_eq!(code.content, "// start");
    }

    #[tokio::test]
    async fn ensure_user_keeps_existing_role() {
        let store = MemoryStore::new();
        user(&store, "u", None, Role::Teacher).await;
        let again = user(&store, "u", None, Role::Student).await;
        assert_eq!(again.role, Role::Teacher);
    }

    #[tokio::test]
    async fn assign_teacher_demotes_previous() {
        let store = MemoryStore::new();
        user(&store, "old", None, Role::Teacher).await;
        user(&store, "new", None, Role::Student).await;
        let teacher = store.assign_teacher("new").await.unwrap();
        assert_eq!(teacher.role, Role::Teacher);
        assert_eq!(store.get_user("old").await.unwrap().unwrap().role, Role::Student);
        assert_eq!(store.find_teacher().await.unwrap().unwrap().id, "new");
        assert!(store.assign_teacher("ghost").await.is_err());
    }

    #[tokio::test]
    async fn students_sorted_by_name_with_unnamed_last() {
        let store = MemoryStore::new();
        user(&store, "t", None, Role::Teacher).await;
        user(&store, "anon", None, Role::Student).await;
        user(&store, "bo", Some("Bo"), Role::Student).await;
        user(&store, "al", Some("Al"), Role::Student).await;
        let session = store.create_session("Intro", "t", "").await.unwrap();
        for id in ["anon", "bo", "al"] {
            store.upsert_student_code(&session.id, id, "x").await.unwrap();
        }
        let ids: Vec<String> = store
            .list_session_students(&session.id)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["al", "bo", "anon"]);
    }

    #[tokio::test]
    async fn post_lifecycle() {
        let store = MemoryStore::new();
        user(&store, "a", None, Role::Student).await;
        let post = store.create_post("a", "Hello", "World").await.unwrap();
        assert_eq!(post.author.as_ref().unwrap().id, "a");
        let updated = store.update_post(post.id, "Hi", "There").await.unwrap().unwrap();
        assert_eq!(updated.title, "Hi");
        assert!(store.delete_post(post.id).await.unwrap().is_some());
        assert!(store.get_post(post.id).await.unwrap().is_none());
        assert!(store.update_post(post.id, "x", "y").await.unwrap().is_none());
    }
}
