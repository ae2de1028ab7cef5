use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{CodeType, TextSnapshot, TextType, UserSummary};

/// RFC 3339 timestamp stamped on every live event
pub fn event_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Session streams carry the session and user, the text sync channel the current texts
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changed_text: Option<String>,
    pub timestamp: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HeartbeatEvent {
    pub timestamp: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CodeUpdateEvent {
    pub code_type: CodeType,
    pub content: String,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    pub timestamp: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudentJoinedEvent {
    pub session_id: String,
    pub student: UserSummary,
    pub timestamp: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TextUpdateEvent {
    pub text_type: TextType,
    pub content: String,
    pub timestamp: String,
}

/// Events pushed to clients over a live stream
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum LiveEvent {
    #[serde(rename = "connected")]
    Connected(ConnectedEvent),
    #[serde(rename = "heartbeat")]
    Heartbeat(HeartbeatEvent),
    #[serde(rename = "code_update")]
    CodeUpdate(CodeUpdateEvent),
    #[serde(rename = "student_joined")]
    StudentJoined(StudentJoinedEvent),
    #[serde(rename = "text_update")]
    TextUpdate(TextUpdateEvent),
}

impl LiveEvent {
    pub fn connected(session_id: &str, user_id: &str) -> Self {
        LiveEvent::Connected(ConnectedEvent {
            session_id: Some(session_id.to_string()),
            user_id: Some(user_id.to_string()),
            original_text: None,
            changed_text: None,
            timestamp: event_timestamp(),
        })
    }

    /// First event on the text sync channel
    pub fn text_sync_connected(snapshot: &TextSnapshot) -> Self {
        LiveEvent::Connected(ConnectedEvent {
            session_id: None,
            user_id: None,
            original_text: Some(snapshot.original_text.clone()),
            changed_text: Some(snapshot.changed_text.clone()),
            timestamp: event_timestamp(),
        })
    }

    pub fn heartbeat() -> Self {
        LiveEvent::Heartbeat(HeartbeatEvent { timestamp: event_timestamp() })
    }

    /// `student_id` is only carried for student code.
    pub fn code_update(session_id: &str, code_type: CodeType, content: &str, student_id: Option<&str>) -> Self {
        let student_id = match code_type {
            CodeType::Student => student_id.map(str::to_string),
            CodeType::Teacher => None,
        };
        LiveEvent::CodeUpdate(CodeUpdateEvent {
            code_type,
            content: content.to_string(),
            session_id: session_id.to_string(),
            student_id,
            timestamp: event_timestamp(),
        })
    }

    pub fn student_joined(session_id: &str, student: UserSummary) -> Self {
        LiveEvent::StudentJoined(StudentJoinedEvent {
            session_id: session_id.to_string(),
            student,
            timestamp: event_timestamp(),
        })
    }

    pub fn text_update(text_type: TextType, content: &str) -> Self {
        LiveEvent::TextUpdate(TextUpdateEvent {
            text_type,
            content: content.to_string(),
            timestamp: event_timestamp(),
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LiveEvent::Connected(_) => "connected",
            LiveEvent::Heartbeat(_) => "heartbeat",
            LiveEvent::CodeUpdate(_) => "code_update",
            LiveEvent::StudentJoined(_) => "student_joined",
            LiveEvent::TextUpdate(_) => "text_update",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn code_update_uses_camel_case_and_type_tag() {
        let event = LiveEvent::code_update("s1", CodeType::Student, "x=1", Some("u1"));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "code_update");
        assert_eq!(value["codeType"], "student");
        assert_eq!(value["sessionId"], "s1");
        assert_eq!(value["studentId"], "u1");
        assert_eq!(value["content"], "x=1");
        assert!(value["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn teacher_update_omits_student_id() {
        let event = LiveEvent::code_update("s1", CodeType::Teacher, "x=1", Some("u1"));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["codeType"], "teacher");
        assert!(value.get("studentId").is_none());
    }

    #[test]
    fn student_joined_omits_missing_names() {
        let student = UserSummary {
            id: "u1".to_string(),
            email: "u1@example.com".to_string(),
            first_name: Some("Ada".to_string()),
            last_name: None,
            image_url: None,
        };
        let value = serde_json::to_value(LiveEvent::student_joined("s1", student)).unwrap();
        assert_eq!(value["type"], "student_joined");
        assert_eq!(value["student"], json!({"id": "u1", "email": "u1@example.com", "firstName": "Ada"}));
    }

    #[test]
    fn connected_parses_back() {
        let raw = r#"{"type":"connected","sessionId":"s1","userId":"u1","timestamp":"2024-01-01T00:00:00.000Z"}"#;
        let event: LiveEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.kind(), "connected");
    }

    #[test]
    fn session_connected_has_no_texts() {
        let value = serde_json::to_value(LiveEvent::connected("s1", "u1")).unwrap();
        assert_eq!(value["sessionId"], "s1");
        assert!(value.get("originalText").is_none());
    }

    #[test]
    fn text_sync_connected_carries_both_texts() {
        let snapshot = TextSnapshot { original_text: "a".into(), changed_text: String::new() };
        let value = serde_json::to_value(LiveEvent::text_sync_connected(&snapshot)).unwrap();
        assert_eq!(value["type"], "connected");
        assert_eq!(value["originalText"], "a");
        assert_eq!(value["changedText"], "");
        assert!(value.get("sessionId").is_none());
    }

    #[test]
    fn text_update_names_the_side() {
        let value = serde_json::to_value(LiveEvent::text_update(TextType::Changed, "b")).unwrap();
        assert_eq!(value["type"], "text_update");
        assert_eq!(value["textType"], "changed");
        assert_eq!(value["content"], "b");
    }
}
