use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Which of the two shared texts an update replaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TextType {
    Original,
    Changed,
}

impl TextType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "original" => Some(TextType::Original),
            "changed" => Some(TextType::Changed),
            _ => None,
        }
    }
}

/// Both shared texts as currently held by the server
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TextSnapshot {
    pub original_text: String,
    pub changed_text: String,
}

/// Body of a text update. The type stays a raw string so an unknown side is a 400 with a message
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TextUpdateRequest {
    #[serde(rename = "type", default)]
    pub text_type: Option<String>,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TextUpdateResponse {
    pub message: String,
    pub original_text: String,
    pub changed_text: String,
}
