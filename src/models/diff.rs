use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    Same,
    Added,
    Removed,
    Modified,
}

/// How lines present on both sides but different are reported
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DiffPolicy {
    /// Reported as `modified`
    #[default]
    Distinct,
    /// Reported as `added`
    CollapseModified,
}

/// One row of the positional comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DiffLine {
    pub index: usize,
    pub teacher: String,
    pub student: String,
    #[serde(rename = "type")]
    pub kind: DiffKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DiffSummary {
    pub same: usize,
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct DiffRequest {
    pub teacher: String,
    pub student: String,
    pub policy: Option<DiffPolicy>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct DiffResponse {
    pub message: String,
    pub lines: Vec<DiffLine>,
    pub summary: DiffSummary,
}
