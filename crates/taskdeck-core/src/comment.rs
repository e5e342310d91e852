use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRef {
    pub id: String,
}

/// Append-only from the client's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskComment {
    pub id: String,
    pub content: String,
    pub author_email: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub task: Option<TaskRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskComment {
    pub task_id: String,
    pub organization_slug: String,
    pub content: String,
    pub author_email: String,
}
