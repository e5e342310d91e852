use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::organization::OrganizationRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Active,
    Completed,
    OnHold,
}

impl ProjectStatus {
    pub const ALL: &[ProjectStatus] = &[
        ProjectStatus::Active,
        ProjectStatus::Completed,
        ProjectStatus::OnHold,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "ACTIVE",
            ProjectStatus::Completed => "COMPLETED",
            ProjectStatus::OnHold => "ON_HOLD",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "Active",
            ProjectStatus::Completed => "Completed",
            ProjectStatus::OnHold => "On Hold",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(ProjectStatus::Active),
            "COMPLETED" => Some(ProjectStatus::Completed),
            "ON_HOLD" => Some(ProjectStatus::OnHold),
            _ => None,
        }
    }

    /// Next value when cycling a status picker.
    pub fn cycle(&self) -> Self {
        match self {
            ProjectStatus::Active => ProjectStatus::Completed,
            ProjectStatus::Completed => ProjectStatus::OnHold,
            ProjectStatus::OnHold => ProjectStatus::Active,
        }
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::Active
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: ProjectStatus,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub task_count: i64,
    #[serde(default)]
    pub completed_tasks: i64,
    /// Percentage of tasks marked Done, computed server-side.
    #[serde(default)]
    pub completion_rate: f64,
    pub organization: OrganizationRef,
}

/// Read-only aggregate over one organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatistics {
    pub total_projects: i64,
    pub active_projects: i64,
    pub completed_projects: i64,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub overall_completion_rate: f64,
}

/// Variables for the `projects` list query.
///
/// `status` is always sent; `None` goes over the wire as an explicit
/// `null` meaning "all statuses".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFilter {
    pub organization_slug: String,
    pub status: Option<ProjectStatus>,
}

impl ProjectFilter {
    pub fn all(organization_slug: &str) -> Self {
        Self {
            organization_slug: organization_slug.to_string(),
            status: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    pub organization_slug: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

/// Partial update. Outer `None` leaves a field untouched. `Some(None)` sends
/// an explicit null, which the server ignores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    pub id: String,
    pub organization_slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
}
