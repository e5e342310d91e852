//! Editable form state for projects, tasks and comments.
//!
//! Drafts hold raw text exactly as typed. Validation trims, parses and turns
//! a draft into the request struct for the matching mutation; a draft that
//! fails validation never produces a request.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::comment::CreateTaskComment;
use crate::error::ValidationError;
use crate::project::{CreateProject, Project, ProjectStatus, UpdateProject};
use crate::task::{CreateTask, Task, TaskStatus, UpdateTask};

pub const PROJECT_NAME_REQUIRED: &str = "Project name is required";
pub const PROJECT_DUE_DATE_INVALID: &str = "Due date must be a valid date (YYYY-MM-DD)";
pub const TASK_TITLE_REQUIRED: &str = "Task title is required";
pub const TASK_DUE_DATE_INVALID: &str = "Due date must be YYYY-MM-DD or YYYY-MM-DDTHH:MM";
pub const COMMENT_AUTHOR_REQUIRED: &str = "Author email is required";
pub const COMMENT_CONTENT_REQUIRED: &str = "Comment content is required";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    /// `YYYY-MM-DD`, blank for none.
    pub due_date: String,
}

/// Trimmed, parsed project fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectFields {
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub due_date: Option<NaiveDate>,
}

impl ProjectDraft {
    /// Blank draft for "create new": Active, no due date.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_project(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            description: project.description.clone(),
            status: project.status,
            due_date: project
                .due_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<ProjectFields, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::single(PROJECT_NAME_REQUIRED));
        }
        let due_date = match self.due_date.trim() {
            "" => None,
            text => Some(
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .map_err(|_| ValidationError::single(PROJECT_DUE_DATE_INVALID))?,
            ),
        };
        Ok(ProjectFields {
            name: name.to_string(),
            description: self.description.trim().to_string(),
            status: self.status,
            due_date,
        })
    }

    pub fn to_create(&self, organization_slug: &str) -> Result<CreateProject, ValidationError> {
        let fields = self.validate()?;
        Ok(CreateProject {
            organization_slug: organization_slug.to_string(),
            name: fields.name,
            description: Some(fields.description).filter(|d| !d.is_empty()),
            status: Some(fields.status),
            due_date: fields.due_date,
        })
    }

    /// Every field is sent; a blank due date clears it.
    pub fn to_update(
        &self,
        id: &str,
        organization_slug: &str,
    ) -> Result<UpdateProject, ValidationError> {
        let fields = self.validate()?;
        Ok(UpdateProject {
            id: id.to_string(),
            organization_slug: organization_slug.to_string(),
            name: Some(fields.name),
            description: Some(fields.description),
            status: Some(fields.status),
            due_date: fields.due_date.map(Some),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub assignee_email: String,
    /// `YYYY-MM-DDTHH:MM`, `YYYY-MM-DD HH:MM` or `YYYY-MM-DD`; blank for none.
    pub due_date: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskFields {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub assignee_email: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status.clone(),
            assignee_email: task.assignee_email.clone().unwrap_or_default(),
            due_date: task
                .due_date
                .map(|d| d.format("%Y-%m-%dT%H:%M").to_string())
                .unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<TaskFields, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::single(TASK_TITLE_REQUIRED));
        }
        let due_date = match self.due_date.trim() {
            "" => None,
            text => Some(
                parse_due_timestamp(text)
                    .ok_or_else(|| ValidationError::single(TASK_DUE_DATE_INVALID))?,
            ),
        };
        let assignee = self.assignee_email.trim();
        Ok(TaskFields {
            title: title.to_string(),
            description: self.description.trim().to_string(),
            status: self.status.clone(),
            assignee_email: (!assignee.is_empty()).then(|| assignee.to_string()),
            due_date,
        })
    }

    pub fn to_create(
        &self,
        project_id: &str,
        organization_slug: &str,
    ) -> Result<CreateTask, ValidationError> {
        let fields = self.validate()?;
        Ok(CreateTask {
            project_id: project_id.to_string(),
            organization_slug: organization_slug.to_string(),
            title: fields.title,
            description: Some(fields.description).filter(|d| !d.is_empty()),
            status: Some(fields.status),
            assignee_email: fields.assignee_email,
            due_date: fields.due_date,
        })
    }

    pub fn to_update(&self, id: &str, organization_slug: &str) -> Result<UpdateTask, ValidationError> {
        let fields = self.validate()?;
        Ok(UpdateTask {
            id: id.to_string(),
            organization_slug: organization_slug.to_string(),
            title: Some(fields.title),
            description: Some(fields.description),
            status: Some(fields.status),
            assignee_email: Some(Some(fields.assignee_email.unwrap_or_default())),
            due_date: fields.due_date.map(Some),
        })
    }
}

/// Normalises a date or date-time typed by the user to a UTC timestamp.
pub fn parse_due_timestamp(text: &str) -> Option<DateTime<Utc>> {
    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.and_utc());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommentDraft {
    pub author_email: String,
    pub content: String,
}

impl CommentDraft {
    pub fn is_empty(&self) -> bool {
        self.author_email.is_empty() && self.content.is_empty()
    }

    pub fn clear(&mut self) {
        self.author_email.clear();
        self.content.clear();
    }

    pub fn to_create(
        &self,
        task_id: &str,
        organization_slug: &str,
    ) -> Result<CreateTaskComment, ValidationError> {
        let author = self.author_email.trim();
        let content = self.content.trim();
        let mut messages = Vec::new();
        if author.is_empty() {
            messages.push(COMMENT_AUTHOR_REQUIRED.to_string());
        }
        if content.is_empty() {
            messages.push(COMMENT_CONTENT_REQUIRED.to_string());
        }
        if !messages.is_empty() {
            return Err(ValidationError { messages });
        }
        Ok(CreateTaskComment {
            task_id: task_id.to_string(),
            organization_slug: organization_slug.to_string(),
            content: content.to_string(),
            author_email: author.to_string(),
        })
    }
}
