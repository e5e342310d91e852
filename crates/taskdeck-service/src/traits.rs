use async_trait::async_trait;
use taskdeck_core::comment::{CreateTaskComment, TaskComment};
use taskdeck_core::organization::{CreateOrganization, Organization};
use taskdeck_core::project::{
    CreateProject, Project, ProjectFilter, ProjectStatistics, UpdateProject,
};
use taskdeck_core::task::{CreateTask, Task, TaskFilter, UpdateTask};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    /// The request never produced a usable response (connection, HTTP status).
    #[error("network error: {0}")]
    Network(String),

    /// Field-level errors reported by the API alongside (possibly partial) data.
    #[error("{}", .0.join(", "))]
    Graphql(Vec<String>),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("not found: {0}")]
    NotFound(String),
}

impl ServiceError {
    /// User-facing messages, in the order the server reported them.
    pub fn messages(&self) -> Vec<String> {
        match self {
            ServiceError::Graphql(messages) => messages.clone(),
            other => vec![other.to_string()],
        }
    }
}

/// Abstraction over the remote project/task API.
///
/// The TUI programs against this trait; `GraphqlService` talks to the real
/// endpoint. Every read and write that touches projects or tasks is scoped
/// by organization slug.
#[async_trait]
pub trait DeckService: Send + Sync {
    // -- Organizations --
    async fn list_organizations(&self) -> Result<Vec<Organization>, ServiceError>;
    async fn create_organization(
        &self,
        input: &CreateOrganization,
    ) -> Result<Organization, ServiceError>;

    // -- Projects --
    async fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>, ServiceError>;
    async fn get_project(
        &self,
        id: &str,
        organization_slug: &str,
    ) -> Result<Project, ServiceError>;
    async fn project_statistics(
        &self,
        organization_slug: &str,
    ) -> Result<ProjectStatistics, ServiceError>;
    async fn create_project(&self, input: &CreateProject) -> Result<Project, ServiceError>;
    async fn update_project(&self, input: &UpdateProject) -> Result<Project, ServiceError>;

    // -- Tasks --
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, ServiceError>;
    /// Single task including its comment thread.
    async fn get_task(&self, id: &str, organization_slug: &str) -> Result<Task, ServiceError>;
    async fn create_task(&self, input: &CreateTask) -> Result<Task, ServiceError>;
    async fn update_task(&self, input: &UpdateTask) -> Result<Task, ServiceError>;

    // -- Comments --
    async fn create_task_comment(
        &self,
        input: &CreateTaskComment,
    ) -> Result<TaskComment, ServiceError>;
}
