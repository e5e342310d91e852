use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use taskdeck_core::comment::{CreateTaskComment, TaskComment};
use taskdeck_core::organization::{CreateOrganization, Organization};
use taskdeck_core::project::{
    CreateProject, Project, ProjectFilter, ProjectStatistics, UpdateProject,
};
use taskdeck_core::task::{CreateTask, Task, TaskFilter, UpdateTask};
use tracing::{debug, warn};

use crate::cache::ResponseCache;
use crate::graphql::{self, GraphqlRequest, GraphqlResponse, Operation, OperationKind};
use crate::{DeckService, ServiceError};

pub const PROJECT_TYPENAME: &str = "ProjectType";
pub const TASK_TYPENAME: &str = "TaskType";

/// Async GraphQL client implementation of `DeckService`.
///
/// Holds a single endpoint and a normalised response cache. Nothing here
/// refetches on its own: callers re-read after every write.
pub struct GraphqlService {
    endpoint: String,
    client: Client,
    cache: Mutex<ResponseCache>,
}

impl GraphqlService {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            client: Client::new(),
            cache: Mutex::new(ResponseCache::new()),
        }
    }

    /// Check the endpoint answers GraphQL at all.
    pub async fn health_check(&self) -> Result<(), ServiceError> {
        let resp = self.send(&graphql::PING, &json!({})).await?;
        if resp.data.is_some() || !resp.errors.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::Decode("empty GraphQL envelope".into()))
        }
    }

    /// Last known state of a task, including comments if the single-task
    /// query has been seen for it.
    pub fn cached_task(&self, id: &str) -> Option<Task> {
        self.lock_cache().read_entity(TASK_TYPENAME, id)
    }

    pub fn cached_project(&self, id: &str) -> Option<Project> {
        self.lock_cache().read_entity(PROJECT_TYPENAME, id)
    }

    /// Last cached result of the project list query for this filter.
    pub fn cached_projects(&self, filter: &ProjectFilter) -> Option<Vec<Project>> {
        let args = serde_json::to_value(filter).ok()?;
        self.lock_cache()
            .read_root(graphql::GET_PROJECTS.root_field, &args)
    }

    fn lock_cache(&self) -> MutexGuard<'_, ResponseCache> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn send<V: Serialize>(
        &self,
        op: &Operation,
        variables: &V,
    ) -> Result<GraphqlResponse, ServiceError> {
        debug!(operation = op.name, "sending GraphQL request");
        let body = GraphqlRequest {
            query: op.document,
            operation_name: op.name,
            variables,
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Network(format!("connection failed: {e}")))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| ServiceError::Network(format!("read body: {e}")))?;

        let parsed = serde_json::from_str::<GraphqlResponse>(&text);
        if !status.is_success() {
            // GraphQL servers may answer field errors with a 4xx and a valid envelope.
            return match parsed {
                Ok(envelope) if !envelope.errors.is_empty() => Ok(envelope),
                _ => Err(ServiceError::Network(format!("HTTP {status}: {}", text.trim()))),
            };
        }
        parsed.map_err(|e| ServiceError::Decode(format!("json decode: {e}")))
    }

    /// Runs an operation, records its data in the cache and returns the
    /// value under its root (or payload) field.
    async fn execute<V: Serialize>(&self, op: &Operation, variables: &V) -> Result<Value, ServiceError> {
        let resp = self.send(op, variables).await?;

        if let Some(field) = resp.field(op) {
            let mut cache = self.lock_cache();
            match op.kind {
                OperationKind::Query => {
                    let args = serde_json::to_value(variables)
                        .map_err(|e| ServiceError::Decode(format!("variables: {e}")))?;
                    cache.write_root(op.root_field, &args, field);
                }
                OperationKind::Mutation => cache.write_entities(field),
            }
        }

        if !resp.errors.is_empty() {
            let messages = resp.error_messages();
            warn!(operation = op.name, errors = ?messages, "GraphQL errors");
            return Err(ServiceError::Graphql(messages));
        }

        resp.field(op)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("{} returned null", op.root_field)))
    }

    async fn execute_one<V: Serialize, T: DeserializeOwned>(
        &self,
        op: &Operation,
        variables: &V,
    ) -> Result<T, ServiceError> {
        let value = self.execute(op, variables).await?;
        serde_json::from_value(value)
            .map_err(|e| ServiceError::Decode(format!("{}: {e}", op.root_field)))
    }

    async fn execute_list<V: Serialize, T: DeserializeOwned>(
        &self,
        op: &Operation,
        variables: &V,
        identity: &[&str],
    ) -> Result<Vec<T>, ServiceError> {
        let value = self.execute(op, variables).await?;
        decode_rows(op, value, identity)
    }
}

/// Decodes a list field, dropping rows that are null, lack any of the
/// `identity` JSON pointers, or fail to decode.
pub(crate) fn decode_rows<T: DeserializeOwned>(
    op: &Operation,
    value: Value,
    identity: &[&str],
) -> Result<Vec<T>, ServiceError> {
    let Value::Array(rows) = value else {
        return Err(ServiceError::Decode(format!("{}: expected a list", op.root_field)));
    };
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let missing = identity
            .iter()
            .find(|ptr| row.pointer(ptr).map_or(true, Value::is_null));
        if let Some(ptr) = missing {
            warn!(operation = op.name, field = ptr, "dropping row without identity");
            continue;
        }
        match serde_json::from_value(row) {
            Ok(item) => out.push(item),
            Err(e) => warn!(operation = op.name, error = %e, "dropping undecodable row"),
        }
    }
    Ok(out)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScopedId<'a> {
    id: &'a str,
    organization_slug: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OrganizationScope<'a> {
    organization_slug: &'a str,
}

#[async_trait]
impl DeckService for GraphqlService {
    async fn list_organizations(&self) -> Result<Vec<Organization>, ServiceError> {
        self.execute_list(&graphql::GET_ORGANIZATIONS, &json!({}), &["/id"])
            .await
    }

    async fn create_organization(
        &self,
        input: &CreateOrganization,
    ) -> Result<Organization, ServiceError> {
        self.execute_one(&graphql::CREATE_ORGANIZATION, input).await
    }

    async fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>, ServiceError> {
        self.execute_list(&graphql::GET_PROJECTS, filter, &["/id", "/organization/id"])
            .await
    }

    async fn get_project(
        &self,
        id: &str,
        organization_slug: &str,
    ) -> Result<Project, ServiceError> {
        self.execute_one(
            &graphql::GET_PROJECT,
            &ScopedId {
                id,
                organization_slug,
            },
        )
        .await
    }

    async fn project_statistics(
        &self,
        organization_slug: &str,
    ) -> Result<ProjectStatistics, ServiceError> {
        self.execute_one(
            &graphql::GET_PROJECT_STATISTICS,
            &OrganizationScope { organization_slug },
        )
        .await
    }

    async fn create_project(&self, input: &CreateProject) -> Result<Project, ServiceError> {
        self.execute_one(&graphql::CREATE_PROJECT, input).await
    }

    async fn update_project(&self, input: &UpdateProject) -> Result<Project, ServiceError> {
        self.execute_one(&graphql::UPDATE_PROJECT, input).await
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, ServiceError> {
        self.execute_list(&graphql::GET_TASKS, filter, &["/id"]).await
    }

    async fn get_task(&self, id: &str, organization_slug: &str) -> Result<Task, ServiceError> {
        self.execute_one(
            &graphql::GET_TASK,
            &ScopedId {
                id,
                organization_slug,
            },
        )
        .await
    }

    async fn create_task(&self, input: &CreateTask) -> Result<Task, ServiceError> {
        self.execute_one(&graphql::CREATE_TASK, input).await
    }

    async fn update_task(&self, input: &UpdateTask) -> Result<Task, ServiceError> {
        self.execute_one(&graphql::UPDATE_TASK, input).await
    }

    async fn create_task_comment(
        &self,
        input: &CreateTaskComment,
    ) -> Result<TaskComment, ServiceError> {
        self.execute_one(&graphql::CREATE_TASK_COMMENT, input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project_row(id: Value, org_id: Value) -> Value {
        json!({
            "__typename": "ProjectType",
            "id": id,
            "name": "P",
            "description": "",
            "status": "ACTIVE",
            "dueDate": null,
            "createdAt": "2024-05-01T10:00:00+00:00",
            "taskCount": 0,
            "completedTasks": 0,
            "completionRate": 0.0,
            "organization": { "__typename": "OrganizationType", "id": org_id, "slug": "acme" }
        })
    }

    #[test]
    fn rows_without_identity_are_dropped() {
        let rows = json!([
            project_row(json!("1"), json!("1")),
            null,
            project_row(Value::Null, json!("1")),
            project_row(json!("4"), Value::Null),
            project_row(json!("5"), json!("1")),
        ]);
        let projects: Vec<Project> =
            decode_rows(&graphql::GET_PROJECTS, rows, &["/id", "/organization/id"]).unwrap();
        let ids: Vec<&str> = projects.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["1", "5"]);
    }

    #[test]
    fn undecodable_rows_are_dropped() {
        let mut bad = project_row(json!("2"), json!("1"));
        bad["status"] = json!("ARCHIVED");
        let rows = json!([project_row(json!("1"), json!("1")), bad]);
        let projects: Vec<Project> = decode_rows(&graphql::GET_PROJECTS, rows, &["/id"]).unwrap();
        assert_eq!(projects.len(), 1);
    }

    #[test]
    fn non_list_is_a_decode_error() {
        let err = decode_rows::<Project>(&graphql::GET_PROJECTS, json!({}), &["/id"]).unwrap_err();
        assert!(matches!(err, ServiceError::Decode(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_network_error() {
        // Port 9 (discard) is closed on test hosts.
        let svc = GraphqlService::new("http://127.0.0.1:9/graphql/");
        let err = svc.list_organizations().await.unwrap_err();
        assert!(matches!(err, ServiceError::Network(_)), "{err:?}");
    }
}
