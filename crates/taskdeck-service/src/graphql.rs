//! Named GraphQL operations against the project/task schema and the
//! request/response envelope they travel in.
//!
//! Every object selection asks for `__typename` so responses can be
//! normalised into the [`ResponseCache`](crate::cache::ResponseCache).

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
}

/// A named operation: its document, the root field it selects and, for
/// mutations, the payload field wrapping the returned entity.
#[derive(Debug, Clone, Copy)]
pub struct Operation {
    pub name: &'static str,
    pub kind: OperationKind,
    pub root_field: &'static str,
    pub payload_field: Option<&'static str>,
    pub document: &'static str,
}

macro_rules! organization_fields {
    () => {
        "fragment OrganizationFields on OrganizationType { __typename id name slug contactEmail createdAt }"
    };
}

macro_rules! project_fields {
    () => {
        "fragment ProjectFields on ProjectType { __typename id name description status dueDate createdAt taskCount completedTasks completionRate organization { __typename id slug } }"
    };
}

macro_rules! task_fields {
    () => {
        "fragment TaskFields on TaskType { __typename id title description status assigneeEmail dueDate createdAt project { __typename id name } }"
    };
}

macro_rules! comment_fields {
    () => {
        "fragment CommentFields on TaskCommentType { __typename id content authorEmail createdAt task { __typename id } }"
    };
}

pub const GET_ORGANIZATIONS: Operation = Operation {
    name: "GetOrganizations",
    kind: OperationKind::Query,
    root_field: "organizations",
    payload_field: None,
    document: concat!(
        "query GetOrganizations { organizations { ...OrganizationFields } } ",
        organization_fields!()
    ),
};

pub const GET_PROJECTS: Operation = Operation {
    name: "GetProjects",
    kind: OperationKind::Query,
    root_field: "projects",
    payload_field: None,
    document: concat!(
        "query GetProjects($organizationSlug: String!, $status: String) { ",
        "projects(organizationSlug: $organizationSlug, status: $status) { ...ProjectFields } } ",
        project_fields!()
    ),
};

pub const GET_PROJECT: Operation = Operation {
    name: "GetProject",
    kind: OperationKind::Query,
    root_field: "project",
    payload_field: None,
    document: concat!(
        "query GetProject($id: ID!, $organizationSlug: String!) { ",
        "project(id: $id, organizationSlug: $organizationSlug) { ...ProjectFields } } ",
        project_fields!()
    ),
};

pub const GET_PROJECT_STATISTICS: Operation = Operation {
    name: "GetProjectStatistics",
    kind: OperationKind::Query,
    root_field: "projectStatistics",
    payload_field: None,
    document: concat!(
        "query GetProjectStatistics($organizationSlug: String!) { ",
        "projectStatistics(organizationSlug: $organizationSlug) { ",
        "__typename totalProjects activeProjects completedProjects totalTasks completedTasks overallCompletionRate } }"
    ),
};

pub const GET_TASKS: Operation = Operation {
    name: "GetTasks",
    kind: OperationKind::Query,
    root_field: "tasks",
    payload_field: None,
    document: concat!(
        "query GetTasks($projectId: ID!, $organizationSlug: String!, $status: String) { ",
        "tasks(projectId: $projectId, organizationSlug: $organizationSlug, status: $status) { ...TaskFields } } ",
        task_fields!()
    ),
};

pub const GET_TASK: Operation = Operation {
    name: "GetTask",
    kind: OperationKind::Query,
    root_field: "task",
    payload_field: None,
    document: concat!(
        "query GetTask($id: ID!, $organizationSlug: String!) { ",
        "task(id: $id, organizationSlug: $organizationSlug) { ...TaskFields comments { ...CommentFields } } } ",
        task_fields!(),
        " ",
        comment_fields!()
    ),
};

pub const CREATE_ORGANIZATION: Operation = Operation {
    name: "CreateOrganization",
    kind: OperationKind::Mutation,
    root_field: "createOrganization",
    payload_field: Some("organization"),
    document: concat!(
        "mutation CreateOrganization($name: String!, $slug: String!, $contactEmail: String!) { ",
        "createOrganization(name: $name, slug: $slug, contactEmail: $contactEmail) { ",
        "organization { ...OrganizationFields } } } ",
        organization_fields!()
    ),
};

pub const CREATE_PROJECT: Operation = Operation {
    name: "CreateProject",
    kind: OperationKind::Mutation,
    root_field: "createProject",
    payload_field: Some("project"),
    document: concat!(
        "mutation CreateProject($organizationSlug: String!, $name: String!, $description: String, ",
        "$status: String, $dueDate: Date) { ",
        "createProject(organizationSlug: $organizationSlug, name: $name, description: $description, ",
        "status: $status, dueDate: $dueDate) { project { ...ProjectFields } } } ",
        project_fields!()
    ),
};

pub const UPDATE_PROJECT: Operation = Operation {
    name: "UpdateProject",
    kind: OperationKind::Mutation,
    root_field: "updateProject",
    payload_field: Some("project"),
    document: concat!(
        "mutation UpdateProject($id: ID!, $organizationSlug: String!, $name: String, ",
        "$description: String, $status: String, $dueDate: Date) { ",
        "updateProject(id: $id, organizationSlug: $organizationSlug, name: $name, ",
        "description: $description, status: $status, dueDate: $dueDate) { project { ...ProjectFields } } } ",
        project_fields!()
    ),
};

pub const CREATE_TASK: Operation = Operation {
    name: "CreateTask",
    kind: OperationKind::Mutation,
    root_field: "createTask",
    payload_field: Some("task"),
    document: concat!(
        "mutation CreateTask($projectId: ID!, $organizationSlug: String!, $title: String!, ",
        "$description: String, $status: String, $assigneeEmail: String, $dueDate: DateTime) { ",
        "createTask(projectId: $projectId, organizationSlug: $organizationSlug, title: $title, ",
        "description: $description, status: $status, assigneeEmail: $assigneeEmail, dueDate: $dueDate) { ",
        "task { ...TaskFields } } } ",
        task_fields!()
    ),
};

pub const UPDATE_TASK: Operation = Operation {
    name: "UpdateTask",
    kind: OperationKind::Mutation,
    root_field: "updateTask",
    payload_field: Some("task"),
    document: concat!(
        "mutation UpdateTask($id: ID!, $organizationSlug: String!, $title: String, ",
        "$description: String, $status: String, $assigneeEmail: String, $dueDate: DateTime) { ",
        "updateTask(id: $id, organizationSlug: $organizationSlug, title: $title, ",
        "description: $description, status: $status, assigneeEmail: $assigneeEmail, dueDate: $dueDate) { ",
        "task { ...TaskFields } } } ",
        task_fields!()
    ),
};

pub const CREATE_TASK_COMMENT: Operation = Operation {
    name: "CreateTaskComment",
    kind: OperationKind::Mutation,
    root_field: "createTaskComment",
    payload_field: Some("comment"),
    document: concat!(
        "mutation CreateTaskComment($taskId: ID!, $organizationSlug: String!, $content: String!, ",
        "$authorEmail: String!) { ",
        "createTaskComment(taskId: $taskId, organizationSlug: $organizationSlug, content: $content, ",
        "authorEmail: $authorEmail) { comment { ...CommentFields } } } ",
        comment_fields!()
    ),
};

/// Used by `health_check`; any well-formed envelope counts as reachable.
pub const PING: Operation = Operation {
    name: "Ping",
    kind: OperationKind::Query,
    root_field: "__typename",
    payload_field: None,
    document: "query Ping { __typename }",
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest<'a, V: Serialize> {
    pub query: &'a str,
    pub operation_name: &'a str,
    pub variables: &'a V,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphqlResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlError {
    pub message: String,
    #[serde(default)]
    pub path: Vec<Value>,
}

impl GraphqlResponse {
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.message.clone()).collect()
    }

    /// The value under the operation's root field (and payload field for
    /// mutations). `None` when the field is missing or `null`.
    pub fn field(&self, op: &Operation) -> Option<&Value> {
        let root = self.data.as_ref()?.get(op.root_field)?;
        let value = match op.payload_field {
            Some(payload) => root.get(payload)?,
            None => root,
        };
        (!value.is_null()).then_some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn documents_name_their_operation() {
        for op in [
            GET_ORGANIZATIONS,
            GET_PROJECTS,
            GET_PROJECT,
            GET_PROJECT_STATISTICS,
            GET_TASKS,
            GET_TASK,
            CREATE_ORGANIZATION,
            CREATE_PROJECT,
            UPDATE_PROJECT,
            CREATE_TASK,
            UPDATE_TASK,
            CREATE_TASK_COMMENT,
        ] {
            let keyword = match op.kind {
                OperationKind::Query => "query",
                OperationKind::Mutation => "mutation",
            };
            assert!(
                op.document.starts_with(&format!("{keyword} {} ", op.name))
                    || op.document.starts_with(&format!("{keyword} {}(", op.name)),
                "{} document header",
                op.name
            );
            assert!(op.document.contains(op.root_field));
            if let Some(payload) = op.payload_field {
                assert!(op.document.contains(&format!("{payload} {{")));
            }
        }
    }

    #[test]
    fn request_envelope_shape() {
        let vars = json!({ "organizationSlug": "acme", "status": null });
        let req = GraphqlRequest {
            query: GET_PROJECTS.document,
            operation_name: GET_PROJECTS.name,
            variables: &vars,
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["operationName"], "GetProjects");
        assert_eq!(v["variables"]["status"], Value::Null);
    }

    #[test]
    fn field_unwraps_mutation_payload() {
        let resp: GraphqlResponse = serde_json::from_value(json!({
            "data": { "createProject": { "project": { "id": "1" } } }
        }))
        .unwrap();
        assert_eq!(resp.field(&CREATE_PROJECT).unwrap()["id"], "1");
        assert!(resp.errors.is_empty());
    }

    #[test]
    fn null_field_is_none_and_errors_are_collected() {
        let resp: GraphqlResponse = serde_json::from_value(json!({
            "data": { "project": null },
            "errors": [{ "message": "Project with id '9' not found", "path": ["project"] }]
        }))
        .unwrap();
        assert!(resp.field(&GET_PROJECT).is_none());
        assert_eq!(resp.error_messages(), vec!["Project with id '9' not found"]);
    }
}
