//! In-process GraphQL endpoint for tests.
//!
//! Serves the same operations `GraphqlService` sends, keyed on
//! `operationName`, against in-memory rows. Every request is recorded so
//! tests can assert on what went over the wire (or that nothing did), and
//! individual operations can be made to fail, answer with a canned body,
//! or stall.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use crate::graphql::{self, Operation};

const OPERATIONS: &[Operation] = &[
    graphql::GET_ORGANIZATIONS,
    graphql::GET_PROJECTS,
    graphql::GET_PROJECT,
    graphql::GET_PROJECT_STATISTICS,
    graphql::GET_TASKS,
    graphql::GET_TASK,
    graphql::CREATE_ORGANIZATION,
    graphql::CREATE_PROJECT,
    graphql::UPDATE_PROJECT,
    graphql::CREATE_TASK,
    graphql::UPDATE_TASK,
    graphql::CREATE_TASK_COMMENT,
    graphql::PING,
];

/// One request as received by the mock endpoint.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub operation_name: String,
    pub variables: Value,
}

#[derive(Debug, Clone)]
struct CannedResponse {
    status: StatusCode,
    body: Value,
}

struct OrgRow {
    id: String,
    name: String,
    slug: String,
    contact_email: String,
    created_at: DateTime<Utc>,
}

struct ProjectRow {
    id: String,
    org_id: String,
    name: String,
    description: String,
    status: String,
    due_date: Option<String>,
    created_at: DateTime<Utc>,
}

struct TaskRow {
    id: String,
    project_id: String,
    title: String,
    description: String,
    status: String,
    assignee_email: String,
    due_date: Option<String>,
    created_at: DateTime<Utc>,
}

struct CommentRow {
    id: String,
    task_id: String,
    content: String,
    author_email: String,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct MockState {
    next_id: u64,
    orgs: Vec<OrgRow>,
    projects: Vec<ProjectRow>,
    tasks: Vec<TaskRow>,
    comments: Vec<CommentRow>,
    requests: Vec<RecordedRequest>,
    canned: HashMap<String, CannedResponse>,
    delays: HashMap<String, Duration>,
}

/// Shared handle on the mock's data and request log.
#[derive(Clone, Default)]
pub struct MockApi {
    state: Arc<Mutex<MockState>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/graphql/", post(handle_graphql))
            .with_state(self.clone())
    }

    // -- Seeding --

    pub fn seed_organization(&self, name: &str, slug: &str) -> String {
        let mut s = self.lock();
        let id = s.allocate_id();
        let created_at = s.timestamp();
        s.orgs.push(OrgRow {
            id: id.clone(),
            name: name.to_string(),
            slug: slug.to_string(),
            contact_email: format!("admin@{slug}.test"),
            created_at,
        });
        id
    }

    /// Panics when the organization slug is unknown.
    pub fn seed_project(&self, organization_slug: &str, name: &str, status: &str) -> String {
        let mut s = self.lock();
        let org_id = s
            .org_by_slug(organization_slug)
            .map(|o| o.id.clone())
            .unwrap_or_else(|| panic!("no organization '{organization_slug}'"));
        let id = s.allocate_id();
        let created_at = s.timestamp();
        s.projects.push(ProjectRow {
            id: id.clone(),
            org_id,
            name: name.to_string(),
            description: String::new(),
            status: status.to_string(),
            due_date: None,
            created_at,
        });
        id
    }

    pub fn seed_task(&self, project_id: &str, title: &str, status: &str) -> String {
        let mut s = self.lock();
        let id = s.allocate_id();
        let created_at = s.timestamp();
        s.tasks.push(TaskRow {
            id: id.clone(),
            project_id: project_id.to_string(),
            title: title.to_string(),
            description: String::new(),
            status: status.to_string(),
            assignee_email: String::new(),
            due_date: None,
            created_at,
        });
        id
    }

    pub fn seed_comment(&self, task_id: &str, author_email: &str, content: &str) -> String {
        let mut s = self.lock();
        let id = s.allocate_id();
        let created_at = s.timestamp();
        s.comments.push(CommentRow {
            id: id.clone(),
            task_id: task_id.to_string(),
            content: content.to_string(),
            author_email: author_email.to_string(),
            created_at,
        });
        id
    }

    /// Deletes a task behind the client's back.
    pub fn remove_task(&self, id: &str) {
        let mut s = self.lock();
        s.tasks.retain(|t| t.id != id);
        s.comments.retain(|c| c.task_id != id);
    }

    pub fn set_task_status(&self, id: &str, status: &str) {
        let mut s = self.lock();
        if let Some(task) = s.tasks.iter_mut().find(|t| t.id == id) {
            task.status = status.to_string();
        }
    }

    // -- Behaviour injection --

    /// Answer `operation` with a field error and `null` data until cleared.
    pub fn fail_operation(&self, operation: &str, message: &str) {
        let root = OPERATIONS
            .iter()
            .find(|op| op.name == operation)
            .map_or("unknown", |op| op.root_field);
        self.respond_with(
            operation,
            200,
            json!({ "data": { root: null }, "errors": [{ "message": message, "path": [root] }] }),
        );
    }

    /// Answer `operation` with a fixed status and body until cleared.
    pub fn respond_with(&self, operation: &str, status: u16, body: Value) {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.lock()
            .canned
            .insert(operation.to_string(), CannedResponse { status, body });
    }

    /// Hold every `operation` response for `delay` before answering.
    pub fn delay_operation(&self, operation: &str, delay: Duration) {
        self.lock().delays.insert(operation.to_string(), delay);
    }

    pub fn clear_overrides(&self) {
        let mut s = self.lock();
        s.canned.clear();
        s.delays.clear();
    }

    // -- Inspection --

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Variables of every recorded request for `operation`, oldest first.
    pub fn variables_for(&self, operation: &str) -> Vec<Value> {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.operation_name == operation)
            .map(|r| r.variables.clone())
            .collect()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.variables_for(operation).len()
    }

    pub fn clear_requests(&self) {
        self.lock().requests.clear();
    }
}

async fn handle_graphql(State(api): State<MockApi>, Json(body): Json<Value>) -> Response {
    let operation_name = body["operationName"].as_str().unwrap_or_default().to_string();
    let variables = body.get("variables").cloned().unwrap_or_else(|| json!({}));

    let delay = {
        let mut s = api.lock();
        s.requests.push(RecordedRequest {
            operation_name: operation_name.clone(),
            variables: variables.clone(),
        });
        s.delays.get(&operation_name).copied()
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let mut s = api.lock();
    if let Some(canned) = s.canned.get(&operation_name).cloned() {
        return (canned.status, Json(canned.body)).into_response();
    }

    let Some(op) = OPERATIONS.iter().find(|op| op.name == operation_name) else {
        let message = format!("Unknown operation '{operation_name}'");
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "errors": [{ "message": message }] })),
        )
            .into_response();
    };

    let envelope = match s.resolve(op.name, &variables) {
        Ok(value) => {
            let value = match op.payload_field {
                Some(payload) => json!({ payload: value }),
                None => value,
            };
            json!({ "data": { op.root_field: value } })
        }
        Err(message) => json!({
            "data": { op.root_field: null },
            "errors": [{ "message": message, "path": [op.root_field] }]
        }),
    };
    Json(envelope).into_response()
}

fn str_var<'a>(vars: &'a Value, key: &str) -> Option<&'a str> {
    vars.get(key).and_then(Value::as_str)
}

fn required<'a>(vars: &'a Value, key: &str) -> Result<&'a str, String> {
    str_var(vars, key).ok_or_else(|| format!("Variable '${key}' is required"))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn rate(done: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        round2(done as f64 / total as f64 * 100.0)
    }
}

impl MockState {
    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }

    /// Strictly increasing creation times so server order is creation order.
    fn timestamp(&self) -> DateTime<Utc> {
        let base = Utc
            .with_ymd_and_hms(2024, 5, 1, 9, 0, 0)
            .single()
            .unwrap_or_default();
        base + ChronoDuration::minutes(self.next_id as i64)
    }

    fn org_by_slug(&self, slug: &str) -> Option<&OrgRow> {
        self.orgs.iter().find(|o| o.slug == slug)
    }

    fn org_scope(&self, vars: &Value) -> Result<String, String> {
        let slug = required(vars, "organizationSlug")?;
        self.org_by_slug(slug)
            .map(|o| o.id.clone())
            .ok_or_else(|| format!("Organization with slug '{slug}' not found"))
    }

    fn project_in_org(&self, id: &str, org_id: &str, slug: &str) -> Result<usize, String> {
        self.projects
            .iter()
            .position(|p| p.id == id && p.org_id == org_id)
            .ok_or_else(|| format!("Project with id '{id}' not found in organization '{slug}'"))
    }

    fn task_in_org(&self, id: &str, org_id: &str, slug: &str) -> Result<usize, String> {
        self.tasks
            .iter()
            .position(|t| {
                t.id == id
                    && self
                        .projects
                        .iter()
                        .any(|p| p.id == t.project_id && p.org_id == org_id)
            })
            .ok_or_else(|| format!("Task with id '{id}' not found in organization '{slug}'"))
    }

    fn resolve(&mut self, operation: &str, vars: &Value) -> Result<Value, String> {
        match operation {
            "Ping" => Ok(json!("Query")),
            "GetOrganizations" => Ok(Value::Array(
                self.orgs.iter().map(|o| self.org_json(o)).collect(),
            )),
            "GetProjects" => {
                let org_id = self.org_scope(vars)?;
                let status = str_var(vars, "status");
                Ok(Value::Array(
                    self.projects
                        .iter()
                        .filter(|p| p.org_id == org_id)
                        .filter(|p| status.map_or(true, |s| p.status == s))
                        .map(|p| self.project_json(p))
                        .collect(),
                ))
            }
            "GetProject" => {
                let org_id = self.org_scope(vars)?;
                let idx = self.project_in_org(
                    required(vars, "id")?,
                    &org_id,
                    required(vars, "organizationSlug")?,
                )?;
                Ok(self.project_json(&self.projects[idx]))
            }
            "GetProjectStatistics" => {
                let org_id = self.org_scope(vars)?;
                Ok(self.statistics_json(&org_id))
            }
            "GetTasks" => {
                let org_id = self.org_scope(vars)?;
                let slug = required(vars, "organizationSlug")?;
                let project_id = required(vars, "projectId")?;
                self.project_in_org(project_id, &org_id, slug)?;
                let status = str_var(vars, "status");
                Ok(Value::Array(
                    self.tasks
                        .iter()
                        .filter(|t| t.project_id == project_id)
                        .filter(|t| status.map_or(true, |s| t.status == s))
                        .map(|t| self.task_json(t, false))
                        .collect(),
                ))
            }
            "GetTask" => {
                let org_id = self.org_scope(vars)?;
                let idx = self.task_in_org(
                    required(vars, "id")?,
                    &org_id,
                    required(vars, "organizationSlug")?,
                )?;
                Ok(self.task_json(&self.tasks[idx], true))
            }
            "CreateOrganization" => {
                let slug = required(vars, "slug")?;
                if self.org_by_slug(slug).is_some() {
                    return Err(format!("Organization with slug '{slug}' already exists"));
                }
                let row = OrgRow {
                    id: self.allocate_id(),
                    name: required(vars, "name")?.to_string(),
                    slug: slug.to_string(),
                    contact_email: required(vars, "contactEmail")?.to_string(),
                    created_at: self.timestamp(),
                };
                let value = self.org_json(&row);
                self.orgs.push(row);
                Ok(value)
            }
            "CreateProject" => {
                let org_id = self.org_scope(vars)?;
                let name = required(vars, "name")?.trim();
                if name.is_empty() {
                    return Err("Project name is required".into());
                }
                let row = ProjectRow {
                    id: self.allocate_id(),
                    org_id,
                    name: name.to_string(),
                    description: str_var(vars, "description").unwrap_or_default().to_string(),
                    status: str_var(vars, "status").unwrap_or("ACTIVE").to_string(),
                    due_date: str_var(vars, "dueDate").map(str::to_string),
                    created_at: self.timestamp(),
                };
                let value = self.project_json(&row);
                self.projects.push(row);
                Ok(value)
            }
            "UpdateProject" => {
                let org_id = self.org_scope(vars)?;
                let idx = self.project_in_org(
                    required(vars, "id")?,
                    &org_id,
                    required(vars, "organizationSlug")?,
                )?;
                let row = &mut self.projects[idx];
                if let Some(name) = str_var(vars, "name") {
                    row.name = name.to_string();
                }
                if let Some(description) = str_var(vars, "description") {
                    row.description = description.to_string();
                }
                if let Some(status) = str_var(vars, "status") {
                    row.status = status.to_string();
                }
                if let Some(due) = str_var(vars, "dueDate") {
                    row.due_date = Some(due.to_string());
                }
                Ok(self.project_json(&self.projects[idx]))
            }
            "CreateTask" => {
                let org_id = self.org_scope(vars)?;
                let slug = required(vars, "organizationSlug")?;
                let project_id = required(vars, "projectId")?.to_string();
                self.project_in_org(&project_id, &org_id, slug)?;
                let title = required(vars, "title")?.trim();
                if title.is_empty() {
                    return Err("Task title is required".into());
                }
                let row = TaskRow {
                    id: self.allocate_id(),
                    project_id,
                    title: title.to_string(),
                    description: str_var(vars, "description").unwrap_or_default().to_string(),
                    status: str_var(vars, "status").unwrap_or("TODO").to_string(),
                    assignee_email: str_var(vars, "assigneeEmail")
                        .unwrap_or_default()
                        .to_string(),
                    due_date: str_var(vars, "dueDate").map(str::to_string),
                    created_at: self.timestamp(),
                };
                let value = self.task_json(&row, false);
                self.tasks.push(row);
                Ok(value)
            }
            "UpdateTask" => {
                let org_id = self.org_scope(vars)?;
                let idx = self.task_in_org(
                    required(vars, "id")?,
                    &org_id,
                    required(vars, "organizationSlug")?,
                )?;
                let row = &mut self.tasks[idx];
                if let Some(title) = str_var(vars, "title") {
                    row.title = title.to_string();
                }
                if let Some(description) = str_var(vars, "description") {
                    row.description = description.to_string();
                }
                if let Some(status) = str_var(vars, "status") {
                    row.status = status.to_string();
                }
                // null leaves both untouched; "" unassigns
                if let Some(assignee) = str_var(vars, "assigneeEmail") {
                    row.assignee_email = assignee.to_string();
                }
                if let Some(due) = str_var(vars, "dueDate") {
                    row.due_date = Some(due.to_string());
                }
                Ok(self.task_json(&self.tasks[idx], false))
            }
            "CreateTaskComment" => {
                let org_id = self.org_scope(vars)?;
                let task_id = required(vars, "taskId")?.to_string();
                self.task_in_org(&task_id, &org_id, required(vars, "organizationSlug")?)?;
                let row = CommentRow {
                    id: self.allocate_id(),
                    task_id,
                    content: required(vars, "content")?.to_string(),
                    author_email: required(vars, "authorEmail")?.to_string(),
                    created_at: self.timestamp(),
                };
                let value = comment_json(&row);
                self.comments.push(row);
                Ok(value)
            }
            other => Err(format!("Unknown operation '{other}'")),
        }
    }

    fn org_json(&self, o: &OrgRow) -> Value {
        json!({
            "__typename": "OrganizationType",
            "id": o.id,
            "name": o.name,
            "slug": o.slug,
            "contactEmail": o.contact_email,
            "createdAt": o.created_at.to_rfc3339(),
        })
    }

    fn project_json(&self, p: &ProjectRow) -> Value {
        let tasks: Vec<&TaskRow> = self.tasks.iter().filter(|t| t.project_id == p.id).collect();
        let done = tasks.iter().filter(|t| t.status == "DONE").count();
        let slug = self
            .orgs
            .iter()
            .find(|o| o.id == p.org_id)
            .map(|o| o.slug.clone())
            .unwrap_or_default();
        json!({
            "__typename": "ProjectType",
            "id": p.id,
            "name": p.name,
            "description": p.description,
            "status": p.status,
            "dueDate": p.due_date,
            "createdAt": p.created_at.to_rfc3339(),
            "taskCount": tasks.len(),
            "completedTasks": done,
            "completionRate": rate(done, tasks.len()),
            "organization": { "__typename": "OrganizationType", "id": p.org_id, "slug": slug },
        })
    }

    fn task_json(&self, t: &TaskRow, with_comments: bool) -> Value {
        let project_name = self
            .projects
            .iter()
            .find(|p| p.id == t.project_id)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        let mut value = json!({
            "__typename": "TaskType",
            "id": t.id,
            "title": t.title,
            "description": t.description,
            "status": t.status,
            "assigneeEmail": t.assignee_email,
            "dueDate": t.due_date,
            "createdAt": t.created_at.to_rfc3339(),
            "project": { "__typename": "ProjectType", "id": t.project_id, "name": project_name },
        });
        if with_comments {
            value["comments"] = Value::Array(
                self.comments
                    .iter()
                    .filter(|c| c.task_id == t.id)
                    .map(comment_json)
                    .collect(),
            );
        }
        value
    }

    fn statistics_json(&self, org_id: &str) -> Value {
        let projects: Vec<&ProjectRow> =
            self.projects.iter().filter(|p| p.org_id == org_id).collect();
        let tasks: Vec<&TaskRow> = self
            .tasks
            .iter()
            .filter(|t| projects.iter().any(|p| p.id == t.project_id))
            .collect();
        let done = tasks.iter().filter(|t| t.status == "DONE").count();
        json!({
            "__typename": "ProjectStatisticsType",
            "totalProjects": projects.len(),
            "activeProjects": projects.iter().filter(|p| p.status == "ACTIVE").count(),
            "completedProjects": projects.iter().filter(|p| p.status == "COMPLETED").count(),
            "totalTasks": tasks.len(),
            "completedTasks": done,
            "overallCompletionRate": rate(done, tasks.len()),
        })
    }
}

fn comment_json(c: &CommentRow) -> Value {
    json!({
        "__typename": "TaskCommentType",
        "id": c.id,
        "content": c.content,
        "authorEmail": c.author_email,
        "createdAt": c.created_at.to_rfc3339(),
        "task": { "__typename": "TaskType", "id": c.task_id },
    })
}

/// A running mock endpoint. `endpoint` is the full GraphQL URL.
pub struct TestServer {
    pub endpoint: String,
    pub api: MockApi,
    _handle: tokio::task::JoinHandle<()>,
}

/// Spawn the mock endpoint on a random port.
pub async fn spawn_test_server() -> TestServer {
    spawn_with(MockApi::new()).await
}

/// Spawn the mock endpoint over pre-seeded data.
pub async fn spawn_with(api: MockApi) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let endpoint = format!("http://{addr}/graphql/");
    let app = api.router();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestServer {
        endpoint,
        api,
        _handle: handle,
    }
}
