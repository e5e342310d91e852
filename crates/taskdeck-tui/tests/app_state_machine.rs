//! State machine tests for the TUI App.
//!
//! Each test spawns the mock GraphQL endpoint on a separate thread with its
//! own runtime (the App runs its requests on a runtime of its own), builds an
//! App over a real `GraphqlService`, and drives it with key events. `settle`
//! waits until every request the App issued has been applied.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use serde_json::json;
use taskdeck_core::draft::{PROJECT_NAME_REQUIRED, TASK_TITLE_REQUIRED};
use taskdeck_core::task::TaskStatus;
use taskdeck_service::test_helpers::{spawn_with, MockApi};
use taskdeck_service::GraphqlService;
use taskdeck_tui::app::{App, Mode, View, DEFAULT_BOARD_TITLE};
use taskdeck_tui::components::dashboard::{EMPTY_PROJECTS, RETRY_HINT};
use taskdeck_tui::loadable::Loadable;

/// Serve `api` from a background thread and return the endpoint URL.
fn spawn_server(api: MockApi) -> String {
    let (tx, rx) = std::sync::mpsc::sync_channel(1);
    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let server = spawn_with(api).await;
            tx.send(server.endpoint.clone()).unwrap();
            std::future::pending::<()>().await;
        });
    });
    rx.recv().unwrap()
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn char_key(c: char) -> KeyEvent {
    key(KeyCode::Char(c))
}

fn type_str(app: &mut App, text: &str) {
    for c in text.chars() {
        app.handle_key(char_key(c));
    }
}

/// acme: "Website" (ACTIVE, one task per column) and "Mobile" (ON_HOLD).
struct Seeded {
    api: MockApi,
    website: String,
    todo_task: String,
}

fn seeded() -> Seeded {
    let api = MockApi::new();
    api.seed_organization("Acme", "acme");
    let website = api.seed_project("acme", "Website", "ACTIVE");
    api.seed_project("acme", "Mobile", "ON_HOLD");
    let todo_task = api.seed_task(&website, "Write copy", "TODO");
    api.seed_task(&website, "Build", "IN_PROGRESS");
    api.seed_task(&website, "Design", "DONE");
    Seeded {
        api,
        website,
        todo_task,
    }
}

fn make_app(api: &MockApi, org: Option<&str>) -> App {
    let endpoint = spawn_server(api.clone());
    let service = Arc::new(GraphqlService::new(&endpoint));
    let mut app = App::new(service, org.map(str::to_string)).unwrap();
    app.settle();
    app
}

/// Seeded app sitting on the acme dashboard.
fn dashboard_app() -> (App, Seeded) {
    let seeded = seeded();
    let app = make_app(&seeded.api, Some("acme"));
    (app, seeded)
}

/// Seeded app on the Website board.
fn board_app() -> (App, Seeded) {
    let (mut app, seeded) = dashboard_app();
    app.handle_key(key(KeyCode::Enter));
    app.settle();
    (app, seeded)
}

fn screen(app: &App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
    terminal.draw(|frame| app.render(frame)).unwrap();
    let buffer = terminal.backend().buffer();
    let mut out = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            out.push_str(buffer[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

fn project_names(app: &App) -> Vec<String> {
    app.dashboard()
        .projects()
        .iter()
        .map(|p| p.name.clone())
        .collect()
}

// ---- Organization selection ----

#[test]
fn starts_without_organization() {
    let seeded = seeded();
    let app = make_app(&seeded.api, None);
    assert_eq!(app.view(), &View::NoOrganization);
    assert!(matches!(app.mode(), Mode::Normal));
    assert_eq!(app.organizations().loaded().map(Vec::len), Some(1));
    assert!(screen(&app).contains("No organization selected"));
    assert_eq!(seeded.api.count("GetProjects"), 0);
}

#[test]
fn no_organizations_shows_hint() {
    let app = make_app(&MockApi::new(), None);
    assert!(screen(&app).contains("No organizations found"));
}

#[test]
fn preselected_organization_opens_dashboard() {
    let (app, seeded) = dashboard_app();
    assert_eq!(app.view(), &View::Dashboard);
    assert_eq!(app.organization().map(|o| o.slug.as_str()), Some("acme"));
    assert_eq!(project_names(&app), ["Website", "Mobile"]);
    assert_eq!(
        seeded.api.variables_for("GetProjects")[0],
        json!({ "organizationSlug": "acme", "status": null })
    );
    assert_eq!(seeded.api.count("GetProjectStatistics"), 1);
}

#[test]
fn unknown_preselect_stays_unselected() {
    let seeded = seeded();
    let app = make_app(&seeded.api, Some("nope"));
    assert_eq!(app.view(), &View::NoOrganization);
    assert!(app.status_message().unwrap().contains("not found"));
}

#[test]
fn picker_selects_organization() {
    let seeded = seeded();
    let mut app = make_app(&seeded.api, None);

    app.handle_key(char_key('o'));
    assert!(matches!(app.mode(), Mode::OrganizationPicker { .. }));
    app.handle_key(char_key('j'));
    app.handle_key(key(KeyCode::Enter));
    app.settle();

    assert!(matches!(app.mode(), Mode::Normal));
    assert_eq!(app.view(), &View::Dashboard);
    assert_eq!(project_names(&app).len(), 2);
}

#[test]
fn picker_can_clear_organization() {
    let (mut app, _seeded) = board_app();

    app.handle_key(char_key('o'));
    app.handle_key(char_key('k'));
    app.handle_key(key(KeyCode::Enter));

    assert_eq!(app.view(), &View::NoOrganization);
    assert!(app.organization().is_none());
    assert!(matches!(app.tasks(), Loadable::Idle));
}

#[test]
fn picker_escape_keeps_view() {
    let (mut app, _seeded) = dashboard_app();
    app.handle_key(char_key('o'));
    app.handle_key(key(KeyCode::Esc));
    assert!(matches!(app.mode(), Mode::Normal));
    assert_eq!(app.view(), &View::Dashboard);
}

#[test]
fn switching_organization_leaves_board() {
    let seeded = seeded();
    seeded.api.seed_organization("Beta", "beta");
    let beta_project = seeded.api.seed_project("beta", "Internal", "ACTIVE");
    let mut app = make_app(&seeded.api, Some("acme"));
    app.handle_key(key(KeyCode::Enter));
    app.settle();
    assert!(matches!(app.view(), View::Tasks { .. }));

    app.handle_key(char_key('o'));
    app.handle_key(char_key('j'));
    app.handle_key(key(KeyCode::Enter));
    app.settle();

    assert_eq!(app.view(), &View::Dashboard);
    assert_eq!(app.organization().map(|o| o.slug.as_str()), Some("beta"));
    assert_eq!(app.dashboard().projects()[0].id, beta_project);
    assert!(matches!(app.tasks(), Loadable::Idle));
}

// ---- Dashboard ----

#[test]
fn empty_dashboard_state() {
    let api = MockApi::new();
    api.seed_organization("Acme", "acme");
    let app = make_app(&api, Some("acme"));
    assert!(screen(&app).contains(EMPTY_PROJECTS));
}

#[test]
fn dashboard_renders_projects_and_statistics() {
    let (app, _seeded) = dashboard_app();
    let text = screen(&app);
    assert!(text.contains("Website"));
    assert!(text.contains("Mobile"));
    assert!(text.contains("Projects (2) [All]"));
    assert!(text.contains("Statistics"));
}

#[test]
fn statistics_failure_keeps_project_list() {
    let seeded = seeded();
    seeded
        .api
        .fail_operation("GetProjectStatistics", "statistics offline");
    let app = make_app(&seeded.api, Some("acme"));

    assert_eq!(project_names(&app).len(), 2);
    assert!(app.dashboard().statistics.state().error().is_some());
    let text = screen(&app);
    assert!(text.contains("Failed to load statistics"));
    assert!(text.contains("Website"));
}

#[test]
fn project_list_failure_then_retry() {
    let seeded = seeded();
    seeded.api.fail_operation("GetProjects", "database unavailable");
    let mut app = make_app(&seeded.api, Some("acme"));

    let text = screen(&app);
    assert!(text.contains("Failed to load projects: database unavailable"));
    assert!(text.contains(RETRY_HINT));

    seeded.api.clear_overrides();
    app.handle_key(char_key('r'));
    app.settle();
    assert_eq!(project_names(&app), ["Website", "Mobile"]);
}

#[test]
fn dashboard_cursor_survives_refetch() {
    let (mut app, seeded) = dashboard_app();
    let selected = |app: &App| app.dashboard().selected_project().map(|p| p.name.clone());

    app.handle_key(char_key('j'));
    assert_eq!(selected(&app).as_deref(), Some("Mobile"));

    app.handle_key(char_key('r'));
    app.settle();
    assert_eq!(selected(&app).as_deref(), Some("Mobile"));

    app.handle_key(key(KeyCode::Enter));
    app.settle();
    app.handle_key(key(KeyCode::Esc));
    app.settle();
    assert_eq!(app.view(), &View::Dashboard);
    assert_eq!(selected(&app).as_deref(), Some("Mobile"));
    assert_eq!(seeded.api.count("GetProjects"), 3);
}

#[test]
fn filter_sends_status() {
    let (mut app, seeded) = dashboard_app();

    app.handle_key(char_key('f'));
    assert!(matches!(app.mode(), Mode::FilterPick { .. }));
    app.handle_key(char_key('j'));
    app.handle_key(key(KeyCode::Enter));
    app.settle();

    let sent = seeded.api.variables_for("GetProjects");
    assert_eq!(sent.last().unwrap()["status"], "ACTIVE");
    assert_eq!(project_names(&app), ["Website"]);
    assert_eq!(app.dashboard().filter_label(), "Active");
    // Statistics are organization-wide and not refetched on filter change.
    assert_eq!(seeded.api.count("GetProjectStatistics"), 1);
}

#[test]
fn stale_project_list_is_discarded() {
    let (mut app, seeded) = dashboard_app();

    // Slow unfiltered reload, then a fast filtered one overtakes it.
    seeded
        .api
        .delay_operation("GetProjects", Duration::from_millis(400));
    app.handle_key(char_key('r'));
    std::thread::sleep(Duration::from_millis(50));
    seeded.api.clear_overrides();

    app.handle_key(char_key('f'));
    app.handle_key(char_key('j'));
    app.handle_key(key(KeyCode::Enter));
    app.settle();

    assert_eq!(seeded.api.count("GetProjects"), 3);
    assert_eq!(project_names(&app), ["Website"]);
}

// ---- Project form ----

#[test]
fn blank_project_name_is_rejected_locally() {
    let (mut app, seeded) = dashboard_app();

    app.handle_key(char_key('n'));
    assert!(app.is_input_mode());
    app.handle_key(key(KeyCode::Enter));
    type_str(&mut app, "   ");
    app.handle_key(key(KeyCode::Enter));
    app.settle();

    match app.mode() {
        Mode::ProjectForm(form) => assert_eq!(form.errors, [PROJECT_NAME_REQUIRED]),
        other => panic!("expected project form, got {other:?}"),
    }
    assert_eq!(seeded.api.count("CreateProject"), 0);
}

#[test]
fn create_project_refreshes_dashboard() {
    let (mut app, seeded) = dashboard_app();

    app.handle_key(char_key('n'));
    type_str(&mut app, "Docs");
    app.handle_key(key(KeyCode::Enter));
    app.settle();

    assert!(matches!(app.mode(), Mode::Normal));
    assert_eq!(app.status_message(), Some("Project created: Docs"));
    assert!(project_names(&app).contains(&"Docs".to_string()));
    assert_eq!(seeded.api.count("GetProjectStatistics"), 2);
}

#[test]
fn edit_project_leaves_no_stale_entry() {
    let (mut app, seeded) = dashboard_app();

    app.handle_key(char_key('e'));
    match app.mode() {
        Mode::ProjectForm(form) => {
            assert_eq!(form.project_id.as_deref(), Some(seeded.website.as_str()));
            assert_eq!(form.draft.name, "Website");
        }
        other => panic!("expected project form, got {other:?}"),
    }
    for _ in 0.."Website".len() {
        app.handle_key(key(KeyCode::Backspace));
    }
    type_str(&mut app, "Portal");
    app.handle_key(key(KeyCode::Enter));
    app.settle();

    assert_eq!(project_names(&app), ["Portal", "Mobile"]);
    assert_eq!(
        seeded.api.variables_for("UpdateProject")[0]["id"],
        json!(seeded.website)
    );
}

#[test]
fn server_error_stays_in_form() {
    let (mut app, seeded) = dashboard_app();
    seeded
        .api
        .fail_operation("CreateProject", "Project name already taken");

    app.handle_key(char_key('n'));
    type_str(&mut app, "Website");
    app.handle_key(key(KeyCode::Enter));
    app.settle();

    match app.mode() {
        Mode::ProjectForm(form) => {
            assert!(!form.submitting);
            assert_eq!(form.errors, ["Project name already taken"]);
        }
        other => panic!("expected project form, got {other:?}"),
    }
    assert!(screen(&app).contains("Project name already taken"));
}

#[test]
fn duplicate_submit_is_ignored() {
    let (mut app, seeded) = dashboard_app();
    seeded
        .api
        .delay_operation("CreateProject", Duration::from_millis(300));

    app.handle_key(char_key('n'));
    type_str(&mut app, "Docs");
    app.handle_key(key(KeyCode::Enter));
    app.handle_key(key(KeyCode::Enter));
    match app.mode() {
        Mode::ProjectForm(form) => assert!(form.submitting),
        other => panic!("expected project form, got {other:?}"),
    }
    app.settle();

    assert_eq!(seeded.api.count("CreateProject"), 1);
    assert!(matches!(app.mode(), Mode::Normal));
}

#[test]
fn escape_cancels_form() {
    let (mut app, seeded) = dashboard_app();
    app.handle_key(char_key('n'));
    type_str(&mut app, "Draft");
    app.handle_key(key(KeyCode::Esc));
    assert!(matches!(app.mode(), Mode::Normal));
    assert_eq!(seeded.api.count("CreateProject"), 0);
}

// ---- Task board ----

#[test]
fn board_partitions_tasks() {
    let (app, seeded) = board_app();

    assert_eq!(
        app.view(),
        &View::Tasks {
            project_id: seeded.website.clone()
        }
    );
    assert_eq!(
        app.board().column_counts(),
        vec![
            ("To Do".to_string(), 1),
            ("In Progress".to_string(), 1),
            ("Done".to_string(), 1)
        ]
    );
    assert_eq!(app.board_title(), "Website");
    assert_eq!(
        seeded.api.variables_for("GetTasks")[0],
        json!({ "projectId": seeded.website, "organizationSlug": "acme" })
    );

    let text = screen(&app);
    assert!(text.contains("To Do (1)"));
    assert!(text.contains("In Progress (1)"));
    assert!(text.contains("Done (1)"));
}

#[test]
fn unknown_status_lands_in_other_column() {
    let seeded = seeded();
    seeded.api.seed_task(&seeded.website, "Blocked", "BLOCKED");
    let mut app = make_app(&seeded.api, Some("acme"));
    app.handle_key(key(KeyCode::Enter));
    app.settle();

    let counts = app.board().column_counts();
    assert_eq!(counts.len(), 4);
    assert_eq!(counts[3], ("Other".to_string(), 1));
    assert_eq!(
        app.board()
            .column_tasks(&TaskStatus::Other("BLOCKED".into()))
            .len(),
        1
    );
}

#[test]
fn header_falls_back_when_project_fetch_fails() {
    let seeded = seeded();
    seeded.api.fail_operation("GetProject", "boom");
    let mut app = make_app(&seeded.api, Some("acme"));
    app.handle_key(key(KeyCode::Enter));
    app.settle();

    assert_eq!(app.board_title(), DEFAULT_BOARD_TITLE);
    assert_eq!(app.board().column_counts().len(), 3);
    assert!(app.status_message().is_none());
}

#[test]
fn task_list_failure_is_shown() {
    let seeded = seeded();
    seeded.api.fail_operation("GetTasks", "tasks offline");
    let mut app = make_app(&seeded.api, Some("acme"));
    app.handle_key(key(KeyCode::Enter));
    app.settle();

    assert!(app.tasks().error().is_some());
    assert!(screen(&app).contains("Failed to load tasks"));
}

#[test]
fn back_returns_to_dashboard_and_refetches() {
    let (mut app, seeded) = board_app();
    let before = seeded.api.count("GetProjects");

    app.handle_key(key(KeyCode::Esc));
    app.settle();

    assert_eq!(app.view(), &View::Dashboard);
    assert_eq!(seeded.api.count("GetProjects"), before + 1);
    assert!(matches!(app.tasks(), Loadable::Idle));
}

#[test]
fn leaving_board_discards_late_tasks() {
    let seeded = seeded();
    seeded
        .api
        .delay_operation("GetTasks", Duration::from_millis(300));
    let mut app = make_app(&seeded.api, Some("acme"));

    app.handle_key(key(KeyCode::Enter));
    app.handle_key(char_key('b'));
    app.settle();

    assert_eq!(app.view(), &View::Dashboard);
    assert!(matches!(app.tasks(), Loadable::Idle));
    assert!(app.board().is_empty());
}

#[test]
fn blank_task_title_is_rejected_locally() {
    let (mut app, seeded) = board_app();

    app.handle_key(char_key('n'));
    app.handle_key(key(KeyCode::Enter));
    app.settle();

    match app.mode() {
        Mode::TaskForm(form) => assert_eq!(form.errors, [TASK_TITLE_REQUIRED]),
        other => panic!("expected task form, got {other:?}"),
    }
    assert_eq!(seeded.api.count("CreateTask"), 0);
}

#[test]
fn create_task_refreshes_board() {
    let (mut app, seeded) = board_app();

    app.handle_key(char_key('n'));
    type_str(&mut app, "Ship it");
    app.handle_key(key(KeyCode::Enter));
    app.settle();

    assert!(matches!(app.mode(), Mode::Normal));
    assert_eq!(app.board().column_tasks(&TaskStatus::Todo).len(), 2);
    let sent = &seeded.api.variables_for("CreateTask")[0];
    assert_eq!(sent["projectId"], json!(seeded.website));
    assert_eq!(sent["organizationSlug"], "acme");
}

#[test]
fn edit_task_from_board_refreshes_columns() {
    let (mut app, seeded) = board_app();

    app.handle_key(char_key('e'));
    app.handle_key(key(KeyCode::Tab));
    app.handle_key(key(KeyCode::Tab));
    app.handle_key(char_key(' '));
    app.handle_key(key(KeyCode::Enter));
    app.settle();

    assert!(matches!(app.mode(), Mode::Normal));
    assert_eq!(app.status_message(), Some("Task updated: Write copy"));
    let sent = &seeded.api.variables_for("UpdateTask")[0];
    assert_eq!(sent["id"], json!(seeded.todo_task));
    assert_eq!(sent["organizationSlug"], "acme");
    assert_eq!(sent["status"], "IN_PROGRESS");
    assert_eq!(
        app.board().column_counts(),
        vec![
            ("To Do".to_string(), 0),
            ("In Progress".to_string(), 2),
            ("Done".to_string(), 1)
        ]
    );
    assert_eq!(
        app.board().selected_task().map(|t| t.id.as_str()),
        Some(seeded.todo_task.as_str())
    );
}

#[test]
fn clearing_assignee_unassigns_task() {
    let (mut app, seeded) = board_app();
    let to_assignee = |app: &mut App| {
        app.handle_key(char_key('e'));
        for _ in 0..3 {
            app.handle_key(key(KeyCode::Tab));
        }
    };

    to_assignee(&mut app);
    type_str(&mut app, "dev@acme.io");
    app.handle_key(key(KeyCode::Enter));
    app.settle();
    let todo = app.board().column_tasks(&TaskStatus::Todo);
    assert_eq!(todo[0].assignee_email.as_deref(), Some("dev@acme.io"));

    to_assignee(&mut app);
    for _ in 0.."dev@acme.io".len() {
        app.handle_key(key(KeyCode::Backspace));
    }
    app.handle_key(key(KeyCode::Enter));
    app.settle();

    assert_eq!(seeded.api.variables_for("UpdateTask")[1]["assigneeEmail"], "");
    let todo = app.board().column_tasks(&TaskStatus::Todo);
    assert_eq!(todo[0].id, seeded.todo_task);
    assert_eq!(todo[0].assignee_email, None);
}

#[test]
fn refresh_picks_up_server_changes() {
    let (mut app, seeded) = board_app();
    seeded.api.set_task_status(&seeded.todo_task, "DONE");

    app.handle_key(char_key('r'));
    app.settle();

    assert_eq!(app.board().column_tasks(&TaskStatus::Todo).len(), 0);
    assert_eq!(app.board().column_tasks(&TaskStatus::Done).len(), 2);
    // Cursor follows the task into its new column.
    assert_eq!(
        app.board().selected_task().map(|t| t.id.as_str()),
        Some(seeded.todo_task.as_str())
    );
}

// ---- Task detail and comments ----

fn open_detail(app: &mut App) {
    app.handle_key(key(KeyCode::Enter));
    app.settle();
    assert!(matches!(app.mode(), Mode::TaskDetail(_)));
}

fn comment_contents(app: &App) -> Vec<String> {
    match app.mode() {
        Mode::TaskDetail(detail) => detail
            .task()
            .comments
            .iter()
            .map(|c| c.content.clone())
            .collect(),
        other => panic!("expected task detail, got {other:?}"),
    }
}

#[test]
fn comment_thread_in_server_order_then_append() {
    let (mut app, seeded) = board_app();
    seeded.api.seed_comment(&seeded.todo_task, "a@x.com", "first");
    seeded.api.seed_comment(&seeded.todo_task, "b@x.com", "second");
    seeded.api.seed_comment(&seeded.todo_task, "c@x.com", "third");

    open_detail(&mut app);
    assert_eq!(comment_contents(&app), ["first", "second", "third"]);

    app.handle_key(char_key('c'));
    assert!(app.is_input_mode());
    type_str(&mut app, "a@x.com");
    app.handle_key(key(KeyCode::Tab));
    type_str(&mut app, "done");
    app.handle_key(key(KeyCode::Enter));
    app.settle();

    assert_eq!(comment_contents(&app), ["first", "second", "third", "done"]);
    match app.mode() {
        Mode::TaskDetail(detail) => {
            assert!(detail.comments.draft.is_empty());
            assert!(!detail.comments.open);
            assert_eq!(detail.task().comments[3].author_email, "a@x.com");
        }
        other => panic!("expected task detail, got {other:?}"),
    }
    let sent = &seeded.api.variables_for("CreateTaskComment")[0];
    assert_eq!(sent["taskId"], json!(seeded.todo_task));
}

#[test]
fn thread_stays_visible_while_refetching() {
    let (mut app, seeded) = board_app();
    seeded.api.seed_comment(&seeded.todo_task, "a@x.com", "first");
    open_detail(&mut app);
    assert_eq!(comment_contents(&app), ["first"]);

    seeded.api.seed_comment(&seeded.todo_task, "b@x.com", "second");
    seeded
        .api
        .delay_operation("GetTask", Duration::from_millis(300));
    app.handle_key(char_key('r'));
    app.pump();

    assert_eq!(app.in_flight(), 1);
    assert_eq!(comment_contents(&app), ["first"]);
    let text = screen(&app);
    assert!(text.contains("first"));
    assert!(!text.contains("Loading..."));

    app.settle();
    assert_eq!(comment_contents(&app), ["first", "second"]);
}

#[test]
fn empty_comment_is_rejected_locally() {
    let (mut app, seeded) = board_app();
    open_detail(&mut app);

    app.handle_key(char_key('c'));
    app.handle_key(key(KeyCode::Enter));

    match app.mode() {
        Mode::TaskDetail(detail) => assert_eq!(detail.comments.errors.len(), 2),
        other => panic!("expected task detail, got {other:?}"),
    }
    assert_eq!(seeded.api.count("CreateTaskComment"), 0);
    assert!(screen(&app).contains("No comments yet"));
}

#[test]
fn comment_draft_survives_collapse() {
    let (mut app, _seeded) = board_app();
    open_detail(&mut app);

    app.handle_key(char_key('c'));
    type_str(&mut app, "a@x.com");
    app.handle_key(key(KeyCode::Esc));
    assert!(!app.is_input_mode());
    app.handle_key(char_key('c'));

    match app.mode() {
        Mode::TaskDetail(detail) => assert_eq!(detail.comments.draft.author_email, "a@x.com"),
        other => panic!("expected task detail, got {other:?}"),
    }
}

#[test]
fn detail_shows_board_copy_when_fetch_fails() {
    let (mut app, seeded) = board_app();
    seeded.api.fail_operation("GetTask", "gone");
    open_detail(&mut app);

    match app.mode() {
        Mode::TaskDetail(detail) => {
            assert_eq!(detail.task().title, "Write copy");
            assert!(detail.fetched.state().error().is_some());
        }
        other => panic!("expected task detail, got {other:?}"),
    }
    assert!(screen(&app).contains("Failed to load comments"));
}

#[test]
fn edit_from_detail_opens_task_form() {
    let (mut app, seeded) = board_app();
    open_detail(&mut app);

    app.handle_key(char_key('e'));
    match app.mode() {
        Mode::TaskForm(form) => {
            assert_eq!(form.task_id.as_deref(), Some(seeded.todo_task.as_str()));
            assert_eq!(form.draft.title, "Write copy");
        }
        other => panic!("expected task form, got {other:?}"),
    }
}

#[test]
fn edit_from_detail_renames_card() {
    let (mut app, seeded) = board_app();
    open_detail(&mut app);

    app.handle_key(char_key('e'));
    for _ in 0.."Write copy".len() {
        app.handle_key(key(KeyCode::Backspace));
    }
    type_str(&mut app, "Write docs");
    app.handle_key(key(KeyCode::Enter));
    app.settle();

    assert!(matches!(app.mode(), Mode::Normal));
    let sent = &seeded.api.variables_for("UpdateTask")[0];
    assert_eq!(sent["id"], json!(seeded.todo_task));
    assert_eq!(sent["title"], "Write docs");
    assert_eq!(sent["status"], "TODO");
    assert_eq!(
        app.board().column_counts(),
        vec![
            ("To Do".to_string(), 1),
            ("In Progress".to_string(), 1),
            ("Done".to_string(), 1)
        ]
    );
    assert_eq!(app.board().column_tasks(&TaskStatus::Todo)[0].title, "Write docs");
}

#[test]
fn escape_closes_detail() {
    let (mut app, _seeded) = board_app();
    open_detail(&mut app);
    app.handle_key(key(KeyCode::Esc));
    assert!(matches!(app.mode(), Mode::Normal));
    assert!(matches!(app.view(), View::Tasks { .. }));
}
