use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use taskdeck_core::project::{ProjectFilter, ProjectStatus};
use taskdeck_core::task::TaskFilter;
use taskdeck_core::{Organization, Project, Task};
use taskdeck_service::{DeckService, ServiceError};
use tracing::{debug, info, warn};

use crate::components::dashboard::Dashboard;
use crate::components::placeholder;
use crate::components::project_form::ProjectForm;
use crate::components::task_board::TaskBoard;
use crate::components::task_detail::TaskDetail;
use crate::components::task_form::TaskForm;
use crate::components::FormAction;
use crate::dispatch::{Dispatcher, Outcome};
use crate::loadable::{Loadable, Slot};

/// Upper bound for `settle`; a request that takes longer is left running.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Board header label when the project detail is unavailable.
pub const DEFAULT_BOARD_TITLE: &str = "Tasks";

const FILTER_CHOICES: [Option<ProjectStatus>; 4] = [
    None,
    Some(ProjectStatus::Active),
    Some(ProjectStatus::Completed),
    Some(ProjectStatus::OnHold),
];

/// Which screen is showing. Tasks can only be entered from the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    NoOrganization,
    Dashboard,
    Tasks { project_id: String },
}

/// What the app is currently doing on top of the view
#[derive(Debug, Clone)]
pub enum Mode {
    /// Navigating the current view
    Normal,
    /// Organization switcher; entry 0 is "no organization"
    OrganizationPicker { list_state: ListState },
    /// Dashboard status filter picker
    FilterPick { list_state: ListState },
    /// Creating or editing a project
    ProjectForm(ProjectForm),
    /// Creating or editing a task
    TaskForm(TaskForm),
    /// Task overlay with comments
    TaskDetail(TaskDetail),
}

pub struct App {
    dispatcher: Dispatcher,
    view: View,
    mode: Mode,
    organizations: Slot<Vec<Organization>>,
    organization: Option<Organization>,
    /// Slug from the command line, applied once organizations arrive.
    preselect: Option<String>,
    dashboard: Dashboard,
    tasks: Slot<Vec<Task>>,
    header: Slot<Project>,
    board: TaskBoard,
    status_message: Option<String>,
    generation: u64,
}

impl App {
    pub fn new(service: Arc<dyn DeckService>, organization_slug: Option<String>) -> Result<Self> {
        let mut app = Self {
            dispatcher: Dispatcher::new(service)?,
            view: View::NoOrganization,
            mode: Mode::Normal,
            organizations: Slot::default(),
            organization: None,
            preselect: organization_slug,
            dashboard: Dashboard::new(),
            tasks: Slot::default(),
            header: Slot::default(),
            board: TaskBoard::default(),
            status_message: None,
            generation: 0,
        };
        app.load_organizations();
        Ok(app)
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn organization(&self) -> Option<&Organization> {
        self.organization.as_ref()
    }

    pub fn organizations(&self) -> &Loadable<Vec<Organization>> {
        self.organizations.state()
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn board(&self) -> &TaskBoard {
        &self.board
    }

    pub fn tasks(&self) -> &Loadable<Vec<Task>> {
        self.tasks.state()
    }

    /// Project name for the board header, or the generic label.
    pub fn board_title(&self) -> &str {
        self.header
            .state()
            .loaded()
            .map_or(DEFAULT_BOARD_TITLE, |p| p.name.as_str())
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn in_flight(&self) -> usize {
        self.dispatcher.in_flight()
    }

    pub fn is_input_mode(&self) -> bool {
        match &self.mode {
            Mode::ProjectForm(_) | Mode::TaskForm(_) => true,
            Mode::TaskDetail(detail) => detail.comments.open,
            _ => false,
        }
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn slug(&self) -> Option<String> {
        self.organization.as_ref().map(|o| o.slug.clone())
    }

    fn organization_list(&self) -> &[Organization] {
        self.organizations
            .state()
            .loaded()
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    //  Fetching

    fn load_organizations(&mut self) {
        let gen = self.next_generation();
        self.organizations.begin(gen);
        self.dispatcher.spawn(move |svc| async move {
            Outcome::Organizations(gen, svc.list_organizations().await)
        });
    }

    fn load_projects(&mut self) {
        let Some(slug) = self.slug() else { return };
        let gen = self.next_generation();
        self.dashboard.projects.begin(gen);
        let filter = ProjectFilter {
            organization_slug: slug,
            status: self.dashboard.filter,
        };
        self.dispatcher.spawn(move |svc| async move {
            Outcome::Projects(gen, svc.list_projects(&filter).await)
        });
    }

    fn load_statistics(&mut self) {
        let Some(slug) = self.slug() else { return };
        let gen = self.next_generation();
        self.dashboard.statistics.begin(gen);
        self.dispatcher.spawn(move |svc| async move {
            Outcome::Statistics(gen, svc.project_statistics(&slug).await)
        });
    }

    /// Project list and statistics, issued side by side.
    fn load_dashboard(&mut self) {
        self.load_projects();
        self.load_statistics();
    }

    fn current_project_id(&self) -> Option<String> {
        match &self.view {
            View::Tasks { project_id } => Some(project_id.clone()),
            _ => None,
        }
    }

    fn load_tasks(&mut self) {
        let (Some(slug), Some(project_id)) = (self.slug(), self.current_project_id()) else {
            return;
        };
        let gen = self.next_generation();
        self.tasks.begin(gen);
        let filter = TaskFilter::for_project(&project_id, &slug);
        self.dispatcher.spawn(move |svc| async move {
            Outcome::Tasks(gen, svc.list_tasks(&filter).await)
        });
    }

    fn load_board_header(&mut self) {
        let (Some(slug), Some(project_id)) = (self.slug(), self.current_project_id()) else {
            return;
        };
        let gen = self.next_generation();
        self.header.begin(gen);
        self.dispatcher.spawn(move |svc| async move {
            Outcome::BoardHeader(gen, svc.get_project(&project_id, &slug).await)
        });
    }

    fn load_task_detail(&mut self) {
        let Some(slug) = self.slug() else { return };
        let gen = self.next_generation();
        let Mode::TaskDetail(detail) = &mut self.mode else {
            return;
        };
        detail.fetched.begin(gen);
        let id = detail.task_id.clone();
        self.dispatcher.spawn(move |svc| async move {
            Outcome::TaskDetail(gen, svc.get_task(&id, &slug).await)
        });
    }

    //  View transitions

    fn select_organization(&mut self, org: Organization) {
        info!(slug = %org.slug, "organization selected");
        self.organization = Some(org);
        self.view = View::Dashboard;
        self.dashboard = Dashboard::new();
        self.clear_board();
        self.load_dashboard();
    }

    fn clear_organization(&mut self) {
        self.organization = None;
        self.view = View::NoOrganization;
        self.dashboard = Dashboard::new();
        self.clear_board();
    }

    fn clear_board(&mut self) {
        self.tasks.reset();
        self.header.reset();
        self.board = TaskBoard::default();
    }

    fn open_project(&mut self, project_id: String) {
        if self.view != View::Dashboard {
            return;
        }
        self.view = View::Tasks { project_id };
        self.clear_board();
        self.load_tasks();
        self.load_board_header();
    }

    fn back_to_dashboard(&mut self) {
        self.view = View::Dashboard;
        self.clear_board();
        self.load_dashboard();
    }

    fn open_task_detail(&mut self, task: Task) {
        self.mode = Mode::TaskDetail(TaskDetail::new(task));
        self.load_task_detail();
    }

    //  Outcomes

    /// Apply every outcome that has already arrived. Never blocks.
    pub fn pump(&mut self) {
        while let Some(outcome) = self.dispatcher.try_recv() {
            self.apply(outcome);
        }
    }

    /// Block until nothing is in flight, including requests issued while
    /// applying outcomes (refetch after a write).
    pub fn settle(&mut self) {
        let deadline = Instant::now() + SETTLE_TIMEOUT;
        while self.dispatcher.in_flight() > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                warn!(in_flight = self.dispatcher.in_flight(), "requests still pending");
                break;
            }
            match self.dispatcher.recv_timeout(remaining) {
                Some(outcome) => self.apply(outcome),
                None => break,
            }
        }
    }

    fn apply(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Organizations(gen, result) => {
                if !self.organizations.finish(gen, result) {
                    debug!(generation = gen, "discarding stale organizations response");
                    return;
                }
                self.apply_preselect();
            }
            Outcome::Projects(gen, result) => {
                if !self.dashboard.apply_projects(gen, result) {
                    debug!(generation = gen, "discarding stale project list");
                }
            }
            Outcome::Statistics(gen, result) => {
                if !self.dashboard.statistics.finish(gen, result) {
                    debug!(generation = gen, "discarding stale statistics");
                }
            }
            Outcome::Tasks(gen, result) => {
                let selected = self.board.selected_task().map(|t| t.id.clone());
                if !self.tasks.finish(gen, result) {
                    debug!(generation = gen, "discarding stale task list");
                    return;
                }
                if let Loadable::Loaded(tasks) = self.tasks.state() {
                    self.board = TaskBoard::from_tasks(tasks);
                    if let Some(id) = selected {
                        self.board.select_task_by_id(&id);
                    }
                }
            }
            Outcome::BoardHeader(gen, result) => {
                if let Err(ref e) = result {
                    // Not surfaced: the header falls back to a generic label.
                    warn!(error = %e, "board header fetch failed");
                }
                if !self.header.finish(gen, result) {
                    debug!(generation = gen, "discarding stale board header");
                }
            }
            Outcome::TaskDetail(gen, result) => {
                let landed = match &mut self.mode {
                    Mode::TaskDetail(detail) => detail.fetched.finish(gen, result),
                    _ => false,
                };
                if !landed {
                    debug!(generation = gen, "discarding stale task detail");
                }
            }
            Outcome::ProjectSaved(gen, result) => self.finish_project_save(gen, result),
            Outcome::TaskSaved(gen, result) => self.finish_task_save(gen, result),
            Outcome::CommentAdded(gen, result) => self.finish_comment(gen, result.map(|_| ())),
        }
    }

    fn apply_preselect(&mut self) {
        if self.view != View::NoOrganization {
            return;
        }
        let Some(slug) = self.preselect.take() else { return };
        let found = self
            .organization_list()
            .iter()
            .find(|o| o.slug == slug)
            .cloned();
        match found {
            Some(org) => self.select_organization(org),
            None => {
                warn!(%slug, "preselected organization not found");
                self.status_message = Some(format!("Organization '{slug}' not found"));
            }
        }
    }

    fn finish_project_save(&mut self, gen: u64, result: Result<Project, ServiceError>) {
        let form = match &mut self.mode {
            Mode::ProjectForm(form) if form.submitting && form.generation == gen => form,
            _ => {
                debug!(generation = gen, "project save landed after its form closed");
                if result.is_ok() && self.view == View::Dashboard {
                    self.load_dashboard();
                }
                return;
            }
        };
        form.submitting = false;
        match result {
            Ok(project) => {
                let verb = if form.project_id.is_some() { "updated" } else { "created" };
                info!(id = %project.id, "project {verb}");
                self.status_message = Some(format!("Project {verb}: {}", project.name));
                self.mode = Mode::Normal;
                self.load_dashboard();
            }
            Err(e) => {
                warn!(error = %e, "project save failed");
                form.errors = e.messages();
            }
        }
    }

    fn finish_task_save(&mut self, gen: u64, result: Result<Task, ServiceError>) {
        let form = match &mut self.mode {
            Mode::TaskForm(form) if form.submitting && form.generation == gen => form,
            _ => {
                debug!(generation = gen, "task save landed after its form closed");
                if result.is_ok() {
                    self.load_tasks();
                }
                return;
            }
        };
        form.submitting = false;
        match result {
            Ok(task) => {
                let verb = if form.task_id.is_some() { "updated" } else { "created" };
                info!(id = %task.id, "task {verb}");
                self.status_message = Some(format!("Task {verb}: {}", task.title));
                self.mode = Mode::Normal;
                self.load_tasks();
            }
            Err(e) => {
                warn!(error = %e, "task save failed");
                form.errors = e.messages();
            }
        }
    }

    fn finish_comment(&mut self, gen: u64, result: Result<(), ServiceError>) {
        let form = match &mut self.mode {
            Mode::TaskDetail(detail)
                if detail.comments.submitting && detail.comments.generation == gen =>
            {
                &mut detail.comments
            }
            _ => {
                debug!(generation = gen, "comment landed after its task closed");
                return;
            }
        };
        form.submitting = false;
        match result {
            Ok(()) => {
                form.reset();
                // Re-read the thread so the new comment shows in server order.
                self.load_task_detail();
            }
            Err(e) => {
                warn!(error = %e, "comment failed");
                form.errors = e.messages();
            }
        }
    }

    //  Key handling

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.status_message = None;

        match self.mode.clone() {
            Mode::Normal => self.handle_normal(key),
            Mode::OrganizationPicker { list_state } => {
                self.handle_organization_picker(key, list_state)
            }
            Mode::FilterPick { list_state } => self.handle_filter_pick(key, list_state),
            Mode::ProjectForm(form) => self.handle_project_form(key, form),
            Mode::TaskForm(form) => self.handle_task_form(key, form),
            Mode::TaskDetail(detail) => self.handle_task_detail(key, detail),
        }
    }

    fn handle_normal(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('o') {
            self.open_organization_picker();
            return;
        }
        match self.view {
            View::NoOrganization => {
                if key.code == KeyCode::Char('r') {
                    self.load_organizations();
                }
            }
            View::Dashboard => self.handle_dashboard(key),
            View::Tasks { .. } => self.handle_board(key),
        }
    }

    fn handle_dashboard(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                if let Some(project) = self.dashboard.selected_project() {
                    let id = project.id.clone();
                    self.open_project(id);
                }
            }
            KeyCode::Char('n') => self.mode = Mode::ProjectForm(ProjectForm::create()),
            KeyCode::Char('e') => {
                if let Some(project) = self.dashboard.selected_project() {
                    self.mode = Mode::ProjectForm(ProjectForm::edit(project));
                }
            }
            KeyCode::Char('f') => {
                let idx = FILTER_CHOICES
                    .iter()
                    .position(|f| *f == self.dashboard.filter)
                    .unwrap_or(0);
                let mut list_state = ListState::default();
                list_state.select(Some(idx));
                self.mode = Mode::FilterPick { list_state };
            }
            // Retry
            KeyCode::Char('r') => {
                self.load_projects();
                if self.dashboard.statistics.state().error().is_some() {
                    self.load_statistics();
                }
            }
            _ => self.dashboard.handle_key(key),
        }
    }

    fn handle_board(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('b') => self.back_to_dashboard(),
            KeyCode::Enter => {
                if let Some(task) = self.board.selected_task() {
                    let task = task.clone();
                    self.open_task_detail(task);
                }
            }
            KeyCode::Char('n') => self.mode = Mode::TaskForm(TaskForm::create()),
            KeyCode::Char('e') => {
                if let Some(task) = self.board.selected_task() {
                    self.mode = Mode::TaskForm(TaskForm::edit(task));
                }
            }
            KeyCode::Char('r') => {
                self.load_tasks();
                self.load_board_header();
            }
            _ => self.board.handle_key(key),
        }
    }

    fn open_organization_picker(&mut self) {
        if matches!(self.organizations.state(), Loadable::Idle | Loadable::Failed(_)) {
            self.load_organizations();
        }
        let idx = self
            .organization
            .as_ref()
            .and_then(|current| {
                self.organization_list()
                    .iter()
                    .position(|o| o.id == current.id)
            })
            .map_or(0, |i| i + 1);
        let mut list_state = ListState::default();
        list_state.select(Some(idx));
        self.mode = Mode::OrganizationPicker { list_state };
    }

    fn handle_organization_picker(&mut self, key: KeyEvent, mut list_state: ListState) {
        // Entry 0 is "no organization".
        let entries = self.organization_list().len() + 1;
        match key.code {
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Char('j') | KeyCode::Down => {
                let i = list_state.selected().unwrap_or(0);
                if i + 1 < entries {
                    list_state.select(Some(i + 1));
                }
                self.mode = Mode::OrganizationPicker { list_state };
            }
            KeyCode::Char('k') | KeyCode::Up => {
                let i = list_state.selected().unwrap_or(0);
                list_state.select(Some(i.saturating_sub(1)));
                self.mode = Mode::OrganizationPicker { list_state };
            }
            KeyCode::Char('r') => {
                self.load_organizations();
                self.mode = Mode::OrganizationPicker { list_state };
            }
            KeyCode::Enter => {
                self.mode = Mode::Normal;
                match list_state.selected().unwrap_or(0) {
                    0 => self.clear_organization(),
                    i => {
                        if let Some(org) = self.organization_list().get(i - 1).cloned() {
                            self.select_organization(org);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_filter_pick(&mut self, key: KeyEvent, mut list_state: ListState) {
        match key.code {
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Char('j') | KeyCode::Down => {
                let i = list_state.selected().unwrap_or(0);
                if i + 1 < FILTER_CHOICES.len() {
                    list_state.select(Some(i + 1));
                }
                self.mode = Mode::FilterPick { list_state };
            }
            KeyCode::Char('k') | KeyCode::Up => {
                let i = list_state.selected().unwrap_or(0);
                list_state.select(Some(i.saturating_sub(1)));
                self.mode = Mode::FilterPick { list_state };
            }
            KeyCode::Enter => {
                let choice = FILTER_CHOICES
                    .get(list_state.selected().unwrap_or(0))
                    .copied()
                    .flatten();
                self.mode = Mode::Normal;
                if choice != self.dashboard.filter {
                    self.dashboard.filter = choice;
                    self.load_projects();
                }
            }
            _ => {}
        }
    }

    fn handle_project_form(&mut self, key: KeyEvent, mut form: ProjectForm) {
        match form.handle_input(key) {
            FormAction::Cancel => self.mode = Mode::Normal,
            FormAction::None => self.mode = Mode::ProjectForm(form),
            FormAction::Submit => self.submit_project_form(form),
        }
    }

    fn submit_project_form(&mut self, mut form: ProjectForm) {
        let Some(slug) = self.slug() else {
            self.mode = Mode::Normal;
            return;
        };
        if form.submitting {
            self.mode = Mode::ProjectForm(form);
            return;
        }
        let gen = self.next_generation();
        let dispatched = match form.project_id.clone() {
            Some(id) => form.draft.to_update(&id, &slug).map(|input| {
                self.dispatcher.spawn(move |svc| async move {
                    Outcome::ProjectSaved(gen, svc.update_project(&input).await)
                })
            }),
            None => form.draft.to_create(&slug).map(|input| {
                self.dispatcher.spawn(move |svc| async move {
                    Outcome::ProjectSaved(gen, svc.create_project(&input).await)
                })
            }),
        };
        match dispatched {
            Ok(()) => {
                form.errors.clear();
                form.submitting = true;
                form.generation = gen;
            }
            Err(invalid) => {
                debug!(errors = ?invalid.messages, "project form rejected");
                form.errors = invalid.messages;
            }
        }
        self.mode = Mode::ProjectForm(form);
    }

    fn handle_task_form(&mut self, key: KeyEvent, mut form: TaskForm) {
        match form.handle_input(key) {
            FormAction::Cancel => self.mode = Mode::Normal,
            FormAction::None => self.mode = Mode::TaskForm(form),
            FormAction::Submit => self.submit_task_form(form),
        }
    }

    fn submit_task_form(&mut self, mut form: TaskForm) {
        let (Some(slug), Some(project_id)) = (self.slug(), self.current_project_id()) else {
            self.mode = Mode::Normal;
            return;
        };
        if form.submitting {
            self.mode = Mode::TaskForm(form);
            return;
        }
        let gen = self.next_generation();
        let dispatched = match form.task_id.clone() {
            Some(id) => form.draft.to_update(&id, &slug).map(|input| {
                self.dispatcher.spawn(move |svc| async move {
                    Outcome::TaskSaved(gen, svc.update_task(&input).await)
                })
            }),
            None => form.draft.to_create(&project_id, &slug).map(|input| {
                self.dispatcher.spawn(move |svc| async move {
                    Outcome::TaskSaved(gen, svc.create_task(&input).await)
                })
            }),
        };
        match dispatched {
            Ok(()) => {
                form.errors.clear();
                form.submitting = true;
                form.generation = gen;
            }
            Err(invalid) => {
                debug!(errors = ?invalid.messages, "task form rejected");
                form.errors = invalid.messages;
            }
        }
        self.mode = Mode::TaskForm(form);
    }

    fn handle_task_detail(&mut self, key: KeyEvent, mut detail: TaskDetail) {
        if detail.comments.open {
            match detail.comments.handle_input(key) {
                FormAction::Cancel => detail.comments.open = false,
                FormAction::None => {}
                FormAction::Submit => {
                    self.mode = Mode::TaskDetail(detail);
                    self.submit_comment();
                    return;
                }
            }
            self.mode = Mode::TaskDetail(detail);
            return;
        }

        match key.code {
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Char('c') => {
                detail.comments.toggle();
                self.mode = Mode::TaskDetail(detail);
            }
            // Edit closes the overlay first.
            KeyCode::Char('e') => {
                let task = detail.task().clone();
                self.mode = Mode::TaskForm(TaskForm::edit(&task));
            }
            KeyCode::Char('r') => {
                self.mode = Mode::TaskDetail(detail);
                self.load_task_detail();
            }
            KeyCode::Char('j') | KeyCode::Down => {
                detail.scroll = detail.scroll.saturating_add(1);
                self.mode = Mode::TaskDetail(detail);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                detail.scroll = detail.scroll.saturating_sub(1);
                self.mode = Mode::TaskDetail(detail);
            }
            _ => self.mode = Mode::TaskDetail(detail),
        }
    }

    fn submit_comment(&mut self) {
        let Some(slug) = self.slug() else { return };
        let gen = self.next_generation();
        let Mode::TaskDetail(detail) = &mut self.mode else {
            return;
        };
        let form = &mut detail.comments;
        if form.submitting {
            return;
        }
        let input = match form.draft.to_create(&detail.task_id, &slug) {
            Ok(input) => input,
            Err(invalid) => {
                debug!(errors = ?invalid.messages, "comment form rejected");
                form.errors = invalid.messages;
                return;
            }
        };
        form.errors.clear();
        form.submitting = true;
        form.generation = gen;
        self.dispatcher.spawn(move |svc| async move {
            Outcome::CommentAdded(gen, svc.create_task_comment(&input).await)
        });
    }

    //  Rendering

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_title_bar(frame, layout[0]);
        match &self.view {
            View::NoOrganization => self.render_no_organization(frame, layout[1]),
            View::Dashboard => self.dashboard.render(frame, layout[1]),
            View::Tasks { .. } => self.render_board(frame, layout[1]),
        }
        self.render_status_bar(frame, layout[2]);

        // Overlays
        match &self.mode {
            Mode::Normal => {}
            Mode::OrganizationPicker { list_state } => {
                self.render_organization_picker(frame, list_state, area)
            }
            Mode::FilterPick { list_state } => self.render_filter_pick(frame, list_state, area),
            Mode::ProjectForm(form) => {
                let popup = centered_rect(60, 50, area);
                frame.render_widget(Clear, popup);
                form.render(frame, popup);
            }
            Mode::TaskForm(form) => {
                let popup = centered_rect(60, 55, area);
                frame.render_widget(Clear, popup);
                form.render(frame, popup);
            }
            Mode::TaskDetail(detail) => detail.render(frame, centered_rect(70, 80, area)),
        }
    }

    fn render_title_bar(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled(" taskdeck ", Style::default().bold().fg(Color::Cyan)),
            Span::raw("| "),
        ];
        match &self.organization {
            Some(org) => {
                spans.push(Span::styled(&org.name, Style::default().fg(Color::Yellow)));
                spans.push(Span::styled(
                    format!(" ({})", org.slug),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            None => spans.push(Span::styled(
                "No organization",
                Style::default().fg(Color::DarkGray),
            )),
        }
        if let View::Tasks { .. } = self.view {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                self.board_title(),
                Style::default().fg(Color::Magenta).bold(),
            ));
        }
        frame.render_widget(Line::from(spans), area);
    }

    fn render_no_organization(&self, frame: &mut Frame, area: Rect) {
        let mut lines = vec![
            Line::from(Span::styled(
                "No organization selected.",
                Style::default().bold(),
            )),
            Line::from("Press o to choose an organization."),
            Line::from(""),
        ];
        match self.organizations.state() {
            Loadable::Loading => lines.push(Line::from(placeholder::LOADING)),
            Loadable::Failed(message) => {
                lines.push(Line::from(Span::styled(
                    format!("Failed to load organizations: {message}"),
                    Style::default().fg(Color::Red),
                )));
                lines.push(Line::from(Span::styled(
                    "Press r to retry",
                    Style::default().fg(Color::Yellow),
                )));
            }
            Loadable::Loaded(orgs) if orgs.is_empty() => lines.push(Line::from(
                "No organizations found. Create one with `taskdeck create-org`.",
            )),
            _ => {}
        }
        let block = Block::default().borders(Borders::ALL);
        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
            area,
        );
    }

    fn render_board(&self, frame: &mut Frame, area: Rect) {
        match self.tasks.state() {
            Loadable::Failed(message) => placeholder::render_error(
                frame,
                area,
                "Failed to load tasks",
                Some(&format!("{message} (r to retry)")),
            ),
            Loadable::Loading | Loadable::Idle if self.board.is_empty() => {
                placeholder::render_loading(frame, area)
            }
            _ => self.board.render(frame, area),
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        if let Some(ref msg) = self.status_message {
            let line = Line::from(Span::styled(
                format!(" {msg}"),
                Style::default().fg(Color::Green),
            ));
            frame.render_widget(line, area);
            return;
        }

        let hints = match (&self.mode, &self.view) {
            (Mode::Normal, View::NoOrganization) => {
                vec![("q", "quit"), ("o", "organization"), ("r", "reload")]
            }
            (Mode::Normal, View::Dashboard) => vec![
                ("q", "quit"),
                ("j/k", "projects"),
                ("Enter", "tasks"),
                ("n", "new"),
                ("e", "edit"),
                ("f", "filter"),
                ("r", "retry"),
                ("o", "organization"),
            ],
            (Mode::Normal, View::Tasks { .. }) => vec![
                ("q", "quit"),
                ("h/l", "cols"),
                ("j/k", "tasks"),
                ("Enter", "detail"),
                ("n", "new"),
                ("e", "edit"),
                ("r", "refresh"),
                ("Esc", "back"),
            ],
            (Mode::OrganizationPicker { .. }, _) => vec![
                ("j/k", "nav"),
                ("Enter", "select"),
                ("r", "reload"),
                ("Esc", "cancel"),
            ],
            (Mode::FilterPick { .. }, _) => {
                vec![("j/k", "nav"), ("Enter", "apply"), ("Esc", "cancel")]
            }
            (Mode::ProjectForm(_), _) | (Mode::TaskForm(_), _) => vec![
                ("Tab", "next field"),
                ("Space", "status"),
                ("Enter", "save"),
                ("Esc", "cancel"),
            ],
            (Mode::TaskDetail(detail), _) if detail.comments.open => vec![
                ("Tab", "next field"),
                ("Enter", "post"),
                ("Esc", "collapse"),
            ],
            (Mode::TaskDetail(_), _) => vec![
                ("c", "comment"),
                ("e", "edit"),
                ("j/k", "scroll"),
                ("r", "refresh"),
                ("Esc", "back"),
            ],
        };

        let spans: Vec<Span> = hints
            .into_iter()
            .flat_map(|(key, desc)| {
                vec![
                    Span::styled(
                        format!(" {key}"),
                        Style::default().fg(Color::Yellow).bold(),
                    ),
                    Span::raw(format!(" {desc} ")),
                ]
            })
            .collect();

        frame.render_widget(Line::from(spans), area);
    }

    fn render_organization_picker(&self, frame: &mut Frame, list_state: &ListState, area: Rect) {
        let popup = centered_rect(50, 50, area);
        frame.render_widget(Clear, popup);

        let title = match self.organizations.state() {
            Loadable::Loading => " Organizations (loading) ",
            _ => " Organizations ",
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta));

        if let Some(message) = self.organizations.state().error() {
            let inner = block.inner(popup);
            frame.render_widget(block, popup);
            placeholder::render_error(
                frame,
                inner,
                &format!("Failed to load organizations: {message}"),
                Some("Press r to retry"),
            );
            return;
        }

        let current = self.organization.as_ref().map(|o| o.id.as_str());
        let mut items = vec![ListItem::new(Line::from(Span::styled(
            "  (no organization)",
            Style::default().fg(Color::DarkGray),
        )))];
        items.extend(self.organization_list().iter().map(|o| {
            let marker = if Some(o.id.as_str()) == current {
                "* "
            } else {
                "  "
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::Cyan)),
                Span::styled(o.name.as_str(), Style::default().bold()),
                Span::styled(
                    format!(" ({})", o.slug),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        }));

        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Magenta)
                    .bold(),
            )
            .highlight_symbol("> ");

        let mut state = list_state.clone();
        frame.render_stateful_widget(list, popup, &mut state);
    }

    fn render_filter_pick(&self, frame: &mut Frame, list_state: &ListState, area: Rect) {
        let popup = centered_rect(30, 30, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(" Status filter ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta));

        let items: Vec<ListItem> = FILTER_CHOICES
            .iter()
            .map(|choice| ListItem::new(choice.map_or("All", |s| s.display_name())))
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(Color::Black).bg(Color::Magenta).bold())
            .highlight_symbol("> ");

        let mut state = list_state.clone();
        frame.render_stateful_widget(list, popup, &mut state);
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
