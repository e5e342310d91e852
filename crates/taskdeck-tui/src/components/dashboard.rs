use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};
use taskdeck_core::{Project, ProjectStatistics, ProjectStatus};
use taskdeck_service::ServiceError;

use crate::components::{placeholder, project_card, statistics_card};
use crate::loadable::{Loadable, Slot};

pub const EMPTY_PROJECTS: &str = "No projects found. Create your first project!";
pub const RETRY_HINT: &str = "Press r to retry";

/// Project list and statistics for one organization. The two load and
/// fail independently.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub projects: Slot<Vec<Project>>,
    pub statistics: Slot<ProjectStatistics>,
    pub filter: Option<ProjectStatus>,
    list_state: ListState,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn projects(&self) -> &[Project] {
        self.projects
            .state()
            .loaded()
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.projects().get(self.list_state.selected()?)
    }

    pub fn filter_label(&self) -> &'static str {
        self.filter.map_or("All", |s| s.display_name())
    }

    /// Applies a project-list outcome, keeping the cursor on the same
    /// project when it is still present.
    pub fn apply_projects(&mut self, generation: u64, result: Result<Vec<Project>, ServiceError>) -> bool {
        let previous = self
            .list_state
            .selected()
            .and_then(|idx| self.projects.latest()?.get(idx))
            .map(|p| p.id.clone());
        if !self.projects.finish(generation, result) {
            return false;
        }
        let projects = self.projects();
        let idx = previous
            .and_then(|id| projects.iter().position(|p| p.id == id))
            .or_else(|| (!projects.is_empty()).then_some(0));
        self.list_state.select(idx);
        true
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let len = self.projects().len();
        if len == 0 {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0);
        let next = match key.code {
            KeyCode::Char('j') | KeyCode::Down => (current + 1).min(len - 1),
            KeyCode::Char('k') | KeyCode::Up => current.saturating_sub(1),
            KeyCode::Char('g') => 0,
            KeyCode::Char('G') => len - 1,
            _ => return,
        };
        self.list_state.select(Some(next));
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        statistics_card::render(frame, layout[0], self.statistics.state());

        let count = self.projects().len();
        let block = Block::default()
            .title(format!(" Projects ({count}) [{}] ", self.filter_label()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(layout[1]);

        match self.projects.state() {
            Loadable::Idle => frame.render_widget(block, layout[1]),
            Loadable::Loading => {
                frame.render_widget(block, layout[1]);
                placeholder::render_loading(frame, inner);
            }
            Loadable::Failed(message) => {
                frame.render_widget(block, layout[1]);
                placeholder::render_error(
                    frame,
                    inner,
                    &format!("Failed to load projects: {message}"),
                    Some(RETRY_HINT),
                );
            }
            Loadable::Loaded(projects) if projects.is_empty() => {
                frame.render_widget(block, layout[1]);
                placeholder::render_empty(frame, inner, EMPTY_PROJECTS);
            }
            Loadable::Loaded(projects) => {
                let items: Vec<ListItem> = projects.iter().map(project_card::project_item).collect();
                let list = List::new(items)
                    .block(block)
                    .highlight_style(Style::default().bg(Color::DarkGray))
                    .highlight_symbol("> ");
                let mut state = self.list_state.clone();
                frame.render_stateful_widget(list, layout[1], &mut state);
            }
        }
    }
}
