use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};
use taskdeck_core::board::partition_by_status;
use taskdeck_core::task::{Task, TaskStatus};

#[derive(Debug, Clone)]
pub struct TaskBoard {
    columns: Vec<BoardColumn>,
    active_column: usize,
}

#[derive(Debug, Clone)]
struct BoardColumn {
    status: TaskStatus,
    tasks: Vec<Task>,
    list_state: ListState,
}

impl Default for TaskBoard {
    fn default() -> Self {
        Self::from_tasks(&[])
    }
}

impl TaskBoard {
    pub fn new(columns: Vec<(TaskStatus, Vec<Task>)>) -> Self {
        let columns = columns
            .into_iter()
            .map(|(status, tasks)| {
                let mut list_state = ListState::default();
                if !tasks.is_empty() {
                    list_state.select(Some(0));
                }
                BoardColumn {
                    status,
                    tasks,
                    list_state,
                }
            })
            .collect();
        Self {
            columns,
            active_column: 0,
        }
    }

    /// Board with the three fixed columns, plus "Other" when needed.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        Self::new(partition_by_status(tasks))
    }

    /// `(column label, task count)` left to right.
    pub fn column_counts(&self) -> Vec<(String, usize)> {
        self.columns
            .iter()
            .map(|c| (c.status.display_name().to_string(), c.tasks.len()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(|c| c.tasks.is_empty())
    }

    pub fn column_tasks(&self, status: &TaskStatus) -> &[Task] {
        self.columns
            .iter()
            .find(|c| &c.status == status)
            .map(|c| c.tasks.as_slice())
            .unwrap_or_default()
    }

    pub fn selected_task(&self) -> Option<&Task> {
        let column = self.columns.get(self.active_column)?;
        column.tasks.get(column.list_state.selected()?)
    }

    /// Moves the cursor onto `task_id`, switching column if needed.
    /// Leaves the cursor alone and returns `false` when the task is gone.
    pub fn select_task_by_id(&mut self, task_id: &str) -> bool {
        let found = self.columns.iter().enumerate().find_map(|(c, column)| {
            column
                .tasks
                .iter()
                .position(|t| t.id == task_id)
                .map(|row| (c, row))
        });
        let Some((c, row)) = found else {
            return false;
        };
        self.active_column = c;
        self.columns[c].list_state.select(Some(row));
        true
    }

    fn step_column(&mut self, forward: bool) {
        let last = self.columns.len().saturating_sub(1);
        self.active_column = if forward {
            (self.active_column + 1).min(last)
        } else {
            self.active_column.saturating_sub(1)
        };
    }

    /// Selects `row` in the active column, clamped to its length.
    fn select_row(&mut self, row: impl FnOnce(usize, usize) -> usize) {
        let Some(column) = self.columns.get_mut(self.active_column) else {
            return;
        };
        let len = column.tasks.len();
        if len == 0 {
            return;
        }
        let current = column.list_state.selected().unwrap_or(0);
        column.list_state.select(Some(row(current, len).min(len - 1)));
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('h') | KeyCode::Left => self.step_column(false),
            KeyCode::Char('l') | KeyCode::Right => self.step_column(true),
            KeyCode::Char('j') | KeyCode::Down => self.select_row(|cur, _| cur + 1),
            KeyCode::Char('k') | KeyCode::Up => self.select_row(|cur, _| cur.saturating_sub(1)),
            KeyCode::Char('g') => self.select_row(|_, _| 0),
            KeyCode::Char('G') => self.select_row(|_, len| len - 1),
            _ => {}
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if self.columns.is_empty() {
            return;
        }
        let areas = Layout::horizontal(self.columns.iter().map(|_| Constraint::Fill(1))).split(area);
        for (i, column) in self.columns.iter().enumerate() {
            column.render(frame, areas[i], i == self.active_column);
        }
    }
}

impl BoardColumn {
    fn render(&self, frame: &mut Frame, area: Rect, active: bool) {
        let (border, highlight) = if active {
            (Color::Cyan, Style::default().fg(Color::Black).bg(Color::Cyan).bold())
        } else {
            (Color::DarkGray, Style::default().bg(Color::DarkGray))
        };
        let block = Block::default()
            .title(format!(" {} ({}) ", self.status.display_name(), self.tasks.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border));

        let list = List::new(self.tasks.iter().map(task_card))
            .block(block)
            .highlight_style(highlight)
            .highlight_symbol("> ");

        let mut state = self.list_state.clone();
        frame.render_stateful_widget(list, area, &mut state);
    }
}

fn task_card(task: &Task) -> ListItem<'_> {
    let mut lines = vec![Line::from(Span::raw(task.title.as_str()))];
    let mut meta = Vec::new();
    if let Some(ref email) = task.assignee_email {
        meta.push(Span::styled(format!("@{email}"), Style::default().fg(Color::Blue)));
    }
    if let Some(due) = task.due_date {
        if !meta.is_empty() {
            meta.push(Span::raw(" "));
        }
        meta.push(Span::styled(
            format!("due {}", due.format("%Y-%m-%d %H:%M")),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if !meta.is_empty() {
        lines.push(Line::from(meta));
    }
    ListItem::new(lines)
}
