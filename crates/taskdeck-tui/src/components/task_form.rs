use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use taskdeck_core::draft::TaskDraft;
use taskdeck_core::Task;

use crate::components::project_form::render_feedback;
use crate::components::FormAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Title,
    Description,
    Status,
    Assignee,
    DueDate,
}

impl TaskField {
    const ORDER: [TaskField; 5] = [
        TaskField::Title,
        TaskField::Description,
        TaskField::Status,
        TaskField::Assignee,
        TaskField::DueDate,
    ];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    fn label(self) -> &'static str {
        match self {
            TaskField::Title => "Title",
            TaskField::Description => "Description",
            TaskField::Status => "Status",
            TaskField::Assignee => "Assignee email",
            TaskField::DueDate => "Due",
        }
    }
}

/// Modal create/edit form for a task. `task_id` is `None` when creating.
#[derive(Debug, Clone)]
pub struct TaskForm {
    pub task_id: Option<String>,
    pub draft: TaskDraft,
    pub field: TaskField,
    pub errors: Vec<String>,
    pub submitting: bool,
    pub generation: u64,
}

impl TaskForm {
    pub fn create() -> Self {
        Self::with_draft(None, TaskDraft::new())
    }

    pub fn edit(task: &Task) -> Self {
        Self::with_draft(Some(task.id.clone()), TaskDraft::from_task(task))
    }

    fn with_draft(task_id: Option<String>, draft: TaskDraft) -> Self {
        Self {
            task_id,
            draft,
            field: TaskField::Title,
            errors: Vec::new(),
            submitting: false,
            generation: 0,
        }
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> FormAction {
        match key.code {
            KeyCode::Esc => return FormAction::Cancel,
            KeyCode::Enter => return FormAction::Submit,
            KeyCode::Tab | KeyCode::Down => self.field = self.field.next(),
            KeyCode::BackTab | KeyCode::Up => self.field = self.field.prev(),
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') if self.field == TaskField::Status => {
                self.draft.status = self.draft.status.cycle();
            }
            KeyCode::Backspace => {
                if let Some(text) = self.text_mut() {
                    text.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(text) = self.text_mut() {
                    text.push(c);
                }
            }
            _ => {}
        }
        FormAction::None
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        match self.field {
            TaskField::Title => Some(&mut self.draft.title),
            TaskField::Description => Some(&mut self.draft.description),
            TaskField::Assignee => Some(&mut self.draft.assignee_email),
            TaskField::DueDate => Some(&mut self.draft.due_date),
            TaskField::Status => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let title = if self.task_id.is_some() {
            " Edit Task "
        } else {
            " New Task "
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta));

        let status_value = format!("< {} >", self.draft.status.display_name());
        let values = [
            (TaskField::Title, self.draft.title.as_str()),
            (TaskField::Description, self.draft.description.as_str()),
            (TaskField::Status, status_value.as_str()),
            (TaskField::Assignee, self.draft.assignee_email.as_str()),
            (TaskField::DueDate, self.draft.due_date.as_str()),
        ];

        let mut lines: Vec<Line> = values
            .into_iter()
            .map(|(field, value)| {
                let label_style = if field == self.field {
                    Style::default().fg(Color::Cyan).bold()
                } else {
                    Style::default()
                };
                Line::from(vec![
                    Span::styled(format!("{}: ", field.label()), label_style),
                    Span::raw(value.to_string()),
                ])
            })
            .collect();
        lines.push(Line::from(Span::styled(
            "  (YYYY-MM-DD or YYYY-MM-DDTHH:MM, UTC)",
            Style::default().fg(Color::DarkGray),
        )));
        render_feedback(&mut lines, &self.errors, self.submitting);

        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
            area,
        );
    }
}
