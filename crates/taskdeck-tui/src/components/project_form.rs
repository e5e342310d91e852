use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use taskdeck_core::draft::ProjectDraft;
use taskdeck_core::Project;

use crate::components::FormAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectField {
    Name,
    Description,
    Status,
    DueDate,
}

impl ProjectField {
    const ORDER: [ProjectField; 4] = [
        ProjectField::Name,
        ProjectField::Description,
        ProjectField::Status,
        ProjectField::DueDate,
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
            ProjectField::Name => "Name",
            ProjectField::Description => "Description",
            ProjectField::Status => "Status",
            ProjectField::DueDate => "Due date",
        }
    }
}

/// Modal create/edit form. `project_id` is `None` when creating.
#[derive(Debug, Clone)]
pub struct ProjectForm {
    pub project_id: Option<String>,
    pub draft: ProjectDraft,
    pub field: ProjectField,
    pub errors: Vec<String>,
    pub submitting: bool,
    pub generation: u64,
}

impl ProjectForm {
    pub fn create() -> Self {
        Self::with_draft(None, ProjectDraft::new())
    }

    pub fn edit(project: &Project) -> Self {
        Self::with_draft(Some(project.id.clone()), ProjectDraft::from_project(project))
    }

    fn with_draft(project_id: Option<String>, draft: ProjectDraft) -> Self {
        Self {
            project_id,
            draft,
            field: ProjectField::Name,
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
            KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')
                if self.field == ProjectField::Status =>
            {
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
            ProjectField::Name => Some(&mut self.draft.name),
            ProjectField::Description => Some(&mut self.draft.description),
            ProjectField::DueDate => Some(&mut self.draft.due_date),
            ProjectField::Status => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let title = if self.project_id.is_some() {
            " Edit Project "
        } else {
            " New Project "
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta));

        let status_value = format!("< {} >", self.draft.status.display_name());
        let values = [
            (ProjectField::Name, self.draft.name.as_str()),
            (ProjectField::Description, self.draft.description.as_str()),
            (ProjectField::Status, status_value.as_str()),
            (ProjectField::DueDate, self.draft.due_date.as_str()),
        ];

        let mut lines: Vec<Line> = Vec::new();
        for (field, value) in values {
            let label_style = if field == self.field {
                Style::default().fg(Color::Cyan).bold()
            } else {
                Style::default()
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{}: ", field.label()), label_style),
                Span::raw(value.to_string()),
            ]));
        }
        lines.push(Line::from(Span::styled(
            "  (YYYY-MM-DD, blank for none)",
            Style::default().fg(Color::DarkGray),
        )));
        render_feedback(&mut lines, &self.errors, self.submitting);

        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
            area,
        );
    }
}

/// Appends the joined error list, or a saving indicator, under a form.
pub fn render_feedback(lines: &mut Vec<Line<'_>>, errors: &[String], submitting: bool) {
    lines.push(Line::from(""));
    if submitting {
        lines.push(Line::from(Span::styled(
            "Saving...",
            Style::default().fg(Color::Yellow),
        )));
    } else if !errors.is_empty() {
        lines.push(Line::from(Span::styled(
            errors.join(", "),
            Style::default().fg(Color::Red),
        )));
    }
}
