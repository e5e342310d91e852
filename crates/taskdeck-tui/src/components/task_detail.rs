use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use taskdeck_core::Task;

use crate::components::comment_thread::{self, CommentForm};
use crate::loadable::{Loadable, Slot};

/// Read-only task overlay with its comment thread.
///
/// Shows `fallback` (the board's copy) until the first single-task fetch
/// lands. Later refetches keep the last fetched copy on screen.
#[derive(Debug, Clone)]
pub struct TaskDetail {
    pub task_id: String,
    pub fallback: Task,
    pub fetched: Slot<Task>,
    pub comments: CommentForm,
    pub scroll: u16,
}

impl TaskDetail {
    pub fn new(task: Task) -> Self {
        Self {
            task_id: task.id.clone(),
            fallback: task,
            fetched: Slot::default(),
            comments: CommentForm::default(),
            scroll: 0,
        }
    }

    pub fn task(&self) -> &Task {
        self.fetched.latest().unwrap_or(&self.fallback)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let task = self.task();
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(format!(" {} ", task.title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let dim = Style::default().fg(Color::DarkGray);
        let mut lines = vec![
            Line::from(vec![
                Span::styled("Status:   ", dim),
                Span::styled(task.status.display_name(), Style::default().bold()),
            ]),
            Line::from(vec![
                Span::styled("Assignee: ", dim),
                Span::raw(task.assignee_email.as_deref().unwrap_or("Unassigned")),
            ]),
            Line::from(vec![
                Span::styled("Due:      ", dim),
                Span::raw(
                    task.due_date
                        .map(|d| d.format("%Y-%m-%d %H:%M UTC").to_string())
                        .unwrap_or_else(|| "No due date".into()),
                ),
            ]),
            Line::from(vec![
                Span::styled("Project:  ", dim),
                Span::raw(task.project.name.as_str()),
            ]),
            Line::from(""),
        ];
        if task.description.is_empty() {
            lines.push(Line::from(Span::styled("No description", dim.italic())));
        } else {
            lines.extend(task.description.lines().map(Line::from));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Comments ({})", task.comments.len()),
            Style::default().fg(Color::Magenta).bold(),
        )));
        match self.fetched.state() {
            Loadable::Loading if self.fetched.latest().is_none() && task.comments.is_empty() => {
                lines.push(Line::from(Span::styled("Loading...", dim)));
            }
            Loadable::Failed(message) => {
                lines.push(Line::from(Span::styled(
                    format!("Failed to load comments: {message}"),
                    Style::default().fg(Color::Red),
                )));
            }
            _ => lines.extend(comment_thread::thread_lines(&task.comments)),
        }

        if self.comments.open {
            lines.push(Line::from(""));
            lines.extend(self.comments.lines());
        }

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0));
        frame.render_widget(paragraph, area);
    }
}
