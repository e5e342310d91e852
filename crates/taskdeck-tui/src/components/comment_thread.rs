use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use taskdeck_core::draft::CommentDraft;
use taskdeck_core::TaskComment;

use crate::components::FormAction;

pub const EMPTY_THREAD: &str = "No comments yet. Be the first to comment!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentField {
    Author,
    Content,
}

/// Inline comment form. The draft outlives collapsing the form and is
/// only cleared by a successful submit.
#[derive(Debug, Clone, Default)]
pub struct CommentForm {
    pub open: bool,
    pub draft: CommentDraft,
    pub field: Option<CommentField>,
    pub errors: Vec<String>,
    pub submitting: bool,
    pub generation: u64,
}

impl CommentForm {
    pub fn toggle(&mut self) {
        self.open = !self.open;
        if self.open && self.field.is_none() {
            self.field = Some(CommentField::Author);
        }
    }

    /// Clears and collapses after the comment was accepted.
    pub fn reset(&mut self) {
        self.draft.clear();
        self.errors.clear();
        self.open = false;
        self.field = Some(CommentField::Author);
    }

    pub fn handle_input(&mut self, key: KeyEvent) -> FormAction {
        let field = self.field.unwrap_or(CommentField::Author);
        match key.code {
            KeyCode::Esc => return FormAction::Cancel,
            KeyCode::Enter => return FormAction::Submit,
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.field = Some(match field {
                    CommentField::Author => CommentField::Content,
                    CommentField::Content => CommentField::Author,
                });
            }
            KeyCode::Backspace => {
                self.text_mut(field).pop();
            }
            KeyCode::Char(c) => self.text_mut(field).push(c),
            _ => {}
        }
        FormAction::None
    }

    fn text_mut(&mut self, field: CommentField) -> &mut String {
        match field {
            CommentField::Author => &mut self.draft.author_email,
            CommentField::Content => &mut self.draft.content,
        }
    }

    pub fn lines(&self) -> Vec<Line<'_>> {
        let focused = self.field.unwrap_or(CommentField::Author);
        let label = |field: CommentField, text: &'static str| {
            if field == focused {
                Span::styled(text, Style::default().fg(Color::Cyan).bold())
            } else {
                Span::raw(text)
            }
        };
        let mut lines = vec![
            Line::from(Span::styled(
                "── Add comment ──",
                Style::default().fg(Color::Magenta),
            )),
            Line::from(vec![
                label(CommentField::Author, "Author email: "),
                Span::raw(self.draft.author_email.as_str()),
            ]),
            Line::from(vec![
                label(CommentField::Content, "Comment: "),
                Span::raw(self.draft.content.as_str()),
            ]),
        ];
        if self.submitting {
            lines.push(Line::from(Span::styled(
                "Posting...",
                Style::default().fg(Color::Yellow),
            )));
        } else if !self.errors.is_empty() {
            lines.push(Line::from(Span::styled(
                self.errors.join(", "),
                Style::default().fg(Color::Red),
            )));
        }
        lines
    }
}

/// Comments oldest to newest, exactly in the order given.
pub fn thread_lines(comments: &[TaskComment]) -> Vec<Line<'_>> {
    if comments.is_empty() {
        return vec![Line::from(Span::styled(
            EMPTY_THREAD,
            Style::default().fg(Color::DarkGray).italic(),
        ))];
    }
    comments
        .iter()
        .flat_map(|c| {
            [
                Line::from(vec![
                    Span::styled(c.author_email.as_str(), Style::default().fg(Color::Blue)),
                    Span::styled(
                        format!("  {}", c.created_at.format("%Y-%m-%d %H:%M")),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]),
                Line::from(format!("  {}", c.content)),
            ]
        })
        .collect()
}
