use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Wrap};

pub const LOADING: &str = "Loading...";

pub fn render_loading(frame: &mut Frame, area: Rect) {
    let line = Line::from(Span::styled(LOADING, Style::default().fg(Color::DarkGray)));
    frame.render_widget(Paragraph::new(line), area);
}

/// Inline error with an optional key hint underneath.
pub fn render_error(frame: &mut Frame, area: Rect, message: &str, hint: Option<&str>) {
    let mut lines = vec![Line::from(Span::styled(
        message.to_string(),
        Style::default().fg(Color::Red),
    ))];
    if let Some(hint) = hint {
        lines.push(Line::from(Span::styled(
            hint.to_string(),
            Style::default().fg(Color::Yellow),
        )));
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}

pub fn render_empty(frame: &mut Frame, area: Rect, message: &str) {
    let line = Line::from(Span::styled(
        message.to_string(),
        Style::default().fg(Color::DarkGray).italic(),
    ));
    frame.render_widget(Paragraph::new(line).wrap(Wrap { trim: true }), area);
}
