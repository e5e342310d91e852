use ratatui::prelude::*;
use ratatui::widgets::ListItem;
use taskdeck_core::project::{Project, ProjectStatus};

pub fn status_style(status: ProjectStatus) -> Style {
    match status {
        ProjectStatus::Active => Style::default().fg(Color::Green),
        ProjectStatus::Completed => Style::default().fg(Color::Blue),
        ProjectStatus::OnHold => Style::default().fg(Color::Yellow),
    }
}

/// `50` -> `50%`, `66.666` -> `66.67%`.
pub fn format_rate(rate: f64) -> String {
    let text = format!("{rate:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{text}%")
}

/// Three-line list entry for one project.
pub fn project_item(project: &Project) -> ListItem<'_> {
    let header = Line::from(vec![
        Span::styled(project.name.as_str(), Style::default().bold()),
        Span::raw("  "),
        Span::styled(
            format!("[{}]", project.status.display_name()),
            status_style(project.status),
        ),
    ]);

    let description = if project.description.is_empty() {
        Line::from(Span::styled(
            "No description",
            Style::default().fg(Color::DarkGray).italic(),
        ))
    } else {
        Line::from(project.description.as_str())
    };

    let due = match project.due_date {
        Some(date) => format!("Due {}", date.format("%Y-%m-%d")),
        None => "No due date".to_string(),
    };
    let footer = Line::from(vec![
        Span::styled(due, Style::default().fg(Color::DarkGray)),
        Span::raw(" | "),
        Span::raw(format!(
            "Tasks: {}/{}",
            project.completed_tasks, project.task_count
        )),
        Span::raw(" | "),
        Span::styled(
            format!("{} complete", format_rate(project.completion_rate)),
            Style::default().fg(Color::Cyan),
        ),
    ]);

    ListItem::new(vec![header, description, footer, Line::from("")])
}
