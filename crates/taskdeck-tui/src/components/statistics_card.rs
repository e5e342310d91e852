use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use taskdeck_core::ProjectStatistics;

use crate::components::project_card::format_rate;
use crate::loadable::Loadable;

pub fn render(frame: &mut Frame, area: Rect, stats: &Loadable<ProjectStatistics>) {
    let block = Block::default()
        .title(" Statistics ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let line = match stats {
        Loadable::Idle => Line::from(""),
        Loadable::Loading => Line::from(Span::styled(
            "Loading...",
            Style::default().fg(Color::DarkGray),
        )),
        Loadable::Failed(message) => Line::from(Span::styled(
            format!("Failed to load statistics: {message}"),
            Style::default().fg(Color::Red),
        )),
        Loadable::Loaded(s) => counters(s),
    };

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn counters(s: &ProjectStatistics) -> Line<'static> {
    let items = [
        ("Projects", s.total_projects.to_string()),
        ("Active", s.active_projects.to_string()),
        ("Completed", s.completed_projects.to_string()),
        ("Tasks", s.total_tasks.to_string()),
        ("Done", s.completed_tasks.to_string()),
        ("Completion", format_rate(s.overall_completion_rate)),
    ];
    let spans: Vec<Span> = items
        .into_iter()
        .flat_map(|(label, value)| {
            vec![
                Span::styled(format!(" {label}: "), Style::default().fg(Color::DarkGray)),
                Span::styled(value, Style::default().bold()),
                Span::raw(" "),
            ]
        })
        .collect();
    Line::from(spans)
}
