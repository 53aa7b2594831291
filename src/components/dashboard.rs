//! Dashboard screen: header, cards, status line and help bar

use crate::component::Component;
use crate::components::contact_section::draw_contact_section;
use crate::components::database_stats_card::draw_database_stats_card;
use crate::components::header::{draw_header, HeaderContext};
use crate::components::job_status_card::draw_job_status_card;
use crate::components::layout::calculate_dashboard_layout;
use crate::components::results_table::ResultsPreviewTable;
use crate::model::{DomainState, JobStatus, QueryKind};
use anyhow::Result;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Context needed for rendering the dashboard
pub struct DashboardContext<'a> {
    pub domain: &'a DomainState,
    pub error: Option<&'a str>,
    pub status_message: Option<&'a str>,
}

pub fn draw_dashboard(
    frame: &mut Frame,
    area: Rect,
    results: &mut ResultsPreviewTable,
    ctx: &DashboardContext,
) -> Result<()> {
    let has_status = ctx.error.is_some() || ctx.status_message.is_some();
    let layout = calculate_dashboard_layout(area, has_status);
    let domain = ctx.domain;
    let job = domain.current_job();

    let header = HeaderContext {
        notification_count: domain.notifications.len(),
        latest: domain.notifications.latest(),
        connection: domain.connection.state(),
        job_position: domain.tracker.position(),
    };
    draw_header(frame, layout.header, &header);

    draw_job_status_card(frame, layout.job, job);

    match job {
        Some(job) => results.set_preview(
            &job.preview,
            job.results_count,
            job.status == JobStatus::Completed,
        ),
        None => results.clear(),
    }
    results.draw(frame, layout.results)?;

    draw_database_stats_card(
        frame,
        layout.stats,
        domain.stats.as_ref(),
        domain.connection.query(QueryKind::DatabaseStats),
    );
    if let Some(contact_area) = layout.contact {
        draw_contact_section(frame, contact_area);
    }

    if let Some(status_area) = layout.status {
        render_status_bar(frame, status_area, ctx);
    }
    render_help_bar(frame, layout.help, job.map(|j| j.status));

    Ok(())
}

fn render_status_bar(frame: &mut Frame, area: Rect, ctx: &DashboardContext) {
    let mut spans = vec![];

    if let Some(error) = ctx.error {
        spans.push(Span::styled(
            format!(" Error: {} ", error),
            Style::default().fg(Color::Red),
        ));
    }

    if let Some(status) = ctx.status_message {
        spans.push(Span::styled(
            format!(" {} ", status),
            Style::default().fg(Color::Yellow),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn key(label: &str, color: Color) -> Span<'static> {
    Span::styled(
        format!(" {} ", label),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

/// Help bar; job controls only appear when they apply to the selected job
pub fn build_help_line(status: Option<JobStatus>) -> Line<'static> {
    let mut spans = vec![
        key("q", Color::Yellow),
        Span::raw("Quit "),
        key("s", Color::Green),
        Span::raw("Start "),
    ];

    if let Some(status) = status {
        if status.can_pause() {
            spans.push(key("p", Color::Yellow));
            spans.push(Span::raw("Pause "));
        }
        if status.can_resume() {
            spans.push(key("u", Color::Green));
            spans.push(Span::raw("Resume "));
        }
        if status.can_cancel() {
            spans.push(key("x", Color::Red));
            spans.push(Span::raw("Cancel "));
        }
        if status == JobStatus::Completed {
            spans.push(key("d", Color::Cyan));
            spans.push(Span::raw("Download "));
        }
    }

    spans.extend([
        key("n", Color::Magenta),
        Span::raw("Notifications "),
        key("r", Color::Cyan),
        Span::raw("Refresh "),
        key("i", Color::Cyan),
        Span::raw("Contact "),
        key("?", Color::White),
        Span::raw("Help"),
    ]);
    Line::from(spans)
}

fn render_help_bar(frame: &mut Frame, area: Rect, status: Option<JobStatus>) {
    let help = Paragraph::new(build_help_line(status)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(help, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_help_line_follows_job_status() {
        let idle = text(&build_help_line(None));
        assert!(idle.contains("Start"));
        assert!(!idle.contains("Pause"));

        let running = text(&build_help_line(Some(JobStatus::Running)));
        assert!(running.contains("Pause"));
        assert!(running.contains("Cancel"));
        assert!(!running.contains("Download"));

        let done = text(&build_help_line(Some(JobStatus::Completed)));
        assert!(done.contains("Download"));
        assert!(!done.contains("Cancel"));
    }
}
