//! Job status card: badge, progress, counters, configuration and controls

use crate::components::status_badge::{status_badge, status_color};
use crate::format::{
    format_duration, format_export_format, format_job_message, format_job_status, format_number,
    format_percentage, format_time,
};
use crate::model::{JobProjection, JobStatus};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

fn label(text: &str) -> Span<'static> {
    Span::styled(text.to_string(), Style::default().fg(Color::DarkGray))
}

fn value(text: String) -> Span<'static> {
    Span::styled(
        text,
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    )
}

fn key_hint(key: &str, text: &str, color: Color) -> Vec<Span<'static>> {
    vec![
        Span::styled(
            format!(" {} ", key),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("{}  ", text)),
    ]
}

/// Lines above the progress gauge
pub fn build_summary_lines(job: &JobProjection) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![
            status_badge(job.status),
            Span::raw(" "),
            Span::styled(
                format_job_status(job.status),
                Style::default()
                    .fg(status_color(job.status))
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            label("Job "),
            value(job.job_id.clone()),
            label("  Target "),
            value(job.target_label()),
        ]),
        Line::from(Span::styled(
            job.message
                .clone()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| format_job_message(&job.job_id, job.status, Some(job.results_count))),
            Style::default().fg(Color::Gray),
        )),
    ];

    if let Some(ref details) = job.error_details {
        if job.status == JobStatus::Failed {
            lines.push(Line::from(Span::styled(
                format!("Error: {}", details),
                Style::default().fg(Color::Red),
            )));
        }
    }
    lines
}

/// Lines below the progress gauge
pub fn build_detail_lines(job: &JobProjection) -> Vec<Line<'static>> {
    let mut progress_line = vec![
        value(format_number(job.processed_records)),
        label(" / "),
        value(format_number(job.total_records)),
        label(" records"),
    ];
    if let Some(eta) = job.estimated_remaining_secs {
        progress_line.push(label(&format!("   ~{} remaining", format_duration(eta))));
    }

    let mut counters = vec![
        label("Processed "),
        value(format_number(job.processed_records)),
        label("  Errors "),
        Span::styled(
            format_number(job.error_count),
            Style::default().fg(if job.error_count > 0 {
                Color::Red
            } else {
                Color::White
            }),
        ),
        label("  Started "),
        value(format_time(&job.started_at)),
    ];
    if let Some(entries) = job.db_entries {
        counters.push(label("  Saved "));
        counters.push(value(format_number(entries)));
    }

    let cfg = &job.config;
    let mut config_line = vec![
        label("Config "),
        Span::raw(format!(
            "{} · {} · Batch: {} · Delay: {}ms · Retries: {}",
            cfg.country_code,
            format_export_format(cfg.export_format),
            cfg.batch_size,
            cfg.delay_ms,
            cfg.max_retries
        )),
    ];
    if cfg.validate_data {
        config_line.push(Span::styled(" · Validation ON", Style::default().fg(Color::Green)));
    }

    let mut controls = Vec::new();
    if job.status.can_pause() {
        controls.extend(key_hint("p", "Pause", Color::Yellow));
    }
    if job.status.can_resume() {
        controls.extend(key_hint("u", "Resume", Color::Green));
    }
    if job.status.can_cancel() {
        controls.extend(key_hint("x", "Cancel", Color::Red));
    }
    if job.status == JobStatus::Completed && job.results_count > 0 {
        controls.extend(key_hint("d", "Download", Color::Cyan));
    }

    let mut lines = vec![
        Line::from(progress_line),
        Line::from(counters),
        Line::from(config_line),
    ];
    if !controls.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(controls));
    }
    lines
}

fn empty_lines() -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        Line::from(Span::styled(
            "No job selected",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::raw("Press "),
            Span::styled(
                "s",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" to select a state and start scraping."),
        ]),
    ]
}

pub fn draw_job_status_card(frame: &mut Frame, area: Rect, job: Option<&JobProjection>) {
    let border_color = job.map(|j| status_color(j.status)).unwrap_or(Color::DarkGray);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Job Status ")
        .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(job) = job else {
        frame.render_widget(Paragraph::new(empty_lines()), inner);
        return;
    };

    let summary = build_summary_lines(job);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(summary.len() as u16),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    frame.render_widget(Paragraph::new(summary).wrap(Wrap { trim: true }), chunks[0]);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(status_color(job.status)).bg(Color::Black))
        .ratio((job.progress / 100.0).clamp(0.0, 1.0))
        .label(format_percentage(job.progress));
    frame.render_widget(gauge, chunks[1]);

    frame.render_widget(Paragraph::new(build_detail_lines(job)), chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScrapeConfig;

    fn text(lines: &[Line]) -> String {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn job(status: JobStatus) -> JobProjection {
        let mut job = JobProjection::pending("job-1", "California", None, ScrapeConfig::default());
        job.status = status;
        job
    }

    #[test]
    fn test_pending_job_summary() {
        let rendered = text(&build_summary_lines(&job(JobStatus::Pending)));
        assert!(rendered.contains("job-1"));
        assert!(rendered.contains("Pending"));
        assert!(rendered.contains("Job job-1 is queued for processing"));
    }

    #[test]
    fn test_blank_backend_message_falls_back_to_summary() {
        let mut done = job(JobStatus::Completed);
        done.results_count = 1247;
        done.message = Some(String::new());
        let rendered = text(&build_summary_lines(&done));
        assert!(rendered.contains("Job job-1 completed! Found 1,247 postcodes."));
    }

    #[test]
    fn test_controls_follow_status() {
        let running = text(&build_detail_lines(&job(JobStatus::Running)));
        assert!(running.contains("Pause"));
        assert!(running.contains("Cancel"));
        assert!(!running.contains("Resume"));

        let paused = text(&build_detail_lines(&job(JobStatus::Paused)));
        assert!(paused.contains("Resume"));
        assert!(!paused.contains("Pause "));

        let failed = text(&build_detail_lines(&job(JobStatus::Failed)));
        assert!(!failed.contains("Cancel"));
    }

    #[test]
    fn test_config_line() {
        let rendered = text(&build_detail_lines(&job(JobStatus::Running)));
        assert!(rendered.contains("US · CSV · Batch: 100 · Delay: 1000ms · Retries: 3"));
        assert!(rendered.contains("Validation ON"));
    }

    #[test]
    fn test_failed_job_shows_error_details() {
        let mut failed = job(JobStatus::Failed);
        failed.error_details = Some("Timeout contacting geonames".to_string());
        let rendered = text(&build_summary_lines(&failed));
        assert!(rendered.contains("Error: Timeout contacting geonames"));
    }
}
