//! Colored status badge used by the job card and notifications

use crate::format::format_status;
use crate::model::{JobStatus, Severity};
use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
};

pub fn status_color(status: JobStatus) -> Color {
    match status {
        JobStatus::Pending => Color::Gray,
        JobStatus::Running => Color::Blue,
        JobStatus::Paused => Color::Yellow,
        JobStatus::Completed => Color::Green,
        JobStatus::Failed => Color::Red,
        JobStatus::Cancelled => Color::Magenta,
    }
}

pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Info => Color::Cyan,
        Severity::Success => Color::Green,
        Severity::Warning => Color::Yellow,
        Severity::Error => Color::Red,
    }
}

/// Inverted pill, e.g. " ✓ Completed "
pub fn status_badge(status: JobStatus) -> Span<'static> {
    Span::styled(
        format!(" {} {} ", status.icon(), format_status(status)),
        Style::default()
            .fg(Color::Black)
            .bg(status_color(status))
            .add_modifier(Modifier::BOLD),
    )
}
