//! Dashboard header: title, job selector, notification badge, connection

use crate::components::connection_status::connection_indicator;
use crate::components::status_badge::severity_color;
use crate::model::{ConnectionState, Notification};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub struct HeaderContext<'a> {
    pub notification_count: usize,
    pub latest: Option<&'a Notification>,
    pub connection: ConnectionState,
    /// (selected, total) among jobs started this session
    pub job_position: Option<(usize, usize)>,
}

pub fn build_header_line(ctx: &HeaderContext) -> Line<'static> {
    let mut spans = vec![
        Span::styled(
            " ✉ Postcode Scraper ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
    ];

    if let Some((selected, total)) = ctx.job_position {
        if total > 1 {
            spans.push(Span::styled(
                format!("job {}/{} ", selected, total),
                Style::default().fg(Color::DarkGray),
            ));
        }
    }

    if let Some(indicator) = connection_indicator(ctx.connection) {
        spans.push(indicator);
    }

    let badge_color = ctx
        .latest
        .map(|n| severity_color(n.severity))
        .unwrap_or(Color::DarkGray);
    spans.push(Span::styled(
        format!(" 🔔 {} ", ctx.notification_count),
        Style::default().fg(badge_color).add_modifier(Modifier::BOLD),
    ));

    Line::from(spans)
}

pub fn draw_header(frame: &mut Frame, area: Rect, ctx: &HeaderContext) {
    let paragraph = Paragraph::new(build_header_line(ctx))
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .alignment(Alignment::Left);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_header_hides_connection_when_connected() {
        let ctx = HeaderContext {
            notification_count: 3,
            latest: None,
            connection: ConnectionState::Connected,
            job_position: Some((1, 1)),
        };
        let rendered = text(&build_header_line(&ctx));
        assert!(rendered.contains("Postcode Scraper"));
        assert!(rendered.contains("🔔 3"));
        assert!(!rendered.contains("Connected"));
        assert!(!rendered.contains("job 1/1"));
    }

    #[test]
    fn test_header_shows_disconnected_and_job_position() {
        let ctx = HeaderContext {
            notification_count: 0,
            latest: None,
            connection: ConnectionState::Disconnected,
            job_position: Some((2, 3)),
        };
        let rendered = text(&build_header_line(&ctx));
        assert!(rendered.contains("Disconnected from server"));
        assert!(rendered.contains("job 2/3"));
    }
}
