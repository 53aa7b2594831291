//! Connection indicator and the connection details overlay

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use crate::model::connection::{ConnectionMonitor, ConnectionState, QueryKind};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Header indicator; nothing is shown while connected
pub fn connection_indicator(state: ConnectionState) -> Option<Span<'static>> {
    let (icon, color) = match state {
        ConnectionState::Connected => return None,
        ConnectionState::Checking => ("◌", Color::Yellow),
        ConnectionState::Disconnected => ("⚠", Color::Red),
    };
    Some(Span::styled(
        format!(" {} {} ", icon, state.label()),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
}

#[derive(Default)]
pub struct ConnectionDetailsDialog {
    /// Snapshot taken when the overlay is drawn
    lines: Vec<Line<'static>>,
}

impl ConnectionDetailsDialog {
    pub fn set_monitor(&mut self, monitor: &ConnectionMonitor, endpoint: &str) {
        self.lines = build_details_lines(monitor, endpoint);
    }
}

pub fn build_details_lines(monitor: &ConnectionMonitor, endpoint: &str) -> Vec<Line<'static>> {
    let state = monitor.state();
    let state_color = match state {
        ConnectionState::Connected => Color::Green,
        ConnectionState::Checking => Color::Yellow,
        ConnectionState::Disconnected => Color::Red,
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Backend: ", Style::default().fg(Color::DarkGray)),
            Span::raw(endpoint.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Status:  ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                state.label(),
                Style::default().fg(state_color).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
    ];

    for kind in QueryKind::all() {
        let query = monitor.query(kind);
        let (marker, detail, color) = if query.is_loading() {
            ("◌", "loading".to_string(), Color::Yellow)
        } else if let Some(ref err) = query.last_error {
            ("✗", err.clone(), Color::Red)
        } else if query.settled {
            ("✓", "ok".to_string(), Color::Green)
        } else {
            ("·", "not requested yet".to_string(), Color::DarkGray)
        };
        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", marker), Style::default().fg(color)),
            Span::styled(
                format!("{:<20}", kind.endpoint()),
                Style::default().fg(Color::White),
            ),
            Span::styled(detail, Style::default().fg(color)),
        ]));
    }

    lines
}

impl Component for ConnectionDetailsDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('c') => Some(Action::CloseModal),
            KeyCode::Char('r') => Some(Action::RefreshAll),
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let popup_area = centered_popup(area, 70, 11);
        frame.render_widget(Clear, popup_area);

        let mut content = self.lines.clone();
        content.push(Line::from(""));
        content.push(Line::from(vec![
            Span::styled(
                " r ",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Span::raw("Retry all  "),
            Span::styled(
                " Esc ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw("Close"),
        ]));

        let paragraph = Paragraph::new(content)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Connection ")
                    .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, popup_area);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(lines: &[Line]) -> String {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_indicator_hidden_when_connected() {
        assert!(connection_indicator(ConnectionState::Connected).is_none());
        let span = connection_indicator(ConnectionState::Disconnected).unwrap();
        assert!(span.content.contains("Disconnected"));
    }

    #[test]
    fn test_details_list_each_endpoint() {
        let mut monitor = ConnectionMonitor::new();
        monitor.request_failed(QueryKind::DatabaseStats, "connection refused");
        let rendered = text(&build_details_lines(&monitor, "http://localhost:5001"));
        assert!(rendered.contains("http://localhost:5001"));
        assert!(rendered.contains("GET database-stats"));
        assert!(rendered.contains("connection refused"));
        assert!(rendered.contains("GET job/{id}"));
        assert!(rendered.contains("not requested yet"));
    }
}
