//! Notification log overlay

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use crate::components::status_badge::severity_color;
use crate::format::format_time;
use crate::model::notification::NOTIFICATION_CAPACITY;
use crate::model::Notification;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    Frame,
};

#[derive(Default)]
pub struct NotificationsDialog {
    pub scroll_offset: usize,
    count: usize,
    lines: Vec<Line<'static>>,
}

impl NotificationsDialog {
    /// Refresh the rendered entries from the log
    pub fn set_entries(&mut self, entries: &[Notification]) {
        self.count = entries.len();
        self.lines = build_notification_lines(entries);
    }
}

pub fn build_notification_lines(entries: &[Notification]) -> Vec<Line<'static>> {
    if entries.is_empty() {
        return vec![
            Line::from(""),
            Line::from(Span::styled(
                "  No notifications",
                Style::default().fg(Color::DarkGray),
            )),
        ];
    }

    entries
        .iter()
        .map(|n| {
            let color = severity_color(n.severity);
            Line::from(vec![
                Span::styled(
                    format!(" {} ", format_time(&n.timestamp)),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!("{:<8}", n.severity.label()),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(n.message.clone(), Style::default().fg(Color::White)),
            ])
        })
        .collect()
}

impl Component for NotificationsDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('n') => Some(Action::CloseModal),
            KeyCode::Char('c') => Some(Action::ClearNotifications),
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll_offset = self.scroll_offset.saturating_add(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let height = (NOTIFICATION_CAPACITY as u16 + 5).min(area.height);
        let popup_area = centered_popup(area, area.width.saturating_sub(8).min(100), height);
        frame.render_widget(Clear, popup_area);

        let mut content = self.lines.clone();
        content.push(Line::from(""));
        content.push(Line::from(vec![
            Span::styled(
                " c ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::raw("Clear all  "),
            Span::styled(
                " Esc ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw("Close"),
        ]));

        let total = content.len();
        let visible_height = popup_area.height.saturating_sub(2) as usize;
        let max_scroll = total.saturating_sub(visible_height);
        if self.scroll_offset > max_scroll {
            self.scroll_offset = max_scroll;
        }

        let paragraph = Paragraph::new(content)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" Notifications ({}) ", self.count))
                    .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .wrap(Wrap { trim: false })
            .scroll((self.scroll_offset as u16, 0));
        frame.render_widget(paragraph, popup_area);

        if total > visible_height {
            let mut scrollbar_state = ScrollbarState::new(max_scroll).position(self.scroll_offset);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight)
                    .begin_symbol(Some("↑"))
                    .end_symbol(Some("↓")),
                popup_area.inner(ratatui::layout::Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::notification::NotificationLog;
    use crate::model::Severity;
    use crossterm::event::KeyModifiers;

    fn text(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_entries_newest_first() {
        let mut log = NotificationLog::new();
        log.push("first", Severity::Info);
        log.push("Job job-1 failed to complete", Severity::Error);
        let lines = text(&build_notification_lines(log.entries()));
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("error"));
        assert!(lines[0].ends_with("Job job-1 failed to complete"));
        assert!(lines[1].ends_with("first"));
    }

    #[test]
    fn test_empty_log_and_clear_key() {
        let mut dialog = NotificationsDialog::default();
        dialog.set_entries(&[]);
        assert_eq!(dialog.count, 0);
        assert!(text(&dialog.lines).iter().any(|l| l.contains("No notifications")));
        assert_eq!(
            dialog
                .handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE))
                .unwrap(),
            Some(Action::ClearNotifications)
        );
    }
}
