//! Information request dialog (name, email, message)

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use crate::model::form::InfoRequestForm;
use crate::model::response::InfoRequest;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InfoField {
    #[default]
    Name,
    Email,
    Message,
}

impl InfoField {
    fn next(&self) -> InfoField {
        match self {
            InfoField::Name => InfoField::Email,
            InfoField::Email => InfoField::Message,
            InfoField::Message => InfoField::Name,
        }
    }

    fn prev(&self) -> InfoField {
        match self {
            InfoField::Name => InfoField::Message,
            InfoField::Email => InfoField::Name,
            InfoField::Message => InfoField::Email,
        }
    }
}

#[derive(Default)]
pub struct InfoRequestDialog {
    pub focus: InfoField,
    form: InfoRequestForm,
    error: Option<String>,
    submitting: bool,
}

impl InfoRequestDialog {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn form(&self) -> &InfoRequestForm {
        &self.form
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn submit(&mut self) -> Option<InfoRequest> {
        if self.submitting {
            return None;
        }
        match self.form.to_request() {
            Ok(req) => {
                self.error = None;
                self.submitting = true;
                Some(req)
            }
            Err(err) => {
                self.error = Some(err);
                None
            }
        }
    }

    pub fn finish(&mut self, error: Option<String>) {
        self.submitting = false;
        self.error = error;
    }

    fn input_mut(&mut self) -> &mut String {
        match self.focus {
            InfoField::Name => &mut self.form.name,
            InfoField::Email => &mut self.form.email,
            InfoField::Message => &mut self.form.message,
        }
    }

    fn field_line(&self, field: InfoField, label: &str, value: &str) -> Line<'static> {
        let focused = self.focus == field;
        Line::from(vec![
            Span::raw(if focused { "▶ " } else { "  " }),
            Span::styled(format!("{:<10}", label), Style::default().fg(Color::Gray)),
            Span::styled(
                if focused {
                    format!("{}_", value)
                } else {
                    value.to_string()
                },
                if focused {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                },
            ),
        ])
    }

    pub fn build_lines(&self) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(Span::styled(
                "Questions, feedback or data requests. Name and email are optional.",
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(""),
            self.field_line(InfoField::Name, "Name", &self.form.name),
            self.field_line(InfoField::Email, "Email", &self.form.email),
            self.field_line(InfoField::Message, "Message *", &self.form.message),
        ];

        if let Some(ref err) = self.error {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                err.clone(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(
                " Enter ",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Span::raw(if self.submitting { "Sending...  " } else { "Send  " }),
            Span::styled(
                " Tab ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw("Next field  "),
            Span::styled(
                " Esc ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw("Close"),
        ]));
        lines
    }
}

impl Component for InfoRequestDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc => Some(Action::CloseModal),
            _ if self.submitting => None,
            KeyCode::Enter => Some(Action::ConfirmModal),
            KeyCode::Tab | KeyCode::Down => {
                self.focus = self.focus.next();
                None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = self.focus.prev();
                None
            }
            KeyCode::Backspace => {
                self.input_mut().pop();
                None
            }
            KeyCode::Char(c) => {
                self.input_mut().push(c);
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let content = self.build_lines();
        let popup_area = centered_popup(area, 72, content.len() as u16 + 2);
        frame.render_widget(Clear, popup_area);

        let paragraph = Paragraph::new(content)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Green))
                    .title(" Request Information ")
                    .title_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            )
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, popup_area);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(dialog: &mut InfoRequestDialog, code: KeyCode) -> Option<Action> {
        dialog
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    fn type_text(dialog: &mut InfoRequestDialog, text: &str) {
        for c in text.chars() {
            press(dialog, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_fill_and_submit() {
        let mut dialog = InfoRequestDialog::default();
        type_text(&mut dialog, "Ada");
        press(&mut dialog, KeyCode::Tab);
        type_text(&mut dialog, "ada@example.com");
        press(&mut dialog, KeyCode::Tab);
        type_text(&mut dialog, "Hi");
        assert_eq!(press(&mut dialog, KeyCode::Enter), Some(Action::ConfirmModal));

        let req = dialog.submit().unwrap();
        assert_eq!(req.name, "Ada");
        assert_eq!(req.email, "ada@example.com");
        assert_eq!(req.message, "Hi");
        assert!(dialog.is_submitting());
        assert_eq!(press(&mut dialog, KeyCode::Char('x')), None);
        assert_eq!(dialog.form().message, "Hi");
    }

    #[test]
    fn test_invalid_email_is_inline_error() {
        let mut dialog = InfoRequestDialog::default();
        dialog.focus = InfoField::Email;
        type_text(&mut dialog, "not-an-email");
        dialog.focus = InfoField::Message;
        type_text(&mut dialog, "Hello");
        assert!(dialog.submit().is_none());
        assert_eq!(dialog.error(), Some("Email address looks invalid"));
    }

    #[test]
    fn test_server_failure_keeps_draft() {
        let mut dialog = InfoRequestDialog::default();
        dialog.focus = InfoField::Message;
        type_text(&mut dialog, "Hello");
        assert!(dialog.submit().is_some());
        dialog.finish(Some("HTTP 500: down".to_string()));
        assert!(!dialog.is_submitting());
        assert_eq!(dialog.error(), Some("HTTP 500: down"));
        assert_eq!(dialog.form().message, "Hello");
    }
}
