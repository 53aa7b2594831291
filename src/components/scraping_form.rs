//! Start-scraping dialog
//!
//! Field-by-field form with an autocomplete list for the state, inline
//! validation errors and a submitting flag while the start request runs.

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use crate::format::format_export_format;
use crate::model::form::{canonical_state, filter_states, FieldError, FormField, ScrapeForm};
use crate::model::response::ScrapeRequest;
use crate::model::{ScrapeConfig, StartDraft};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Suggestions listed under the state field
const MAX_SUGGESTIONS: usize = 5;

/// Focusable rows of the dialog, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormFocus {
    #[default]
    State,
    City,
    CountryCode,
    BatchSize,
    Delay,
    MaxRetries,
    Validate,
    ExportFormat,
}

impl FormFocus {
    const ORDER: [FormFocus; 8] = [
        FormFocus::State,
        FormFocus::City,
        FormFocus::CountryCode,
        FormFocus::BatchSize,
        FormFocus::Delay,
        FormFocus::MaxRetries,
        FormFocus::Validate,
        FormFocus::ExportFormat,
    ];

    fn index(&self) -> usize {
        Self::ORDER.iter().position(|f| f == self).unwrap_or(0)
    }

    pub fn next(&self) -> FormFocus {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(&self) -> FormFocus {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    fn field(&self) -> Option<FormField> {
        match self {
            FormFocus::State => Some(FormField::State),
            FormFocus::City => Some(FormField::City),
            FormFocus::CountryCode => Some(FormField::CountryCode),
            FormFocus::BatchSize => Some(FormField::BatchSize),
            FormFocus::Delay => Some(FormField::Delay),
            FormFocus::MaxRetries => Some(FormField::MaxRetries),
            FormFocus::Validate | FormFocus::ExportFormat => None,
        }
    }
}

pub struct ScrapeFormDialog {
    pub focus: FormFocus,
    state: String,
    city: String,
    country_code: String,
    batch_size: String,
    delay_ms: String,
    max_retries: String,
    config: ScrapeConfig,
    suggestion_index: usize,
    errors: Vec<FieldError>,
    submit_error: Option<String>,
    submitting: bool,
}

impl Default for ScrapeFormDialog {
    fn default() -> Self {
        let config = ScrapeConfig::default();
        Self {
            focus: FormFocus::State,
            state: String::new(),
            city: String::new(),
            country_code: config.country_code.clone(),
            batch_size: config.batch_size.to_string(),
            delay_ms: config.delay_ms.to_string(),
            max_retries: config.max_retries.to_string(),
            config,
            suggestion_index: 0,
            errors: Vec::new(),
            submit_error: None,
            submitting: false,
        }
    }
}

impl ScrapeFormDialog {
    /// Reset for a new invocation, keeping the last configuration
    pub fn reset(&mut self) {
        let config = self.config.clone();
        *self = Self {
            country_code: config.country_code.clone(),
            batch_size: config.batch_size.to_string(),
            delay_ms: config.delay_ms.to_string(),
            max_retries: config.max_retries.to_string(),
            config,
            ..Self::default()
        };
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    pub fn suggestions(&self) -> Vec<&'static str> {
        let mut states = filter_states(&self.state);
        states.truncate(MAX_SUGGESTIONS);
        states
    }

    /// Current draft; numeric fields that don't parse are reported as errors
    pub fn form(&self) -> (ScrapeForm, Vec<FieldError>) {
        let mut parse_errors = Vec::new();
        let mut config = self.config.clone();
        config.country_code = self.country_code.trim().to_string();

        let mut number = |raw: &str, field: FormField, slot: &mut u32| match raw.trim().parse() {
            Ok(n) => *slot = n,
            Err(_) => parse_errors.push(FieldError {
                field,
                message: format!("{} must be a whole number", field.label()),
            }),
        };
        number(&self.batch_size, FormField::BatchSize, &mut config.batch_size);
        number(&self.delay_ms, FormField::Delay, &mut config.delay_ms);
        number(&self.max_retries, FormField::MaxRetries, &mut config.max_retries);

        let form = ScrapeForm {
            state: self.state.clone(),
            city: self.city.clone(),
            config,
        };
        (form, parse_errors)
    }

    /// Validate and mark the form as submitting; None blocks submission
    pub fn submit(&mut self) -> Option<(StartDraft, ScrapeRequest)> {
        if self.submitting {
            return None;
        }
        let (form, mut errors) = self.form();
        let request = match form.to_request() {
            Ok(req) if errors.is_empty() => req,
            Ok(_) => {
                self.errors = errors;
                return None;
            }
            Err(validation) => {
                for err in validation {
                    if !errors.iter().any(|e| e.field == err.field) {
                        errors.push(err);
                    }
                }
                self.errors = errors;
                return None;
            }
        };

        self.errors.clear();
        self.submit_error = None;
        self.submitting = true;
        self.config = form.config.clone();

        let draft = StartDraft {
            state: request.state.clone(),
            city: request.city.clone(),
            config: form.config,
        };
        Some((draft, request))
    }

    /// Outcome of the start request; Err keeps the dialog open with an alert
    pub fn finish(&mut self, error: Option<String>) {
        self.submitting = false;
        self.submit_error = error;
    }

    fn input_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            FormFocus::State => Some(&mut self.state),
            FormFocus::City => Some(&mut self.city),
            FormFocus::CountryCode => Some(&mut self.country_code),
            FormFocus::BatchSize => Some(&mut self.batch_size),
            FormFocus::Delay => Some(&mut self.delay_ms),
            FormFocus::MaxRetries => Some(&mut self.max_retries),
            FormFocus::Validate | FormFocus::ExportFormat => None,
        }
    }

    fn accept_suggestion(&mut self) {
        if canonical_state(&self.state).is_some() {
            return;
        }
        if let Some(state) = self.suggestions().get(self.suggestion_index) {
            self.state = state.to_string();
        }
    }

    fn move_focus(&mut self, forward: bool) {
        if self.focus == FormFocus::State {
            self.accept_suggestion();
        }
        self.focus = if forward {
            self.focus.next()
        } else {
            self.focus.prev()
        };
    }

    fn toggle(&mut self) {
        match self.focus {
            FormFocus::Validate => self.config.validate_data = !self.config.validate_data,
            FormFocus::ExportFormat => self.config.export_format = self.config.export_format.next(),
            _ => {}
        }
    }

    fn error_for(&self, field: FormField) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    fn field_lines(&self, focus: FormFocus, label: &str, value: &str) -> Vec<Line<'static>> {
        let focused = self.focus == focus;
        let prefix = if focused { "▶ " } else { "  " };
        let shown = if focused {
            format!("{}_", value)
        } else if value.is_empty() {
            "(empty)".to_string()
        } else {
            value.to_string()
        };
        let value_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::White)
        };

        let mut lines = vec![Line::from(vec![
            Span::raw(prefix),
            Span::styled(format!("{:<14}", label), Style::default().fg(Color::Gray)),
            Span::styled(shown, value_style),
        ])];
        if let Some(err) = focus.field().and_then(|f| self.error_for(f)) {
            lines.push(Line::from(Span::styled(
                format!("    {}", err),
                Style::default().fg(Color::Red),
            )));
        }
        lines
    }

    fn toggle_line(&self, focus: FormFocus, label: &str, value: String) -> Line<'static> {
        let prefix = if self.focus == focus { "▶ " } else { "  " };
        Line::from(vec![
            Span::raw(prefix),
            Span::styled(format!("{:<14}", label), Style::default().fg(Color::Gray)),
            Span::styled(
                value,
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
        ])
    }

    pub fn build_lines(&self) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(Span::styled(
                "Select a state and optionally filter by city to begin collecting postcode data.",
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(""),
        ];

        lines.extend(self.field_lines(FormFocus::State, "State *", &self.state));
        if self.focus == FormFocus::State && canonical_state(&self.state).is_none() {
            let suggestions = self.suggestions();
            if suggestions.is_empty() {
                lines.push(Line::from(Span::styled(
                    "    No states found",
                    Style::default().fg(Color::DarkGray),
                )));
            }
            for (i, state) in suggestions.iter().enumerate() {
                let style = if i == self.suggestion_index {
                    Style::default().fg(Color::Black).bg(Color::Cyan)
                } else {
                    Style::default().fg(Color::Cyan)
                };
                lines.push(Line::from(vec![
                    Span::raw("    "),
                    Span::styled(format!(" {} ", state), style),
                ]));
            }
        }
        lines.extend(self.field_lines(FormFocus::City, "City", &self.city));

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "─ Configuration ─",
            Style::default().fg(Color::DarkGray),
        )));
        lines.extend(self.field_lines(FormFocus::CountryCode, "Country code", &self.country_code));
        lines.extend(self.field_lines(FormFocus::BatchSize, "Batch size", &self.batch_size));
        lines.extend(self.field_lines(FormFocus::Delay, "Delay (ms)", &self.delay_ms));
        lines.extend(self.field_lines(FormFocus::MaxRetries, "Max retries", &self.max_retries));
        lines.push(self.toggle_line(
            FormFocus::Validate,
            "Validation",
            if self.config.validate_data { "[x] ON" } else { "[ ] OFF" }.to_string(),
        ));
        lines.push(self.toggle_line(
            FormFocus::ExportFormat,
            "Export format",
            format_export_format(self.config.export_format).to_string(),
        ));

        if let Some(ref err) = self.submit_error {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Failed to start scraping. Please try again.",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                err.clone(),
                Style::default().fg(Color::Red),
            )));
        }

        lines.push(Line::from(""));
        let submit_label = if self.submitting {
            "Starting..."
        } else {
            "Start Scraping"
        };
        lines.push(Line::from(vec![
            Span::styled(
                " Enter ",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("{}  ", submit_label)),
            Span::styled(
                " Tab ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw("Next field  "),
            Span::styled(
                " Space ",
                Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
            ),
            Span::raw("Toggle  "),
            Span::styled(
                " Esc ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw("Close"),
        ]));
        lines
    }
}

impl Component for ScrapeFormDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.submitting {
            return Ok(match key.code {
                KeyCode::Esc => Some(Action::CloseModal),
                _ => None,
            });
        }

        let action = match key.code {
            KeyCode::Esc => Some(Action::CloseModal),
            KeyCode::Enter => {
                if self.focus == FormFocus::State {
                    self.accept_suggestion();
                }
                Some(Action::ConfirmModal)
            }
            KeyCode::Tab => {
                self.move_focus(true);
                None
            }
            KeyCode::BackTab => {
                self.move_focus(false);
                None
            }
            KeyCode::Down if self.focus == FormFocus::State => {
                let max = self.suggestions().len().saturating_sub(1);
                self.suggestion_index = (self.suggestion_index + 1).min(max);
                None
            }
            KeyCode::Up if self.focus == FormFocus::State => {
                self.suggestion_index = self.suggestion_index.saturating_sub(1);
                None
            }
            KeyCode::Down => {
                self.move_focus(true);
                None
            }
            KeyCode::Up => {
                self.move_focus(false);
                None
            }
            KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right
                if matches!(self.focus, FormFocus::Validate | FormFocus::ExportFormat) =>
            {
                self.toggle();
                None
            }
            KeyCode::Backspace => {
                if let Some(input) = self.input_mut() {
                    input.pop();
                }
                self.suggestion_index = 0;
                None
            }
            KeyCode::Char(c) => {
                let focus = self.focus;
                if let Some(input) = self.input_mut() {
                    match focus {
                        FormFocus::CountryCode => input.push(c.to_ascii_uppercase()),
                        FormFocus::BatchSize | FormFocus::Delay | FormFocus::MaxRetries => {
                            if c.is_ascii_digit() {
                                input.push(c);
                            }
                        }
                        _ => input.push(c),
                    }
                }
                self.suggestion_index = 0;
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let content = self.build_lines();
        let height = (content.len() as u16 + 2).min(area.height);
        let popup_area = centered_popup(area, 84, height);

        frame.render_widget(Clear, popup_area);

        let paragraph = Paragraph::new(content).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Start Scraping ")
                .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        );
        frame.render_widget(paragraph, popup_area);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(dialog: &mut ScrapeFormDialog, code: KeyCode) -> Option<Action> {
        dialog
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    fn type_text(dialog: &mut ScrapeFormDialog, text: &str) {
        for c in text.chars() {
            press(dialog, KeyCode::Char(c));
        }
    }

    fn text(lines: &[Line]) -> String {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_autocomplete_accepts_highlighted_state() {
        let mut dialog = ScrapeFormDialog::default();
        type_text(&mut dialog, "new");
        assert_eq!(
            dialog.suggestions(),
            vec!["New Hampshire", "New Jersey", "New Mexico", "New York"]
        );
        press(&mut dialog, KeyCode::Down);
        press(&mut dialog, KeyCode::Down);
        press(&mut dialog, KeyCode::Down);
        press(&mut dialog, KeyCode::Tab);
        assert_eq!(dialog.focus, FormFocus::City);

        type_text(&mut dialog, "Buffalo");
        assert_eq!(press(&mut dialog, KeyCode::Enter), Some(Action::ConfirmModal));
        let (draft, req) = dialog.submit().unwrap();
        assert_eq!(req.state, "New York");
        assert_eq!(req.city.as_deref(), Some("Buffalo"));
        assert_eq!(draft.config, ScrapeConfig::default());
        assert!(dialog.is_submitting());
    }

    #[test]
    fn test_no_states_found() {
        let mut dialog = ScrapeFormDialog::default();
        type_text(&mut dialog, "zzz");
        assert!(dialog.suggestions().is_empty());
        assert!(text(&dialog.build_lines()).contains("No states found"));
    }

    #[test]
    fn test_submit_blocked_by_errors() {
        let mut dialog = ScrapeFormDialog::default();
        assert!(dialog.submit().is_none());
        assert_eq!(dialog.errors()[0].field, FormField::State);
        assert!(text(&dialog.build_lines()).contains("State is required"));
        assert!(!dialog.is_submitting());

        dialog.focus = FormFocus::BatchSize;
        press(&mut dialog, KeyCode::Backspace);
        press(&mut dialog, KeyCode::Backspace);
        press(&mut dialog, KeyCode::Backspace);
        dialog.focus = FormFocus::State;
        type_text(&mut dialog, "Texas");
        assert!(dialog.submit().is_none());
        assert_eq!(dialog.errors().len(), 1);
        assert_eq!(dialog.errors()[0].field, FormField::BatchSize);
    }

    #[test]
    fn test_failed_start_shows_alert_and_allows_retry() {
        let mut dialog = ScrapeFormDialog::default();
        type_text(&mut dialog, "California");
        assert!(dialog.submit().is_some());
        assert!(dialog.submit().is_none());
        assert!(text(&dialog.build_lines()).contains("Starting..."));

        dialog.finish(Some("HTTP 500: boom".to_string()));
        let rendered = text(&dialog.build_lines());
        assert!(rendered.contains("Failed to start scraping. Please try again."));
        assert!(rendered.contains("HTTP 500: boom"));
        assert!(dialog.submit().is_some());
    }

    #[test]
    fn test_toggles_and_reset_keep_config() {
        let mut dialog = ScrapeFormDialog::default();
        dialog.focus = FormFocus::Validate;
        press(&mut dialog, KeyCode::Char(' '));
        dialog.focus = FormFocus::ExportFormat;
        press(&mut dialog, KeyCode::Right);
        dialog.focus = FormFocus::State;
        type_text(&mut dialog, "Ohio");
        let (draft, _) = dialog.submit().unwrap();
        assert!(!draft.config.validate_data);
        assert_eq!(draft.config.export_format, crate::model::ExportFormat::Json);

        dialog.reset();
        assert!(!dialog.is_submitting());
        let (form, _) = dialog.form();
        assert_eq!(form.state, "");
        assert!(!form.config.validate_data);
    }
}
