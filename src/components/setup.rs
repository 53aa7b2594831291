//! Setup wizard component
//!
//! Interactive setup for first-time configuration: backend URL and
//! download directory, written to `~/.postcode-tui/config.json`.

use crate::action::Action;
use crate::component::Component;
use crate::config::{Config, BASE_URL_ENV};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Setup wizard step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStep {
    Welcome,
    BackendUrl,
    DownloadDir,
    Confirm,
}

impl SetupStep {
    fn next(&self) -> Option<SetupStep> {
        match self {
            SetupStep::Welcome => Some(SetupStep::BackendUrl),
            SetupStep::BackendUrl => Some(SetupStep::DownloadDir),
            SetupStep::DownloadDir => Some(SetupStep::Confirm),
            SetupStep::Confirm => None,
        }
    }

    fn prev(&self) -> Option<SetupStep> {
        match self {
            SetupStep::Welcome => None,
            SetupStep::BackendUrl => Some(SetupStep::Welcome),
            SetupStep::DownloadDir => Some(SetupStep::BackendUrl),
            SetupStep::Confirm => Some(SetupStep::DownloadDir),
        }
    }

    fn title(&self) -> &str {
        match self {
            SetupStep::Welcome => "Welcome",
            SetupStep::BackendUrl => "Backend URL",
            SetupStep::DownloadDir => "Download Directory",
            SetupStep::Confirm => "Confirm",
        }
    }

    fn step_number(&self) -> usize {
        match self {
            SetupStep::Welcome => 1,
            SetupStep::BackendUrl => 2,
            SetupStep::DownloadDir => 3,
            SetupStep::Confirm => 4,
        }
    }
}

/// Setup wizard component
pub struct SetupComponent {
    /// Current step
    pub step: SetupStep,
    /// Config being built
    pub config: Config,
    /// Current input text
    pub input: String,
    /// Error message to display
    pub error: Option<String>,
    /// Whether setup is complete
    pub complete: bool,
}

impl Default for SetupComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl SetupComponent {
    pub fn new() -> Self {
        Self {
            step: SetupStep::Welcome,
            config: Config::default(),
            input: String::new(),
            error: None,
            complete: false,
        }
    }

    /// Get the saved config if setup completed successfully
    pub fn get_config(&self) -> Option<&Config> {
        if self.complete {
            Some(&self.config)
        } else {
            None
        }
    }

    fn validate_current_step(&mut self) -> bool {
        self.error = None;

        match self.step {
            SetupStep::Welcome => true,
            SetupStep::BackendUrl => {
                let input = self.input.trim();
                if input.is_empty() {
                    self.error = Some("Backend URL is required".to_string());
                    return false;
                }
                match reqwest::Url::parse(input) {
                    Ok(url) if matches!(url.scheme(), "http" | "https") => {}
                    Ok(url) => {
                        self.error = Some(format!("Unsupported scheme: {}", url.scheme()));
                        return false;
                    }
                    Err(e) => {
                        self.error = Some(format!("Invalid URL: {}", e));
                        return false;
                    }
                }
                self.config.base_url = input.trim_end_matches('/').to_string();
                true
            }
            SetupStep::DownloadDir => {
                let input = self.input.trim();
                if input.is_empty() {
                    self.error = Some("Download directory is required".to_string());
                    return false;
                }
                let path = std::path::Path::new(input);
                if path.exists() && !path.is_dir() {
                    self.error = Some("Path must be a directory".to_string());
                    return false;
                }
                self.config.download_dir = input.to_string();
                true
            }
            SetupStep::Confirm => true,
        }
    }

    fn advance_step(&mut self) {
        if self.validate_current_step() {
            if let Some(next) = self.step.next() {
                self.step = next;
                self.input = self.input_for_step();
            } else {
                // On confirm step, save the config
                self.save_config();
            }
        }
    }

    fn go_back(&mut self) {
        if let Some(prev) = self.step.prev() {
            self.step = prev;
            self.error = None;
            self.input = self.input_for_step();
        }
    }

    fn input_for_step(&self) -> String {
        match self.step {
            SetupStep::BackendUrl => self.config.base_url.clone(),
            SetupStep::DownloadDir => self.config.download_dir.clone(),
            SetupStep::Welcome | SetupStep::Confirm => String::new(),
        }
    }

    fn save_config(&mut self) {
        match self.config.save() {
            Ok(()) => {
                self.complete = true;
            }
            Err(e) => {
                self.error = Some(format!("Failed to save config: {}", e));
            }
        }
    }
}

impl Component for SetupComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match self.step {
            SetupStep::Welcome => match key.code {
                KeyCode::Enter => {
                    self.advance_step();
                    Ok(None)
                }
                KeyCode::Esc => Ok(Some(Action::ForceQuit)),
                _ => Ok(None),
            },
            SetupStep::BackendUrl | SetupStep::DownloadDir => match key.code {
                KeyCode::Enter => {
                    self.advance_step();
                    Ok(None)
                }
                KeyCode::Esc => {
                    self.go_back();
                    Ok(None)
                }
                KeyCode::Backspace => {
                    self.input.pop();
                    self.error = None;
                    Ok(None)
                }
                KeyCode::Char(c) => {
                    self.input.push(c);
                    self.error = None;
                    Ok(None)
                }
                _ => Ok(None),
            },
            SetupStep::Confirm => match key.code {
                KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.save_config();
                    if self.complete {
                        Ok(Some(Action::SetupConfirm))
                    } else {
                        Ok(None)
                    }
                }
                KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                    self.go_back();
                    Ok(None)
                }
                KeyCode::Backspace => {
                    self.go_back();
                    Ok(None)
                }
                _ => Ok(None),
            },
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        // Clear the screen
        frame.render_widget(Clear, area);
        let background = Block::default().style(Style::default().bg(Color::Reset));
        frame.render_widget(background, area);

        let margin = 4;
        let content_area = Rect::new(
            margin,
            margin,
            area.width.saturating_sub(margin * 2),
            area.height.saturating_sub(margin * 2),
        );

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Length(2), // Progress
                Constraint::Min(10),   // Content
                Constraint::Length(3), // Help
            ])
            .split(content_area);

        // Title
        let title = Paragraph::new(Line::from(vec![
            Span::styled(
                " Postcode Scraper Setup ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
        ]))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(title, chunks[0]);

        // Progress indicator
        let progress = format!(
            "Step {} of 4: {}",
            self.step.step_number(),
            self.step.title()
        );
        let progress_widget = Paragraph::new(Line::from(vec![
            Span::styled(progress, Style::default().fg(Color::DarkGray)),
        ]));
        frame.render_widget(progress_widget, chunks[1]);

        // Content based on step
        self.draw_step_content(frame, chunks[2]);

        // Help bar
        let help_text = match self.step {
            SetupStep::Welcome => " Enter  Continue   Esc  Quit",
            SetupStep::BackendUrl | SetupStep::DownloadDir => {
                " Enter  Continue   Esc  Back   Type to edit"
            }
            SetupStep::Confirm => " Enter/y  Save & Continue   Esc/n  Go Back",
        };
        let help = Paragraph::new(Line::from(vec![Span::styled(
            help_text,
            Style::default().fg(Color::DarkGray),
        )]))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(help, chunks[3]);

        Ok(())
    }
}

impl SetupComponent {
    fn draw_step_content(&self, frame: &mut Frame, area: Rect) {
        match self.step {
            SetupStep::Welcome => self.draw_welcome(frame, area),
            SetupStep::BackendUrl => self.draw_backend_url(frame, area),
            SetupStep::DownloadDir => self.draw_download_dir(frame, area),
            SetupStep::Confirm => self.draw_confirm(frame, area),
        }
    }

    fn draw_welcome(&self, frame: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "Welcome to the Postcode Scraper dashboard!",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from("This wizard connects the dashboard to your scraping backend."),
            Line::from(""),
            Line::from("You will need to provide:"),
            Line::from(vec![Span::styled(
                "  1. URL of the scraping backend",
                Style::default().fg(Color::Cyan),
            )]),
            Line::from(vec![Span::styled(
                "  2. Directory where downloaded CSV files are saved",
                Style::default().fg(Color::Cyan),
            )]),
            Line::from(""),
            Line::from(vec![Span::styled(
                "Press Enter to begin...",
                Style::default().fg(Color::Yellow),
            )]),
        ];

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Welcome ")
                .border_style(Style::default().fg(Color::Green)),
        );
        frame.render_widget(paragraph, area);
    }

    fn draw_input_step(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        prompt: &str,
        hint: &str,
        note: Option<Line<'static>>,
    ) {
        let mut lines = vec![
            Line::from(""),
            Line::from(prompt.to_string()),
            Line::from(Span::styled(hint.to_string(), Style::default().fg(Color::DarkGray))),
            Line::from(""),
            Line::from(vec![
                Span::styled("> ", Style::default().fg(Color::Cyan)),
                Span::styled(
                    format!("{}_", &self.input),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
        ];

        if let Some(note) = note {
            lines.push(Line::from(""));
            lines.push(note);
        }

        if let Some(ref error) = self.error {
            lines.push(Line::from(""));
            lines.push(Line::from(vec![Span::styled(
                format!("Error: {}", error),
                Style::default().fg(Color::Red),
            )]));
        }

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", title))
                .border_style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(paragraph, area);
    }

    fn draw_backend_url(&self, frame: &mut Frame, area: Rect) {
        self.draw_input_step(
            frame,
            area,
            "Backend URL",
            "Enter the URL of the scraping backend:",
            &format!("(e.g., http://localhost:5001; {} overrides it at startup)", BASE_URL_ENV),
            None,
        );
    }

    fn draw_download_dir(&self, frame: &mut Frame, area: Rect) {
        let path = std::path::Path::new(self.input.trim());
        let note = if self.input.trim().is_empty() {
            None
        } else if path.is_dir() {
            Some(Line::from(Span::styled(
                "✓ Directory exists",
                Style::default().fg(Color::Green),
            )))
        } else if !path.exists() {
            Some(Line::from(Span::styled(
                "Directory will be created on the first download",
                Style::default().fg(Color::Yellow),
            )))
        } else {
            None
        };
        self.draw_input_step(
            frame,
            area,
            "Download Directory",
            "Enter the directory for downloaded CSV files:",
            "(files are named postcodes_<state>.csv)",
            note,
        );
    }

    fn draw_confirm(&self, frame: &mut Frame, area: Rect) {
        let config_dir = Config::config_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "~/.postcode-tui".to_string());

        let mut lines = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "Review your configuration:",
                Style::default().add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Backend URL:        ", Style::default().fg(Color::Cyan)),
                Span::raw(&self.config.base_url),
            ]),
            Line::from(vec![
                Span::styled("Download directory: ", Style::default().fg(Color::Cyan)),
                Span::raw(&self.config.download_dir),
            ]),
            Line::from(vec![
                Span::styled("Polling:            ", Style::default().fg(Color::Cyan)),
                Span::raw(format!(
                    "job every {}s, statistics every {}s",
                    self.config.job_poll_secs, self.config.stats_poll_secs
                )),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Config will be saved to: ", Style::default().fg(Color::DarkGray)),
                Span::raw(format!("{}/config.json", config_dir)),
            ]),
            Line::from(""),
            Line::from(vec![Span::styled(
                "Press Enter or 'y' to save and continue...",
                Style::default().fg(Color::Yellow),
            )]),
        ];

        if let Some(ref error) = self.error {
            lines.push(Line::from(""));
            lines.push(Line::from(vec![Span::styled(
                format!("Error: {}", error),
                Style::default().fg(Color::Red),
            )]));
        }

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Confirm Configuration ")
                .border_style(Style::default().fg(Color::Green)),
        );
        frame.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(setup: &mut SetupComponent, code: KeyCode) -> Option<Action> {
        setup
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    fn replace_input(setup: &mut SetupComponent, text: &str) {
        while !setup.input.is_empty() {
            press(setup, KeyCode::Backspace);
        }
        for c in text.chars() {
            press(setup, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_backend_url_prefilled_and_validated() {
        let mut setup = SetupComponent::new();
        press(&mut setup, KeyCode::Enter);
        assert_eq!(setup.step, SetupStep::BackendUrl);
        assert_eq!(setup.input, "http://localhost:5001");

        replace_input(&mut setup, "not a url");
        press(&mut setup, KeyCode::Enter);
        assert_eq!(setup.step, SetupStep::BackendUrl);
        assert!(setup.error.as_deref().unwrap().starts_with("Invalid URL"));

        replace_input(&mut setup, "ftp://scraper");
        press(&mut setup, KeyCode::Enter);
        assert_eq!(setup.error.as_deref(), Some("Unsupported scheme: ftp"));

        replace_input(&mut setup, "http://scraper:5001/");
        press(&mut setup, KeyCode::Enter);
        assert_eq!(setup.step, SetupStep::DownloadDir);
        assert_eq!(setup.config.base_url, "http://scraper:5001");
    }

    #[test]
    fn test_download_dir_must_not_be_a_file() {
        let file = std::env::temp_dir().join("postcode-tui-setup-test.txt");
        std::fs::write(&file, "x").unwrap();

        let mut setup = SetupComponent::new();
        setup.step = SetupStep::DownloadDir;
        replace_input(&mut setup, &file.display().to_string());
        press(&mut setup, KeyCode::Enter);
        assert_eq!(setup.error.as_deref(), Some("Path must be a directory"));

        let dir = std::env::temp_dir();
        replace_input(&mut setup, &dir.display().to_string());
        press(&mut setup, KeyCode::Enter);
        assert_eq!(setup.step, SetupStep::Confirm);
        assert_eq!(setup.config.download_dir, dir.display().to_string());

        press(&mut setup, KeyCode::Esc);
        assert_eq!(setup.step, SetupStep::DownloadDir);
        assert_eq!(setup.input, dir.display().to_string());
        let _ = std::fs::remove_file(file);
    }
}
