//! Results preview table
//!
//! Renders the first few scraped postcodes of the selected job with
//! aligned columns and a download hint once the job has results.

use crate::action::Action;
use crate::component::Component;
use crate::format::{format_number, format_results_count, pad_to_width};
use crate::model::job::PREVIEW_ROWS;
use crate::model::PostcodeEntry;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use unicode_width::UnicodeWidthStr;

const HEADERS: [&str; 2] = ["Post-Code", "City/Town"];
const MAX_COLUMN_WIDTH: usize = 40;

/// Results preview for the selected job
#[derive(Default)]
pub struct ResultsPreviewTable {
    rows: Vec<PostcodeEntry>,
    results_count: u64,
    /// Whether the selected job completed, which enables the download hint
    downloadable: bool,
    has_job: bool,
    scroll: usize,
}

impl ResultsPreviewTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the preview; scroll resets only when the rows change
    pub fn set_preview(&mut self, rows: &[PostcodeEntry], results_count: u64, downloadable: bool) {
        if self.rows.as_slice() != rows {
            self.rows = rows.to_vec();
            self.scroll = 0;
        }
        self.results_count = results_count;
        self.downloadable = downloadable;
        self.has_job = true;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn render_lines(&self) -> Vec<Line<'static>> {
        if !self.has_job {
            return vec![Line::from(Span::styled(
                "Start a scraping job to preview results.",
                Style::default().fg(Color::DarkGray),
            ))];
        }

        let mut lines = vec![Line::from(Span::styled(
            format!(
                "Showing first {} of {}",
                self.rows.len().min(PREVIEW_ROWS),
                format_results_count(self.results_count)
            ),
            Style::default().fg(Color::DarkGray),
        ))];
        lines.push(Line::from(""));

        if self.rows.is_empty() {
            lines.push(Line::from(Span::styled(
                "No postcodes found for the selected criteria.",
                Style::default().fg(Color::Gray),
            )));
        } else {
            lines.extend(build_table_lines(&self.rows));
        }

        if self.downloadable && self.results_count > 0 {
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled(
                    " d ",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(
                    "Download Full CSV ({} postcodes)",
                    format_number(self.results_count)
                )),
            ]));
        }
        lines
    }
}

fn cell(value: &str) -> &str {
    if value.trim().is_empty() {
        "N/A"
    } else {
        value
    }
}

/// Build aligned header, separator and row lines
pub fn build_table_lines(rows: &[PostcodeEntry]) -> Vec<Line<'static>> {
    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.width()).collect();
    for row in rows {
        widths[0] = widths[0].max(cell(&row.code).width());
        widths[1] = widths[1].max(cell(&row.place_name).width());
    }
    for width in &mut widths {
        *width = (*width).min(MAX_COLUMN_WIDTH);
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);

    let header_spans: Vec<Span> = HEADERS
        .iter()
        .zip(&widths)
        .flat_map(|(h, w)| {
            vec![
                Span::styled(
                    pad_to_width(h, *w),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
                Span::raw(" │ "),
            ]
        })
        .collect();
    lines.push(Line::from(header_spans));

    let separator = widths
        .iter()
        .map(|w| "─".repeat(*w))
        .collect::<Vec<_>>()
        .join("─┼─");
    lines.push(Line::from(Span::styled(
        separator,
        Style::default().fg(Color::DarkGray),
    )));

    for row in rows {
        lines.push(Line::from(vec![
            Span::styled(
                pad_to_width(cell(&row.code), widths[0]),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" │ "),
            Span::styled(
                pad_to_width(cell(&row.place_name), widths[1]),
                Style::default().fg(Color::White),
            ),
            Span::raw(" │ "),
        ]));
    }

    lines
}

impl Component for ResultsPreviewTable {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => Some(Action::ScrollDown),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::ScrollUp),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::ScrollDown => {
                let max_scroll = self.render_lines().len().saturating_sub(1);
                if self.scroll < max_scroll {
                    self.scroll += 1;
                }
            }
            Action::ScrollUp => {
                self.scroll = self.scroll.saturating_sub(1);
            }
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let content = self.render_lines();
        let visible_height = area.height.saturating_sub(2) as usize;
        let total = content.len();
        self.scroll = self.scroll.min(total.saturating_sub(visible_height));

        let paragraph = Paragraph::new(content)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Results Preview ")
                    .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .scroll((self.scroll as u16, 0));

        frame.render_widget(paragraph, area);

        if total > visible_height {
            let mut scrollbar_state =
                ScrollbarState::new(total.saturating_sub(visible_height)).position(self.scroll);

            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight)
                    .begin_symbol(Some("↑"))
                    .end_symbol(Some("↓")),
                area.inner(ratatui::layout::Margin {
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

    fn text(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect()
    }

    fn sample_rows() -> Vec<PostcodeEntry> {
        vec![
            PostcodeEntry::new("90001", "Los Angeles"),
            PostcodeEntry::new("90002", "Los Angeles"),
            PostcodeEntry::new("94102", "San Francisco"),
            PostcodeEntry::new("92101", "San Diego"),
            PostcodeEntry::new("95814", ""),
        ]
    }

    #[test]
    fn test_table_aligns_columns() {
        let lines = text(&build_table_lines(&sample_rows()));
        assert_eq!(lines.len(), 7);
        assert!(lines[0].starts_with("Post-Code │ City/Town"));
        assert!(lines[2].starts_with("90001     │ Los Angeles"));
        assert!(lines[6].contains("N/A"));
    }

    #[test]
    fn test_preview_subtitle_and_download_hint() {
        let mut table = ResultsPreviewTable::new();
        table.set_preview(&sample_rows(), 1247, true);
        let lines = text(&table.render_lines());
        assert_eq!(lines[0], "Showing first 5 of 1,247 postcodes");
        assert!(lines
            .iter()
            .any(|l| l.contains("Download Full CSV (1,247 postcodes)")));
    }

    #[test]
    fn test_empty_preview() {
        let mut table = ResultsPreviewTable::new();
        table.set_preview(&[], 0, true);
        let lines = text(&table.render_lines());
        assert_eq!(lines[0], "Showing first 0 of No results");
        assert!(lines.iter().any(|l| l == "No postcodes found for the selected criteria."));
        assert!(!lines.iter().any(|l| l.contains("Download")));
    }

    #[test]
    fn test_no_download_hint_while_running() {
        let mut table = ResultsPreviewTable::new();
        table.set_preview(&sample_rows(), 40, false);
        assert!(!text(&table.render_lines()).iter().any(|l| l.contains("Download")));
    }

    #[test]
    fn test_scroll_is_bounded() {
        let mut table = ResultsPreviewTable::new();
        table.update(Action::ScrollUp).unwrap();
        assert_eq!(table.scroll, 0);
        table.set_preview(&sample_rows(), 5, false);
        for _ in 0..50 {
            table.update(Action::ScrollDown).unwrap();
        }
        assert_eq!(table.scroll, table.render_lines().len() - 1);
    }
}
