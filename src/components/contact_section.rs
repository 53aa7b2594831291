//! "Need Help?" card with support links

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct ContactOption {
    pub title: &'static str,
    pub description: &'static str,
    pub target: &'static str,
}

pub const CONTACT_OPTIONS: [ContactOption; 4] = [
    ContactOption {
        title: "Email Support",
        description: "Get help with technical issues",
        target: "mailto:support@postcodescraper.com",
    },
    ContactOption {
        title: "GitHub Repository",
        description: "View source code and contribute",
        target: "https://github.com/postcode-scraper",
    },
    ContactOption {
        title: "Report Bug",
        description: "Found an issue? Let us know",
        target: "https://github.com/postcode-scraper/issues",
    },
    ContactOption {
        title: "Documentation",
        description: "Learn how to use the scraper",
        target: "https://docs.postcodescraper.com",
    },
];

pub fn build_contact_lines() -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        "Get support, report issues, or contribute to the project",
        Style::default().fg(Color::DarkGray),
    ))];
    lines.push(Line::from(""));

    for option in &CONTACT_OPTIONS {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<18}", option.title),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::styled(option.description, Style::default().fg(Color::Gray)),
        ]));
        lines.push(Line::from(Span::styled(
            format!("  {}", option.target),
            Style::default().fg(Color::Cyan),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(
            " i ",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw("Send an information request"),
    ]));
    lines.push(Line::from(Span::styled(
        format!("Postcode Scraper v{}", APP_VERSION),
        Style::default().fg(Color::DarkGray),
    )));
    lines
}

pub fn draw_contact_section(frame: &mut Frame, area: Rect) {
    let paragraph = Paragraph::new(build_contact_lines())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Need Help? ")
                .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_lines_list_every_option() {
        let rendered: String = build_contact_lines()
            .iter()
            .flat_map(|l| l.spans.iter().map(|s| s.content.to_string()))
            .collect();
        for option in &CONTACT_OPTIONS {
            assert!(rendered.contains(option.title));
            assert!(rendered.contains(option.target));
        }
        assert!(rendered.contains("Postcode Scraper v"));
    }
}
