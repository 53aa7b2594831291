//! Database statistics card

use crate::format::{format_date_time, format_number, format_percentage};
use crate::model::connection::QueryState;
use crate::model::job::PostcodeEntry;
use crate::model::stats::DatabaseStats;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

/// Regions listed on the card
const REGION_LIMIT: usize = 8;

fn recent_row(entry: &PostcodeEntry) -> Line<'static> {
    let place = if entry.place_name.is_empty() {
        "N/A".to_string()
    } else {
        entry.place_name.clone()
    };
    Line::from(vec![
        Span::styled(
            format!("  {:<10}", entry.code),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(place, Style::default().fg(Color::White)),
    ])
}

pub fn quality_color(percent: f64) -> Color {
    if percent > 90.0 {
        Color::Green
    } else if percent > 70.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}

fn row(label: &str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<18}", label), Style::default().fg(Color::Gray)),
        Span::styled(value, Style::default().fg(color).add_modifier(Modifier::BOLD)),
    ])
}

fn section(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        title.to_string(),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
    ))
}

/// Card body; the last good snapshot stays visible while a refetch runs or fails
pub fn build_stats_lines(stats: Option<&DatabaseStats>, query: &QueryState) -> Vec<Line<'static>> {
    let Some(stats) = stats else {
        if let Some(ref err) = query.last_error {
            return vec![
                Line::from(Span::styled(
                    "Failed to load database statistics",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(err.clone(), Style::default().fg(Color::DarkGray))),
            ];
        }
        return vec![Line::from(Span::styled(
            "Loading database statistics...",
            Style::default().fg(Color::DarkGray),
        ))];
    };

    let mut lines = vec![
        Line::from(Span::styled(
            format!("Last updated: {}", format_date_time(&stats.last_updated)),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                format_number(stats.total_records),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" Total postcode records", Style::default().fg(Color::Gray)),
        ]),
    ];

    lines.push(Line::from(""));
    lines.push(section("Recent Entries"));
    if stats.recent_entries.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No recent entries",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        // newest last on the wire
        lines.extend(stats.recent_entries.iter().rev().map(recent_row));
    }

    if let Some(quality) = stats.data_quality {
        lines.push(Line::from(""));
        lines.push(section("Data Quality"));
        if let Some(ratio) = stats.valid_ratio() {
            lines.push(row("Overall Quality", format_percentage(ratio), quality_color(ratio)));
        }
        lines.push(row("Valid Records", format_number(quality.valid), Color::Green));
        lines.push(row("Invalid Records", format_number(quality.invalid), Color::Red));
        lines.push(row("Duplicate Records", format_number(quality.duplicate), Color::Yellow));
    }

    let regions = stats.top_regions(REGION_LIMIT);
    if !regions.is_empty() {
        lines.push(Line::from(""));
        lines.push(section("Records by Region"));
        for (name, count) in regions {
            lines.push(row(name, format_number(count), Color::White));
        }
    }

    if let Some(ref err) = query.last_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Refresh failed: {}", err),
            Style::default().fg(Color::Red),
        )));
    }

    lines
}

pub fn draw_database_stats_card(
    frame: &mut Frame,
    area: Rect,
    stats: Option<&DatabaseStats>,
    query: &QueryState,
) {
    let title = if query.in_flight && stats.is_some() {
        " Database Statistics ◌ "
    } else {
        " Database Statistics "
    };
    let paragraph = Paragraph::new(build_stats_lines(stats, query))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
