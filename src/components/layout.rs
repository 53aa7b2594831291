//! Layout calculations for the UI

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Height of the job status card
const JOB_CARD_HEIGHT: u16 = 14;
/// Height of the contact card
const CONTACT_HEIGHT: u16 = 15;

/// Dashboard layout areas
pub struct DashboardLayout {
    pub header: Rect,
    pub job: Rect,
    pub results: Rect,
    pub stats: Rect,
    pub contact: Option<Rect>,
    pub status: Option<Rect>,
    pub help: Rect,
}

/// Calculate centered popup area
pub fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    let popup_x = area.x + (area.width.saturating_sub(width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect::new(
        popup_x,
        popup_y,
        width.min(area.width),
        height.min(area.height),
    )
}

/// Calculate the dashboard layout
///
/// Left column: job status card above the results preview.
/// Right column: database statistics above the contact card, which is
/// dropped when the terminal is too short to fit both.
pub fn calculate_dashboard_layout(area: Rect, has_status: bool) -> DashboardLayout {
    let mut constraints = vec![Constraint::Length(2), Constraint::Min(0)];
    if has_status {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Length(3));

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let body = main_chunks[1];
    let (status_area, help_area) = if has_status {
        (Some(main_chunks[2]), main_chunks[3])
    } else {
        (None, main_chunks[2])
    };

    // Horizontal split: jobs (60%) and statistics (40%)
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(body);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(JOB_CARD_HEIGHT), Constraint::Min(0)])
        .split(columns[0]);

    let (stats_area, contact_area) = if columns[1].height >= CONTACT_HEIGHT * 2 {
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(CONTACT_HEIGHT)])
            .split(columns[1]);
        (right[0], Some(right[1]))
    } else {
        (columns[1], None)
    };

    DashboardLayout {
        header: main_chunks[0],
        job: left[0],
        results: left[1],
        stats: stats_area,
        contact: contact_area,
        status: status_area,
        help: help_area,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_popup_is_centered_and_clamped() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(centered_popup(area, 40, 10), Rect::new(30, 15, 40, 10));
        assert_eq!(centered_popup(area, 200, 80), Rect::new(0, 0, 100, 40));
    }

    #[test]
    fn test_short_terminal_drops_contact_card() {
        let tall = calculate_dashboard_layout(Rect::new(0, 0, 120, 50), true);
        assert!(tall.contact.is_some());
        assert_eq!(tall.status.map(|s| s.height), Some(1));
        assert_eq!(tall.help.height, 3);

        let short = calculate_dashboard_layout(Rect::new(0, 0, 120, 30), false);
        assert!(short.contact.is_none());
        assert!(short.status.is_none());
        assert_eq!(short.job.height, JOB_CARD_HEIGHT);
    }
}
