//! Display formatting helpers
//!
//! Pure functions turning statuses, counts, durations and timestamps into
//! the strings shown by the components.

use crate::model::{ExportFormat, JobStatus};
use chrono::{DateTime, Local};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Label used on the job status card headline
pub fn format_job_status(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Pending => "Pending",
        JobStatus::Running => "Processing...",
        JobStatus::Paused => "Paused",
        JobStatus::Completed => "Completed",
        JobStatus::Failed => "Failed",
        JobStatus::Cancelled => "Cancelled",
    }
}

/// Short label used inside status badges
pub fn format_status(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Pending => "Pending",
        JobStatus::Running => "Running",
        JobStatus::Paused => "Paused",
        JobStatus::Completed => "Completed",
        JobStatus::Failed => "Error",
        JobStatus::Cancelled => "Cancelled",
    }
}

pub fn format_export_format(format: ExportFormat) -> &'static str {
    match format {
        ExportFormat::Csv => "CSV",
        ExportFormat::Json => "JSON",
        ExportFormat::Excel => "Excel",
    }
}

/// Format an integer with thousands separators (1247 -> "1,247")
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_results_count(count: u64) -> String {
    match count {
        0 => "No results".to_string(),
        1 => "1 postcode".to_string(),
        n => format!("{} postcodes", format_number(n)),
    }
}

/// One-line summary of a job, used for the card body and notifications
pub fn format_job_message(job_id: &str, status: JobStatus, count: Option<u64>) -> String {
    match status {
        JobStatus::Pending => format!("Job {} is queued for processing", job_id),
        JobStatus::Running => format!("Job {} is currently running...", job_id),
        JobStatus::Paused => format!("Job {} is paused", job_id),
        JobStatus::Completed => match count {
            Some(n) if n > 0 => format!(
                "Job {} completed! Found {}.",
                job_id,
                format_results_count(n)
            ),
            _ => format!(
                "Job {} completed! No postcodes found for the selected criteria.",
                job_id
            ),
        },
        JobStatus::Failed => format!("Job {} failed to complete", job_id),
        JobStatus::Cancelled => format!("Job {} was cancelled", job_id),
    }
}

pub fn format_percentage(value: f64) -> String {
    format!("{:.1}%", value.clamp(0.0, 100.0))
}

/// Format a number of seconds as a compact duration ("1h 5m", "3m 20s", "45s")
pub fn format_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let rem = secs % 60;
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else if mins > 0 {
        format!("{}m {}s", mins, rem)
    } else {
        format!("{}s", rem)
    }
}

pub fn format_date_time(ts: &DateTime<Local>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn format_time(ts: &DateTime<Local>) -> String {
    ts.format("%H:%M:%S").to_string()
}

/// Truncate to a display width, appending an ellipsis when cut
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max_width - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// Pad to a display width (format! pads by char count, not columns)
pub fn pad_to_width(s: &str, width: usize) -> String {
    let truncated = truncate_to_width(s, width);
    let pad = width.saturating_sub(truncated.width());
    format!("{}{}", truncated, " ".repeat(pad))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_groups_thousands() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1247), "1,247");
        assert_eq!(format_number(45678), "45,678");
        assert_eq!(format_number(1_000_000), "1,000,000");
    }

    #[test]
    fn test_format_results_count() {
        assert_eq!(format_results_count(0), "No results");
        assert_eq!(format_results_count(1), "1 postcode");
        assert_eq!(format_results_count(1247), "1,247 postcodes");
    }

    #[test]
    fn test_format_job_message_completed() {
        assert_eq!(
            format_job_message("job-1", JobStatus::Completed, Some(1247)),
            "Job job-1 completed! Found 1,247 postcodes."
        );
        assert_eq!(
            format_job_message("job-1", JobStatus::Completed, Some(0)),
            "Job job-1 completed! No postcodes found for the selected criteria."
        );
        assert_eq!(
            format_job_message("job-1", JobStatus::Pending, None),
            "Job job-1 is queued for processing"
        );
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(45), "45s");
        assert_eq!(format_duration(200), "3m 20s");
        assert_eq!(format_duration(3900), "1h 5m");
    }

    #[test]
    fn test_format_percentage_clamps() {
        assert_eq!(format_percentage(42.5), "42.5%");
        assert_eq!(format_percentage(150.0), "100.0%");
        assert_eq!(format_percentage(-3.0), "0.0%");
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("Beverly Hills", 20), "Beverly Hills");
        assert_eq!(truncate_to_width("Beverly Hills", 8), "Beverly…");
        assert_eq!(pad_to_width("90210", 8), "90210   ");
    }
}
