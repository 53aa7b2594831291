//! Job projection - the client's copy of a server-side scraping job

use super::response::JobStatusResponse;
use super::status::JobStatus;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Maximum number of preview rows kept and shown for a job
pub const PREVIEW_ROWS: usize = 5;

/// A single scraped postcode row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PostcodeEntry {
    #[serde(rename = "Post-Code", default)]
    pub code: String,
    #[serde(rename = "City/Town", default)]
    pub place_name: String,
}

impl PostcodeEntry {
    pub fn new(code: impl Into<String>, place_name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            place_name: place_name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
    Excel,
}

impl ExportFormat {
    pub fn all() -> [ExportFormat; 3] {
        [ExportFormat::Csv, ExportFormat::Json, ExportFormat::Excel]
    }

    pub fn next(&self) -> ExportFormat {
        match self {
            ExportFormat::Csv => ExportFormat::Json,
            ExportFormat::Json => ExportFormat::Excel,
            ExportFormat::Excel => ExportFormat::Csv,
        }
    }
}

/// Control requests that can be sent for a job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobControl {
    Pause,
    Resume,
    Cancel,
}

impl JobControl {
    pub fn verb(&self) -> &'static str {
        match self {
            JobControl::Pause => "pause",
            JobControl::Resume => "resume",
            JobControl::Cancel => "cancel",
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            JobControl::Pause => "paused",
            JobControl::Resume => "resumed",
            JobControl::Cancel => "cancelled",
        }
    }

    /// Whether the control makes sense for a job in `status`
    pub fn allowed_for(&self, status: JobStatus) -> bool {
        match self {
            JobControl::Pause => status.can_pause(),
            JobControl::Resume => status.can_resume(),
            JobControl::Cancel => status.can_cancel(),
        }
    }
}

/// Configuration snapshot captured when a job is started
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeConfig {
    pub country_code: String,
    pub batch_size: u32,
    pub delay_ms: u32,
    pub max_retries: u32,
    pub validate_data: bool,
    pub export_format: ExportFormat,
    pub output_path: Option<String>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            country_code: "US".to_string(),
            batch_size: 100,
            delay_ms: 1000,
            max_retries: 3,
            validate_data: true,
            export_format: ExportFormat::Csv,
            output_path: None,
        }
    }
}

/// Locally held view of one job.
///
/// Only `merge_response` mutates the server-owned fields; `state`, `city`
/// and `config` are client-only and survive every merge.
#[derive(Debug, Clone, PartialEq)]
pub struct JobProjection {
    pub job_id: String,
    pub status: JobStatus,
    pub state: String,
    pub city: Option<String>,
    pub config: ScrapeConfig,
    pub preview: Vec<PostcodeEntry>,
    pub results_count: u64,
    pub db_entries: Option<u64>,
    pub message: Option<String>,
    pub error_details: Option<String>,
    pub progress: f64,
    pub processed_records: u64,
    pub total_records: u64,
    pub error_count: u64,
    pub estimated_remaining_secs: Option<u64>,
    pub started_at: DateTime<Local>,
    pub finished_at: Option<DateTime<Local>>,
}

impl JobProjection {
    /// Synthesised projection shown between a successful start and the first poll
    pub fn pending(
        job_id: impl Into<String>,
        state: impl Into<String>,
        city: Option<String>,
        config: ScrapeConfig,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            status: JobStatus::Pending,
            state: state.into(),
            city,
            config,
            preview: Vec::new(),
            results_count: 0,
            db_entries: None,
            message: None,
            error_details: None,
            progress: 0.0,
            processed_records: 0,
            total_records: 0,
            error_count: 0,
            estimated_remaining_secs: None,
            started_at: Local::now(),
            finished_at: None,
        }
    }

    /// Overwrite the fields the response carries, keep everything else
    pub fn merge_response(&mut self, resp: &JobStatusResponse) {
        self.status = resp.status;

        if let Some(ref preview) = resp.preview {
            self.preview = preview.iter().take(PREVIEW_ROWS).cloned().collect();
        }
        if let Some(count) = resp.results_count {
            self.results_count = count;
        }
        if let Some(entries) = resp.db_entries {
            self.db_entries = Some(entries);
        }
        if let Some(ref message) = resp.message {
            self.message = Some(message.clone());
        }
        if let Some(ref details) = resp.error_details {
            self.error_details = Some(details.clone());
        }
        if let Some(processed) = resp.processed_records {
            self.processed_records = processed;
        }
        if let Some(total) = resp.total_records {
            self.total_records = total;
        }
        if let Some(errors) = resp.error_count {
            self.error_count = errors;
        }
        if let Some(eta) = resp.estimated_time_remaining {
            self.estimated_remaining_secs = Some(eta);
        }

        self.progress = match resp.progress {
            Some(p) => p,
            None if self.total_records > 0 => {
                self.processed_records as f64 / self.total_records as f64 * 100.0
            }
            None => self.progress,
        };

        self.normalize();
    }

    /// Keep progress, counters and status mutually consistent
    fn normalize(&mut self) {
        self.progress = self.progress.clamp(0.0, 100.0);

        if self.status == JobStatus::Completed {
            let total = self.total_records.max(self.results_count);
            self.total_records = total;
            self.processed_records = total;
            self.progress = 100.0;
        } else if self.total_records > 0 {
            self.processed_records = self.processed_records.min(self.total_records);
        }

        if self.status.is_terminal() {
            self.estimated_remaining_secs = None;
            if self.finished_at.is_none() {
                self.finished_at = Some(Local::now());
            }
        }
    }

    /// Human readable target, e.g. "California (Los Angeles)"
    pub fn target_label(&self) -> String {
        match self.city {
            Some(ref city) if !city.is_empty() => format!("{} ({})", self.state, city),
            _ => self.state.clone(),
        }
    }

    /// Filename used when saving the downloaded CSV
    pub fn download_file_name(&self) -> String {
        format!("postcodes_{}.csv", self.state.to_lowercase().replace(' ', "_"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: JobStatus) -> JobStatusResponse {
        JobStatusResponse {
            status,
            ..Default::default()
        }
    }

    fn sample_job() -> JobProjection {
        JobProjection::pending(
            "job-1",
            "California",
            Some("Los Angeles".to_string()),
            ScrapeConfig::default(),
        )
    }

    #[test]
    fn test_merge_keeps_client_only_fields() {
        let mut job = sample_job();
        let mut resp = response(JobStatus::Running);
        resp.message = Some("working".to_string());
        job.merge_response(&resp);

        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(job.state, "California");
        assert_eq!(job.city.as_deref(), Some("Los Angeles"));
        assert_eq!(job.message.as_deref(), Some("working"));
    }

    #[test]
    fn test_merge_does_not_clear_absent_fields() {
        let mut job = sample_job();
        let mut resp = response(JobStatus::Running);
        resp.message = Some("first".to_string());
        resp.processed_records = Some(10);
        resp.total_records = Some(40);
        job.merge_response(&resp);

        job.merge_response(&response(JobStatus::Running));
        assert_eq!(job.message.as_deref(), Some("first"));
        assert_eq!(job.processed_records, 10);
        assert_eq!(job.progress, 25.0);
    }

    #[test]
    fn test_completed_implies_full_progress() {
        let mut job = sample_job();
        let mut resp = response(JobStatus::Completed);
        resp.results_count = Some(1247);
        job.merge_response(&resp);

        assert_eq!(job.progress, 100.0);
        assert_eq!(job.processed_records, 1247);
        assert_eq!(job.total_records, 1247);
        assert!(job.finished_at.is_some());
    }

    #[test]
    fn test_preview_is_capped() {
        let mut job = sample_job();
        let mut resp = response(JobStatus::Completed);
        resp.preview = Some(
            (0..8)
                .map(|i| PostcodeEntry::new(format!("9021{}", i), "Beverly Hills"))
                .collect(),
        );
        job.merge_response(&resp);
        assert_eq!(job.preview.len(), PREVIEW_ROWS);
        assert_eq!(job.preview[0].code, "90210");
    }

    #[test]
    fn test_download_file_name() {
        let job = JobProjection::pending("x", "New York", None, ScrapeConfig::default());
        assert_eq!(job.download_file_name(), "postcodes_new_york.csv");
        assert_eq!(job.target_label(), "New York");
        assert_eq!(sample_job().target_label(), "California (Los Angeles)");
    }

    #[test]
    fn test_postcode_entry_wire_names() {
        let entry: PostcodeEntry =
            serde_json::from_str(r#"{"Post-Code": "90210", "City/Town": "Beverly Hills"}"#)
                .unwrap();
        assert_eq!(entry, PostcodeEntry::new("90210", "Beverly Hills"));
    }
}
