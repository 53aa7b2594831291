//! Wire types exchanged with the scraping backend

use super::job::PostcodeEntry;
use super::status::JobStatus;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Form body of `POST scrape`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapeRequest {
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl ScrapeRequest {
    /// Blank cities are left out of the body entirely
    pub fn new(state: impl Into<String>, city: Option<&str>) -> Self {
        let city = city
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        Self {
            state: state.into(),
            city,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeResponse {
    pub status: String,
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of `GET job/{id}`; every field except `status` is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobStatusResponse {
    pub status: JobStatus,
    #[serde(default)]
    pub preview: Option<Vec<PostcodeEntry>>,
    #[serde(default)]
    pub results_count: Option<u64>,
    #[serde(default)]
    pub db_entries: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error_details: Option<String>,
    #[serde(default, deserialize_with = "lenient_stats")]
    pub db_stats: Option<DatabaseStatsResponse>,
    #[serde(default)]
    pub db_stats_error: Option<String>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub processed_records: Option<u64>,
    #[serde(default)]
    pub total_records: Option<u64>,
    #[serde(default)]
    pub error_count: Option<u64>,
    #[serde(default)]
    pub estimated_time_remaining: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct DataQuality {
    #[serde(default)]
    pub valid: u64,
    #[serde(default)]
    pub invalid: u64,
    #[serde(default)]
    pub duplicate: u64,
}

/// Response of `GET database-stats`.
///
/// The backend reports its own failures with HTTP 200 and an `error` field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseStatsResponse {
    #[serde(default)]
    pub total_postcodes: u64,
    /// Most recently stored rows, oldest first
    #[serde(default)]
    pub recent_entries: Vec<PostcodeEntry>,
    #[serde(default)]
    pub region_counts: BTreeMap<String, u64>,
    #[serde(default)]
    pub data_quality: Option<DataQuality>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A malformed nested snapshot is dropped instead of failing the whole job poll
fn lenient_stats<'de, D>(deserializer: D) -> Result<Option<DatabaseStatsResponse>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match serde_json::from_value(v) {
        Ok(stats) => Some(stats),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring malformed db_stats in job poll");
            None
        }
    }))
}

/// Response of the pause/resume/cancel endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct ControlResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Form body of `POST request-info`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InfoRequestResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
}
