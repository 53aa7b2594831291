//! Database statistics projection

use super::job::PostcodeEntry;
use super::response::{DataQuality, DatabaseStatsResponse};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseStats {
    pub total_records: u64,
    pub records_by_region: BTreeMap<String, u64>,
    pub recent_entries: Vec<PostcodeEntry>,
    pub data_quality: Option<DataQuality>,
    pub last_updated: DateTime<Local>,
}

impl DatabaseStats {
    /// Build from a wire snapshot; `received_at` stands in for a missing timestamp
    pub fn from_response(resp: &DatabaseStatsResponse, received_at: DateTime<Local>) -> Self {
        let last_updated = resp
            .last_updated
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or(received_at);

        Self {
            total_records: resp.total_postcodes,
            records_by_region: resp.region_counts.clone(),
            recent_entries: resp.recent_entries.clone(),
            data_quality: resp.data_quality,
            last_updated,
        }
    }

    /// Regions sorted by record count, largest first
    pub fn top_regions(&self, limit: usize) -> Vec<(&str, u64)> {
        let mut regions: Vec<(&str, u64)> = self
            .records_by_region
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        regions.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        regions.truncate(limit);
        regions
    }

    /// Valid records as a share of all stored records, clamped to 0..=100
    pub fn valid_ratio(&self) -> Option<f64> {
        let quality = self.data_quality?;
        if self.total_records == 0 {
            return None;
        }
        let percent = quality.valid as f64 / self.total_records as f64 * 100.0;
        Some(percent.clamp(0.0, 100.0))
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Local>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Local));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response() -> DatabaseStatsResponse {
        let mut region_counts = BTreeMap::new();
        region_counts.insert("Texas".to_string(), 300);
        region_counts.insert("California".to_string(), 900);
        region_counts.insert("Alaska".to_string(), 300);
        DatabaseStatsResponse {
            total_postcodes: 1500,
            recent_entries: vec![PostcodeEntry::new("73301", "Austin")],
            region_counts,
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_timestamp_is_stamped_on_receipt() {
        let now = Local::now();
        let stats = DatabaseStats::from_response(&response(), now);
        assert_eq!(stats.last_updated, now);
        assert_eq!(stats.total_records, 1500);
    }

    #[test]
    fn test_server_timestamp_is_kept() {
        let mut resp = response();
        resp.last_updated = Some("2024-03-01 12:30:00".to_string());
        let stats = DatabaseStats::from_response(&resp, Local::now());
        assert_eq!(
            stats.last_updated.format("%Y-%m-%d %H:%M").to_string(),
            "2024-03-01 12:30"
        );
    }

    #[test]
    fn test_top_regions_order() {
        let stats = DatabaseStats::from_response(&response(), Local::now());
        let top = stats.top_regions(2);
        assert_eq!(top, vec![("California", 900), ("Alaska", 300)]);
    }

    #[test]
    fn test_valid_ratio() {
        let mut resp = response();
        resp.data_quality = Some(DataQuality {
            valid: 1200,
            invalid: 100,
            duplicate: 0,
        });
        let stats = DatabaseStats::from_response(&resp, Local::now());
        assert_eq!(stats.valid_ratio(), Some(80.0));
        assert_eq!(stats.recent_entries[0].place_name, "Austin");

        resp.total_postcodes = 0;
        let empty = DatabaseStats::from_response(&resp, Local::now());
        assert_eq!(empty.valid_ratio(), None);
    }
}
