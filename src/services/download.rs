//! Saving downloaded result CSVs

use super::error::ClientError;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSummary {
    pub path: PathBuf,
    pub rows: usize,
}

/// Count data rows, checking the payload really is CSV
pub fn count_rows(bytes: &[u8]) -> Result<usize, ClientError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    if !bytes.is_empty() && headers.iter().all(|h| h.trim().is_empty()) {
        return Err(ClientError::Deserialize("CSV has no header row".to_string()));
    }

    let mut rows = 0;
    for record in reader.records() {
        record?;
        rows += 1;
    }
    Ok(rows)
}

/// Write `bytes` to `dir/file_name`, creating `dir` if needed
pub fn save_results(bytes: &[u8], dir: &Path, file_name: &str) -> Result<DownloadSummary, ClientError> {
    let rows = count_rows(bytes)?;

    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    let path = dir.join(file_name);
    fs::write(&path, bytes)?;

    tracing::debug!(path = %path.display(), rows, "wrote results file");
    Ok(DownloadSummary { path, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &[u8] = b"Post-Code,City/Town\n90001,Los Angeles\n90002,Los Angeles\n";

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("postcode-tui-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_count_rows() {
        assert_eq!(count_rows(SAMPLE).unwrap(), 2);
        assert_eq!(count_rows(b"Post-Code,City/Town\n").unwrap(), 0);
    }

    #[test]
    fn test_ragged_csv_is_rejected() {
        let err = count_rows(b"Post-Code,City/Town\n90001\n").unwrap_err();
        assert!(matches!(err, ClientError::Csv(_)));
    }

    #[test]
    fn test_save_results_creates_directory() {
        let dir = temp_dir("save");
        let summary = save_results(SAMPLE, &dir.join("nested"), "postcodes_california.csv").unwrap();
        assert_eq!(summary.rows, 2);
        assert_eq!(fs::read(&summary.path).unwrap(), SAMPLE);
        let _ = fs::remove_dir_all(&dir);
    }
}
