use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Overrides `base_url` from the config file when set
pub const BASE_URL_ENV: &str = "POSTCODE_TUI_BASE_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Root URL of the scraping backend
    pub base_url: String,
    /// Where downloaded CSVs are written
    pub download_dir: String,
    #[serde(default = "default_job_poll_secs")]
    pub job_poll_secs: u64,
    #[serde(default = "default_stats_poll_secs")]
    pub stats_poll_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_job_poll_secs() -> u64 {
    5
}

fn default_stats_poll_secs() -> u64 {
    30
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5001".to_string(),
            download_dir: env::var("HOME")
                .map(|home| format!("{}/Downloads", home))
                .unwrap_or_else(|_| ".".to_string()),
            job_poll_secs: default_job_poll_secs(),
            stats_poll_secs: default_stats_poll_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Config {
    pub fn config_dir() -> Option<PathBuf> {
        let home = env::var("HOME").ok()?;
        Some(PathBuf::from(home).join(".postcode-tui"))
    }

    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.json"))
    }

    pub fn load() -> Option<Config> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            return None;
        }

        let contents = fs::read_to_string(&config_path).ok()?;
        let config: Config = serde_json::from_str(&contents).ok()?;
        Some(config.with_env_override(env::var(BASE_URL_ENV).ok()))
    }

    fn with_env_override(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        self
    }

    /// Save the config to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let config_dir = Self::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
        }

        let config_path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config path"))?;

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;

        Ok(())
    }

    pub fn job_poll_interval(&self) -> Duration {
        Duration::from_secs(self.job_poll_secs.max(1))
    }

    pub fn stats_poll_interval(&self) -> Duration {
        Duration::from_secs(self.stats_poll_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
