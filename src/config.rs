use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::error::ScrapeError;

/// Everything one run needs, built once at startup and passed down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub spreadsheet_id: String,
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    #[serde(default = "default_config_sheet")]
    pub config_sheet: String,
    #[serde(default = "default_packing_date_cell")]
    pub packing_date_cell: String,
    #[serde(default = "default_status_cell")]
    pub status_cell: String,
    pub credentials_path: PathBuf,

    pub username: String,
    pub password: String,
    pub login_url: String,
    pub base_url: String,
    #[serde(default, deserialize_with = "comma_list")]
    pub listing_urls: Vec<String>,

    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    #[serde(default = "default_true")]
    pub headless: bool,
    #[serde(default = "default_true")]
    pub verify_login: bool,

    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default = "default_login_delay_ms")]
    pub login_delay_ms: u64,
    #[serde(default = "default_scroll_delay_ms")]
    pub scroll_delay_ms: u64,
    #[serde(default = "default_continue_wait_ms")]
    pub continue_wait_ms: u64,
    #[serde(default = "default_page_timeout_secs")]
    pub page_timeout_secs: u64,
}

/// Fixed UI settle delays and the per-operation ceiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timings {
    pub settle_delay_ms: u64,
    pub login_delay_ms: u64,
    pub scroll_delay_ms: u64,
    pub continue_wait_ms: u64,
    pub page_timeout_secs: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            login_delay_ms: default_login_delay_ms(),
            scroll_delay_ms: default_scroll_delay_ms(),
            continue_wait_ms: default_continue_wait_ms(),
            page_timeout_secs: default_page_timeout_secs(),
        }
    }
}

impl Timings {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn login(&self) -> Duration {
        Duration::from_millis(self.login_delay_ms)
    }

    pub fn scroll(&self) -> Duration {
        Duration::from_millis(self.scroll_delay_ms)
    }

    pub fn continue_wait(&self) -> Duration {
        Duration::from_millis(self.continue_wait_ms)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }
}

impl Config {
    pub fn timings(&self) -> Timings {
        Timings {
            settle_delay_ms: self.settle_delay_ms,
            login_delay_ms: self.login_delay_ms,
            scroll_delay_ms: self.scroll_delay_ms,
            continue_wait_ms: self.continue_wait_ms,
            page_timeout_secs: self.page_timeout_secs,
        }
    }

    /// Optional `flower_scraper.{toml,yaml,json}` file, then `FLOWER_*` env vars.
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("flower_scraper").required(false))
            .add_source(config::Environment::with_prefix("FLOWER"))
            .build()
            .context("Failed to read configuration sources")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ScrapeError> {
        if self.spreadsheet_id.trim().is_empty() {
            return Err(ScrapeError::Config("spreadsheet_id is empty".into()));
        }
        let urls = [&self.base_url, &self.login_url]
            .into_iter()
            .chain(self.listing_urls.iter());
        for url in urls {
            Url::parse(url)
                .map_err(|e| ScrapeError::Config(format!("{} is not a valid URL: {}", url, e)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
impl Config {
    /// Minimal valid configuration against `https://shop.example.com`.
    pub(crate) fn for_tests(listing_urls: &[&str]) -> Self {
        Self {
            spreadsheet_id: "sheet-123".to_string(),
            sheet_name: default_sheet_name(),
            config_sheet: default_config_sheet(),
            packing_date_cell: default_packing_date_cell(),
            status_cell: default_status_cell(),
            credentials_path: PathBuf::from("/etc/flower/key.json"),
            username: "buyer".to_string(),
            password: "secret".to_string(),
            login_url: "https://shop.example.com/login".to_string(),
            base_url: "https://shop.example.com".to_string(),
            listing_urls: listing_urls.iter().map(|u| u.to_string()).collect(),
            log_file: None,
            webdriver_url: default_webdriver_url(),
            headless: true,
            verify_login: true,
            settle_delay_ms: 0,
            login_delay_ms: 0,
            scroll_delay_ms: 0,
            continue_wait_ms: 0,
            page_timeout_secs: 1,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UrlList {
    Joined(String),
    Items(Vec<String>),
}

/// Accepts `"a,b"` from the environment or a list from a config file.
fn comma_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match UrlList::deserialize(deserializer)? {
        UrlList::Joined(joined) => joined.split(',').map(str::to_string).collect(),
        UrlList::Items(items) => items,
    };
    Ok(items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

fn default_sheet_name() -> String {
    "Data".to_string()
}

fn default_config_sheet() -> String {
    "Config".to_string()
}

fn default_packing_date_cell() -> String {
    "B1".to_string()
}

fn default_status_cell() -> String {
    "B2".to_string()
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_true() -> bool {
    true
}

fn default_settle_delay_ms() -> u64 {
    2000
}

fn default_login_delay_ms() -> u64 {
    5000
}

fn default_scroll_delay_ms() -> u64 {
    1500
}

fn default_continue_wait_ms() -> u64 {
    3000
}

fn default_page_timeout_secs() -> u64 {
    60
}
