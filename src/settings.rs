use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

const CONFIG_FILE: &str = "product_scraper";
const ENV_PREFIX: &str = "SCRAPER";

pub const DEFAULT_OUTPUT: &str = "products.csv";

/// Runtime settings. Layered as: built-in defaults, then an optional
/// `product_scraper.{toml,json,yaml}` next to the binary's working directory,
/// then `SCRAPER_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Listing endpoint; `k` and `page` are appended per request.
    pub search_url: String,
    /// Prefix for relative product links.
    pub site_origin: String,
    pub user_agent: String,
    /// Percent-encode the query. When false the raw text is spliced into the
    /// target and odd queries may yield an invalid URL (the page is skipped).
    pub encode_query: bool,
    /// Highest page count a caller may request; 0 disables the ceiling.
    pub max_pages: u32,
    pub pacing_min_ms: u64,
    pub pacing_max_ms: u64,
    /// Per-request timeout. Unset leaves the transport default in place.
    pub request_timeout_secs: Option<u64>,
    pub output_path: PathBuf,
    /// JSON file with the test-mode records; unset uses the built-in sample.
    pub fixture_path: Option<PathBuf>,
    pub bind: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            search_url: "https://www.amazon.com/s".into(),
            site_origin: "https://www.amazon.com".into(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .into(),
            encode_query: true,
            max_pages: 20,
            pacing_min_ms: 1000,
            pacing_max_ms: 3000,
            request_timeout_secs: None,
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            fixture_path: None,
            bind: "0.0.0.0:8000".into(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        let builder = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));
        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let settings: Settings = builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;
        anyhow::ensure!(
            settings.pacing_min_ms <= settings.pacing_max_ms,
            "pacing_min_ms ({}) exceeds pacing_max_ms ({})",
            settings.pacing_min_ms,
            settings.pacing_max_ms
        );
        Ok(settings)
    }

    pub fn pacing_window(&self) -> (Duration, Duration) {
        (
            Duration::from_millis(self.pacing_min_ms),
            Duration::from_millis(self.pacing_max_ms),
        )
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// `None` when no ceiling applies.
    pub fn page_ceiling(&self) -> Option<u32> {
        (self.max_pages > 0).then_some(self.max_pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sources_fall_back_to_defaults() {
        let s = Settings::from_builder(Config::builder()).unwrap();
        assert_eq!(s.max_pages, 20);
        assert_eq!(s.output_path, PathBuf::from("products.csv"));
        assert_eq!(s.pacing_window(), (Duration::from_secs(1), Duration::from_secs(3)));
        assert!(s.encode_query);
        assert!(s.request_timeout().is_none());
    }

    #[test]
    fn overrides_replace_single_keys() {
        let builder = Config::builder()
            .set_override("max_pages", 0)
            .unwrap()
            .set_override("request_timeout_secs", 15)
            .unwrap();
        let s = Settings::from_builder(builder).unwrap();
        assert_eq!(s.page_ceiling(), None);
        assert_eq!(s.request_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(s.site_origin, "https://www.amazon.com");
    }

    #[test]
    fn inverted_pacing_window_rejected() {
        let builder = Config::builder()
            .set_override("pacing_min_ms", 5000)
            .unwrap()
            .set_override("pacing_max_ms", 10)
            .unwrap();
        assert!(Settings::from_builder(builder).is_err());
    }
}
