use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Url;
use tracing::debug;

use crate::error::FetchError;

/// Builds the per-page request target for a query.
#[derive(Debug, Clone)]
pub struct SearchTarget {
    search_url: String,
    encode_query: bool,
}

impl SearchTarget {
    pub fn new(search_url: impl Into<String>, encode_query: bool) -> Self {
        SearchTarget {
            search_url: search_url.into(),
            encode_query,
        }
    }

    pub fn page_url(&self, query: &str, page: u32) -> String {
        if !self.encode_query {
            return self.raw_url(query, page);
        }
        let page_param = page.to_string();
        match Url::parse_with_params(&self.search_url, &[("k", query), ("page", page_param.as_str())]) {
            Ok(url) => url.to_string(),
            // Unparseable base: hand back the raw form and let the fetch fail.
            Err(_) => self.raw_url(query, page),
        }
    }

    fn raw_url(&self, query: &str, page: u32) -> String {
        format!("{}?k={}&page={}", self.search_url, query, page)
    }
}

/// Where listing pages come from. Implemented over HTTP in production and
/// by canned pages in tests.
pub trait PageSource {
    fn fetch(&self, target: &str) -> Result<String, FetchError>;
}

/// Blocking HTTP source with a fixed user agent and no cookie store.
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent).context("Invalid user agent header")?,
        );
        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;
        Ok(HttpSource { client })
    }
}

impl PageSource for HttpSource {
    fn fetch(&self, target: &str) -> Result<String, FetchError> {
        let response = self.client.get(target).send().map_err(|source| {
            if source.is_builder() {
                FetchError::Target {
                    target: target.to_string(),
                    source,
                }
            } else {
                FetchError::Transport {
                    target: target.to_string(),
                    source,
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                target: target.to_string(),
                status,
            });
        }

        let body = response.text().map_err(|source| FetchError::Transport {
            target: target.to_string(),
            source,
        })?;
        debug!("Fetched {} ({} bytes)", target, body.len());
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_target_escapes_query() {
        let target = SearchTarget::new("https://www.amazon.com/s", true);
        assert_eq!(
            target.page_url("usb c & hdmi", 2),
            "https://www.amazon.com/s?k=usb+c+%26+hdmi&page=2"
        );
    }

    #[test]
    fn raw_target_keeps_query_verbatim() {
        let target = SearchTarget::new("https://www.amazon.com/s", false);
        assert_eq!(
            target.page_url("usb c & hdmi", 3),
            "https://www.amazon.com/s?k=usb c & hdmi&page=3"
        );
    }

    #[test]
    fn pages_are_one_based_in_target() {
        let target = SearchTarget::new("https://www.amazon.com/s", true);
        assert!(target.page_url("laptop", 1).ends_with("&page=1"));
    }

    #[test]
    fn bad_user_agent_rejected() {
        assert!(HttpSource::new("bad\nagent", None).is_err());
    }
}
