use chrono::{DateTime, Utc};
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ServiceError;
use crate::pipeline::Pipeline;
use crate::record::ProductRecord;
use crate::settings::Settings;
use crate::sink::CsvSink;

fn default_pages() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeRequest {
    pub query: String,
    #[serde(default = "default_pages")]
    pub pages: u32,
    #[serde(default)]
    pub test_mode: bool,
}

#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub message: String,
    pub count: usize,
    pub products: Vec<ProductRecord>,
    pub csv_file: String,
    pub scraped_at: DateTime<Utc>,
}

/// Reject page counts the pipeline should not attempt. Test mode skips this.
pub fn validate(request: &ScrapeRequest, ceiling: Option<u32>) -> Result<(), ServiceError> {
    if request.pages == 0 {
        return Err(ServiceError::InvalidRequest(
            "pages must be at least 1".to_string(),
        ));
    }
    if let Some(max) = ceiling {
        if request.pages > max {
            return Err(ServiceError::InvalidRequest(format!(
                "pages must be at most {} (got {})",
                max, request.pages
            )));
        }
    }
    Ok(())
}

/// One invocation: scrape, reject an empty result, persist, respond.
pub fn invoke(
    pipeline: &Pipeline,
    sink: &CsvSink,
    ceiling: Option<u32>,
    request: &ScrapeRequest,
    pb: &ProgressBar,
) -> Result<ScrapeResponse, ServiceError> {
    info!(
        query = %request.query,
        pages = request.pages,
        test_mode = request.test_mode,
        "Received scrape request"
    );
    if !request.test_mode {
        validate(request, ceiling)?;
    }

    let outcome = pipeline.run_with_progress(&request.query, request.pages, request.test_mode, pb);
    if outcome.records.is_empty() {
        let stats = &outcome.stats;
        warn!(
            "No products found for {:?} ({} of {} pages failed, {} entries skipped)",
            request.query, stats.errors, stats.pages, stats.skipped_items
        );
        return Err(ServiceError::NoRecords);
    }

    let csv_file = sink.write(&outcome.records)?;
    Ok(ScrapeResponse {
        message: "Products scraped successfully".to_string(),
        count: outcome.records.len(),
        products: outcome.records,
        csv_file,
        scraped_at: Utc::now(),
    })
}

/// Build a fresh pipeline and sink from settings, then invoke. Blocking.
pub fn invoke_with_settings(
    settings: &Settings,
    request: &ScrapeRequest,
    pb: &ProgressBar,
) -> Result<ScrapeResponse, ServiceError> {
    let pipeline = Pipeline::from_settings(settings)?;
    let sink = CsvSink::new(&settings.output_path);
    invoke(&pipeline, &sink, settings.page_ceiling(), request, pb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::fetch::{PageSource, SearchTarget};
    use crate::fixture::Fixture;
    use crate::pacing::NoPacing;

    struct DeadSource;

    impl PageSource for DeadSource {
        fn fetch(&self, target: &str) -> Result<String, FetchError> {
            Err(FetchError::Status {
                target: target.to_string(),
                status: reqwest::StatusCode::FORBIDDEN,
            })
        }
    }

    fn offline_pipeline() -> Pipeline {
        Pipeline::new(
            Box::new(DeadSource),
            Box::new(NoPacing),
            SearchTarget::new("https://www.amazon.com/s", true),
            "https://www.amazon.com",
            Fixture::sample(),
        )
    }

    fn request(pages: u32, test_mode: bool) -> ScrapeRequest {
        ScrapeRequest {
            query: "laptop".to_string(),
            pages,
            test_mode,
        }
    }

    #[test]
    fn request_defaults() {
        let r: ScrapeRequest = serde_json::from_str(r#"{"query": "laptop"}"#).unwrap();
        assert_eq!(r.pages, 1);
        assert!(!r.test_mode);
    }

    #[test]
    fn test_mode_persists_fixture() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvSink::new(dir.path().join("products.csv"));
        let resp = invoke(
            &offline_pipeline(),
            &sink,
            Some(20),
            &request(500, true),
            &ProgressBar::hidden(),
        )
        .unwrap();

        assert_eq!(resp.count, 8);
        assert_eq!(resp.csv_file, sink.path().display().to_string());
        assert_eq!(CsvSink::read(sink.path()).unwrap(), resp.products);
    }

    #[test]
    fn all_pages_failing_is_no_records() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvSink::new(dir.path().join("products.csv"));
        let err = invoke(
            &offline_pipeline(),
            &sink,
            None,
            &request(2, false),
            &ProgressBar::hidden(),
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::NoRecords));
        assert!(!sink.path().exists());
    }

    #[test]
    fn page_count_bounds() {
        assert!(validate(&request(1, false), Some(20)).is_ok());
        assert!(validate(&request(20, false), Some(20)).is_ok());
        assert!(matches!(
            validate(&request(21, false), Some(20)),
            Err(ServiceError::InvalidRequest(_))
        ));
        assert!(matches!(
            validate(&request(0, false), None),
            Err(ServiceError::InvalidRequest(_))
        ));
        assert!(validate(&request(10_000, false), None).is_ok());
    }

    #[test]
    fn sink_failure_is_internal() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CsvSink::new(dir.path().join("nope").join("products.csv"));
        let err = invoke(
            &offline_pipeline(),
            &sink,
            None,
            &request(1, true),
            &ProgressBar::hidden(),
        )
        .unwrap_err();
        assert!(matches!(err, ServiceError::Internal(_)));
    }
}
