use anyhow::Result;
use indicatif::ProgressBar;
use tracing::{info, warn};

use crate::fetch::{HttpSource, PageSource, SearchTarget};
use crate::fixture::Fixture;
use crate::pacing::{NoPacing, Pacing, RandomPacing};
use crate::parser;
use crate::record::ProductRecord;
use crate::settings::Settings;

/// Page and entry counters for one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScrapeStats {
    pub pages: u32,
    pub ok: u32,
    pub errors: u32,
    pub skipped_items: usize,
}

#[derive(Debug)]
pub struct ScrapeOutcome {
    pub records: Vec<ProductRecord>,
    pub stats: ScrapeStats,
}

/// Sequential fetch-and-extract over listing pages `1..=pages`. One instance
/// per invocation; nothing is shared between runs.
pub struct Pipeline {
    source: Box<dyn PageSource>,
    pacing: Box<dyn Pacing>,
    target: SearchTarget,
    origin: String,
    fixture: Fixture,
}

impl Pipeline {
    pub fn new(
        source: Box<dyn PageSource>,
        pacing: Box<dyn Pacing>,
        target: SearchTarget,
        origin: impl Into<String>,
        fixture: Fixture,
    ) -> Self {
        Pipeline {
            source,
            pacing,
            target,
            origin: origin.into(),
            fixture,
        }
    }

    /// HTTP source and random pacing as configured. Must be called off the
    /// async runtime: the blocking client owns its own runtime.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let source = HttpSource::new(&settings.user_agent, settings.request_timeout())?;
        let (min, max) = settings.pacing_window();
        let pacing: Box<dyn Pacing> = if max.is_zero() {
            Box::new(NoPacing)
        } else {
            Box::new(RandomPacing::new(min, max))
        };
        let fixture = Fixture::from_optional_path(settings.fixture_path.as_deref())?;
        Ok(Pipeline::new(
            Box::new(source),
            pacing,
            SearchTarget::new(settings.search_url.clone(), settings.encode_query),
            settings.site_origin.clone(),
            fixture,
        ))
    }

    pub fn run(&self, query: &str, pages: u32, test_mode: bool) -> ScrapeOutcome {
        self.run_with_progress(query, pages, test_mode, &ProgressBar::hidden())
    }

    pub fn run_with_progress(
        &self,
        query: &str,
        pages: u32,
        test_mode: bool,
        pb: &ProgressBar,
    ) -> ScrapeOutcome {
        if test_mode {
            info!(
                "Test mode: returning fixture '{}' ({} products)",
                self.fixture.name,
                self.fixture.records.len()
            );
            return ScrapeOutcome {
                records: self.fixture.records.clone(),
                stats: ScrapeStats::default(),
            };
        }

        pb.set_length(pages as u64);
        let mut records = Vec::new();
        let mut stats = ScrapeStats {
            pages,
            ..ScrapeStats::default()
        };

        for page in 1..=pages {
            let target = self.target.page_url(query, page);
            match self.source.fetch(&target) {
                Ok(body) => {
                    let extracted = parser::extract_page(&body, &self.origin);
                    info!(
                        "Page {}: {} products ({} of {} entries skipped)",
                        page,
                        extracted.records.len(),
                        extracted.skipped,
                        extracted.containers
                    );
                    stats.ok += 1;
                    stats.skipped_items += extracted.skipped;
                    records.extend(extracted.records);
                }
                Err(e) => {
                    stats.errors += 1;
                    warn!("Error fetching page {}: {}", page, e);
                }
            }
            pb.inc(1);
            self.pacing.pause(page);
        }

        pb.finish_and_clear();
        info!(
            "Scraped {} pages ({} ok, {} errors), {} products",
            stats.pages,
            stats.ok,
            stats.errors,
            records.len()
        );
        ScrapeOutcome { records, stats }
    }
}

// ── Tests ──
