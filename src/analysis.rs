//! Analysis pipeline: fetch, parse, detect, enrich, score.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info};

use crate::config::Config;
use crate::detect::{Issue, Runner};
use crate::document::Document;
use crate::enrich::{EnrichOptions, Enricher, TextGenerator};
use crate::fetch::{FetchError, PageFetcher};
use crate::report::Report;
use crate::urls::is_valid_url;

/// Errors that stop an analysis. Everything after a successful fetch
/// degrades instead of failing.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("URL is required")]
    MissingUrl,

    #[error("Invalid URL format")]
    InvalidUrl(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Pipeline stages, reported as they start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Parsing,
    Analyzing,
    Enriching,
    Scoring,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Fetching => "Fetching website content...",
            Stage::Parsing => "Parsing HTML structure...",
            Stage::Analyzing => "Analyzing accessibility issues...",
            Stage::Enriching => "Generating explanations...",
            Stage::Scoring => "Calculating accessibility score...",
        };
        f.write_str(s)
    }
}

/// One configured pipeline, shared across requests.
pub struct Analyzer {
    fetcher: PageFetcher,
    runner: Runner,
    enricher: Enricher,
}

impl Analyzer {
    pub fn new(fetcher: PageFetcher, runner: Runner, enricher: Enricher) -> Self {
        Self {
            fetcher,
            runner,
            enricher,
        }
    }

    /// Build from config. Without a generator, enrichment runs offline.
    pub fn from_config(
        config: &Config,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Result<Self, AnalyzeError> {
        let fetcher = PageFetcher::new(&config.fetch)?;
        let runner = Runner::from_config(&config.rules);
        let enricher = match generator {
            Some(generator) => Enricher::new(
                generator,
                EnrichOptions {
                    concurrency: config.enrichment.concurrency,
                    call_timeout: Duration::from_secs(config.enrichment.timeout_secs),
                },
            ),
            None => Enricher::offline(),
        };
        Ok(Self::new(fetcher, runner, enricher))
    }

    pub fn enricher(&self) -> &Enricher {
        &self.enricher
    }

    /// Run every rule over raw HTML.
    pub fn detect(&self, html: &str) -> Vec<Issue> {
        let doc = Document::parse(html);
        self.runner.run(&doc)
    }

    /// Analyze a page by URL.
    pub async fn analyze(&self, url: &str) -> Result<Report, AnalyzeError> {
        self.analyze_with_progress(url, |_: Stage| {}).await
    }

    /// Analyze a page by URL, calling `on_stage` as each stage begins.
    pub async fn analyze_with_progress<F>(&self, url: &str, on_stage: F) -> Result<Report, AnalyzeError>
    where
        F: Fn(Stage),
    {
        let url = url.trim();
        if url.is_empty() {
            return Err(AnalyzeError::MissingUrl);
        }
        if !is_valid_url(url) {
            return Err(AnalyzeError::InvalidUrl(url.to_string()));
        }

        let started = Instant::now();
        info!(url, "analysis start");

        on_stage(Stage::Fetching);
        let html = self.fetcher.fetch(url).await.map_err(|e| {
            error!(url, error = %e, "fetch failed");
            e
        })?;

        let report = self.analyze_html_with_progress(url, &html, &on_stage).await;
        info!(
            url,
            issues = report.total_issues,
            score = report.overall_score,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "analysis finished"
        );
        Ok(report)
    }

    /// Analyze HTML already in hand. `source` is recorded as the report URL.
    pub async fn analyze_html(&self, source: &str, html: &str) -> Report {
        self.analyze_html_with_progress(source, html, &|_: Stage| {}).await
    }

    pub async fn analyze_html_with_progress<F>(&self, source: &str, html: &str, on_stage: &F) -> Report
    where
        F: Fn(Stage),
    {
        // The parsed tree is not Send; keep it out of the await below.
        let issues = {
            on_stage(Stage::Parsing);
            let doc = Document::parse(html);
            on_stage(Stage::Analyzing);
            self.runner.run(&doc)
        };

        on_stage(Stage::Enriching);
        let enriched = self.enricher.enrich_all(issues).await;

        on_stage(Stage::Scoring);
        Report::build(source, Utc::now(), enriched)
    }
}
