//! End-to-end analysis pipeline: URL → scrape → analyze → report.

use std::time::Instant;

use chrono::Utc;
use tracing::{info, instrument};

use sitebrief_analyzer::LanguageModel;
use sitebrief_fetcher::PageFetcher;
use sitebrief_shared::{AnalysisLimits, AppConfig, Credentials, Result, RunId, SiteReport};

use crate::providers;
use crate::scrape::{ScrapeSettings, scrape_website};

/// Configuration for [`analyze_website`].
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub scrape: ScrapeSettings,
    pub limits: AnalysisLimits,
}

impl From<&AppConfig> for PipelineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            scrape: ScrapeSettings::from(config),
            limits: AnalysisLimits::from(config),
        }
    }
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new step, with overall completion in percent.
    fn step(&self, name: &str, percent: u8);
    /// Called when the pipeline completes.
    fn done(&self, report: &SiteReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn step(&self, _name: &str, _percent: u8) {}
    fn done(&self, _report: &SiteReport) {}
}

/// Validate credentials, build the configured providers, and run
/// [`analyze_website`].
///
/// Missing keys are reported before any network request is made.
pub async fn run_analysis(
    url: &str,
    config: &AppConfig,
    credentials: &Credentials,
    progress: &dyn ProgressReporter,
) -> Result<SiteReport> {
    progress.step("Validating API keys", 20);
    credentials.validate_for(config)?;

    let fetcher = providers::build_fetcher(config, credentials)?;
    let model = providers::build_model(config, credentials)?;

    analyze_website(
        url,
        &PipelineConfig::from(config),
        fetcher.as_ref(),
        model.as_ref(),
        progress,
    )
    .await
}

/// Run the full analysis for one site.
///
/// 1. Normalize the URL
/// 2. Scrape the main page and blog page
/// 3. Analyze the scraped text
///
/// Steps run strictly in sequence; at most one request is in flight.
#[instrument(skip_all, fields(url = %url, fetcher = fetcher.name(), model = model.name()))]
pub async fn analyze_website(
    url: &str,
    config: &PipelineConfig,
    fetcher: &dyn PageFetcher,
    model: &dyn LanguageModel,
    progress: &dyn ProgressReporter,
) -> Result<SiteReport> {
    let start = Instant::now();
    let started_at = Utc::now();
    let run_id = RunId::new();
    let url = sitebrief_fetcher::normalize_url(url)?;

    info!(%run_id, url = %url, "starting analysis");

    // --- Scrape ---
    progress.step("Scraping website", 40);
    let site = scrape_website(fetcher, &url, &config.scrape)
        .await
        .into_result()?;

    // --- Analyze ---
    progress.step("Analyzing content", 70);
    let analysis = sitebrief_analyzer::analyze(
        model,
        &site.content,
        site.blog_content.as_deref(),
        &config.limits,
    )
    .await?;

    let report = SiteReport {
        run_id,
        url: url.to_string(),
        blog_url: site.blog_url,
        analysis,
        content_chars: site.content.chars().count(),
        blog_chars: site
            .blog_content
            .as_deref()
            .map_or(0, |b| b.chars().count()),
        started_at,
        finished_at: Utc::now(),
    };

    progress.step("Complete", 100);
    progress.done(&report);

    info!(
        run_id = %report.run_id,
        quality = %report.analysis.quality,
        elapsed_ms = start.elapsed().as_millis(),
        "analysis complete"
    );

    Ok(report)
}
