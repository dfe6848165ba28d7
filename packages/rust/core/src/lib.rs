//! Core pipeline orchestration for SiteBrief.
//!
//! This crate ties together provider selection, scraping, blog discovery and
//! analysis into the end-to-end `analyze_website` workflow.

pub mod pipeline;
pub mod providers;
pub mod scrape;

#[cfg(test)]
mod testing;

pub use pipeline::{
    PipelineConfig, ProgressReporter, SilentProgress, analyze_website, run_analysis,
};
pub use scrape::{ScrapeSettings, scrape_website};
