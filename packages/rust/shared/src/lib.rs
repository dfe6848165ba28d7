//! Shared types, error model, configuration and credentials for SiteBrief.
//!
//! This crate is the foundation depended on by all other SiteBrief crates.
//! It provides:
//! - [`SiteBriefError`] — the unified error type
//! - Domain types ([`ScrapeResult`], [`AnalysisData`], [`Analysis`], [`SiteReport`])
//! - Configuration ([`AppConfig`], config loading)
//! - The [`CredentialStore`] and the [`Credentials`] handed to providers

pub mod config;
pub mod credentials;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AnalysisConfig, AnalysisLimits, AppConfig, CredentialsConfig, LlmConfig, LlmProvider,
    ScraperConfig, ScraperProvider, config_dir, config_file_path, init_config, load_config,
    load_config_from,
};
pub use credentials::{CredentialStore, Credentials};
pub use error::{Result, SiteBriefError};
pub use types::{
    Analysis, AnalysisData, AnalysisQuality, DEFAULT_BLOG_LIMIT, DEFAULT_CONTENT_LIMIT, RunId,
    ScrapeResult, ScrapedSite, SiteReport,
};
