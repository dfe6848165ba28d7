//! Application configuration for SiteBrief.
//!
//! User config lives at `~/.sitebrief/sitebrief.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SiteBriefError};
use crate::types::{DEFAULT_BLOG_LIMIT, DEFAULT_CONTENT_LIMIT};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "sitebrief.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".sitebrief";

// ---------------------------------------------------------------------------
// Provider selection
// ---------------------------------------------------------------------------

/// Which scraping backend fetches page content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScraperProvider {
    /// Firecrawl hosted scraping API (renders JavaScript).
    #[default]
    Firecrawl,
    /// Plain HTTP fetch with local tag filtering and Markdown conversion.
    Direct,
}

impl ScraperProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Firecrawl => "firecrawl",
            Self::Direct => "direct",
        }
    }

    /// Whether this backend needs the scraper API key.
    pub fn requires_key(&self) -> bool {
        matches!(self, Self::Firecrawl)
    }
}

impl FromStr for ScraperProvider {
    type Err = SiteBriefError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firecrawl" => Ok(Self::Firecrawl),
            "direct" => Ok(Self::Direct),
            other => Err(SiteBriefError::config(format!(
                "unknown scraper provider '{other}': expected 'firecrawl' or 'direct'"
            ))),
        }
    }
}

/// Which language-model backend answers the analysis prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Google Gemini `generateContent` API.
    #[default]
    Gemini,
    /// OpenAI chat completions API.
    OpenAi,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
        }
    }

    /// Human-readable provider name used in error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Gemini => "Gemini",
            Self::OpenAi => "OpenAI",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini-1.5-flash-latest",
            Self::OpenAi => "gpt-4o-mini",
        }
    }

    fn default_base_url(&self) -> &'static str {
        match self {
            Self::Gemini => "https://generativelanguage.googleapis.com",
            Self::OpenAi => "https://api.openai.com",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = SiteBriefError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAi),
            other => Err(SiteBriefError::config(format!(
                "unknown LLM provider '{other}': expected 'gemini' or 'openai'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Config structs (matching sitebrief.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Scraping provider settings.
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// Language-model provider settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Prompt input limits and blog discovery.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Environment variable names that override stored keys.
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

/// `[scraper]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    #[serde(default)]
    pub provider: ScraperProvider,

    /// Base URL of the Firecrawl API.
    #[serde(default = "default_scraper_base_url")]
    pub base_url: String,

    /// Milliseconds the provider waits for the page to render.
    #[serde(default = "default_wait_for_ms")]
    pub wait_for_ms: u64,

    /// Provider-side (or direct fetch) timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            provider: ScraperProvider::default(),
            base_url: default_scraper_base_url(),
            wait_for_ms: default_wait_for_ms(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_scraper_base_url() -> String {
    "https://api.firecrawl.dev".into()
}
fn default_wait_for_ms() -> u64 {
    3_000
}
fn default_timeout_ms() -> u64 {
    30_000
}

/// `[llm]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProvider,

    /// Model ID; the provider's default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// API base URL; the provider's public endpoint when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_k")]
    pub top_k: u32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            model: None,
            base_url: None,
            temperature: default_temperature(),
            top_k: default_top_k(),
            top_p: default_top_p(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

impl LlmConfig {
    /// Configured model, or the provider default.
    pub fn model_id(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// Configured base URL, or the provider default.
    pub fn api_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }
}

fn default_temperature() -> f32 {
    0.1
}
fn default_top_k() -> u32 {
    32
}
fn default_top_p() -> f32 {
    0.95
}
fn default_max_output_tokens() -> u32 {
    2_000
}

/// `[analysis]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Characters of main content embedded in the prompt.
    #[serde(default = "default_content_limit")]
    pub content_limit: usize,

    /// Characters of blog content embedded in the prompt.
    #[serde(default = "default_blog_limit")]
    pub blog_limit: usize,

    /// Whether to look for and fetch a blog page.
    #[serde(default = "default_true")]
    pub fetch_blog: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            content_limit: default_content_limit(),
            blog_limit: default_blog_limit(),
            fetch_blog: true,
        }
    }
}

fn default_content_limit() -> usize {
    DEFAULT_CONTENT_LIMIT
}
fn default_blog_limit() -> usize {
    DEFAULT_BLOG_LIMIT
}
fn default_true() -> bool {
    true
}

/// `[credentials]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Env var that overrides the stored scraper key.
    #[serde(default = "default_scraper_key_env")]
    pub scraper_key_env: String,

    /// Env var that overrides the stored language-model key.
    #[serde(default = "default_llm_key_env")]
    pub llm_key_env: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            scraper_key_env: default_scraper_key_env(),
            llm_key_env: default_llm_key_env(),
        }
    }
}

fn default_scraper_key_env() -> String {
    "SITEBRIEF_SCRAPER_API_KEY".into()
}
fn default_llm_key_env() -> String {
    "SITEBRIEF_LLM_API_KEY".into()
}

// ---------------------------------------------------------------------------
// Analysis limits (runtime, derived from config)
// ---------------------------------------------------------------------------

/// Input truncation applied before content is embedded in the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisLimits {
    pub content_limit: usize,
    pub blog_limit: usize,
}

impl Default for AnalysisLimits {
    fn default() -> Self {
        Self {
            content_limit: DEFAULT_CONTENT_LIMIT,
            blog_limit: DEFAULT_BLOG_LIMIT,
        }
    }
}

impl From<&AppConfig> for AnalysisLimits {
    fn from(config: &AppConfig) -> Self {
        Self {
            content_limit: config.analysis.content_limit,
            blog_limit: config.analysis.blog_limit,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.sitebrief/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SiteBriefError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.sitebrief/sitebrief.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SiteBriefError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| SiteBriefError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SiteBriefError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SiteBriefError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SiteBriefError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
