//! CLI command definitions, routing, and tracing setup.

use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use sitebrief_core::{ProgressReporter, run_analysis};
use sitebrief_shared::{
    AnalysisQuality, AppConfig, CredentialStore, Credentials, LlmProvider, ScraperProvider,
    SiteReport, init_config, load_config,
};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// SiteBrief — four-question business briefs for any website.
#[derive(Parser)]
#[command(
    name = "sitebrief",
    version,
    about = "Scrape a website and summarize what the business does, sells, who it serves and what it blogs about.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Analyze a website.
    Analyze {
        /// Website URL (scheme optional).
        url: String,

        /// Print the full report as JSON.
        #[arg(long)]
        json: bool,

        /// Skip blog discovery.
        #[arg(long)]
        no_blog: bool,

        /// Scraping provider: firecrawl or direct.
        #[arg(long)]
        scraper: Option<ScraperProvider>,

        /// Language-model provider: gemini or openai.
        #[arg(long)]
        llm: Option<LlmProvider>,

        /// Model ID (defaults to the provider's default model).
        #[arg(long)]
        model: Option<String>,
    },

    /// API key management.
    Keys {
        #[command(subcommand)]
        action: KeysAction,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Key subcommands.
#[derive(Subcommand)]
pub(crate) enum KeysAction {
    /// Save both API keys, replacing any stored keys.
    ///
    /// Keys can come from the environment instead of the command line so they
    /// stay out of shell history and the process list.
    Set {
        /// Scraping provider API key.
        #[arg(long, env = "SITEBRIEF_SCRAPER_API_KEY", hide_env_values = true)]
        scraper: String,

        /// Language-model provider API key.
        #[arg(long, env = "SITEBRIEF_LLM_API_KEY", hide_env_values = true)]
        llm: String,
    },
    /// Show which keys are configured.
    Status,
    /// Delete stored keys.
    Clear,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "sitebrief=info",
        1 => "sitebrief=debug",
        _ => "sitebrief=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so `--json` output stays clean.
    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Analyze {
            url,
            json,
            no_blog,
            scraper,
            llm,
            model,
        } => {
            let overrides = AnalyzeOverrides {
                no_blog,
                scraper,
                llm,
                model,
            };
            cmd_analyze(&url, json, overrides).await
        }
        Command::Keys { action } => match action {
            KeysAction::Set { scraper, llm } => cmd_keys_set(scraper, llm),
            KeysAction::Status => cmd_keys_status(),
            KeysAction::Clear => cmd_keys_clear(),
        },
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// analyze
// ---------------------------------------------------------------------------

/// Flag values that take precedence over the config file.
#[derive(Debug, Default)]
struct AnalyzeOverrides {
    no_blog: bool,
    scraper: Option<ScraperProvider>,
    llm: Option<LlmProvider>,
    model: Option<String>,
}

impl AnalyzeOverrides {
    fn apply(self, config: &mut AppConfig) {
        if self.no_blog {
            config.analysis.fetch_blog = false;
        }
        if let Some(scraper) = self.scraper {
            config.scraper.provider = scraper;
        }
        if let Some(llm) = self.llm {
            if llm != config.llm.provider {
                // A configured model or endpoint belongs to the old provider.
                config.llm.model = None;
                config.llm.base_url = None;
            }
            config.llm.provider = llm;
        }
        if let Some(model) = self.model {
            config.llm.model = Some(model);
        }
    }
}

async fn cmd_analyze(url: &str, json: bool, overrides: AnalyzeOverrides) -> Result<()> {
    let mut config = load_config()?;
    overrides.apply(&mut config);

    let credentials = CredentialStore::open_default()?
        .load()?
        .with_env_overrides(&config.credentials);

    info!(
        url,
        scraper = config.scraper.provider.as_str(),
        llm = config.llm.provider.as_str(),
        model = config.llm.model_id(),
        "analyzing website"
    );

    let reporter = CliProgress::new();
    let result = run_analysis(url, &config, &credentials, &reporter).await;
    reporter.clear();

    let report = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(&report));
    }

    Ok(())
}

/// Plain-text rendering of a report.
fn render_report(report: &SiteReport) -> String {
    let data = &report.analysis.data;
    let sections = [
        ("What is this business about?", &data.business_about),
        ("What are the core products or services offered?", &data.core_products),
        ("Who can be the target audience?", &data.target_audience),
        (
            "Do they have a blog page, and what sort of content do they publish?",
            &data.blog_content,
        ),
    ];

    let mut out = String::new();
    out.push('\n');
    out.push_str(&format!("  Analysis of {}\n", report.url));
    if let Some(blog_url) = &report.blog_url {
        out.push_str(&format!("  Blog page:  {blog_url}\n"));
    }
    if report.analysis.quality == AnalysisQuality::Heuristic {
        out.push_str("  Note: the model did not return structured output; answers below are heuristic.\n");
    }

    for (title, answer) in sections {
        out.push('\n');
        out.push_str(&format!("  {title}\n"));
        out.push_str(&format!("  {answer}\n"));
    }
    out.push('\n');
    out
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif bar.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(100);
        let style = ProgressStyle::with_template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    fn clear(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

impl ProgressReporter for CliProgress {
    fn step(&self, name: &str, percent: u8) {
        self.bar.set_position(u64::from(percent));
        self.bar.set_message(name.to_string());
    }

    fn done(&self, _report: &SiteReport) {
        self.bar.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// keys
// ---------------------------------------------------------------------------

fn cmd_keys_set(scraper: String, llm: String) -> Result<()> {
    let store = CredentialStore::open_default()?;
    store.save(&Credentials::new(scraper, llm))?;
    println!("API keys saved to: {}", store.path().display());
    Ok(())
}

fn cmd_keys_status() -> Result<()> {
    let config = load_config()?;
    let store = CredentialStore::open_default()?;
    let credentials = store.load()?.with_env_overrides(&config.credentials);
    let (scraper, llm) = credentials.masked();

    println!("Credentials file: {}", store.path().display());
    println!("  Scraper key: {}", key_status(scraper.as_deref()));
    println!("  LLM key:     {}", key_status(llm.as_deref()));

    match credentials.validate_for(&config) {
        Ok(()) => println!("Ready to analyze."),
        Err(e) => println!("Not ready: {e}. Run `sitebrief keys set`."),
    }
    Ok(())
}

fn key_status(masked: Option<&str>) -> String {
    match masked {
        Some(value) => format!("configured ({value})"),
        None => "missing".to_string(),
    }
}

fn cmd_keys_clear() -> Result<()> {
    let store = CredentialStore::open_default()?;
    store.clear()?;
    println!("API keys cleared.");
    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
