//! SiteBrief CLI — business briefs from a website URL.
//!
//! Scrapes a site (and its blog, when one can be found) and asks a language
//! model four questions about the business behind it.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
