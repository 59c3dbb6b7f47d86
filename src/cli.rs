// src/cli.rs
use clap::Parser;
use std::path::PathBuf;

use crate::config::SizeClass;

/// Render one widget and print the canvas as JSON on stdout.
#[derive(Debug, Parser)]
#[command(name = "universal-widget")]
#[command(about = "Fetch a data source and render it as a home-screen widget", long_about = None)]
pub struct Cli {
    /// Source identifier (billboard, imdb, steam, hackernews, github, wikipedia)
    #[arg(env = "WIDGET_SOURCE")]
    pub source: Option<String>,

    /// Widget size: small, medium or large
    #[arg(short, long, env = "WIDGET_SIZE")]
    pub size: Option<SizeClass>,

    /// Config file (TOML or JSON); overrides the default lookup
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the API base URL from the config
    #[arg(long)]
    pub base_url: Option<String>,

    /// List registered sources and exit
    #[arg(long)]
    pub list: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Print the whole run report (outcome and normalized data) instead of the canvas
    #[arg(long)]
    pub report: bool,

    /// Log as JSON lines on stderr
    #[arg(long)]
    pub json_logs: bool,
}
