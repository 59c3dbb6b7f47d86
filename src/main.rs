//! Universal widget binary entrypoint.
//! Loads config, runs one widget, and prints the canvas JSON on stdout.
//! Exits 0 for rendered, empty and error canvases alike; only setup failures
//! (bad config, HTTP client) exit non-zero.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;

use universal_widget::cli::Cli;
use universal_widget::registry::registered_sources;
use universal_widget::telemetry::init_tracing;
use universal_widget::{HttpTransport, WidgetConfig, WidgetController};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; WIDGET_* and WIKIPEDIA_* may come from there.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    if cli.list {
        for id in registered_sources() {
            println!("{id}");
        }
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => WidgetConfig::load_from(path)?,
        None => WidgetConfig::load_default().context("loading widget config")?,
    };
    if let Some(base) = &cli.base_url {
        config.api_base_url = base.trim_end_matches('/').to_string();
    }

    let transport = HttpTransport::new(Duration::from_secs(config.request_timeout_secs))?;
    let controller = WidgetController::new(config, Arc::new(transport));
    let report = controller.run(cli.source.as_deref(), cli.size).await;

    let out = match (cli.report, cli.pretty) {
        (true, true) => serde_json::to_string_pretty(&report),
        (true, false) => serde_json::to_string(&report),
        (false, true) => serde_json::to_string_pretty(&report.widget),
        (false, false) => serde_json::to_string(&report.widget),
    }
    .context("serializing widget")?;
    println!("{out}");
    Ok(())
}
