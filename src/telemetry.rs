// src/telemetry.rs
use metrics::{describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// One-time metrics registration, so series exist even before the first
/// increment when a host installs a recorder.
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("widget_runs_total", "Widget runs by outcome.");
        describe_counter!(
            "widget_fetch_errors_total",
            "API fetches that failed (transport, status, or JSON)."
        );
        describe_histogram!("widget_fetch_ms", "API fetch latency in milliseconds.");
        describe_counter!("image_cache_hits_total", "Image loads served from cache.");
        describe_counter!(
            "image_cache_misses_total",
            "Image loads that went to the network."
        );
    });
}

/// Compact stderr logging; stdout is reserved for the rendered canvas.
/// `RUST_LOG` overrides the default filter; `json` switches to JSON lines.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("universal_widget=info,warn"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}
