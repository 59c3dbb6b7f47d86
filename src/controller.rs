// src/controller.rs
//! One widget run: resolve the request, build the adapter, fetch, check for
//! emptiness, render, and stamp the refresh time.
//!
//! This is the only place a [`WidgetError`](crate::error::WidgetError) is
//! caught. Whatever happens, the caller gets a finished canvas back.

use chrono::{DateTime, Local, Utc};
use metrics::counter;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api_client::ApiClient;
use crate::canvas::{Align, ColorToken, Container, Font, Image, Stack, Text, Widget};
use crate::config::{SizeClass, SizeProfile, WidgetConfig};
use crate::image_cache::ImageCache;
use crate::registry;
use crate::sources::FetchResult;
use crate::telemetry::ensure_metrics_described;
use crate::transport::DynTransport;

pub const NO_DATA_MESSAGE: &str = "No data available";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum Outcome {
    /// At least one item across all collections.
    Rendered,
    Empty,
    Failed(String),
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Rendered => "rendered",
            Outcome::Empty => "empty",
            Outcome::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub source: String,
    pub size: SizeClass,
    pub outcome: Outcome,
    /// Normalized data, when the fetch succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<FetchResult>,
    pub widget: Widget,
}

pub struct WidgetController {
    config: WidgetConfig,
    transport: DynTransport,
}

impl WidgetController {
    pub fn new(config: WidgetConfig, transport: DynTransport) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Trimmed, lowercased identifier; blank or missing means the default source.
    pub fn resolve_source(&self, requested: Option<&str>) -> String {
        requested
            .map(|s| s.trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.config.default_source.clone())
    }

    pub async fn run(&self, source: Option<&str>, size: Option<SizeClass>) -> RunReport {
        self.run_at(source, size, Utc::now()).await
    }

    /// Same as [`run`](Self::run) with an explicit clock for the refresh
    /// stamp and the large-size footer.
    pub async fn run_at(
        &self,
        source: Option<&str>,
        size: Option<SizeClass>,
        now: DateTime<Utc>,
    ) -> RunReport {
        ensure_metrics_described();
        let id = self.resolve_source(source);
        let size = size.unwrap_or_default();
        info!(source = %id, %size, "widget run");

        // Fresh per run: nothing survives between runs.
        let images = Arc::new(ImageCache::new(Arc::clone(&self.transport)));
        let api = ApiClient::new(self.config.api_base_url.clone(), Arc::clone(&self.transport));

        let adapter = match registry::create(&id, &self.config, api, images) {
            Ok(a) => a,
            Err(e) => {
                let widget = self.message_canvas(&e.to_string(), refresh_at(now, self.config.refresh_interval()));
                return self.finish(id, size, Outcome::Failed(e.to_string()), None, widget);
            }
        };
        let source_refresh = refresh_at(now, adapter.config().refresh_interval());

        let data = match adapter.fetch_data(size).await {
            Ok(d) => d,
            Err(e) => {
                let widget = self.message_canvas(&e.to_string(), source_refresh);
                return self.finish(id, size, Outcome::Failed(e.to_string()), None, widget);
            }
        };
        if data.is_empty() {
            let widget = self.message_canvas(NO_DATA_MESSAGE, source_refresh);
            return self.finish(id, size, Outcome::Empty, Some(data), widget);
        }

        let profile = self.config.profile(size);
        let mut widget = Widget::new(profile.padding);
        widget.url = adapter.config().url_scheme.clone();
        widget.refresh_after = Some(source_refresh);
        adapter.render(&mut widget, &data, size);
        if size == SizeClass::Large {
            add_footer(&mut widget, profile, now);
        }

        self.finish(id, size, Outcome::Rendered, Some(data), widget)
    }

    fn finish(
        &self,
        source: String,
        size: SizeClass,
        outcome: Outcome,
        data: Option<FetchResult>,
        widget: Widget,
    ) -> RunReport {
        counter!("widget_runs_total", "outcome" => outcome.label()).increment(1);
        match &outcome {
            Outcome::Failed(message) => warn!(source = %source, %size, outcome = outcome.label(), %message, "widget run failed"),
            _ => info!(
                source = %source,
                %size,
                outcome = outcome.label(),
                items = data.as_ref().map_or(0, FetchResult::total_items),
                "widget run finished"
            ),
        }
        RunReport {
            source,
            size,
            outcome,
            data,
            widget,
        }
    }

    /// Warning symbol, "Error" title and the message, centered. Always laid
    /// out with the medium profile's padding.
    fn message_canvas(&self, message: &str, refresh_after: DateTime<Utc>) -> Widget {
        let mut widget = Widget::new(self.config.profile(SizeClass::Medium).padding);
        widget.refresh_after = Some(refresh_after);

        let mut stack = Stack::vertical().centered();
        stack.push(
            Image::symbol("exclamationmark.triangle.fill")
                .size(32.0)
                .tint(ColorToken::Warning),
        );
        stack.add_spacer(8.0);
        stack.push(
            Text::new("Error", Font::bold(14.0))
                .color(ColorToken::Primary)
                .align(Align::Center),
        );
        stack.add_spacer(4.0);
        stack.push(
            Text::new(message, Font::regular(11.0))
                .color(ColorToken::Secondary)
                .align(Align::Center),
        );
        widget.push(stack);
        widget
    }
}

/// Right-aligned `Updated HH:MM` in the host's local time.
/// `now + interval`, saturating at the latest representable instant.
fn refresh_at(now: DateTime<Utc>, interval: chrono::Duration) -> DateTime<Utc> {
    now.checked_add_signed(interval).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn add_footer(widget: &mut Widget, p: &SizeProfile, now: DateTime<Utc>) {
    widget.add_flexible_spacer();
    let mut footer = Stack::horizontal();
    footer.add_flexible_spacer();
    let stamp = now.with_timezone(&Local).format("%H:%M");
    footer.push(
        Text::new(format!("Updated {stamp}"), Font::regular(p.font_size.tertiary))
            .color(ColorToken::Tertiary)
            .align(Align::Right),
    );
    widget.push(footer);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::FixtureTransport;

    fn controller() -> WidgetController {
        WidgetController::new(WidgetConfig::builtin(), Arc::new(FixtureTransport::default()))
    }

    #[test]
    fn source_resolution_trims_lowercases_and_defaults() {
        let c = controller();
        assert_eq!(c.resolve_source(Some("  HackerNews ")), "hackernews");
        assert_eq!(c.resolve_source(Some("   ")), "billboard");
        assert_eq!(c.resolve_source(None), "billboard");
    }

    #[tokio::test]
    async fn huge_refresh_hours_saturate_instead_of_panicking() {
        let mut cfg = WidgetConfig::builtin();
        cfg.refresh_hours = f64::MAX;
        for src in cfg.sources.values_mut() {
            src.refresh_hours = 1e300;
        }
        let c = WidgetController::new(cfg, Arc::new(FixtureTransport::default()));
        let now = Utc::now();

        // unknown id: config-wide interval on the error canvas
        let report = c.run_at(Some("nope"), None, now).await;
        assert_eq!(report.widget.refresh_after, Some(DateTime::<Utc>::MAX_UTC));

        // known id, failing fetch: the source's own interval
        let report = c.run_at(Some("hackernews"), None, now).await;
        assert!(matches!(report.outcome, Outcome::Failed(_)));
        assert_eq!(report.widget.refresh_after, Some(DateTime::<Utc>::MAX_UTC));
    }

    #[test]
    fn refresh_stamp_clamps_near_the_end_of_time() {
        let late = DateTime::<Utc>::MAX_UTC - chrono::Duration::hours(1);
        assert_eq!(refresh_at(late, chrono::Duration::hours(2)), DateTime::<Utc>::MAX_UTC);
        assert_eq!(
            refresh_at(late, chrono::Duration::minutes(30)),
            late + chrono::Duration::minutes(30)
        );
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let v = serde_json::to_value(Outcome::Failed("boom".into())).unwrap();
        assert_eq!(v["status"], "failed");
        assert_eq!(v["message"], "boom");
        let v = serde_json::to_value(Outcome::Empty).unwrap();
        assert_eq!(v["status"], "empty");
    }
}
