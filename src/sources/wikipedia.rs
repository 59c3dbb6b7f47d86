// src/sources/wikipedia.rs
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{add_header, item_column, lenient, parse_items, DataSource, FetchResult, NormalizedItem, SourceContext};
use crate::canvas::{ColorToken, Container, Font, Stack, Text, Widget};
use crate::config::{SizeClass, SizeProfile, SourceConfig};
use crate::error::{WidgetError, WidgetResult};
use crate::format::{format_time_ago, truncate, Timestamp};

pub const EDITS: &str = "edits";

#[derive(Debug, Deserialize)]
struct Response {
    edits: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Edit {
    #[serde(default, deserialize_with = "lenient")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    language: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    language_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    user: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    time_ago: Option<String>,
    #[serde(default)]
    timestamp: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    comment: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    url: Option<String>,
}

/// Watchlist edits for one or more `lang:username` accounts.
pub struct WikipediaSource {
    ctx: SourceContext,
}

impl WikipediaSource {
    pub fn new(ctx: SourceContext) -> Self {
        Self { ctx }
    }

    /// Server-side limit: the configured one, else the size's item budget.
    pub fn request_limit(config: &SourceConfig, max_items: usize) -> usize {
        config.limit.unwrap_or(max_items)
    }

    fn normalize(edit: Edit) -> NormalizedItem {
        let age = edit
            .time_ago
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| match edit.timestamp.as_ref().and_then(Timestamp::from_json) {
                Some(ts) => format_time_ago(ts),
                None => "Unknown".to_string(),
            });
        let user = edit.user.unwrap_or_else(|| "unknown".to_string());

        NormalizedItem {
            subtitle: edit
                .comment
                .filter(|c| !c.trim().is_empty())
                .map(|c| truncate(&c, 60)),
            badge: edit
                .language_name
                .filter(|n| !n.is_empty())
                .or(edit.language),
            detail: Some(format!("{user} • {age}")),
            url: edit.url,
            ..NormalizedItem::new(truncate(edit.title.as_deref().unwrap_or_default(), 40))
        }
    }

    fn render_item(item: &NormalizedItem, p: &SizeProfile) -> Stack {
        let mut col = Stack::vertical();

        let mut top = Stack::horizontal().centered();
        if let Some(lang) = &item.badge {
            let mut pill = Stack::horizontal().badge(ColorToken::Accent, 3.0);
            pill.push(Text::new(lang, Font::bold(p.font_size.tertiary)).color(ColorToken::White));
            top.push(pill);
            top.add_spacer(4.0);
        }
        top.push(
            Text::new(&item.title, Font::medium(p.font_size.primary))
                .color(ColorToken::Primary)
                .line_limit(1),
        );
        col.push(top);

        if let Some(comment) = &item.subtitle {
            col.push(
                Text::new(comment, Font::regular(p.font_size.secondary))
                    .color(ColorToken::Secondary)
                    .line_limit(1),
            );
        }
        if let Some(meta) = &item.detail {
            col.push(Text::new(meta, Font::regular(p.font_size.tertiary)).color(ColorToken::Tertiary));
        }
        col
    }
}

#[async_trait]
impl DataSource for WikipediaSource {
    fn config(&self) -> &SourceConfig {
        &self.ctx.config
    }

    async fn fetch_data(&self, size: SizeClass) -> WidgetResult<FetchResult> {
        let cfg = &self.ctx.config;
        let max_items = self.ctx.profile(size).max_items;
        let params = [
            ("username", cfg.usernames.clone()),
            ("token", cfg.tokens.clone()),
            ("lang", cfg.languages.clone()),
            ("limit", Some(Self::request_limit(cfg, max_items).to_string())),
        ];
        let raw = self.ctx.api.fetch(&cfg.endpoint, &params).await?;
        let resp: Response = serde_json::from_value(raw)
            .map_err(|e| WidgetError::invalid("Wikipedia", e.to_string()))?;
        let edits = resp
            .edits
            .ok_or_else(|| WidgetError::invalid("Wikipedia", "missing edits"))?;

        // The configured limit may exceed what the size can show.
        Ok(FetchResult::single(
            EDITS,
            parse_items("Wikipedia", edits)
                .into_iter()
                .take(max_items)
                .map(Self::normalize)
                .collect(),
        ))
    }

    fn render(&self, widget: &mut Widget, data: &FetchResult, size: SizeClass) {
        let p = self.ctx.profile(size);
        add_header(widget, &self.ctx.config, "Recent Edits", data.logo.as_ref(), p);
        widget.add_spacer(p.spacing);
        widget.push(item_column(data.items(EDITS), p.spacing, |it| Self::render_item(it, p)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn configured_limit_wins_for_the_request() {
        let mut cfg = crate::config::WidgetConfig::builtin().sources["wikipedia"].clone();
        assert_eq!(WikipediaSource::request_limit(&cfg, 3), 10);
        cfg.limit = None;
        assert_eq!(WikipediaSource::request_limit(&cfg, 3), 3);
    }

    #[test]
    fn language_name_preferred_and_missing_comment_dropped() {
        let edit: Edit = serde_json::from_value(json!({
            "title": "Rust (programming language)",
            "language": "en",
            "languageName": "English",
            "user": "Jane",
            "timeAgo": "5m ago"
        }))
        .unwrap();
        let item = WikipediaSource::normalize(edit);
        assert_eq!(item.badge.as_deref(), Some("English"));
        assert_eq!(item.subtitle, None);
        assert_eq!(item.detail.as_deref(), Some("Jane • 5m ago"));

        let edit: Edit = serde_json::from_value(json!({
            "title": "Berlin",
            "language": "de",
            "user": "Max",
            "timestamp": "not-a-date",
            "comment": "typo",
            "languageName": null
        }))
        .unwrap();
        let item = WikipediaSource::normalize(edit);
        assert_eq!(item.badge.as_deref(), Some("de"));
        assert_eq!(item.subtitle.as_deref(), Some("typo"));
        assert_eq!(item.detail.as_deref(), Some("Max • Unknown"));
    }
}
