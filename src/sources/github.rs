// src/sources/github.rs
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{add_header, item_column, lenient, parse_items, DataSource, FetchResult, NormalizedItem, SourceContext};
use crate::canvas::{ColorToken, Container, Font, Stack, Text, Widget};
use crate::config::{SizeClass, SizeProfile, SourceConfig};
use crate::error::{WidgetError, WidgetResult};
use crate::format::{format_time_ago, Timestamp};

pub const RELEASES: &str = "releases";

#[derive(Debug, Deserialize)]
struct Response {
    releases: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Release {
    #[serde(default, deserialize_with = "lenient")]
    repo: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    tag_name: Option<String>,
    /// Epoch number or date string; anything else reads as unknown.
    #[serde(default)]
    published_at: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    time_ago: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    author: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    is_prerelease: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    url: Option<String>,
}

/// `owner/repo` → `repo`.
pub fn repo_label(full: &str) -> &str {
    full.rsplit('/').next().unwrap_or(full)
}

/// Monorepo tags like `releases/v1.2` lose their prefix.
pub fn clean_tag(tag: &str) -> &str {
    tag.strip_prefix("releases/").unwrap_or(tag)
}

pub struct GitHubSource {
    ctx: SourceContext,
}

impl GitHubSource {
    pub fn new(ctx: SourceContext) -> Self {
        Self { ctx }
    }

    fn normalize(release: Release) -> NormalizedItem {
        let tag = release
            .tag_name
            .as_deref()
            .map(clean_tag)
            .map(str::to_string)
            .or(release.name);
        let age = release
            .time_ago
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| match release.published_at.as_ref().and_then(Timestamp::from_json) {
                Some(ts) => format_time_ago(ts),
                None => "Unknown".to_string(),
            });
        let author = release.author.unwrap_or_else(|| "unknown".to_string());

        NormalizedItem {
            subtitle: tag,
            flag: release.is_prerelease.unwrap_or(false).then(|| "pre".to_string()),
            detail: Some(format!("{author} • {age}")),
            url: release.url,
            ..NormalizedItem::new(repo_label(release.repo.as_deref().unwrap_or_default()))
        }
    }

    fn render_item(item: &NormalizedItem, p: &SizeProfile) -> Stack {
        let mut col = Stack::vertical();

        let mut top = Stack::horizontal().centered();
        top.push(Text::new(&item.title, Font::semibold(p.font_size.primary)).color(ColorToken::Accent));
        top.add_spacer(4.0);
        if let Some(tag) = &item.subtitle {
            top.push(Text::new(tag, Font::regular(p.font_size.tertiary)).color(ColorToken::Secondary));
        }
        if let Some(flag) = &item.flag {
            top.add_spacer(4.0);
            top.push(Text::new(flag, Font::bold(p.font_size.tertiary)).color(ColorToken::Warning));
        }
        col.push(top);

        if let Some(detail) = &item.detail {
            col.push(
                Text::new(detail, Font::regular(p.font_size.tertiary))
                    .color(ColorToken::Secondary)
                    .line_limit(1),
            );
        }
        col
    }
}

#[async_trait]
impl DataSource for GitHubSource {
    fn config(&self) -> &SourceConfig {
        &self.ctx.config
    }

    async fn fetch_data(&self, size: SizeClass) -> WidgetResult<FetchResult> {
        let repos = self.ctx.config.repos.join(",");
        let raw = self
            .ctx
            .api
            .fetch(&self.ctx.config.endpoint, &[("repos", Some(repos))])
            .await?;
        let resp: Response =
            serde_json::from_value(raw).map_err(|e| WidgetError::invalid("GitHub", e.to_string()))?;
        let releases = resp
            .releases
            .ok_or_else(|| WidgetError::invalid("GitHub", "missing releases"))?;

        let limit = self.ctx.profile(size).max_items;
        Ok(FetchResult::single(
            RELEASES,
            parse_items("GitHub", releases)
                .into_iter()
                .take(limit)
                .map(Self::normalize)
                .collect(),
        ))
    }

    fn render(&self, widget: &mut Widget, data: &FetchResult, size: SizeClass) {
        let p = self.ctx.profile(size);
        add_header(widget, &self.ctx.config, "Recent Releases", data.logo.as_ref(), p);
        widget.add_spacer(p.spacing);
        widget.push(item_column(data.items(RELEASES), p.spacing, |it| Self::render_item(it, p)));
    }
}
