// src/sources/imdb.rs
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{
    add_header, item_column, json_text, lenient, parse_items, DataSource, FetchResult, NormalizedItem,
    SourceContext,
};
use crate::canvas::{ColorToken, Container, Font, Stack, Text, Widget};
use crate::config::{SizeClass, SizeProfile, SourceConfig};
use crate::error::{WidgetError, WidgetResult};
use crate::format::truncate;

pub const MOVIES: &str = "movies";
pub const TV_SHOWS: &str = "tv_shows";

#[derive(Debug, Deserialize)]
struct Response {
    movies: Option<Section>,
    tv_shows: Option<Section>,
}

#[derive(Debug, Deserialize)]
struct Section {
    #[serde(default)]
    data: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default, deserialize_with = "lenient")]
    title: Option<String>,
    #[serde(default)]
    year: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    length: Option<String>,
    #[serde(default)]
    rating: Option<Value>,
}

/// Popular movies and TV shows; both lists come back in one response and
/// share the size budget half and half.
pub struct ImdbSource {
    ctx: SourceContext,
}

/// `""` means not yet rated; a missing or null rating draws no badge.
pub fn rating_badge(rating: Option<&Value>) -> Option<String> {
    match rating {
        Some(Value::String(s)) if s.is_empty() => Some("NEW".to_string()),
        other => json_text(other),
    }
}

impl ImdbSource {
    pub fn new(ctx: SourceContext) -> Self {
        Self { ctx }
    }

    fn normalize(entry: Entry) -> NormalizedItem {
        let year = json_text(entry.year.as_ref())
            .filter(|y| !y.is_empty())
            .unwrap_or_else(|| "N/A".to_string());
        NormalizedItem {
            subtitle: Some(format!("{} • {}", year, entry.length.unwrap_or_default())),
            badge: rating_badge(entry.rating.as_ref()),
            ..NormalizedItem::new(truncate(entry.title.as_deref().unwrap_or_default(), 30))
        }
    }

    fn take(section: Option<Section>, limit: usize) -> Vec<NormalizedItem> {
        section
            .and_then(|s| s.data)
            .map(|raw| parse_items::<Entry>("IMDb", raw))
            .unwrap_or_default()
            .into_iter()
            .take(limit)
            .map(Self::normalize)
            .collect()
    }

    fn render_item(item: &NormalizedItem, p: &SizeProfile) -> Stack {
        let mut row = Stack::horizontal().centered();
        if let Some(badge) = &item.badge {
            let mut pill = Stack::horizontal().badge(ColorToken::Accent, 4.0);
            pill.push(Text::new(badge, Font::bold(p.font_size.tertiary)).color(ColorToken::White));
            row.push(pill);
            row.add_spacer(p.spacing);
        }

        let mut text = Stack::vertical();
        text.push(
            Text::new(&item.title, Font::medium(p.font_size.secondary))
                .color(ColorToken::Primary)
                .line_limit(1),
        );
        if let Some(sub) = &item.subtitle {
            text.push(Text::new(sub, Font::regular(p.font_size.tertiary)).color(ColorToken::Secondary));
        }
        row.push(text);
        row
    }

    fn section(title: &str, items: &[NormalizedItem], p: &SizeProfile) -> Stack {
        let mut col = Stack::vertical();
        col.push(Text::new(title, Font::semibold(p.font_size.secondary)).color(ColorToken::Secondary));
        col.add_spacer(p.spacing);
        col.push(item_column(items, p.spacing, |it| Self::render_item(it, p)));
        col
    }
}

#[async_trait]
impl DataSource for ImdbSource {
    fn config(&self) -> &SourceConfig {
        &self.ctx.config
    }

    async fn fetch_data(&self, size: SizeClass) -> WidgetResult<FetchResult> {
        let raw = self.ctx.api.fetch(&self.ctx.config.endpoint, &[]).await?;
        let resp: Response =
            serde_json::from_value(raw).map_err(|e| WidgetError::invalid("IMDb", e.to_string()))?;
        if resp.movies.is_none() && resp.tv_shows.is_none() {
            return Err(WidgetError::invalid("IMDb", "missing movies and tv_shows"));
        }

        let per_list = self.ctx.profile(size).max_items.div_ceil(2);
        Ok(FetchResult::single(MOVIES, Self::take(resp.movies, per_list))
            .with(TV_SHOWS, Self::take(resp.tv_shows, per_list)))
    }

    fn render(&self, widget: &mut Widget, data: &FetchResult, size: SizeClass) {
        let p = self.ctx.profile(size);
        add_header(widget, &self.ctx.config, "Popular on IMDb", data.logo.as_ref(), p);
        widget.add_spacer(p.spacing);

        let mut content = Stack::horizontal();
        let movies = data.items(MOVIES);
        if !movies.is_empty() {
            content.push(Self::section("Movies", movies, p));
        }
        let shows = data.items(TV_SHOWS);
        if size != SizeClass::Small && !shows.is_empty() {
            content.add_flexible_spacer();
            content.push(Self::section("TV Shows", shows, p));
        }
        widget.push(content);
    }
}
