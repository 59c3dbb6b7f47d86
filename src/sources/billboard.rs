// src/sources/billboard.rs
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{
    add_header, item_column, lenient, lenient_num, parse_items, split_columns, ChartPosition, DataSource,
    FetchResult, NormalizedItem, SourceContext,
};
use crate::canvas::{ColorToken, Container, Font, Image, Stack, Text, Widget};
use crate::config::{SizeClass, SizeProfile, SourceConfig};
use crate::error::{WidgetError, WidgetResult};
use crate::format::{clean_title, truncate};

pub const ITEMS: &str = "items";

#[derive(Debug, Deserialize)]
struct Response {
    music: Option<Music>,
}

#[derive(Debug, Deserialize)]
struct Music {
    data: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    data_title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    data_desc: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default, deserialize_with = "lenient_num")]
    position: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    artist: Option<String>,
    /// Missing, null or a placeholder like `"-"` all mean "not charted last week".
    #[serde(default, deserialize_with = "lenient_num")]
    last_week: Option<i64>,
    #[serde(default, deserialize_with = "lenient_num")]
    peak: Option<i64>,
    #[serde(default, deserialize_with = "lenient_num")]
    weeks: Option<i64>,
}

/// Billboard 200 album chart.
pub struct BillboardSource {
    ctx: SourceContext,
}

impl BillboardSource {
    pub fn new(ctx: SourceContext) -> Self {
        Self { ctx }
    }

    fn normalize(entry: Entry) -> NormalizedItem {
        let weeks = entry.weeks.unwrap_or(0);
        NormalizedItem {
            subtitle: entry.artist,
            detail: (weeks > 0).then(|| format!("{weeks} weeks")),
            chart: Some(ChartPosition {
                current: entry.position.unwrap_or(0),
                last_week: entry.last_week.unwrap_or(0),
                peak: entry.peak.unwrap_or(0),
                weeks,
            }),
            ..NormalizedItem::new(clean_title(entry.title.as_deref().unwrap_or_default()))
        }
    }

    fn columns(size: SizeClass) -> usize {
        match size {
            SizeClass::Small => 1,
            SizeClass::Medium | SizeClass::Large => 2,
        }
    }

    fn render_item(item: &NormalizedItem, p: &SizeProfile) -> Stack {
        let mut row = Stack::horizontal().centered();

        let mut position = Stack::vertical().centered();
        if let Some(chart) = item.chart {
            let movement = chart.movement();
            position.push(
                Image::symbol(movement.symbol())
                    .size(p.icon_size)
                    .tint(movement.color()),
            );
        }
        row.push(position);
        row.add_spacer(p.spacing);

        let mut text = Stack::vertical();
        text.push(
            Text::new(truncate(&item.title, 35), Font::medium(p.font_size.primary))
                .color(ColorToken::Primary)
                .line_limit(1),
        );
        if let Some(artist) = &item.subtitle {
            text.push(
                Text::new(truncate(artist, 30), Font::regular(p.font_size.secondary))
                    .color(ColorToken::Secondary)
                    .line_limit(1),
            );
        }
        if let Some(detail) = &item.detail {
            text.push(
                Text::new(detail, Font::regular(p.font_size.tertiary)).color(ColorToken::Tertiary),
            );
        }
        row.push(text);
        row.add_flexible_spacer();
        row
    }
}

#[async_trait]
impl DataSource for BillboardSource {
    fn config(&self) -> &SourceConfig {
        &self.ctx.config
    }

    async fn fetch_data(&self, size: SizeClass) -> WidgetResult<FetchResult> {
        let raw = self.ctx.api.fetch(&self.ctx.config.endpoint, &[]).await?;
        let resp: Response = serde_json::from_value(raw)
            .map_err(|e| WidgetError::invalid("Billboard", e.to_string()))?;
        let music = resp
            .music
            .ok_or_else(|| WidgetError::invalid("Billboard", "missing music"))?;
        let data = music
            .data
            .ok_or_else(|| WidgetError::invalid("Billboard", "missing music.data"))?;

        let limit = self.ctx.profile(size).max_items;
        let items = parse_items::<Entry>("Billboard", data)
            .into_iter()
            .take(limit)
            .map(Self::normalize)
            .collect();

        Ok(FetchResult {
            title: Some(music.data_title.unwrap_or_else(|| "Billboard 200".to_string())),
            subtitle: Some(music.data_desc.unwrap_or_default()),
            ..FetchResult::single(ITEMS, items)
        })
    }

    fn render(&self, widget: &mut Widget, data: &FetchResult, size: SizeClass) {
        let p = self.ctx.profile(size);
        let title = data.title.as_deref().unwrap_or(&self.ctx.config.name);
        add_header(widget, &self.ctx.config, title, data.logo.as_ref(), p);
        widget.add_spacer(p.spacing);

        let mut content = Stack::horizontal();
        for (i, chunk) in split_columns(data.items(ITEMS), Self::columns(size))
            .into_iter()
            .enumerate()
        {
            if i > 0 {
                content.add_spacer(p.spacing * 2.0);
            }
            content.push(item_column(chunk, p.spacing, |it| Self::render_item(it, p)));
        }
        widget.push(content);
    }
}
