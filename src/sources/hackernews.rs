// src/sources/hackernews.rs
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{
    add_header, item_column, lenient, lenient_num, parse_items, split_columns, DataSource, FetchResult,
    NormalizedItem, SourceContext,
};
use crate::canvas::{ColorToken, Container, Font, Stack, Text, Widget};
use crate::config::{SizeClass, SizeProfile, SourceConfig};
use crate::error::{WidgetError, WidgetResult};
use crate::format::truncate;

pub const STORIES: &str = "stories";

#[derive(Debug, Deserialize)]
struct Response {
    stories: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Story {
    #[serde(default, deserialize_with = "lenient")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient_num")]
    points: Option<u64>,
    #[serde(default, deserialize_with = "lenient_num")]
    num_comments: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    author: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    url: Option<String>,
}

pub struct HackerNewsSource {
    ctx: SourceContext,
}

impl HackerNewsSource {
    pub fn new(ctx: SourceContext) -> Self {
        Self { ctx }
    }

    fn normalize(story: Story) -> NormalizedItem {
        NormalizedItem {
            subtitle: story.author,
            detail: Some(format!(
                "{}pts • {}cmt",
                story.points.unwrap_or(0),
                story.num_comments.unwrap_or(0)
            )),
            url: story.url,
            ..NormalizedItem::new(truncate(story.title.as_deref().unwrap_or_default(), 50))
        }
    }

    /// Two columns only pay off on a medium widget with more than three stories.
    pub fn columns(size: SizeClass, stories: usize) -> usize {
        if size == SizeClass::Medium && stories > 3 {
            2
        } else {
            1
        }
    }

    fn render_item(item: &NormalizedItem, p: &SizeProfile) -> Stack {
        let mut col = Stack::vertical();
        col.push(
            Text::new(&item.title, Font::medium(p.font_size.primary))
                .color(ColorToken::Primary)
                .line_limit(2),
        );
        if let Some(meta) = &item.detail {
            let mut line = Stack::horizontal();
            line.push(Text::new(meta, Font::regular(p.font_size.tertiary)).color(ColorToken::Secondary));
            col.push(line);
        }
        col
    }
}

#[async_trait]
impl DataSource for HackerNewsSource {
    fn config(&self) -> &SourceConfig {
        &self.ctx.config
    }

    async fn fetch_data(&self, size: SizeClass) -> WidgetResult<FetchResult> {
        let raw = self.ctx.api.fetch(&self.ctx.config.endpoint, &[]).await?;
        let resp: Response = serde_json::from_value(raw)
            .map_err(|e| WidgetError::invalid("Hacker News", e.to_string()))?;
        let stories = resp
            .stories
            .ok_or_else(|| WidgetError::invalid("Hacker News", "missing stories"))?;

        let limit = self.ctx.profile(size).max_items;
        Ok(FetchResult::single(
            STORIES,
            parse_items("Hacker News", stories)
                .into_iter()
                .take(limit)
                .map(Self::normalize)
                .collect(),
        ))
    }

    fn render(&self, widget: &mut Widget, data: &FetchResult, size: SizeClass) {
        let p = self.ctx.profile(size);
        add_header(widget, &self.ctx.config, "Hacker News", data.logo.as_ref(), p);
        widget.add_spacer(p.spacing);

        let stories = data.items(STORIES);
        let columns = Self::columns(size, stories.len());
        if columns == 1 {
            widget.push(item_column(stories, p.spacing, |it| Self::render_item(it, p)));
            return;
        }

        let mut content = Stack::horizontal();
        for (i, chunk) in split_columns(stories, columns).into_iter().enumerate() {
            if i > 0 {
                content.add_spacer(p.spacing * 2.0);
            }
            content.push(item_column(chunk, p.spacing, |it| Self::render_item(it, p)));
        }
        widget.push(content);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_medium_with_more_than_three_splits() {
        assert_eq!(HackerNewsSource::columns(SizeClass::Medium, 4), 2);
        assert_eq!(HackerNewsSource::columns(SizeClass::Medium, 3), 1);
        assert_eq!(HackerNewsSource::columns(SizeClass::Large, 10), 1);
        assert_eq!(HackerNewsSource::columns(SizeClass::Small, 3), 1);
    }
}
