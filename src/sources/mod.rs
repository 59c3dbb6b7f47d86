// src/sources/mod.rs
//! Data source adapters.
//!
//! Every adapter does the same three things for its remote source: fetch the
//! JSON (through the shared [`ApiClient`]), normalize it into
//! [`NormalizedItem`] collections limited by the active [`SizeProfile`], and
//! lay those collections out on a [`Widget`]. `fetch_data` owns all I/O
//! (including image preloads); `render` is pure.

pub mod billboard;
pub mod github;
pub mod hackernews;
pub mod imdb;
pub mod steam;
pub mod wikipedia;

use async_trait::async_trait;
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

use crate::api_client::ApiClient;
use crate::canvas::{ColorToken, Container, Font, Image, Stack, Text, Widget};
use crate::config::{SizeClass, SizeProfile, SizeProfiles, SourceConfig};
use crate::error::WidgetResult;
use crate::image_cache::{ImageCache, WidgetImage};

/// Chart placement for ranked sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartPosition {
    pub current: i64,
    /// `0` means the entry was not on last week's chart.
    pub last_week: i64,
    pub peak: i64,
    pub weeks: i64,
}

impl ChartPosition {
    pub fn movement(&self) -> Movement {
        Movement::between(self.current, self.last_week)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Movement {
    New,
    Up,
    Down,
    Unchanged,
}

impl Movement {
    /// Compares positions, not an API-provided delta. A lower number is a
    /// better rank, so `current < last_week` is a climb.
    pub fn between(current: i64, last_week: i64) -> Self {
        if last_week == 0 {
            Movement::New
        } else if current < last_week {
            Movement::Up
        } else if current > last_week {
            Movement::Down
        } else {
            Movement::Unchanged
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Movement::New => "star.circle.fill",
            Movement::Up => "arrow.up.circle.fill",
            Movement::Down => "arrow.down.circle.fill",
            Movement::Unchanged => "minus.circle.fill",
        }
    }

    pub fn color(self) -> ColorToken {
        match self {
            Movement::New => ColorToken::New,
            Movement::Up => ColorToken::Up,
            Movement::Down => ColorToken::Down,
            Movement::Unchanged => ColorToken::Unchanged,
        }
    }
}

/// The display shape every renderer consumes. A `None` field means the
/// matching element is not drawn.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedItem {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Tertiary line (weeks on chart, author and age, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Short pill text: a rating or a language.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    /// Inline marker such as `pre` for prereleases.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartPosition>,
    /// Numeric ranking key (e.g. hours played).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Arc<WidgetImage>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl NormalizedItem {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Collection {
    pub key: &'static str,
    pub items: Vec<NormalizedItem>,
}

/// Named item collections from one adapter fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FetchResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Header logo, if the source has one and it loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<Arc<WidgetImage>>,
    pub collections: Vec<Collection>,
}

impl FetchResult {
    pub fn single(key: &'static str, items: Vec<NormalizedItem>) -> Self {
        Self::default().with(key, items)
    }

    pub fn with(mut self, key: &'static str, items: Vec<NormalizedItem>) -> Self {
        self.collections.push(Collection { key, items });
        self
    }

    /// Items of collection `key`; empty when the key is absent.
    pub fn items(&self, key: &str) -> &[NormalizedItem] {
        self.collections
            .iter()
            .find(|c| c.key == key)
            .map(|c| c.items.as_slice())
            .unwrap_or_default()
    }

    pub fn total_items(&self) -> usize {
        self.collections.iter().map(|c| c.items.len()).sum()
    }

    /// True when every collection is empty (or there are none).
    pub fn is_empty(&self) -> bool {
        self.total_items() == 0
    }
}

/// What every adapter is built from.
#[derive(Clone)]
pub struct SourceContext {
    pub config: SourceConfig,
    pub sizing: SizeProfiles,
    pub api: ApiClient,
    pub images: Arc<ImageCache>,
}

impl SourceContext {
    pub fn profile(&self, size: SizeClass) -> &SizeProfile {
        self.sizing.get(size)
    }

    /// Load the configured header logo; failure just means no logo.
    pub async fn load_logo(&self) -> Option<Arc<WidgetImage>> {
        match self.config.logo_url.as_deref() {
            Some(url) => self.images.load(url).await,
            None => None,
        }
    }
}

#[async_trait]
pub trait DataSource: Send + Sync {
    fn config(&self) -> &SourceConfig;

    async fn fetch_data(&self, size: SizeClass) -> WidgetResult<FetchResult>;

    fn render(&self, widget: &mut Widget, data: &FetchResult, size: SizeClass);
}

// ------------------------------------------------------------
// Shared rendering pieces
// ------------------------------------------------------------

/// Icon (logo bitmap if loaded, else the source symbol) + bold title.
pub(crate) fn add_header(
    widget: &mut Widget,
    config: &SourceConfig,
    title: &str,
    logo: Option<&Arc<WidgetImage>>,
    p: &SizeProfile,
) {
    let mut header = Stack::horizontal().centered();
    let edge = p.icon_size + 2.0;
    match logo {
        Some(img) => header.push(Image::bitmap(Arc::clone(img)).size(edge).corner_radius(4.0)),
        None => header.push(Image::symbol(&config.icon).size(edge).tint(ColorToken::Accent)),
    }
    header.add_spacer(p.spacing);
    header.push(Text::new(title, Font::bold(p.font_size.primary)).color(ColorToken::Primary));
    widget.push(header);
}

/// Vertical stack of rendered items with `spacing` between (not after) them.
pub(crate) fn item_column<F>(items: &[NormalizedItem], spacing: f32, mut render_item: F) -> Stack
where
    F: FnMut(&NormalizedItem) -> Stack,
{
    let mut col = Stack::vertical();
    for (i, item) in items.iter().enumerate() {
        col.push(render_item(item));
        if i + 1 < items.len() {
            col.add_spacer(spacing);
        }
    }
    col
}

/// Split `items` into at most `columns` chunks, the earlier ones getting the
/// ceiling share.
pub(crate) fn split_columns(items: &[NormalizedItem], columns: usize) -> Vec<&[NormalizedItem]> {
    if items.is_empty() {
        return Vec::new();
    }
    let per = items.len().div_ceil(columns.max(1));
    items.chunks(per).collect()
}

/// String or number JSON field as display text; `None` for null/absent/other.
pub(crate) fn json_text(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// ------------------------------------------------------------
// Lenient item parsing
// ------------------------------------------------------------

/// Field deserializer: `null` or a value of the wrong type reads as `None`
/// instead of failing the whole response. Pair with `#[serde(default)]`.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let v = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(v).ok())
}

/// [`lenient`] for fields that are plain values: unreadable input becomes `T::default()`.
pub(crate) fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

/// Like [`lenient`], but numeric strings (`"12"`) are parsed too.
pub(crate) fn lenient_num<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + FromStr,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s.trim().parse().ok()),
        other => Ok(serde_json::from_value(other).ok()),
    }
}

/// Parse each raw list entry on its own; entries that are not objects are
/// logged and dropped so one bad row cannot fail the source.
pub(crate) fn parse_items<T: DeserializeOwned>(source: &str, raw: Vec<Value>) -> Vec<T> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(index, v)| match serde_json::from_value(v) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(source, index, error = %e, "skipping malformed item");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: usize) -> Vec<NormalizedItem> {
        (0..n).map(|i| NormalizedItem::new(format!("#{i}"))).collect()
    }

    #[test]
    fn movement_labels() {
        assert_eq!(Movement::between(5, 0), Movement::New);
        assert_eq!(Movement::between(2, 5), Movement::Up);
        assert_eq!(Movement::between(7, 5), Movement::Down);
        assert_eq!(Movement::between(5, 5), Movement::Unchanged);
        // previous = 0 wins even when current is also 0
        assert_eq!(Movement::between(0, 0), Movement::New);
    }

    #[test]
    fn split_gives_first_column_the_ceiling() {
        let v = items(5);
        let cols = split_columns(&v, 2);
        assert_eq!(cols.len(), 2);
        assert_eq!(cols[0].len(), 3);
        assert_eq!(cols[1].len(), 2);

        let v = items(1);
        assert_eq!(split_columns(&v, 2).len(), 1);
        assert!(split_columns(&[], 2).is_empty());
    }

    #[test]
    fn fetch_result_emptiness_spans_all_collections() {
        let r = FetchResult::single("movies", vec![]).with("tv_shows", vec![]);
        assert!(r.is_empty());
        let r = FetchResult::single("movies", vec![]).with("tv_shows", items(1));
        assert!(!r.is_empty());
        assert_eq!(r.items("tv_shows").len(), 1);
        assert!(r.items("nope").is_empty());
        assert!(FetchResult::default().is_empty());
    }

    #[test]
    fn item_column_spaces_between_only() {
        let col = item_column(&items(3), 6.0, |it| {
            let mut s = Stack::vertical();
            s.push(Text::new(&it.title, Font::regular(10.0)));
            s
        });
        // 3 items + 2 spacers
        assert_eq!(col.children.len(), 5);
        assert_eq!(col.texts(), vec!["#0", "#1", "#2"]);
    }

    #[derive(Debug, Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "lenient")]
        name: Option<String>,
        #[serde(default, deserialize_with = "lenient_num")]
        rank: Option<i64>,
    }

    #[test]
    fn lenient_fields_absorb_nulls_and_wrong_types() {
        use serde_json::json;
        let rows: Vec<Row> = parse_items(
            "test",
            vec![
                json!({"name": "ok", "rank": 3}),
                json!({"name": null, "rank": "-"}),
                json!({"name": 7, "rank": "12"}),
                json!({}),
                json!(null),
                json!("not a row"),
            ],
        );
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].name.as_deref(), Some("ok"));
        assert_eq!(rows[0].rank, Some(3));
        assert_eq!(rows[1].name, None);
        assert_eq!(rows[1].rank, None);
        assert_eq!(rows[2].name, None);
        assert_eq!(rows[2].rank, Some(12));
        assert_eq!(rows[3].rank, None);
    }

    #[test]
    fn json_text_accepts_strings_and_numbers() {
        use serde_json::json;
        assert_eq!(json_text(Some(&json!("8.1"))), Some("8.1".into()));
        assert_eq!(json_text(Some(&json!(2024))), Some("2024".into()));
        assert_eq!(json_text(Some(&json!(null))), None);
        assert_eq!(json_text(None), None);
    }
}
