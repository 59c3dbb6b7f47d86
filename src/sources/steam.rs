// src/sources/steam.rs
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::{
    add_header, item_column, lenient, lenient_num, lenient_or_default, parse_items, DataSource, FetchResult,
    NormalizedItem, SourceContext,
};
use crate::canvas::{ColorToken, Container, Font, Image, Stack, Text, Widget};
use crate::config::{SizeClass, SizeProfile, SourceConfig};
use crate::error::{WidgetError, WidgetResult};
use crate::format::{format_duration, truncate};

pub const GAMES: &str = "games";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Profile {
    #[serde(default)]
    recent_games: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_num")]
    pub hours_played_numeric: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub icon_url: Option<String>,
}

/// A game with the profile it was played on.
#[derive(Debug, Clone)]
pub struct PlayedGame {
    pub profile: String,
    pub game: Game,
}

impl PlayedGame {
    pub fn hours(&self) -> f64 {
        self.game.hours_played_numeric.unwrap_or(0.0)
    }
}

/// Flatten per-profile game lists in `order`, rank by hours played
/// (stable, descending) and keep the top `limit`.
pub fn merge_profiles(per_profile: Vec<(String, Vec<Game>)>, limit: usize) -> Vec<PlayedGame> {
    let mut all: Vec<PlayedGame> = per_profile
        .into_iter()
        .flat_map(|(profile, games)| {
            games.into_iter().map(move |game| PlayedGame {
                profile: profile.clone(),
                game,
            })
        })
        .collect();
    all.sort_by(|a, b| b.hours().total_cmp(&a.hours()));
    all.truncate(limit);
    all
}

/// Recently played games across several Steam profiles.
pub struct SteamSource {
    ctx: SourceContext,
}

impl SteamSource {
    pub fn new(ctx: SourceContext) -> Self {
        Self { ctx }
    }

    fn profile_games(name: &str, raw: Value) -> WidgetResult<Vec<Game>> {
        let profile: Profile = serde_json::from_value(raw)
            .map_err(|e| WidgetError::invalid("Steam", format!("profile {name}: {e}")))?;
        Ok(profile
            .recent_games
            .map(|raw| parse_items("Steam", raw))
            .unwrap_or_default())
    }

    /// Configured order wins; with no profiles configured, take the response as is.
    /// Every configured profile must be present or the whole fetch fails.
    fn ordered(&self, mut resp: Map<String, Value>) -> WidgetResult<Vec<(String, Vec<Game>)>> {
        let mut out = Vec::new();
        if self.ctx.config.profiles.is_empty() {
            for (name, raw) in resp {
                let games = Self::profile_games(&name, raw)?;
                out.push((name, games));
            }
            return Ok(out);
        }
        for name in &self.ctx.config.profiles {
            let raw = resp
                .remove(name)
                .ok_or_else(|| WidgetError::invalid("Steam", format!("missing profile {name}")))?;
            out.push((name.clone(), Self::profile_games(name, raw)?));
        }
        Ok(out)
    }

    fn render_item(item: &NormalizedItem, p: &SizeProfile) -> Stack {
        let mut row = Stack::horizontal().centered();
        match &item.image {
            Some(img) => row.push(
                Image::bitmap(img.clone())
                    .size(p.icon_size)
                    .corner_radius(4.0),
            ),
            None => row.push(
                Image::symbol("gamecontroller.fill")
                    .size(p.icon_size)
                    .tint(ColorToken::Secondary),
            ),
        }
        row.add_spacer(p.spacing);

        let mut text = Stack::vertical();
        text.push(
            Text::new(truncate(&item.title, 35), Font::medium(p.font_size.primary))
                .color(ColorToken::Primary)
                .line_limit(1),
        );
        if let Some(played) = &item.subtitle {
            text.push(Text::new(played, Font::regular(p.font_size.secondary)).color(ColorToken::Secondary));
        }
        row.push(text);
        row.add_flexible_spacer();
        row
    }
}

#[async_trait]
impl DataSource for SteamSource {
    fn config(&self) -> &SourceConfig {
        &self.ctx.config
    }

    async fn fetch_data(&self, size: SizeClass) -> WidgetResult<FetchResult> {
        let profiles = self.ctx.config.profiles.join(",");
        let raw = self
            .ctx
            .api
            .fetch(&self.ctx.config.endpoint, &[("profiles", Some(profiles))])
            .await?;
        let resp: Map<String, Value> = serde_json::from_value(raw)
            .map_err(|e| WidgetError::invalid("Steam", e.to_string()))?;

        let limit = self.ctx.profile(size).max_items;
        let games = merge_profiles(self.ordered(resp)?, limit);

        let icon_urls: Vec<Option<String>> = games.iter().map(|g| g.game.icon_url.clone()).collect();
        let (icons, logo) = futures::join!(self.ctx.images.load_all(&icon_urls), self.ctx.load_logo());

        let items = games
            .into_iter()
            .zip(icons)
            .map(|(played, icon)| {
                let hours = played.hours();
                NormalizedItem {
                    subtitle: Some(format_duration(hours)),
                    detail: Some(played.profile),
                    score: Some(hours),
                    image: icon,
                    ..NormalizedItem::new(played.game.name)
                }
            })
            .collect();

        Ok(FetchResult {
            logo,
            ..FetchResult::single(GAMES, items)
        })
    }

    fn render(&self, widget: &mut Widget, data: &FetchResult, size: SizeClass) {
        let p = self.ctx.profile(size);
        add_header(widget, &self.ctx.config, "Recently Played", data.logo.as_ref(), p);
        widget.add_spacer(p.spacing);
        widget.push(item_column(data.items(GAMES), p.spacing, |it| Self::render_item(it, p)));
    }
}
