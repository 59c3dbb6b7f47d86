// src/config.rs
//! Static widget configuration: size profiles and per-source descriptors.
//!
//! Lookup order for [`WidgetConfig::load_default`]:
//! 1) `$WIDGET_CONFIG_PATH`
//! 2) `config/widget.toml`
//! 3) `config/widget.json`
//! 4) built-in defaults ([`WidgetConfig::builtin`])

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const ENV_CONFIG_PATH: &str = "WIDGET_CONFIG_PATH";
pub const ENV_WIKIPEDIA_TOKENS: &str = "WIKIPEDIA_TOKENS";
pub const ENV_WIKIPEDIA_USERNAMES: &str = "WIKIPEDIA_USERNAMES";

const STEAM_LOGO_URL: &str =
    "https://cdn.brandfetch.io/idMpZmhn_O/w/400/h/400/theme/dark/icon.jpeg?c=1dxbfHSJFAPEGdCLU4o5B";

/// Widget size class, supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    Small,
    #[default]
    Medium,
    Large,
}

impl SizeClass {
    pub const ALL: [SizeClass; 3] = [SizeClass::Small, SizeClass::Medium, SizeClass::Large];

    pub fn as_str(self) -> &'static str {
        match self {
            SizeClass::Small => "small",
            SizeClass::Medium => "medium",
            SizeClass::Large => "large",
        }
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeClass {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(SizeClass::Small),
            "medium" => Ok(SizeClass::Medium),
            "large" => Ok(SizeClass::Large),
            other => Err(anyhow!("unsupported widget size: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontScale {
    pub primary: f32,
    pub secondary: f32,
    pub tertiary: f32,
}

/// Layout constants for one size class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeProfile {
    pub max_items: usize,
    pub font_size: FontScale,
    pub icon_size: f32,
    pub spacing: f32,
    pub padding: f32,
}

/// One profile per size class. A struct rather than a map so a missing
/// size cannot be represented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeProfiles {
    pub small: SizeProfile,
    pub medium: SizeProfile,
    pub large: SizeProfile,
}

impl SizeProfiles {
    pub fn get(&self, size: SizeClass) -> &SizeProfile {
        match size {
            SizeClass::Small => &self.small,
            SizeClass::Medium => &self.medium,
            SizeClass::Large => &self.large,
        }
    }
}

impl Default for SizeProfiles {
    fn default() -> Self {
        Self {
            small: SizeProfile {
                max_items: 3,
                font_size: FontScale {
                    primary: 11.0,
                    secondary: 9.0,
                    tertiary: 8.0,
                },
                icon_size: 14.0,
                spacing: 4.0,
                padding: 12.0,
            },
            medium: SizeProfile {
                max_items: 6,
                font_size: FontScale {
                    primary: 12.0,
                    secondary: 10.0,
                    tertiary: 9.0,
                },
                icon_size: 16.0,
                spacing: 6.0,
                padding: 14.0,
            },
            large: SizeProfile {
                max_items: 10,
                font_size: FontScale {
                    primary: 13.0,
                    secondary: 11.0,
                    tertiary: 10.0,
                },
                icon_size: 18.0,
                spacing: 8.0,
                padding: 16.0,
            },
        }
    }
}

/// Static descriptor for one remote source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Filled from the map key when loading; the registry matches on it.
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub endpoint: String,
    /// Symbol name for the header icon.
    pub icon: String,
    pub refresh_hours: f64,
    #[serde(default)]
    pub url_scheme: Option<String>,
    /// Header logo, loaded opportunistically.
    #[serde(default)]
    pub logo_url: Option<String>,

    // --- source-specific extras ---
    /// Steam profile names.
    #[serde(default)]
    pub profiles: Vec<String>,
    /// GitHub repositories as `owner/repo`.
    #[serde(default)]
    pub repos: Vec<String>,
    /// Wikipedia `lang:username` pairs, comma separated. `"ENV"` reads `$WIKIPEDIA_USERNAMES`.
    #[serde(default)]
    pub usernames: Option<String>,
    /// Wikipedia `lang:token` pairs, comma separated. `"ENV"` reads `$WIKIPEDIA_TOKENS`.
    #[serde(default)]
    pub tokens: Option<String>,
    #[serde(default)]
    pub languages: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl SourceConfig {
    fn basic(id: &str, name: &str, endpoint: &str, icon: &str, refresh_hours: f64, url_scheme: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            endpoint: endpoint.to_string(),
            icon: icon.to_string(),
            refresh_hours,
            url_scheme: Some(url_scheme.to_string()),
            logo_url: None,
            profiles: Vec::new(),
            repos: Vec::new(),
            usernames: None,
            tokens: None,
            languages: None,
            limit: None,
        }
    }

    /// Refresh interval as a chrono duration (sub-second precision dropped).
    pub fn refresh_interval(&self) -> chrono::Duration {
        hours_to_duration(self.refresh_hours)
    }
}

fn default_source() -> String {
    "billboard".to_string()
}
fn default_api_base_url() -> String {
    "https://api.michi.onl".to_string()
}
fn default_refresh_hours() -> f64 {
    1.0
}
fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetConfig {
    #[serde(default = "default_source")]
    pub default_source: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Used for canvases that never resolved a source (e.g. unknown id).
    #[serde(default = "default_refresh_hours")]
    pub refresh_hours: f64,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub sizing: SizeProfiles,
    #[serde(default = "builtin_sources")]
    pub sources: BTreeMap<String, SourceConfig>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Built-in seed with all six sources.
fn builtin_sources() -> BTreeMap<String, SourceConfig> {
    let mut sources = BTreeMap::new();

    sources.insert(
        "billboard".to_string(),
        SourceConfig::basic(
            "billboard",
            "Billboard 200",
            "/billboard-200",
            "chart.bar.fill",
            24.0,
            "https://www.billboard.com/charts/billboard-200/",
        ),
    );
    sources.insert(
        "imdb".to_string(),
        SourceConfig::basic("imdb", "IMDb Popular", "/imdb", "tv.fill", 12.0, "imdb://"),
    );
    sources.insert(
        "steam".to_string(),
        SourceConfig {
            profiles: vec!["exampleuser1".to_string(), "exampleuser2".to_string()],
            logo_url: Some(STEAM_LOGO_URL.to_string()),
            ..SourceConfig::basic(
                "steam",
                "Steam Games",
                "/steam-profiles",
                "gamecontroller.fill",
                6.0,
                "steam://",
            )
        },
    );
    sources.insert(
        "hackernews".to_string(),
        SourceConfig::basic(
            "hackernews",
            "Hacker News",
            "/hackernews",
            "newspaper.fill",
            1.0,
            "https://news.ycombinator.com/",
        ),
    );
    sources.insert(
        "github".to_string(),
        SourceConfig {
            repos: vec![
                "anthropics/anthropic-sdk-python".to_string(),
                "fasthtml/fasthtml".to_string(),
            ],
            ..SourceConfig::basic(
                "github",
                "GitHub Releases",
                "/github-releases",
                "arrow.down.circle.fill",
                6.0,
                "https://github.com/",
            )
        },
    );
    sources.insert(
        "wikipedia".to_string(),
        SourceConfig {
            usernames: Some(String::new()),
            tokens: Some(String::new()),
            languages: Some("en,de".to_string()),
            limit: Some(10),
            ..SourceConfig::basic(
                "wikipedia",
                "Wikipedia Edits",
                "/wikipedia-watchlist",
                "book.fill",
                2.0,
                "https://wikipedia.org/",
            )
        },
    );

    sources
}

impl WidgetConfig {
    pub fn builtin() -> Self {
        Self {
            default_source: default_source(),
            api_base_url: default_api_base_url(),
            refresh_hours: default_refresh_hours(),
            request_timeout_secs: default_timeout_secs(),
            sizing: SizeProfiles::default(),
            sources: builtin_sources(),
        }
    }

    pub fn source(&self, id: &str) -> Option<&SourceConfig> {
        self.sources.get(id)
    }

    pub fn profile(&self, size: SizeClass) -> &SizeProfile {
        self.sizing.get(size)
    }

    pub fn refresh_interval(&self) -> chrono::Duration {
        hours_to_duration(self.refresh_hours)
    }

    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading widget config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg = parse_config(&content, ext.as_str())
            .with_context(|| format!("parsing widget config {}", path.display()))?;
        cfg.finish()
    }

    /// Load using env var + fallbacks (see module docs).
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            } else {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
        }
        let toml_p = PathBuf::from("config/widget.toml");
        if toml_p.exists() {
            return Self::load_from(&toml_p);
        }
        let json_p = PathBuf::from("config/widget.json");
        if json_p.exists() {
            return Self::load_from(&json_p);
        }
        Self::builtin().finish()
    }

    /// Fill ids from map keys and resolve `"ENV"` secret placeholders.
    fn finish(mut self) -> Result<Self> {
        for (key, src) in self.sources.iter_mut() {
            src.id = key.clone();
            src.usernames = resolve_env_placeholder(src.usernames.take(), ENV_WIKIPEDIA_USERNAMES)?;
            src.tokens = resolve_env_placeholder(src.tokens.take(), ENV_WIKIPEDIA_TOKENS)?;
        }
        self.api_base_url = self.api_base_url.trim_end_matches('/').to_string();
        Ok(self)
    }
}

fn resolve_env_placeholder(value: Option<String>, var: &str) -> Result<Option<String>> {
    match value {
        Some(v) if v.trim().eq_ignore_ascii_case("env") => std::env::var(var)
            .map(Some)
            .map_err(|_| anyhow!("Missing {var} env var")),
        other => Ok(other),
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<WidgetConfig> {
    if hint_ext == "json" {
        return serde_json::from_str(s).context("widget config json");
    }
    match toml::from_str::<WidgetConfig>(s) {
        Ok(cfg) => Ok(cfg),
        Err(toml_err) => serde_json::from_str(s)
            .map_err(|_| anyhow!("unsupported widget config format: {toml_err}")),
    }
}

/// Negative or NaN hours read as zero; huge values saturate at `Duration::MAX`.
fn hours_to_duration(hours: f64) -> chrono::Duration {
    let secs = (hours.max(0.0) * 3600.0) as i64;
    chrono::Duration::try_seconds(secs).unwrap_or(chrono::Duration::MAX)
}
