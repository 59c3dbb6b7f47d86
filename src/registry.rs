// src/registry.rs
//! Source identifier → adapter constructor.

use std::sync::Arc;

use crate::api_client::ApiClient;
use crate::config::WidgetConfig;
use crate::error::{WidgetError, WidgetResult};
use crate::image_cache::ImageCache;
use crate::sources::billboard::BillboardSource;
use crate::sources::github::GitHubSource;
use crate::sources::hackernews::HackerNewsSource;
use crate::sources::imdb::ImdbSource;
use crate::sources::steam::SteamSource;
use crate::sources::wikipedia::WikipediaSource;
use crate::sources::{DataSource, SourceContext};

type Constructor = fn(SourceContext) -> Box<dyn DataSource>;

fn billboard(ctx: SourceContext) -> Box<dyn DataSource> {
    Box::new(BillboardSource::new(ctx))
}
fn imdb(ctx: SourceContext) -> Box<dyn DataSource> {
    Box::new(ImdbSource::new(ctx))
}
fn steam(ctx: SourceContext) -> Box<dyn DataSource> {
    Box::new(SteamSource::new(ctx))
}
fn hackernews(ctx: SourceContext) -> Box<dyn DataSource> {
    Box::new(HackerNewsSource::new(ctx))
}
fn github(ctx: SourceContext) -> Box<dyn DataSource> {
    Box::new(GitHubSource::new(ctx))
}
fn wikipedia(ctx: SourceContext) -> Box<dyn DataSource> {
    Box::new(WikipediaSource::new(ctx))
}

const REGISTRY: &[(&str, Constructor)] = &[
    ("billboard", billboard),
    ("imdb", imdb),
    ("steam", steam),
    ("hackernews", hackernews),
    ("github", github),
    ("wikipedia", wikipedia),
];

/// Identifiers that have an adapter, in registry order.
pub fn registered_sources() -> Vec<&'static str> {
    REGISTRY.iter().map(|(id, _)| *id).collect()
}

/// Build the adapter for `id`. The config decides whether the source exists;
/// the registry decides whether it can be built.
pub fn create(
    id: &str,
    config: &WidgetConfig,
    api: ApiClient,
    images: Arc<ImageCache>,
) -> WidgetResult<Box<dyn DataSource>> {
    let source = config
        .source(id)
        .ok_or_else(|| WidgetError::UnknownSource(id.to_string()))?;
    let (_, construct) = REGISTRY
        .iter()
        .find(|(key, _)| *key == id)
        .ok_or_else(|| WidgetError::UnimplementedSource(id.to_string()))?;

    Ok(construct(SourceContext {
        config: source.clone(),
        sizing: config.sizing.clone(),
        api,
        images,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{DynTransport, FixtureTransport};

    fn deps() -> (ApiClient, Arc<ImageCache>) {
        let t: DynTransport = Arc::new(FixtureTransport::default());
        (
            ApiClient::new("https://api.test", t.clone()),
            Arc::new(ImageCache::new(t)),
        )
    }

    #[test]
    fn every_builtin_source_is_registered() {
        let cfg = WidgetConfig::builtin();
        for id in cfg.sources.keys() {
            let (api, images) = deps();
            let src = create(id, &cfg, api, images).unwrap();
            assert_eq!(&src.config().id, id);
        }
        assert_eq!(registered_sources().len(), cfg.sources.len());
    }

    #[test]
    fn unknown_and_unimplemented_are_distinct() {
        let mut cfg = WidgetConfig::builtin();
        let (api, images) = deps();
        let err = create("spotify", &cfg, api, images).err().unwrap();
        assert!(matches!(err, WidgetError::UnknownSource(ref id) if id == "spotify"));

        let mut extra = cfg.sources["hackernews"].clone();
        extra.id = "lobsters".into();
        cfg.sources.insert("lobsters".into(), extra);
        let (api, images) = deps();
        let err = create("lobsters", &cfg, api, images).err().unwrap();
        assert!(matches!(err, WidgetError::UnimplementedSource(ref id) if id == "lobsters"));
        assert_eq!(err.to_string(), "Source not implemented: lobsters");
    }
}
