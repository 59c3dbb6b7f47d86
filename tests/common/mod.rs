// tests/common/mod.rs
#![allow(dead_code)]

use std::fs;
use std::io::Cursor;
use std::sync::Arc;

use universal_widget::api_client::ApiClient;
use universal_widget::image_cache::ImageCache;
use universal_widget::registry;
use universal_widget::{DataSource, DynTransport, FixtureTransport, WidgetConfig};

pub const BASE: &str = "https://api.test";

pub fn fixture(name: &str) -> String {
    fs::read_to_string(format!("tests/fixtures/{name}.json"))
        .unwrap_or_else(|_| panic!("missing tests/fixtures/{name}.json"))
}

/// Builtin config pointed at the fixture base URL.
pub fn config() -> WidgetConfig {
    let mut cfg = WidgetConfig::builtin();
    cfg.api_base_url = BASE.to_string();
    cfg
}

/// Transport serving every source's fixture under its builtin endpoint.
pub fn all_fixtures() -> FixtureTransport {
    let cfg = config();
    let mut t = FixtureTransport::new();
    for (id, src) in &cfg.sources {
        t = t
            .with_json_str(format!("{BASE}{}", src.endpoint), &fixture(id))
            .expect("fixture json");
    }
    t
}

pub fn adapter(id: &str, transport: &Arc<FixtureTransport>) -> Box<dyn DataSource> {
    let dyn_t: DynTransport = transport.clone();
    let cfg = config();
    registry::create(
        id,
        &cfg,
        ApiClient::new(BASE, dyn_t.clone()),
        Arc::new(ImageCache::new(dyn_t)),
    )
    .unwrap_or_else(|e| panic!("creating {id}: {e}"))
}

/// A small solid PNG, encoded with the same crate the cache decodes with.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 30, 30, 255]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}
