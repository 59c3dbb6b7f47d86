// src/image_cache.rs
//! URL → decoded image memo table, scoped to one widget run.
//!
//! Constructed by the controller and shared with the adapter through an
//! `Arc`; it dies with the run. No eviction and no expiry. Failed loads are
//! not stored, so a later `load` of the same URL tries the network again.

use anyhow::{Context, Result};
use futures::future::join_all;
use image::DynamicImage;
use metrics::counter;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::transport::DynTransport;

/// A fetched and decoded image. Serializes as its URL and pixel size; the
/// pixels stay in memory for the host.
#[derive(Debug, Clone, Serialize)]
pub struct WidgetImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
    #[serde(skip)]
    pub pixels: DynamicImage,
}

impl PartialEq for WidgetImage {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url && self.width == other.width && self.height == other.height
    }
}

pub struct ImageCache {
    transport: DynTransport,
    entries: Mutex<HashMap<String, Arc<WidgetImage>>>,
}

impl ImageCache {
    pub fn new(transport: DynTransport) -> Self {
        Self {
            transport,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// `None` for an empty URL or a failed fetch/decode; otherwise the cached
    /// or freshly loaded image.
    pub async fn load(&self, url: &str) -> Option<Arc<WidgetImage>> {
        if url.trim().is_empty() {
            return None;
        }
        if let Some(hit) = self.get(url) {
            counter!("image_cache_hits_total").increment(1);
            return Some(hit);
        }
        counter!("image_cache_misses_total").increment(1);

        match self.fetch_and_decode(url).await {
            Ok(img) => {
                let img = Arc::new(img);
                self.entries
                    .lock()
                    .expect("image cache mutex poisoned")
                    .insert(url.to_string(), Arc::clone(&img));
                Some(img)
            }
            Err(e) => {
                tracing::warn!(error = ?e, %url, "failed to load image");
                None
            }
        }
    }

    /// Resolve several URLs jointly; output order matches input order.
    /// Each distinct URL is requested once even when it repeats.
    pub async fn load_all(&self, urls: &[Option<String>]) -> Vec<Option<Arc<WidgetImage>>> {
        let mut unique: Vec<&str> = Vec::new();
        for url in urls.iter().flatten() {
            if !unique.contains(&url.as_str()) {
                unique.push(url);
            }
        }
        let loaded = join_all(unique.iter().map(|u| self.load(*u))).await;
        let by_url: HashMap<&str, Option<Arc<WidgetImage>>> = unique.into_iter().zip(loaded).collect();

        urls.iter()
            .map(|u| u.as_deref().and_then(|u| by_url.get(u).cloned().flatten()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("image cache mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, url: &str) -> Option<Arc<WidgetImage>> {
        self.entries
            .lock()
            .expect("image cache mutex poisoned")
            .get(url)
            .cloned()
    }

    async fn fetch_and_decode(&self, url: &str) -> Result<WidgetImage> {
        let bytes = self.transport.get_bytes(url).await?;
        let pixels = image::load_from_memory(&bytes).context("decoding image")?;
        Ok(WidgetImage {
            url: url.to_string(),
            width: pixels.width(),
            height: pixels.height(),
            pixels,
        })
    }
}
