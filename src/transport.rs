// src/transport.rs
//! The one place bytes come over the wire: JSON bodies for the API client,
//! raw bytes for the image cache.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url` and parse the body as JSON.
    async fn get_json(&self, url: &str) -> Result<Value>;
    /// GET `url` and return the raw body.
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

pub type DynTransport = Arc<dyn Transport>;

/// reqwest-backed transport. Single attempt, no retry.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("universal-widget/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building http client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, url: &str) -> Result<Value> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .context("http get()")?
            .error_for_status()
            .context("http non-2xx")?;
        let body = resp.text().await.context("http .text()")?;
        serde_json::from_str(&body).context("response is not JSON")
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .context("http get()")?
            .error_for_status()
            .context("http non-2xx")?;
        let bytes = resp.bytes().await.context("http .bytes()")?;
        Ok(bytes.to_vec())
    }
}

// --- Test helper ---

#[derive(Debug, Clone)]
enum Canned {
    Json(Value),
    Bytes(Vec<u8>),
    Fail(String),
}

/// In-memory transport serving canned responses.
///
/// Lookup tries the exact URL first, then the URL with its query string
/// stripped, so fixtures can be registered either way. Every request is
/// recorded for call-count assertions.
#[derive(Default)]
pub struct FixtureTransport {
    routes: Mutex<HashMap<String, Canned>>,
    pub calls: Mutex<Vec<String>>,
}

impl FixtureTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(self, url: impl Into<String>, body: Value) -> Self {
        self.insert(url.into(), Canned::Json(body));
        self
    }

    /// Register a JSON fixture from its text form (e.g. a file under `tests/fixtures`).
    pub fn with_json_str(self, url: impl Into<String>, body: &str) -> Result<Self> {
        let v: Value = serde_json::from_str(body).context("parsing fixture json")?;
        Ok(self.with_json(url, v))
    }

    pub fn with_bytes(self, url: impl Into<String>, body: Vec<u8>) -> Self {
        self.insert(url.into(), Canned::Bytes(body));
        self
    }

    pub fn with_failure(self, url: impl Into<String>, message: impl Into<String>) -> Self {
        self.insert(url.into(), Canned::Fail(message.into()));
        self
    }

    /// Replace or add a route after construction.
    pub fn set_bytes(&self, url: impl Into<String>, body: Vec<u8>) {
        self.insert(url.into(), Canned::Bytes(body));
    }

    pub fn call_count(&self, url: &str) -> usize {
        self.calls
            .lock()
            .expect("fixture calls mutex poisoned")
            .iter()
            .filter(|u| u.as_str() == url)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().expect("fixture calls mutex poisoned").len()
    }

    fn insert(&self, url: String, canned: Canned) {
        self.routes
            .lock()
            .expect("fixture routes mutex poisoned")
            .insert(url, canned);
    }

    fn lookup(&self, url: &str) -> Result<Canned> {
        self.calls
            .lock()
            .expect("fixture calls mutex poisoned")
            .push(url.to_string());
        let routes = self.routes.lock().expect("fixture routes mutex poisoned");
        let bare = url.split('?').next().unwrap_or(url);
        routes
            .get(url)
            .or_else(|| routes.get(bare))
            .cloned()
            .ok_or_else(|| anyhow!("no fixture for {url}"))
    }
}

#[async_trait]
impl Transport for FixtureTransport {
    async fn get_json(&self, url: &str) -> Result<Value> {
        match self.lookup(url)? {
            Canned::Json(v) => Ok(v),
            Canned::Bytes(b) => serde_json::from_slice(&b).context("response is not JSON"),
            Canned::Fail(msg) => Err(anyhow!(msg)),
        }
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        match self.lookup(url)? {
            Canned::Bytes(b) => Ok(b),
            Canned::Json(v) => Ok(serde_json::to_vec(&v)?),
            Canned::Fail(msg) => Err(anyhow!(msg)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn fixture_matches_exact_then_bare_url() {
        let t = FixtureTransport::new()
            .with_json("http://x/a?q=1", json!({"exact": true}))
            .with_json("http://x/a", json!({"exact": false}));

        let v = t.get_json("http://x/a?q=1").await.unwrap();
        assert_eq!(v["exact"], true);
        let v = t.get_json("http://x/a?q=2").await.unwrap();
        assert_eq!(v["exact"], false);
        assert_eq!(t.total_calls(), 2);
    }

    #[tokio::test]
    async fn fixture_non_json_bytes_fail_as_json() {
        let t = FixtureTransport::new().with_bytes("http://x/html", b"<html>".to_vec());
        assert!(t.get_json("http://x/html").await.is_err());
        assert!(t.get_json("http://x/missing").await.is_err());
    }
}
