// src/api_client.rs
use metrics::{counter, histogram};
use serde_json::Value;

use crate::error::{WidgetError, WidgetResult};
use crate::telemetry::ensure_metrics_described;
use crate::transport::DynTransport;

/// Query parameters in request order; `None` values are dropped from the URL.
pub type Params<'a> = [(&'a str, Option<String>)];

/// Shared JSON client for every source: base URL + endpoint + query string.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: DynTransport,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, transport: DynTransport) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &DynTransport {
        &self.transport
    }

    /// `base + endpoint`, then `?k=v&...` for every present param. Keys and
    /// values are percent-encoded; no `?` if nothing remains.
    pub fn build_url(&self, endpoint: &str, params: &Params<'_>) -> String {
        let mut url = format!("{}{}", self.base_url, endpoint);
        let query = params
            .iter()
            .filter_map(|(k, v)| {
                v.as_ref()
                    .map(|v| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            })
            .collect::<Vec<_>>()
            .join("&");
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }
        url
    }

    /// One JSON request, no retry. Any transport or parse failure becomes
    /// [`WidgetError::Fetch`] tagged with the endpoint.
    pub async fn fetch(&self, endpoint: &str, params: &Params<'_>) -> WidgetResult<Value> {
        ensure_metrics_described();
        let url = self.build_url(endpoint, params);
        tracing::debug!(%url, "fetching");

        let t0 = std::time::Instant::now();
        let res = self.transport.get_json(&url).await;
        histogram!("widget_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        match res {
            Ok(v) => {
                tracing::debug!(endpoint, "fetch ok");
                Ok(v)
            }
            Err(e) => {
                tracing::warn!(error = ?e, endpoint, %url, "api fetch failed");
                counter!("widget_fetch_errors_total").increment(1);
                Err(WidgetError::Fetch {
                    endpoint: endpoint.to_string(),
                    source: e,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::FixtureTransport;
    use std::sync::Arc;

    fn client() -> ApiClient {
        ApiClient::new("https://api.example", Arc::new(FixtureTransport::new()))
    }

    #[test]
    fn url_without_params_has_no_question_mark() {
        assert_eq!(client().build_url("/imdb", &[]), "https://api.example/imdb");
        assert_eq!(
            client().build_url("/imdb", &[("limit", None)]),
            "https://api.example/imdb"
        );
    }

    #[test]
    fn url_drops_absent_and_encodes_present() {
        let url = client().build_url(
            "/wikipedia-watchlist",
            &[
                ("username", Some("en:Jane Doe".into())),
                ("token", None),
                ("lang", Some("en,de".into())),
                ("limit", Some("10".into())),
            ],
        );
        assert_eq!(
            url,
            "https://api.example/wikipedia-watchlist?username=en%3AJane%20Doe&lang=en%2Cde&limit=10"
        );
    }

    #[test]
    fn empty_string_values_are_kept() {
        let url = client().build_url("/w", &[("token", Some(String::new()))]);
        assert_eq!(url, "https://api.example/w?token=");
    }
}
