// src/error.rs
//! Failure taxonomy for one widget run.
//!
//! Everything an adapter or the factory can fail with ends up here; the
//! controller is the only place these are caught and turned into the error
//! canvas (via `Display`).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WidgetError {
    /// Transport failure, non-2xx status, or a body that is not JSON.
    #[error("Failed to fetch from {endpoint}: {source}")]
    Fetch {
        endpoint: String,
        #[source]
        source: anyhow::Error,
    },

    /// The JSON parsed but lacks the top-level shape the adapter needs.
    #[error("Invalid {source_name} data structure: {reason}")]
    InvalidResponse {
        source_name: String,
        reason: String,
    },

    #[error("Unknown source: {0}")]
    UnknownSource(String),

    /// Config exists but no adapter is registered (config and registry out of sync).
    #[error("Source not implemented: {0}")]
    UnimplementedSource(String),
}

impl WidgetError {
    pub fn invalid(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}

pub type WidgetResult<T> = std::result::Result<T, WidgetError>;
