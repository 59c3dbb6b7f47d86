// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api_client;
pub mod canvas;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod format;
pub mod image_cache;
pub mod registry;
pub mod sources;
pub mod telemetry;
pub mod transport;

// ---- Re-exports for stable public API ----
pub use crate::config::{SizeClass, WidgetConfig};
pub use crate::controller::{Outcome, RunReport, WidgetController};
pub use crate::error::{WidgetError, WidgetResult};
pub use crate::sources::{DataSource, FetchResult, NormalizedItem};
pub use crate::transport::{DynTransport, FixtureTransport, HttpTransport, Transport};
