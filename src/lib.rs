// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod backend;
pub mod config;
pub mod format;
pub mod telemetry;
pub mod model;
pub mod ranking;
pub mod source;
pub mod store;
pub mod stream;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::model::{HotSearchItem, ScoredItem};
pub use crate::ranking::{merged_ranking, score};
pub use crate::source::Source;

use std::sync::Arc;

use axum::Router;
use tracing::info;

use crate::backend::HttpBackend;
use crate::config::AppConfig;

/// Build the full HTTP app: backend client, stream bus and routes.
///
/// Does not install the metrics recorder; the binary merges `/metrics`.
pub fn app(config: AppConfig) -> anyhow::Result<Router> {
    let backend = HttpBackend::from_config(&config.backend)?;
    info!(
        base_url = backend.base_url(),
        balance_head = config.ranking.balance_head,
        chunk_size = config.stream.chunk_size,
        "hot search app configured"
    );
    let state = AppState::new(config, Arc::new(backend));
    Ok(router(state))
}
