//! Hot Search Aggregator: Binary Entrypoint
//! Boots the Axum HTTP server with ranking routes, stream events and `/metrics`.

use hot_search_aggregator::{app, config::AppConfig, telemetry::Metrics};
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact tracing logs; RUST_LOG overrides the default filter.
/// `try_init` because the hosting runtime may already own the global subscriber.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("hot_search_aggregator=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = AppConfig::load()?;
    let metrics = Metrics::init(config.ranking.balance_head)?;
    let router = app(config)?.merge(metrics.router());

    Ok(router.into())
}
