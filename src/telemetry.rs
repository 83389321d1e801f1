use axum::{extract::State, routing::get, Router};
use metrics::{describe_counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder and describe the series this crate emits.
    pub fn init(balance_head: usize) -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| anyhow::anyhow!("prometheus: install recorder: {e}"))?;

        describe_counter!("ranking_passes_total", "Merged ranking passes served.");
        describe_counter!("stream_sessions_total", "Stream sessions started.");
        describe_counter!("stream_chunks_total", "Stream chunk events published.");
        describe_counter!("stream_errors_total", "Stream sessions closed with an error.");
        gauge!("ranking_balance_head").set(balance_head as f64);

        Ok(Self { handle })
    }

    /// `/metrics` in the Prometheus text format.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/metrics", get(render))
            .with_state(self.handle.clone())
    }
}

async fn render(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}
