use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures::{stream::unfold, Stream};
use metrics::counter;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::backend::{BackendError, HotSearchBackend, HotSearchQuery};
use crate::config::AppConfig;
use crate::model::{HotSearchItem, Meta, QnaRequest, ScoredItem};
use crate::ranking::{self, MergeOptions};
use crate::source::{self, Source, SourceHeatProfile};
use crate::stream::{self, StreamBus, StreamEmitter, StreamError, SummaryStreamOptions};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub backend: Arc<dyn HotSearchBackend>,
    pub bus: StreamBus,
    pub emitter: StreamEmitter,
}

impl AppState {
    /// Wire a fresh bus + emitter around `backend` using `config`.
    pub fn new(config: AppConfig, backend: Arc<dyn HotSearchBackend>) -> Self {
        let bus = StreamBus::new(config.stream.bus_capacity);
        let emitter = StreamEmitter::new(bus.clone())
            .with_chunking(config.stream.chunk_size, config.stream.chunk_delay_ms);
        Self {
            config: Arc::new(config),
            backend,
            bus,
            emitter,
        }
    }

    fn merge_options(&self) -> MergeOptions {
        MergeOptions::default()
            .balance_head(self.config.ranking.balance_head)
            .debug(self.config.ranking.debug)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/score", post(score_item))
        .route("/ranking", post(merged_ranking))
        .route("/profiles", get(list_profiles))
        .route("/hot-search", get(hot_search_ranking))
        .route("/hot-search/refresh", post(refresh_ranking))
        .route("/summary/stream", post(stream_summary))
        .route("/summary/stream/{platform}", post(stream_platform_summary))
        .route("/qna/stream", post(stream_answer))
        .route("/stream/events", get(stream_events))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/* ----------------------------
Errors
---------------------------- */

pub enum ApiError {
    Backend(BackendError),
    Stream(StreamError),
    BadRequest(&'static str),
}

impl From<BackendError> for ApiError {
    fn from(e: BackendError) -> Self {
        ApiError::Backend(e)
    }
}

impl From<StreamError> for ApiError {
    fn from(e: StreamError) -> Self {
        ApiError::Stream(e)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::Backend(e) => {
                warn!(error = %e, "backend call failed");
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
            ApiError::Stream(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.to_string()),
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

/* ----------------------------
Ranking
---------------------------- */

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScoreResp {
    aggregate_score: f64,
}

async fn score_item(Json(item): Json<HotSearchItem>) -> Json<ScoreResp> {
    Json(ScoreResp {
        aggregate_score: ranking::score(&item),
    })
}

async fn merged_ranking(
    State(state): State<AppState>,
    Json(items): Json<Vec<HotSearchItem>>,
) -> Json<Vec<ScoredItem>> {
    counter!("ranking_passes_total").increment(1);
    Json(ranking::merged_ranking_with(&items, &state.merge_options()))
}

async fn list_profiles() -> Json<&'static [SourceHeatProfile]> {
    Json(source::profiles())
}

async fn hot_search_ranking(
    State(state): State<AppState>,
    Query(query): Query<HotSearchQuery>,
) -> Result<Json<Vec<ScoredItem>>, ApiError> {
    if query.platform == Some(Source::Unknown) {
        return Err(ApiError::BadRequest("unknown platform"));
    }
    let items = state.backend.hot_searches(&query).await?;
    counter!("ranking_passes_total").increment(1);
    Ok(Json(ranking::merged_ranking_with(&items, &state.merge_options())))
}

/// Re-scrape upstream, then merge the fresh listing.
async fn refresh_ranking(State(state): State<AppState>) -> Result<Json<Vec<ScoredItem>>, ApiError> {
    let items = state.backend.refresh_hot_searches().await?;
    counter!("ranking_passes_total").increment(1);
    Ok(Json(ranking::merged_ranking_with(&items, &state.merge_options())))
}

/* ----------------------------
Streams
---------------------------- */

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StreamStarted {
    stream_id: String,
}

const GLOBAL_SUMMARY_TITLE: &str = "全网热搜";

async fn stream_summary(State(state): State<AppState>) -> Result<Json<StreamStarted>, ApiError> {
    let summary = state.backend.global_summary().await?;
    let spawned = stream::push_summary_to_stream(
        &state.emitter,
        GLOBAL_SUMMARY_TITLE,
        &summary,
        SummaryStreamOptions::default(),
    )?;
    Ok(Json(StreamStarted {
        stream_id: spawned.stream_id,
    }))
}

async fn stream_platform_summary(
    State(state): State<AppState>,
    Path(platform): Path<String>,
) -> Result<Json<StreamStarted>, ApiError> {
    let source = Source::parse(&platform).ok_or(ApiError::BadRequest("unknown platform"))?;
    let summary = state.backend.platform_summary(source).await?;

    let mut meta = Meta::new();
    meta.insert("platform".into(), Value::from(source.as_str()));
    let spawned = stream::push_summary_to_stream(
        &state.emitter,
        source.display_name(),
        &summary,
        SummaryStreamOptions {
            meta: Some(meta),
            ..Default::default()
        },
    )?;
    Ok(Json(StreamStarted {
        stream_id: spawned.stream_id,
    }))
}

async fn stream_answer(
    State(state): State<AppState>,
    Json(req): Json<QnaRequest>,
) -> Result<Json<StreamStarted>, ApiError> {
    let spawned = stream::push_answer_to_stream(
        &state.emitter,
        Arc::clone(&state.backend),
        &req.question,
        req.platform_filter,
    )?
    .ok_or(ApiError::BadRequest("question must not be empty"))?;
    Ok(Json(StreamStarted {
        stream_id: spawned.stream_id,
    }))
}

/// Server-sent events of every stream on the bus; event name = event kind.
async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.bus.subscribe();
    let events = unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(ev) => {
                    let data = serde_json::to_string(&ev).unwrap_or_default();
                    let sse = Event::default().event(ev.kind()).data(data);
                    return Some((Ok(sse), rx));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(target: "stream", skipped, "sse subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });
    Sse::new(events).keep_alive(KeepAlive::default())
}
