// src/backend/mod.rs
//! Remote hot-search / AI backend, consumed as typed JSON.

pub mod http;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{AiSummary, HotSearchItem, QnaRequest, QnaResponse};
use crate::source::Source;

pub use http::HttpBackend;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend returned code {code}: {message}")]
    Status { code: i64, message: String },
    #[error("backend returned no data")]
    Empty,
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Optional filters of the hot-search listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct HotSearchQuery {
    pub platform: Option<Source>,
    pub category: Option<String>,
}

#[async_trait]
pub trait HotSearchBackend: Send + Sync {
    async fn hot_searches(&self, query: &HotSearchQuery) -> Result<Vec<HotSearchItem>, BackendError>;

    /// Ask the backend to re-scrape; returns the refreshed listing.
    async fn refresh_hot_searches(&self) -> Result<Vec<HotSearchItem>, BackendError>;

    async fn global_summary(&self) -> Result<AiSummary, BackendError>;

    async fn platform_summary(&self, source: Source) -> Result<AiSummary, BackendError>;

    async fn ask(&self, request: &QnaRequest) -> Result<QnaResponse, BackendError>;

    fn name(&self) -> &'static str;
}
