// src/backend/http.rs
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{BackendError, HotSearchBackend, HotSearchQuery};
use crate::config::BackendConfig;
use crate::model::{AiSummary, ApiResponse, HotSearchItem, QnaRequest, QnaResponse};
use crate::source::Source;

/// reqwest client for the backend's REST API.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    http: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let http = Client::builder()
            .user_agent("hot-search-aggregator/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(timeout)
            .build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn from_config(cfg: &BackendConfig) -> Result<Self, BackendError> {
        Self::new(cfg.base_url.clone(), Duration::from_secs(cfg.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send and unwrap the `{code, message, data}` envelope.
    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<Option<T>, BackendError> {
        let resp = req.send().await?.error_for_status()?;
        let env: ApiResponse<Option<T>> = resp.json().await?;
        debug!(target: "backend", code = env.code, "backend response");
        if env.code != 200 {
            return Err(BackendError::Status {
                code: env.code,
                message: env.message,
            });
        }
        Ok(env.data)
    }

    async fn list(&self, req: RequestBuilder) -> Result<Vec<HotSearchItem>, BackendError> {
        Ok(self.send::<Vec<HotSearchItem>>(req).await?.unwrap_or_default())
    }

    async fn summary(&self, path: &str) -> Result<AiSummary, BackendError> {
        self.send::<AiSummary>(self.http.get(self.url(path)))
            .await?
            .ok_or(BackendError::Empty)
    }
}

#[async_trait]
impl HotSearchBackend for HttpBackend {
    async fn hot_searches(&self, query: &HotSearchQuery) -> Result<Vec<HotSearchItem>, BackendError> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(p) = query.platform {
            params.push(("platform", p.as_str().to_string()));
        }
        if let Some(c) = query.category.as_deref().filter(|c| !c.is_empty()) {
            params.push(("category", c.to_string()));
        }
        let req = self.http.get(self.url("/api/hot-search")).query(&params);
        self.list(req).await
    }

    async fn refresh_hot_searches(&self) -> Result<Vec<HotSearchItem>, BackendError> {
        self.list(self.http.post(self.url("/api/hot-search/refresh")))
            .await
    }

    async fn global_summary(&self) -> Result<AiSummary, BackendError> {
        self.summary("/api/ai/summary/global").await
    }

    async fn platform_summary(&self, source: Source) -> Result<AiSummary, BackendError> {
        self.summary(&format!("/api/ai/summary/platform/{}", source.as_str()))
            .await
    }

    async fn ask(&self, request: &QnaRequest) -> Result<QnaResponse, BackendError> {
        let req = self.http.post(self.url("/api/ai/qna")).json(request);
        self.send::<QnaResponse>(req).await?.ok_or(BackendError::Empty)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
