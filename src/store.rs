//! store.rs: AI summary / Q&A state behind a single-writer handle.
//!
//! Every operation flips `loading` on, clears `error`, talks to the backend
//! and then records either the result or a user-facing error before turning
//! `loading` off again. Readers take snapshots at any time.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;

use crate::backend::HotSearchBackend;
use crate::model::{AiSummary, QnaRequest, QnaResponse};
use crate::source::Source;

pub const SUMMARY_ERROR: &str = "获取总结失败，请稍后重试";
pub const ANSWER_ERROR: &str = crate::stream::ANSWER_FAILED_MESSAGE;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AiState {
    pub summary: Option<AiSummary>,
    pub qna_response: Option<QnaResponse>,
    pub loading: bool,
    /// Empty when there is no error.
    pub error: String,
}

/// Read-only view of the store state; clone freely.
#[derive(Debug, Clone, Default)]
pub struct StoreReader {
    state: Arc<RwLock<AiState>>,
}

impl StoreReader {
    pub fn snapshot(&self) -> AiState {
        self.state.read().clone()
    }
}

pub struct AiStore {
    backend: Arc<dyn HotSearchBackend>,
    state: Arc<RwLock<AiState>>,
}

impl AiStore {
    pub fn new(backend: Arc<dyn HotSearchBackend>) -> Self {
        Self {
            backend,
            state: Arc::default(),
        }
    }

    pub fn reader(&self) -> StoreReader {
        StoreReader {
            state: Arc::clone(&self.state),
        }
    }

    pub fn snapshot(&self) -> AiState {
        self.state.read().clone()
    }

    fn begin_loading(&self) {
        let mut s = self.state.write();
        s.loading = true;
        s.error.clear();
    }

    /// Sets: loading → true, error cleared; then summary or (None + error); loading → false.
    pub async fn fetch_global_summary(&mut self) {
        self.begin_loading();
        let res = self.backend.global_summary().await;

        let mut s = self.state.write();
        match res {
            Ok(summary) => s.summary = Some(summary),
            Err(e) => {
                warn!(error = %e, "fetching global summary failed");
                s.summary = None;
                s.error = SUMMARY_ERROR.to_string();
            }
        }
        s.loading = false;
    }

    /// Blank questions are ignored (no state change).
    pub async fn ask_question(&mut self, question: &str, platform: Option<Source>) {
        if question.trim().is_empty() {
            return;
        }
        self.begin_loading();
        let req = QnaRequest {
            question: question.to_string(),
            platform_filter: platform,
        };
        let res = self.backend.ask(&req).await;

        let mut s = self.state.write();
        match res {
            Ok(r) => s.qna_response = Some(r),
            Err(e) => {
                warn!(error = %e, "asking question failed");
                s.qna_response = None;
                s.error = ANSWER_ERROR.to_string();
            }
        }
        s.loading = false;
    }

    /// Clears the Q&A response and the error; the summary is kept.
    pub fn reset(&mut self) {
        let mut s = self.state.write();
        s.qna_response = None;
        s.error.clear();
    }
}
