// tests/common/mod.rs
//
// In-memory backend shared by the integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use hot_search_aggregator::backend::{BackendError, HotSearchBackend, HotSearchQuery};
use hot_search_aggregator::model::{
    AiSummary, CoreTopic, DataStatus, HotSearchItem, QnaRequest, QnaResponse, RelatedHotSearch,
};
use hot_search_aggregator::store::{AiState, StoreReader};
use hot_search_aggregator::Source;

/// Canned backend. `None` for summary/answer makes the call fail.
#[derive(Default)]
pub struct MockBackend {
    pub items: Vec<HotSearchItem>,
    pub summary: Option<AiSummary>,
    pub answer: Option<QnaResponse>,
    pub calls: AtomicUsize,
    pub last_question: Mutex<Option<QnaRequest>>,
    /// When set, every call records a snapshot of the store mid-flight.
    pub observer: Mutex<Option<StoreReader>>,
    pub observed: Mutex<Vec<AiState>>,
}

impl MockBackend {
    pub fn with_items(items: Vec<HotSearchItem>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    pub fn with_summary(summary: AiSummary) -> Self {
        Self {
            summary: Some(summary),
            ..Default::default()
        }
    }

    pub fn with_answer(answer: QnaResponse) -> Self {
        Self {
            answer: Some(answer),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reader) = self.observer.lock().as_ref() {
            self.observed.lock().push(reader.snapshot());
        }
    }
}

#[async_trait]
impl HotSearchBackend for MockBackend {
    async fn hot_searches(&self, query: &HotSearchQuery) -> Result<Vec<HotSearchItem>, BackendError> {
        self.touch();
        Ok(self
            .items
            .iter()
            .filter(|it| query.platform.map_or(true, |p| it.source == p))
            .cloned()
            .collect())
    }

    async fn refresh_hot_searches(&self) -> Result<Vec<HotSearchItem>, BackendError> {
        self.touch();
        Ok(self.items.clone())
    }

    async fn global_summary(&self) -> Result<AiSummary, BackendError> {
        self.touch();
        self.summary
            .clone()
            .ok_or_else(|| BackendError::Unavailable("mock summary".into()))
    }

    async fn platform_summary(&self, _source: Source) -> Result<AiSummary, BackendError> {
        self.global_summary().await
    }

    async fn ask(&self, request: &QnaRequest) -> Result<QnaResponse, BackendError> {
        self.touch();
        *self.last_question.lock() = Some(request.clone());
        self.answer
            .clone()
            .ok_or_else(|| BackendError::Unavailable("mock qna".into()))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

pub fn item(id: i64, source: Source, rank: i64, heat: i64) -> HotSearchItem {
    HotSearchItem::new(id, format!("{}-{rank}", source.as_str()), source)
        .with_rank(rank)
        .with_heat(heat)
}

/// `per_source` items for each known platform, ranks 1.. with decreasing heat.
pub fn four_platform_board(per_source: i64) -> Vec<HotSearchItem> {
    let mut out = Vec::new();
    for (s_idx, src) in Source::ALL.into_iter().enumerate() {
        let avg = src.profile().map_or(1_000_000.0, |p| p.avg_heat);
        for rank in 1..=per_source {
            let heat = (avg * 2.0 / rank as f64) as i64;
            out.push(item(s_idx as i64 * 1000 + rank, src, rank, heat));
        }
    }
    out
}

pub fn sample_summary() -> AiSummary {
    AiSummary {
        summary: "科技与体育话题领跑。".into(),
        core_topics: vec![CoreTopic {
            topic: "新品发布".into(),
            description: "多款手机同日亮相".into(),
            platforms: vec![Source::Weibo, Source::Douyin],
            heat_level: None,
        }],
        cross_platform_insights: vec!["微博与抖音同时登榜".into()],
        data_status: DataStatus {
            weibo: Some("正常".into()),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn sample_answer() -> QnaResponse {
    QnaResponse {
        answer: "发布会是今天最热的话题。".into(),
        sources: Some(vec!["WEIBO".into()]),
        related_hot_searches: Some(vec![RelatedHotSearch {
            title: "新品发布会".into(),
            platform: Source::Weibo,
            heat: Some(52_000_000),
            rank: Some(1),
            category: None,
            url: None,
            category_confidence: None,
        }]),
    }
}
