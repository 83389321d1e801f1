//! model.rs: shapes consumed from the backend and handed to presentation.
//!
//! All wire types use camelCase. Numeric fields on `HotSearchItem` are read
//! leniently: numbers, numeric strings and `null` are accepted, anything else
//! becomes `None` so scoring can fall back to its documented defaults.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::source::Source;

/// Free-form metadata attached to stream events.
pub type Meta = Map<String, Value>;

/// One hot-search row as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotSearchItem {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "platform", alias = "source")]
    pub source: Source,
    /// Raw platform heat. `None`/0 means "unknown".
    #[serde(default, deserialize_with = "lenient_int")]
    pub heat: Option<i64>,
    /// Position inside the platform's own list, 1 = top.
    #[serde(default, deserialize_with = "lenient_int")]
    pub rank: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degraded_reason: Option<String>,
    /// ISO-8601 capture time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl HotSearchItem {
    /// Minimal constructor; optional wire fields start empty.
    pub fn new(id: i64, title: impl Into<String>, source: Source) -> Self {
        Self {
            id,
            title: title.into(),
            source,
            heat: None,
            rank: None,
            url: None,
            category: None,
            category_confidence: None,
            actual_source: None,
            degraded_reason: None,
            captured_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_heat(mut self, heat: i64) -> Self {
        self.heat = Some(heat);
        self
    }

    pub fn with_rank(mut self, rank: i64) -> Self {
        self.rank = Some(rank);
        self
    }

    pub fn captured_at(mut self, ts: impl Into<String>) -> Self {
        self.captured_at = Some(ts.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// An item together with the aggregate score of one ranking pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredItem {
    #[serde(flatten)]
    pub item: HotSearchItem,
    pub aggregate_score: f64,
}

/* ----------------------------
AI summary
---------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TopicHeat {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreTopic {
    pub topic: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub platforms: Vec<Source>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heat_level: Option<TopicHeat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopItem {
    pub rank: i64,
    pub title: String,
    #[serde(default)]
    pub heat_value: i64,
    #[serde(default)]
    pub trend: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformAnalysisItem {
    #[serde(default)]
    pub characteristic: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub top_items: Vec<TopItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weibo: Option<PlatformAnalysisItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toutiao: Option<PlatformAnalysisItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bilibili: Option<PlatformAnalysisItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub douyin: Option<PlatformAnalysisItem>,
}

/// Per-platform data status lines. Field order is the display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataStatus {
    #[serde(default)]
    pub weibo: Option<String>,
    #[serde(default)]
    pub toutiao: Option<String>,
    #[serde(default)]
    pub bilibili: Option<String>,
    #[serde(default)]
    pub douyin: Option<String>,
}

impl DataStatus {
    /// `(source, status)` pairs in display order, including empty ones.
    pub fn entries(&self) -> [(Source, Option<&str>); 4] {
        [
            (Source::Weibo, self.weibo.as_deref()),
            (Source::Toutiao, self.toutiao.as_deref()),
            (Source::Bilibili, self.bilibili.as_deref()),
            (Source::Douyin, self.douyin.as_deref()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSummary {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub core_topics: Vec<CoreTopic>,
    #[serde(default)]
    pub platform_analysis: PlatformAnalysis,
    #[serde(default)]
    pub cross_platform_insights: Vec<String>,
    #[serde(default)]
    pub data_status: DataStatus,
}

/* ----------------------------
Q&A
---------------------------- */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QnaRequest {
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_filter: Option<Source>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedHotSearch {
    pub title: String,
    pub platform: Source,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_confidence: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QnaResponse {
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_hot_searches: Option<Vec<RelatedHotSearch>>,
}

/// Pre-normalized response envelope of the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: T,
}

/// Accept integers, floats (truncated), numeric strings and null.
fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;
    Ok(match v {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn item_reads_backend_shape() {
        let v = json!({
            "id": 7,
            "title": "台风登陆",
            "platform": "WEIBO",
            "heat": 31000000,
            "rank": 2,
            "url": "https://s.weibo.com/x",
            "category": "society",
            "categoryConfidence": 0.9,
            "actualSource": "weibo-api",
            "degradedReason": null,
            "capturedAt": "2025-09-01T08:00:00Z",
            "createdAt": "2025-09-01T08:00:00Z",
            "updatedAt": "2025-09-01T08:00:00Z"
        });
        let it: HotSearchItem = serde_json::from_value(v).unwrap();
        assert_eq!(it.source, Source::Weibo);
        assert_eq!(it.heat, Some(31_000_000));
        assert_eq!(it.rank, Some(2));
        assert_eq!(it.captured_at.as_deref(), Some("2025-09-01T08:00:00Z"));
    }

    #[test]
    fn malformed_numbers_become_none() {
        let v = json!({ "id": 1, "title": "x", "platform": "DOUYIN", "heat": "n/a", "rank": null });
        let it: HotSearchItem = serde_json::from_value(v).unwrap();
        assert_eq!(it.heat, None);
        assert_eq!(it.rank, None);

        let v = json!({ "id": 2, "title": "y", "platform": "DOUYIN", "heat": "1200", "rank": 3.0 });
        let it: HotSearchItem = serde_json::from_value(v).unwrap();
        assert_eq!(it.heat, Some(1200));
        assert_eq!(it.rank, Some(3));
    }

    #[test]
    fn scored_item_flattens() {
        let s = ScoredItem {
            item: HotSearchItem::new(1, "t", Source::Toutiao).with_rank(1),
            aggregate_score: 150.5,
        };
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["platform"], json!("TOUTIAO"));
        assert_eq!(v["rank"], json!(1));
        assert!((v["aggregateScore"].as_f64().unwrap() - 150.5).abs() < 1e-9);
    }

    #[test]
    fn summary_tolerates_missing_sections() {
        let s: AiSummary = serde_json::from_value(json!({ "summary": "整体平稳" })).unwrap();
        assert!(s.core_topics.is_empty());
        assert!(s.data_status.weibo.is_none());
    }
}
