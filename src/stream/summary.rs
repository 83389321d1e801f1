//! Summary → stream adapter.
//!
//! Flattens a structured `AiSummary` into readable text and streams it through
//! a `StreamEmitter` on a background task that always closes the session.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::warn;

use super::bus::StreamError;
use super::emitter::{StreamEmitter, StreamSession};
use crate::model::{AiSummary, Meta};

/// User-facing message of the error event when a summary cannot be delivered.
pub const SUMMARY_FAILED_MESSAGE: &str = "AI总结发送失败，请稍后重试";

static RE_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"[•·]\s*").expect("bullet regex"));
static RE_BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("blank-run regex"));

/// Background delivery of one stream.
#[derive(Debug)]
pub struct SpawnedStream {
    pub stream_id: String,
    pub handle: JoinHandle<()>,
}

#[derive(Default)]
pub struct SummaryStreamOptions {
    /// Reuse an already opened session instead of starting a new one.
    pub session: Option<StreamSession>,
    /// Extra metadata merged over `{source: "SUMMARY"}`.
    pub meta: Option<Meta>,
    pub chunk_size: Option<usize>,
    pub chunk_delay_ms: Option<u64>,
}

fn normalize_bullets(text: &str) -> String {
    RE_BULLET.replace_all(text, "\n- ").into_owned()
}

/// Render a summary as the text shown in the Q&A panel.
pub fn build_summary_answer(title: &str, summary: &AiSummary) -> String {
    let mut lines: Vec<String> = vec![format!("【{title}】")];

    fn section(lines: &mut Vec<String>, heading: &str) {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(heading.to_string());
    }

    if !summary.summary.is_empty() {
        section(&mut lines, "全局分析：");
        lines.push(normalize_bullets(summary.summary.trim()));
    }

    if !summary.core_topics.is_empty() {
        section(&mut lines, "核心话题：");
        for (i, topic) in summary.core_topics.iter().enumerate() {
            let desc = normalize_bullets(&topic.description);
            lines.push(format!("{}. {}：{}", i + 1, topic.topic, desc));
        }
    }

    let insights: Vec<&String> = summary
        .cross_platform_insights
        .iter()
        .filter(|s| !s.is_empty())
        .collect();
    if !insights.is_empty() {
        section(&mut lines, "跨平台洞察：");
        for insight in insights {
            lines.push(format!("- {}", normalize_bullets(insight)));
        }
    }

    let statuses: Vec<_> = summary
        .data_status
        .entries()
        .into_iter()
        .filter_map(|(src, status)| status.filter(|s| !s.is_empty()).map(|s| (src, s)))
        .collect();
    if !statuses.is_empty() {
        section(&mut lines, "数据状态：");
        for (src, status) in statuses {
            lines.push(format!("{}：{}", src.display_name(), normalize_bullets(status)));
        }
    }

    let joined = lines.join("\n");
    RE_BLANK_RUN.replace_all(&joined, "\n\n").trim().to_string()
}

/// Open a summary session: question `title（AI总结）`, meta `{source: "SUMMARY", ..extra}`.
pub fn start_summary_stream(
    emitter: &StreamEmitter,
    title: &str,
    extra: Option<Meta>,
) -> Result<StreamSession, StreamError> {
    let mut meta = Meta::new();
    meta.insert("source".into(), Value::from("SUMMARY"));
    if let Some(extra) = extra {
        meta.extend(extra);
    }
    emitter.begin_with_prefix("summary", &format!("{title}（AI总结）"), Some(meta))
}

/// Stream `summary` on a background task. The task ends the session after the
/// last chunk or fails it with `SUMMARY_FAILED_MESSAGE`.
pub fn push_summary_to_stream(
    emitter: &StreamEmitter,
    title: &str,
    summary: &AiSummary,
    opts: SummaryStreamOptions,
) -> Result<SpawnedStream, StreamError> {
    let session = match opts.session {
        Some(s) => s,
        None => start_summary_stream(emitter, title, opts.meta)?,
    };
    let stream_id = session.id().to_string();
    let text = build_summary_answer(title, summary);
    let chunk_size = opts.chunk_size.unwrap_or_else(|| emitter.chunk_size());
    let delay = opts
        .chunk_delay_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| emitter.chunk_delay());

    let handle = tokio::spawn(async move {
        match session.emit_with(&text, chunk_size, delay).await {
            Ok(_) => {
                if let Err(e) = session.end(None) {
                    warn!(target: "stream", error = %e, "summary end not delivered");
                }
            }
            Err(e) => {
                warn!(target: "stream", error = %e, "streaming summary failed");
                let _ = session.fail(SUMMARY_FAILED_MESSAGE);
            }
        }
    });

    Ok(SpawnedStream { stream_id, handle })
}
