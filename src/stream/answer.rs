//! Q&A answer → stream adapter.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use super::bus::StreamError;
use super::emitter::StreamEmitter;
use super::events::EndPayload;
use super::summary::SpawnedStream;
use crate::backend::HotSearchBackend;
use crate::model::{Meta, QnaRequest};
use crate::source::Source;

/// User-facing message of the error event when an answer cannot be delivered.
pub const ANSWER_FAILED_MESSAGE: &str = "AI回答失败，请稍后重试";

/// Ask `question` on a background task and stream the answer.
///
/// A blank question opens no session and returns `Ok(None)`. Otherwise the
/// session ends with the related hot searches and `{sources}` meta, or fails
/// with `ANSWER_FAILED_MESSAGE` when the backend or publication fails.
pub fn push_answer_to_stream(
    emitter: &StreamEmitter,
    backend: Arc<dyn HotSearchBackend>,
    question: &str,
    platform: Option<Source>,
) -> Result<Option<SpawnedStream>, StreamError> {
    let question = question.trim();
    if question.is_empty() {
        return Ok(None);
    }

    let mut meta = Meta::new();
    meta.insert("source".into(), Value::from("QNA"));
    if let Some(p) = platform {
        meta.insert("platformFilter".into(), Value::from(p.as_str()));
    }
    let session = emitter.begin(question, Some(meta))?;
    let stream_id = session.id().to_string();
    let request = QnaRequest {
        question: question.to_string(),
        platform_filter: platform,
    };

    let handle = tokio::spawn(async move {
        let resp = match backend.ask(&request).await {
            Ok(r) => r,
            Err(e) => {
                warn!(target: "stream", error = %e, backend = backend.name(), "asking backend failed");
                let _ = session.fail(ANSWER_FAILED_MESSAGE);
                return;
            }
        };

        if let Err(e) = session.emit(&resp.answer).await {
            warn!(target: "stream", error = %e, "streaming answer failed");
            let _ = session.fail(ANSWER_FAILED_MESSAGE);
            return;
        }

        let meta = resp.sources.map(|sources| {
            let mut m = Meta::new();
            m.insert("sources".into(), Value::from(sources));
            m
        });
        let payload = EndPayload {
            related_hot_searches: resp.related_hot_searches,
            meta,
        };
        if let Err(e) = session.end(Some(payload)) {
            warn!(target: "stream", error = %e, "answer end not delivered");
        }
    });

    Ok(Some(SpawnedStream { stream_id, handle }))
}
