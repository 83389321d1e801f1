//! Stream emitter: simulated incremental delivery of generated text.
//!
//! A session is opened with `begin` (publishes `stream-start`), fed with
//! `emit` (one `stream-chunk` per slice, cooperative sleep in between) and
//! closed by exactly one of `end` / `fail`. Both consume the session, so a
//! second terminal event or a chunk after the terminal cannot be expressed.
//! A session dropped without a delivered terminal publishes `stream-error`
//! on drop.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use metrics::counter;
use rand::Rng;
use tracing::{info, warn};

use super::bus::{StreamError, StreamSink};
use super::events::{EndPayload, StreamEvent};
use crate::model::Meta;

pub const DEFAULT_CHUNK_SIZE: usize = 18;
pub const DEFAULT_CHUNK_DELAY_MS: u64 = 30;

/// Message of the error event published when a session is dropped unfinished.
pub const INTERRUPTED_MESSAGE: &str = "stream interrupted";

/// `<prefix>-<unix millis>-<6 hex>`.
pub fn new_stream_id(prefix: &str) -> String {
    let suffix: u32 = rand::rng().random_range(0..0x0100_0000);
    format!("{}-{}-{:06x}", prefix, Utc::now().timestamp_millis(), suffix)
}

/// Consecutive non-overlapping slices of `chunk_size` characters; the last
/// one may be shorter. A size of 0 is treated as 1.
pub fn split_chunks(text: &str, chunk_size: usize) -> Vec<&str> {
    let size = chunk_size.max(1);
    let mut out = Vec::new();
    let mut start = 0;
    for (n, (idx, _)) in text.char_indices().enumerate() {
        if n > 0 && n % size == 0 {
            out.push(&text[start..idx]);
            start = idx;
        }
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}

/// Opens stream sessions on a sink. Cheap to clone.
#[derive(Clone)]
pub struct StreamEmitter {
    sink: Arc<dyn StreamSink>,
    chunk_size: usize,
    chunk_delay: Duration,
}

impl StreamEmitter {
    pub fn new<S: StreamSink>(sink: S) -> Self {
        Self::from_arc(Arc::new(sink))
    }

    pub fn from_arc(sink: Arc<dyn StreamSink>) -> Self {
        Self {
            sink,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_delay: Duration::from_millis(DEFAULT_CHUNK_DELAY_MS),
        }
    }

    /// Default chunking used by `StreamSession::emit`.
    pub fn with_chunking(mut self, chunk_size: usize, delay_ms: u64) -> Self {
        self.chunk_size = chunk_size.max(1);
        self.chunk_delay = Duration::from_millis(delay_ms);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_delay(&self) -> Duration {
        self.chunk_delay
    }

    /// Open a session with the default `stream` id prefix.
    pub fn begin(&self, question: &str, meta: Option<Meta>) -> Result<StreamSession, StreamError> {
        self.begin_with_prefix("stream", question, meta)
    }

    pub fn begin_with_prefix(
        &self,
        prefix: &str,
        question: &str,
        meta: Option<Meta>,
    ) -> Result<StreamSession, StreamError> {
        let stream_id = new_stream_id(prefix);
        self.sink.publish(StreamEvent::Start {
            stream_id: stream_id.clone(),
            question: question.to_string(),
            meta,
        })?;
        counter!("stream_sessions_total").increment(1);
        info!(target: "stream", %stream_id, "stream started");

        Ok(StreamSession {
            stream_id,
            sink: Arc::clone(&self.sink),
            chunk_size: self.chunk_size,
            chunk_delay: self.chunk_delay,
            finished: false,
        })
    }
}

/// One open stream. Not `Clone`: exactly one owner may terminate it.
pub struct StreamSession {
    stream_id: String,
    sink: Arc<dyn StreamSink>,
    chunk_size: usize,
    chunk_delay: Duration,
    finished: bool,
}

impl StreamSession {
    pub fn id(&self) -> &str {
        &self.stream_id
    }

    /// Emit `text` with the emitter's default chunking. Returns the number of
    /// chunks published.
    pub async fn emit(&self, text: &str) -> Result<usize, StreamError> {
        self.emit_with(text, self.chunk_size, self.chunk_delay).await
    }

    /// Emit `text` in `chunk_size`-character slices with `delay` between
    /// consecutive publications. Stops at the first publication failure.
    pub async fn emit_with(
        &self,
        text: &str,
        chunk_size: usize,
        delay: Duration,
    ) -> Result<usize, StreamError> {
        let chunks = split_chunks(text, chunk_size);
        for (i, chunk) in chunks.iter().enumerate() {
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            self.sink.publish(StreamEvent::Chunk {
                stream_id: self.stream_id.clone(),
                chunk: (*chunk).to_string(),
            })?;
            counter!("stream_chunks_total").increment(1);
        }
        Ok(chunks.len())
    }

    /// Publish `stream-end`. If the sink rejects it, the session still closes
    /// through the drop guard with an interrupted error.
    pub fn end(mut self, payload: Option<EndPayload>) -> Result<(), StreamError> {
        let payload = payload.unwrap_or_default();
        let res = self.sink.publish(StreamEvent::End {
            stream_id: self.stream_id.clone(),
            related_hot_searches: payload.related_hot_searches,
            meta: payload.meta,
        });
        self.finished = res.is_ok();
        if self.finished {
            info!(target: "stream", stream_id = %self.stream_id, "stream finished");
        }
        res
    }

    /// Publish `stream-error` with a user-facing message.
    pub fn fail(mut self, message: &str) -> Result<(), StreamError> {
        warn!(target: "stream", stream_id = %self.stream_id, reason = message, "stream failed");
        let res = self.sink.publish(StreamEvent::Error {
            stream_id: self.stream_id.clone(),
            message: message.to_string(),
        });
        self.finished = res.is_ok();
        if self.finished {
            counter!("stream_errors_total").increment(1);
        }
        res
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        counter!("stream_errors_total").increment(1);
        warn!(target: "stream", stream_id = %self.stream_id, "stream dropped without terminal event");
        let _ = self.sink.publish(StreamEvent::Error {
            stream_id: self.stream_id.clone(),
            message: INTERRUPTED_MESSAGE.to_string(),
        });
    }
}
