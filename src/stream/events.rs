// src/stream/events.rs
use serde::{Deserialize, Serialize};

use crate::model::{Meta, RelatedHotSearch};

/// One published event of a stream session. Serialized with a `type` tag
/// carrying the event kind (`stream-start`, `stream-chunk`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum StreamEvent {
    #[serde(rename = "stream-start", rename_all = "camelCase")]
    Start {
        stream_id: String,
        question: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        meta: Option<Meta>,
    },
    #[serde(rename = "stream-chunk", rename_all = "camelCase")]
    Chunk { stream_id: String, chunk: String },
    #[serde(rename = "stream-end", rename_all = "camelCase")]
    End {
        stream_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        related_hot_searches: Option<Vec<RelatedHotSearch>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        meta: Option<Meta>,
    },
    #[serde(rename = "stream-error", rename_all = "camelCase")]
    Error { stream_id: String, message: String },
}

impl StreamEvent {
    pub fn stream_id(&self) -> &str {
        match self {
            StreamEvent::Start { stream_id, .. }
            | StreamEvent::Chunk { stream_id, .. }
            | StreamEvent::End { stream_id, .. }
            | StreamEvent::Error { stream_id, .. } => stream_id,
        }
    }

    /// Event kind as published on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::Start { .. } => "stream-start",
            StreamEvent::Chunk { .. } => "stream-chunk",
            StreamEvent::End { .. } => "stream-end",
            StreamEvent::Error { .. } => "stream-error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::End { .. } | StreamEvent::Error { .. })
    }
}

/// Optional payload of the `stream-end` event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndPayload {
    pub related_hot_searches: Option<Vec<RelatedHotSearch>>,
    pub meta: Option<Meta>,
}
