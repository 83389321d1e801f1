// tests/stream_adapters.rs
//
// Summary and Q&A adapters end to end over the broadcast bus.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::{broadcast, mpsc};

use hot_search_aggregator::stream::{
    build_summary_answer, push_answer_to_stream, push_summary_to_stream, start_summary_stream,
    StreamBus, StreamEmitter, StreamError, StreamEvent, StreamSink, SummaryStreamOptions,
    ANSWER_FAILED_MESSAGE, SUMMARY_FAILED_MESSAGE,
};
use hot_search_aggregator::model::AiSummary;
use hot_search_aggregator::Source;

use common::{sample_answer, sample_summary, MockBackend};

fn bus_emitter() -> (StreamEmitter, broadcast::Receiver<StreamEvent>) {
    let bus = StreamBus::new(256);
    let rx = bus.subscribe();
    (StreamEmitter::new(bus).with_chunking(6, 0), rx)
}

/// Forwards to an mpsc channel; rejects every chunk after the first `ok_chunks`.
struct ChunkLimitSink {
    tx: mpsc::UnboundedSender<StreamEvent>,
    ok_chunks: usize,
    seen: AtomicUsize,
}

impl StreamSink for ChunkLimitSink {
    fn publish(&self, event: StreamEvent) -> Result<(), StreamError> {
        if matches!(event, StreamEvent::Chunk { .. })
            && self.seen.fetch_add(1, Ordering::SeqCst) >= self.ok_chunks
        {
            return Err(StreamError::Publish("chunk rejected".into()));
        }
        self.tx.send(event).map_err(|_| StreamError::Closed)
    }
}

fn limited_emitter(ok_chunks: usize) -> (StreamEmitter, mpsc::UnboundedReceiver<StreamEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let sink = ChunkLimitSink {
        tx,
        ok_chunks,
        seen: AtomicUsize::new(0),
    };
    (StreamEmitter::new(sink).with_chunking(2, 0), rx)
}

fn drain_mpsc(rx: &mut mpsc::UnboundedReceiver<StreamEvent>) -> Vec<StreamEvent> {
    let mut out = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        out.push(ev);
    }
    out
}

fn drain(rx: &mut broadcast::Receiver<StreamEvent>) -> Vec<StreamEvent> {
    let mut out = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        out.push(ev);
    }
    out
}

fn joined_chunks(events: &[StreamEvent]) -> String {
    events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::Chunk { chunk, .. } => Some(chunk.as_str()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn summary_streams_the_rendered_text() {
    let (emitter, mut rx) = bus_emitter();
    let summary = sample_summary();

    let mut extra = serde_json::Map::new();
    extra.insert("scope".into(), json!("global"));
    let spawned = push_summary_to_stream(
        &emitter,
        "全网热搜",
        &summary,
        SummaryStreamOptions {
            meta: Some(extra),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(spawned.stream_id.starts_with("summary-"));
    spawned.handle.await.unwrap();

    let events = drain(&mut rx);
    match events.first() {
        Some(StreamEvent::Start { question, meta, .. }) => {
            assert_eq!(question, "全网热搜（AI总结）");
            let meta = meta.as_ref().unwrap();
            assert_eq!(meta.get("source"), Some(&Value::from("SUMMARY")));
            assert_eq!(meta.get("scope"), Some(&Value::from("global")));
        }
        other => panic!("expected start, got {other:?}"),
    }
    assert_eq!(joined_chunks(&events), build_summary_answer("全网热搜", &summary));
    assert_eq!(events.last().map(StreamEvent::kind), Some("stream-end"));
    assert!(events.iter().all(|e| e.stream_id() == spawned.stream_id));
}

#[tokio::test]
async fn summary_can_reuse_an_open_session() {
    let (emitter, mut rx) = bus_emitter();
    let session = start_summary_stream(&emitter, "微博", None).unwrap();
    let id = session.id().to_string();

    let spawned = push_summary_to_stream(
        &emitter,
        "微博",
        &sample_summary(),
        SummaryStreamOptions {
            session: Some(session),
            chunk_size: Some(1000),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(spawned.stream_id, id);
    spawned.handle.await.unwrap();

    let events = drain(&mut rx);
    let kinds: Vec<_> = events.iter().map(StreamEvent::kind).collect();
    assert_eq!(kinds, ["stream-start", "stream-chunk", "stream-end"]);
}

#[tokio::test]
async fn answer_stream_carries_related_searches_and_sources() {
    let (emitter, mut rx) = bus_emitter();
    let backend = Arc::new(MockBackend::with_answer(sample_answer()));

    let spawned = push_answer_to_stream(&emitter, backend.clone(), "  今天什么最火？ ", Some(Source::Weibo))
        .unwrap()
        .expect("non-blank question opens a stream");
    spawned.handle.await.unwrap();

    let asked = backend.last_question.lock().clone().unwrap();
    assert_eq!(asked.question, "今天什么最火？");
    assert_eq!(asked.platform_filter, Some(Source::Weibo));

    let events = drain(&mut rx);
    match events.first() {
        Some(StreamEvent::Start { question, meta, .. }) => {
            assert_eq!(question, "今天什么最火？");
            let meta = meta.as_ref().unwrap();
            assert_eq!(meta.get("source"), Some(&Value::from("QNA")));
            assert_eq!(meta.get("platformFilter"), Some(&Value::from("WEIBO")));
        }
        other => panic!("expected start, got {other:?}"),
    }
    assert_eq!(joined_chunks(&events), sample_answer().answer);
    match events.last() {
        Some(StreamEvent::End {
            related_hot_searches,
            meta,
            ..
        }) => {
            assert_eq!(related_hot_searches, &sample_answer().related_hot_searches);
            assert_eq!(
                meta.as_ref().and_then(|m| m.get("sources")),
                Some(&json!(["WEIBO"]))
            );
        }
        other => panic!("expected end, got {other:?}"),
    }
}

#[tokio::test]
async fn answer_failure_yields_single_error_without_chunks() {
    let (emitter, mut rx) = bus_emitter();
    let backend = Arc::new(MockBackend::default());

    let spawned = push_answer_to_stream(&emitter, backend, "为什么", None)
        .unwrap()
        .unwrap();
    spawned.handle.await.unwrap();

    let events = drain(&mut rx);
    let kinds: Vec<_> = events.iter().map(StreamEvent::kind).collect();
    assert_eq!(kinds, ["stream-start", "stream-error"]);
    match events.last() {
        Some(StreamEvent::Error { message, .. }) => assert_eq!(message, ANSWER_FAILED_MESSAGE),
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn blank_question_opens_no_stream() {
    let (emitter, mut rx) = bus_emitter();
    let backend = Arc::new(MockBackend::with_answer(sample_answer()));

    let spawned = push_answer_to_stream(&emitter, backend.clone(), "   ", None).unwrap();
    assert!(spawned.is_none());
    assert!(drain(&mut rx).is_empty());
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn summary_publication_failure_fails_with_summary_message() {
    let (emitter, mut rx) = limited_emitter(1);
    let summary = AiSummary {
        summary: "abcdefgh".into(),
        ..Default::default()
    };

    let spawned = push_summary_to_stream(
        &emitter,
        "T",
        &summary,
        SummaryStreamOptions {
            chunk_size: Some(2),
            chunk_delay_ms: Some(0),
            ..Default::default()
        },
    )
    .unwrap();
    spawned.handle.await.unwrap();

    let events = drain_mpsc(&mut rx);
    let kinds: Vec<_> = events.iter().map(StreamEvent::kind).collect();
    assert_eq!(kinds, ["stream-start", "stream-chunk", "stream-error"]);
    match events.last() {
        Some(StreamEvent::Error { message, .. }) => assert_eq!(message, SUMMARY_FAILED_MESSAGE),
        other => panic!("expected error, got {other:?}"),
    }
}

#[tokio::test]
async fn answer_publication_failure_fails_with_answer_message() {
    let (emitter, mut rx) = limited_emitter(2);
    let backend = Arc::new(MockBackend::with_answer(sample_answer()));

    let spawned = push_answer_to_stream(&emitter, backend.clone(), "热点", None)
        .unwrap()
        .unwrap();
    spawned.handle.await.unwrap();
    assert_eq!(backend.calls(), 1);

    let events = drain_mpsc(&mut rx);
    let kinds: Vec<_> = events.iter().map(StreamEvent::kind).collect();
    assert_eq!(kinds, ["stream-start", "stream-chunk", "stream-chunk", "stream-error"]);
    match events.last() {
        Some(StreamEvent::Error { message, .. }) => assert_eq!(message, ANSWER_FAILED_MESSAGE),
        other => panic!("expected error, got {other:?}"),
    }
}
