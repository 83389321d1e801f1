// src/stream/mod.rs
//! Incremental delivery of AI-generated text as ordered stream events.

pub mod answer;
pub mod bus;
pub mod emitter;
pub mod events;
pub mod summary;

pub use answer::{push_answer_to_stream, ANSWER_FAILED_MESSAGE};
pub use bus::{StreamBus, StreamError, StreamSink, DEFAULT_BUS_CAPACITY};
pub use emitter::{
    new_stream_id, split_chunks, StreamEmitter, StreamSession, DEFAULT_CHUNK_DELAY_MS,
    DEFAULT_CHUNK_SIZE, INTERRUPTED_MESSAGE,
};
pub use events::{EndPayload, StreamEvent};
pub use summary::{
    build_summary_answer, push_summary_to_stream, start_summary_stream, SpawnedStream,
    SummaryStreamOptions, SUMMARY_FAILED_MESSAGE,
};
