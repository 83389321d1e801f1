//! Publication seam for stream events.
//!
//! `StreamSink` is the only thing the emitter needs. `StreamBus` is the default
//! sink: a `tokio::sync::broadcast` channel fanning events out to any number of
//! subscribers (SSE clients, in-process consumers). An unbounded mpsc sender is
//! also a sink, for single-consumer setups.

use thiserror::Error;
use tokio::sync::{broadcast, mpsc};

use super::events::StreamEvent;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("stream sink closed")]
    Closed,
    #[error("publish failed: {0}")]
    Publish(String),
}

pub trait StreamSink: Send + Sync + 'static {
    fn publish(&self, event: StreamEvent) -> Result<(), StreamError>;
}

/// Broadcast bus for stream events.
#[derive(Clone, Debug)]
pub struct StreamBus {
    tx: broadcast::Sender<StreamEvent>,
    capacity: usize,
}

pub const DEFAULT_BUS_CAPACITY: usize = 1024;

impl StreamBus {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Receives every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<StreamEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for StreamBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

impl StreamSink for StreamBus {
    /// Nobody listening is not an error; the event is simply dropped.
    fn publish(&self, event: StreamEvent) -> Result<(), StreamError> {
        let _ = self.tx.send(event);
        Ok(())
    }
}

impl StreamSink for mpsc::UnboundedSender<StreamEvent> {
    fn publish(&self, event: StreamEvent) -> Result<(), StreamError> {
        self.send(event).map_err(|_| StreamError::Closed)
    }
}
