use crate::core::analytics::event::AuctionOutcomeEvent;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{info, warn};

/// Downstream publishing target. `LoggingSink` is the default, reference
/// implementation; a real deployment substitutes a sink that forwards
/// to whatever warehouse or stream the operator wants.
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn publish(&self, events: Vec<AuctionOutcomeEvent>) -> anyhow::Result<()>;
}

pub struct LoggingSink;

#[async_trait]
impl AnalyticsSink for LoggingSink {
    async fn publish(&self, events: Vec<AuctionOutcomeEvent>) -> anyhow::Result<()> {
        for event in &events {
            info!(
                request_id = %event.request_id,
                publisher_id = %event.publisher_id,
                winners = event.winners.len(),
                bidders = event.bidder_outcomes.len(),
                "auction outcome"
            );
        }
        Ok(())
    }
}

/// Analytics Emitter (C7). A fixed-size buffer drains on an interval to
/// the sink; `emit` never awaits, so the auction hot path can call it
/// unconditionally. On overflow the event is dropped and a counter
/// incremented rather than blocking the caller.
pub struct AnalyticsEmitter {
    buffer: Mutex<Vec<AuctionOutcomeEvent>>,
    capacity: usize,
    dropped: AtomicU64,
    sink: Arc<dyn AnalyticsSink>,
}

impl AnalyticsEmitter {
    pub fn new(capacity: usize, sink: Arc<dyn AnalyticsSink>) -> Self {
        Self {
            buffer: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
            dropped: AtomicU64::new(0),
            sink,
        }
    }

    /// Non-blocking by construction: the critical section is a bounds
    /// check and a push, never an await.
    pub fn emit(&self, event: AuctionOutcomeEvent) {
        let mut buffer = self.buffer.lock();
        if buffer.len() >= self.capacity {
            drop(buffer);
            self.dropped.fetch_add(1, Ordering::Relaxed);
            warn!("analytics buffer full, dropping event");
            return;
        }
        buffer.push(event);
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Takes ownership of whatever is currently buffered and releases
    /// the lock before handing the batch to the sink, so concurrent
    /// `emit` calls are never blocked on network I/O (§4.7 correctness
    /// requirement).
    async fn drain_once(&self) {
        let batch = {
            let mut buffer = self.buffer.lock();
            std::mem::take(&mut *buffer)
        };

        if batch.is_empty() {
            return;
        }

        if let Err(e) = self.sink.publish(batch).await {
            warn!("analytics sink publish failed: {e}");
        }
    }

    /// Spawns the single drain worker. Runs until the handle is aborted
    /// during shutdown.
    pub fn spawn_worker(self: &Arc<Self>, drain_interval: Duration) -> tokio::task::JoinHandle<()> {
        let emitter = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(drain_interval);
            loop {
                ticker.tick().await;
                emitter.drain_once().await;
            }
        })
    }

    /// Drains whatever remains within a bounded timeout, then returns.
    /// Used during shutdown so in-flight analytics aren't silently lost
    /// on a clean exit.
    pub async fn shutdown_drain(&self, timeout: Duration) {
        if tokio::time::timeout(timeout, self.drain_once()).await.is_err() {
            warn!("analytics shutdown drain timed out, remaining events discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::Mutex as AsyncMutex;

    struct CollectingSink {
        received: AsyncMutex<Vec<AuctionOutcomeEvent>>,
    }

    #[async_trait]
    impl AnalyticsSink for CollectingSink {
        async fn publish(&self, events: Vec<AuctionOutcomeEvent>) -> anyhow::Result<()> {
            self.received.lock().await.extend(events);
            Ok(())
        }
    }

    #[tokio::test]
    async fn drops_events_past_capacity() {
        let sink = Arc::new(CollectingSink { received: AsyncMutex::new(Vec::new()) });
        let emitter = AnalyticsEmitter::new(2, sink);

        emitter.emit(AuctionOutcomeEvent::default());
        emitter.emit(AuctionOutcomeEvent::default());
        emitter.emit(AuctionOutcomeEvent::default());

        assert_eq!(emitter.dropped_count(), 1);
    }

    #[tokio::test]
    async fn drain_forwards_buffered_events_to_sink() {
        let sink = Arc::new(CollectingSink { received: AsyncMutex::new(Vec::new()) });
        let emitter = AnalyticsEmitter::new(10, sink.clone());

        emitter.emit(AuctionOutcomeEvent::default());
        emitter.drain_once().await;

        assert_eq!(sink.received.lock().await.len(), 1);
    }
}
