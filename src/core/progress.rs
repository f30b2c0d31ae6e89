use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use bytes::Bytes;
use futures::Stream;
use parking_lot::Mutex;
use pin_project_lite::pin_project;

/// One point-in-time view of a running transfer.
#[derive(Debug, Clone, Copy)]
pub struct ProgressSample {
    pub bytes_done: u64,
    pub total_bytes: u64,
    pub elapsed: Duration,
}

impl ProgressSample {
    pub fn percentage(&self) -> f64 {
        if self.total_bytes == 0 {
            return 100.0;
        }
        self.bytes_done as f64 * 100.0 / self.total_bytes as f64
    }

    /// Bytes per second. Elapsed time is floored to one second so early
    /// samples never divide by zero.
    pub fn speed(&self) -> f64 {
        self.bytes_done as f64 / self.elapsed.as_secs_f64().max(1.0)
    }

    /// Estimated remaining time, `None` while the speed is still zero.
    pub fn eta(&self) -> Option<Duration> {
        let speed = self.speed();
        if speed <= 0.0 {
            return None;
        }
        let remaining = self.total_bytes.saturating_sub(self.bytes_done);
        Some(Duration::from_secs_f64(remaining as f64 / speed))
    }
}

pub type ProgressCallback = Arc<dyn Fn(ProgressSample) + Send + Sync>;

/// Accumulates transferred bytes for one transfer leg and invokes the
/// callback at most once per update interval.
pub struct ProgressTracker {
    total_bytes: u64,
    bytes_done: Mutex<u64>,
    started_at: Instant,
    last_emit: Mutex<Option<Instant>>,
    update_interval: Duration,
    callback: ProgressCallback,
}

impl ProgressTracker {
    pub fn new(total_bytes: u64, callback: ProgressCallback) -> Self {
        Self {
            total_bytes,
            bytes_done: Mutex::new(0),
            started_at: Instant::now(),
            last_emit: Mutex::new(None),
            update_interval: Duration::from_secs(1),
            callback,
        }
    }

    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = interval;
        self
    }

    pub fn bytes_done(&self) -> u64 {
        *self.bytes_done.lock()
    }

    pub fn record_bytes(&self, bytes: u64) {
        let mut done = self.bytes_done.lock();
        *done += bytes;
        let bytes_done = *done;
        drop(done);

        let now = Instant::now();

        // Cheap gate before taking the emit lock again.
        {
            let last = self.last_emit.lock();
            if let Some(prev) = *last {
                if now.duration_since(prev) < self.update_interval {
                    return;
                }
            }
        }

        let mut last = self.last_emit.lock();
        // Re-check under the lock; concurrent chunks race to emit.
        let due = match *last {
            Some(prev) => now.duration_since(prev) >= self.update_interval,
            None => true,
        };
        if due {
            *last = Some(now);
            drop(last);

            (self.callback)(ProgressSample {
                bytes_done,
                total_bytes: self.total_bytes,
                elapsed: self.started_at.elapsed(),
            });
        }
    }
}

pin_project! {
    /// Byte-stream wrapper that feeds chunk sizes into a tracker as they
    /// pass through.
    pub struct ProgressStream<S> {
        #[pin]
        inner: S,
        tracker: Arc<ProgressTracker>,
    }
}

impl<S> ProgressStream<S> {
    pub fn new(inner: S, tracker: Arc<ProgressTracker>) -> Self {
        Self { inner, tracker }
    }
}

impl<S> Stream for ProgressStream<S>
where
    S: Stream<Item = std::io::Result<Bytes>>,
{
    type Item = std::io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();

        match this.inner.poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                if !chunk.is_empty() {
                    this.tracker.record_bytes(chunk.len() as u64);
                }
                Poll::Ready(Some(Ok(chunk)))
            }
            other => other,
        }
    }
}
