//! The streaming buffer: bounded queue + cached frame + refresh task.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_channel::{bounded, Receiver, Sender, TryRecvError};
use contracts::{Frame, PipelineError, Resolution, StreamBufferConfig, TimestampNs};
use metrics::{counter, gauge};
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, error, warn};

use crate::rate::{AtomicRate, RateUpdate, RateWindow};
use crate::scale;

/// Rate-adaptive single-slot frame cache
///
/// One producer calls `put`, many readers call `get`/`room` concurrently,
/// and a private refresh task republishes queued frames into the cache at
/// the measured producer pace. The only lock readers contend on guards a
/// single frame copy.
pub struct StreamBuffer {
    /// Producer side of the bounded frame queue
    tx: Sender<Frame>,
    /// The "current frame" served to readers
    cached: Arc<Mutex<Frame>>,
    /// Sliding window of put-timestamps (touched only by the producer)
    window: Mutex<RateWindow>,
    /// Shared rate estimate, never zero
    rate: Arc<AtomicRate>,
    /// Refresh task cancellation flag, checked once per pacing interval
    shutdown: Arc<AtomicBool>,
    /// Refresh task handle, taken by `shutdown`
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl StreamBuffer {
    /// Create the buffer and spawn its refresh task
    ///
    /// Must be called from within a tokio runtime. The cache starts out
    /// holding a black placeholder so `get` is valid before the first
    /// frame arrives.
    pub fn new(config: StreamBufferConfig) -> Self {
        let (tx, rx) = bounded(config.queue_capacity.max(1));
        let cached = Arc::new(Mutex::new(Frame::default()));
        let rate = Arc::new(AtomicRate::new(config.initial_fps));
        let shutdown = Arc::new(AtomicBool::new(false));

        let worker = tokio::spawn(refresh_loop(
            rx,
            Arc::clone(&cached),
            Arc::clone(&rate),
            Arc::clone(&shutdown),
        ));

        Self {
            tx,
            cached,
            window: Mutex::new(RateWindow::default()),
            rate,
            shutdown,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Copy a frame into the queue and fold its timestamp into the rate
    /// estimate
    ///
    /// Awaits only when the queue is full; with a generously sized queue
    /// and the refresh task draining at the measured rate that essentially
    /// never happens. Timestamp anomalies are logged and skipped, leaving
    /// the previous rate in place.
    ///
    /// # Errors
    /// `PipelineError::QueueClosed` when the refresh task is gone and the
    /// queue has been closed.
    pub async fn put(&self, frame: Frame, timestamp_ns: TimestampNs) -> Result<(), PipelineError> {
        self.tx
            .send(frame)
            .await
            .map_err(|_| PipelineError::QueueClosed)?;

        let update = self
            .window
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(timestamp_ns);

        match update {
            RateUpdate::Estimate(fps) => {
                self.rate.set(fps);
                gauge!("framesync_stream_rate_fps").set(fps);
            }
            RateUpdate::Pending => {}
            RateUpdate::ClockSkew { first, last } => {
                error!(
                    first,
                    last, "newest timestamp is older than the window start, keeping previous rate"
                );
                counter!("framesync_rate_anomalies_total", "kind" => "clock_skew").increment(1);
            }
            RateUpdate::ZeroSpan => {
                warn!(
                    timestamp_ns,
                    "timestamp window has zero span, keeping previous rate"
                );
                counter!("framesync_rate_anomalies_total", "kind" => "zero_span").increment(1);
            }
            RateUpdate::BogusGap { span_ns } => {
                error!(
                    span_ns,
                    "timestamp window spans more than a day, keeping previous rate"
                );
                counter!("framesync_rate_anomalies_total", "kind" => "bogus_gap").increment(1);
            }
        }

        Ok(())
    }

    /// Latest cached frame, resized to `resolution`
    ///
    /// Holds the cache lock only long enough to copy the frame; the
    /// resize (when needed) runs outside the lock. Never blocks on the
    /// producer or the refresh task.
    pub fn get(&self, resolution: Resolution) -> Frame {
        let copy = self
            .cached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        scale::resize_to(copy, resolution)
    }

    /// Best-effort free space in the producer queue
    ///
    /// The non-blocking size query can race a concurrent mutation and
    /// transiently report more entries than capacity; that case is
    /// clamped to 0 instead of underflowing.
    pub fn room(&self) -> usize {
        // Bounded channels always report a capacity
        let capacity = self.tx.capacity().unwrap_or(0);
        let size = self.tx.len();
        if size > capacity {
            debug!(
                size,
                capacity, "queue size query raced a mutation, reporting no room"
            );
            return 0;
        }
        capacity - size
    }

    /// Current producer rate estimate (frames per second)
    pub fn rate(&self) -> f64 {
        self.rate.get()
    }

    /// Signal the refresh task and wait for it to exit
    ///
    /// The flag is observed at the top of the task's next iteration, so
    /// the wait is bounded by one pacing interval.
    pub async fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!(error = ?e, "refresh task panicked");
            }
        }
        debug!("stream buffer shut down");
    }
}

/// Drain the queue at the measured producer pace, republishing the most
/// recent frame into the cache
///
/// An empty poll leaves the cache untouched (last-known-good). The paced
/// sleep is the loop's only suspension point, which bounds both shutdown
/// latency and the staleness of the cached frame.
async fn refresh_loop(
    rx: Receiver<Frame>,
    cached: Arc<Mutex<Frame>>,
    rate: Arc<AtomicRate>,
    shutdown: Arc<AtomicBool>,
) {
    debug!("refresh task started");

    while !shutdown.load(Ordering::Relaxed) {
        match rx.try_recv() {
            Ok(frame) => {
                *cached.lock().unwrap_or_else(PoisonError::into_inner) = frame;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Closed) => {
                debug!("frame queue closed, refresh task exiting");
                break;
            }
        }

        // rate is never zero, so the pacing divisor is always safe
        let interval_ms = (1000.0 / rate.get()).ceil().max(1.0) as u64;
        tokio::time::sleep(Duration::from_millis(interval_ms)).await;
    }

    debug!("refresh task stopped");
}
