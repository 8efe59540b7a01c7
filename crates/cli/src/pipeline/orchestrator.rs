//! Pipeline orchestrator - coordinates all components.
//!
//! Runs a synthetic frame source against both buffers: every produced
//! frame is published to the streaming buffer and recorded in the
//! alignment buffer, a background reader polls the streaming cache, and
//! a simulated single-in-flight inference drains the alignment buffer by
//! capture timestamp.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{Frame, PipelineBlueprint, TimestampNs, TimestampedFrame};
use observability::{record_drain, record_frame_served, DrainMetricsAggregator};
use stream_buffer::StreamBuffer;
use time_align::TimeAlignedBuffer;
use tokio::time::Instant as TokioInstant;
use tracing::{debug, info, warn};

use super::PipelineStats;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The pipeline blueprint configuration
    pub blueprint: PipelineBlueprint,

    /// Maximum number of frames to produce (None = unlimited)
    pub max_frames: Option<u64>,

    /// Pipeline timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Setup Streaming Buffer
        info!("Setting up streaming buffer...");
        let stream = Arc::new(StreamBuffer::new(blueprint.stream.clone()));

        // Setup Alignment Buffer
        let fallback = TimestampedFrame::new(
            Frame::solid(blueprint.source.width, blueprint.source.height, [0, 0, 0]),
            0,
        );
        let align = TimeAlignedBuffer::new(blueprint.align.clone(), fallback);

        info!(
            queue_capacity = blueprint.stream.queue_capacity,
            align_capacity = align.capacity(),
            "Buffers configured"
        );

        // Spawn streaming reader task
        let reader_stop = Arc::new(AtomicBool::new(false));
        let frames_served = Arc::new(AtomicU64::new(0));
        let reader = spawn_reader(
            Arc::clone(&stream),
            blueprint.stream.resolution,
            Arc::clone(&reader_stop),
            Arc::clone(&frames_served),
        );

        let max_frames = self.config.max_frames;
        info!(max_frames = ?max_frames, "Pipeline running");

        // Producer + coordinator task: owns the alignment buffer
        let producer_stream = Arc::clone(&stream);
        let source = blueprint.source.clone();
        let inference_latency = Duration::from_millis(blueprint.inference.latency_ms);
        let pipeline_task = run_producer(producer_stream, align, source, inference_latency, max_frames);

        // Run with optional timeout
        let stats = if let Some(timeout) = self.config.timeout {
            match tokio::time::timeout(timeout, pipeline_task).await {
                Ok(stats) => stats?,
                Err(_) => {
                    warn!(timeout_secs = timeout.as_secs(), "Pipeline timed out");
                    PipelineStats::default()
                }
            }
        } else {
            pipeline_task.await?
        };

        // Shutdown
        info!("Shutting down pipeline...");
        reader_stop.store(true, Ordering::SeqCst);
        let _ = tokio::time::timeout(Duration::from_secs(5), reader).await;
        stream.shutdown().await;

        let mut final_stats = stats;
        final_stats.frames_served = frames_served.load(Ordering::SeqCst);
        final_stats.duration = start_time.elapsed();

        info!(
            duration_secs = final_stats.duration.as_secs_f64(),
            fps = format!("{:.2}", final_stats.fps()),
            "Pipeline shutdown complete"
        );

        Ok(final_stats)
    }
}

/// Produce synthetic frames and drain the alignment buffer as simulated
/// inferences complete
///
/// A single inference is in flight at a time, mirroring an accelerator
/// that processes one frame while newer ones keep arriving. Each
/// completion drains the matched frame and everything older in one block.
async fn run_producer(
    stream: Arc<StreamBuffer>,
    mut align: TimeAlignedBuffer,
    source: contracts::SourceConfig,
    inference_latency: Duration,
    max_frames: Option<u64>,
) -> Result<PipelineStats> {
    let frame_interval = Duration::from_secs_f64(1.0 / source.fps);
    let frame_interval_ns = (1_000_000_000.0 / source.fps) as TimestampNs;

    let mut stats = PipelineStats::default();
    let mut metrics = DrainMetricsAggregator::new();
    let mut inflight: Option<(TimestampNs, TokioInstant)> = None;
    let mut produced: u64 = 0;

    loop {
        let timestamp_ns = produced as TimestampNs * frame_interval_ns;
        let frame = synthetic_frame(&source, produced);

        stream
            .put(frame.clone(), timestamp_ns)
            .await
            .context("Streaming buffer rejected frame")?;
        align.put(frame, timestamp_ns);
        stats.frames_produced += 1;
        metrics.record_rate(stream.rate());

        // Complete the in-flight inference once its latency has elapsed
        if let Some((inference_ts, deadline)) = inflight {
            if TokioInstant::now() >= deadline {
                let was_empty = align.is_empty();
                let capacity_before = align.capacity();
                let aligned = align.get_best_match_and_older(inference_ts);

                // The three outcomes are exclusive: growth serves the
                // oldest frame without removing it, the fallback serves
                // the cached pair, and only a real drain releases frames
                if align.capacity() > capacity_before {
                    metrics.record_growth();
                } else if was_empty {
                    metrics.record_fallback();
                } else {
                    record_drain();
                    metrics.record_drain(aligned.len());
                    stats.frames_aligned += aligned.len() as u64;
                }
                stats.inferences_completed += 1;

                debug!(
                    inference_ts,
                    aligned = aligned.len(),
                    remaining = align.len(),
                    "Inference result aligned"
                );
                inflight = None;
            }
        }

        // Start the next inference on the newest frame
        if inflight.is_none() {
            inflight = Some((timestamp_ns, TokioInstant::now() + inference_latency));
        }

        produced += 1;
        if let Some(max) = max_frames {
            if produced >= max {
                info!(frames = produced, "Reached max frames limit");
                break;
            }
        }

        tokio::time::sleep(frame_interval).await;
    }

    stats.buffer_metrics = metrics;
    Ok(stats)
}

/// Poll the streaming cache at the configured source rate
///
/// Stands in for downstream consumers (preview streams, snapshots) that
/// read whatever frame is current without ever blocking the producer.
fn spawn_reader(
    stream: Arc<StreamBuffer>,
    resolution: contracts::Resolution,
    stop: Arc<AtomicBool>,
    frames_served: Arc<AtomicU64>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let label = resolution.to_string();
        while !stop.load(Ordering::Relaxed) {
            let frame = stream.get(resolution);
            debug_assert_eq!(frame.dimensions(), resolution.dimensions());

            record_frame_served(&label);
            frames_served.fetch_add(1, Ordering::Relaxed);

            // Readers pace themselves off the measured producer rate
            let interval_ms = (1000.0 / stream.rate()).ceil().max(1.0) as u64;
            tokio::time::sleep(Duration::from_millis(interval_ms)).await;
        }
        debug!("streaming reader stopped");
    })
}

/// Build a synthetic frame whose color encodes the frame index
fn synthetic_frame(source: &contracts::SourceConfig, index: u64) -> Frame {
    let shade = (index % 256) as u8;
    Frame::solid(source.width, source.height, [shade, shade, 255 - shade])
}
