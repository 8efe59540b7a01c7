//! PipelineBlueprint - Config Loader output
//!
//! Describes a complete pipeline run: synthetic source, streaming buffer,
//! alignment buffer, and simulated inference timing.

use serde::{Deserialize, Serialize};

use crate::Resolution;

/// Complete pipeline configuration blueprint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineBlueprint {
    /// Synthetic frame source settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Streaming buffer settings
    #[serde(default)]
    pub stream: StreamBufferConfig,

    /// Alignment buffer settings
    #[serde(default)]
    pub align: AlignBufferConfig,

    /// Simulated inference settings (mock mode)
    #[serde(default)]
    pub inference: InferenceConfig,
}

/// Synthetic frame source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Frame production rate (frames per second)
    #[serde(default = "default_source_fps")]
    pub fps: f64,

    /// Produced frame width in pixels
    #[serde(default = "default_source_width")]
    pub width: u32,

    /// Produced frame height in pixels
    #[serde(default = "default_source_height")]
    pub height: u32,
}

fn default_source_fps() -> f64 {
    30.0
}

fn default_source_width() -> u32 {
    640
}

fn default_source_height() -> u32 {
    480
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            fps: default_source_fps(),
            width: default_source_width(),
            height: default_source_height(),
        }
    }
}

/// Streaming buffer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamBufferConfig {
    /// Bounded frame queue capacity
    ///
    /// Chosen generously so producers essentially never block: the only
    /// consumer is the buffer's own refresh task draining at the measured
    /// rate.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Initial rate estimate used before two timestamps have been observed
    #[serde(default = "default_initial_fps")]
    pub initial_fps: f64,

    /// Resolution served to streaming readers
    #[serde(default)]
    pub resolution: Resolution,
}

fn default_queue_capacity() -> usize {
    64
}

fn default_initial_fps() -> f64 {
    30.0
}

impl Default for StreamBufferConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            initial_fps: default_initial_fps(),
            resolution: Resolution::default(),
        }
    }
}

/// Alignment buffer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignBufferConfig {
    /// Initial logical ring capacity
    ///
    /// Doubles automatically whenever inference latency exceeds the
    /// buffer's retained time span; never shrinks back.
    #[serde(default = "default_align_capacity")]
    pub initial_capacity: usize,
}

fn default_align_capacity() -> usize {
    10
}

impl Default for AlignBufferConfig {
    fn default() -> Self {
        Self {
            initial_capacity: default_align_capacity(),
        }
    }
}

/// Simulated inference configuration (mock mode only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Simulated end-to-end inference latency in milliseconds
    #[serde(default = "default_inference_latency_ms")]
    pub latency_ms: u64,
}

fn default_inference_latency_ms() -> u64 {
    100
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_inference_latency_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_runnable() {
        let blueprint = PipelineBlueprint::default();
        assert!(blueprint.source.fps > 0.0);
        assert!(blueprint.stream.queue_capacity >= 1);
        assert!(blueprint.stream.initial_fps > 0.0);
        assert_eq!(blueprint.align.initial_capacity, 10);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let blueprint: PipelineBlueprint =
            serde_json::from_str(r#"{"stream": {"queue_capacity": 8}}"#).unwrap();
        assert_eq!(blueprint.stream.queue_capacity, 8);
        assert_eq!(blueprint.stream.resolution, Resolution::Sd);
        assert_eq!(blueprint.inference.latency_ms, 100);
    }
}
