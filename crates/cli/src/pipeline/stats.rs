//! Pipeline statistics and metrics.

use std::time::Duration;

use observability::DrainMetricsAggregator;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Total frames produced by the synthetic source
    pub frames_produced: u64,

    /// Total frames released by alignment drains
    pub frames_aligned: u64,

    /// Total simulated inferences completed
    pub inferences_completed: u64,

    /// Total frames served to streaming readers
    pub frames_served: u64,

    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Buffer metrics aggregator
    pub buffer_metrics: DrainMetricsAggregator,
}

impl PipelineStats {
    /// Calculate produced frames per second
    pub fn fps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.frames_produced as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Share of produced frames that made it through alignment
    pub fn alignment_rate(&self) -> f64 {
        if self.frames_produced > 0 {
            (self.frames_aligned as f64 / self.frames_produced as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Pipeline Statistics                        ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Frames produced: {}", self.frames_produced);
        println!("   ├─ Frames aligned: {}", self.frames_aligned);
        println!("   ├─ Alignment rate: {:.2}%", self.alignment_rate());
        println!("   ├─ Inferences completed: {}", self.inferences_completed);
        println!("   ├─ Frames served to readers: {}", self.frames_served);
        println!("   └─ Source FPS: {:.2}", self.fps());

        let summary = self.buffer_metrics.summary();

        println!("\n📈 Buffer Metrics");
        println!("   ├─ Total drains: {}", summary.total_drains);
        println!("   ├─ Fallback drains: {}", summary.fallback_drains);
        println!("   ├─ Capacity growths: {}", summary.capacity_growths);
        println!("   ├─ Drain size: {}", summary.drain_size);
        println!("   └─ Rate estimate (fps): {}", summary.rate_fps);

        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_calculation() {
        let stats = PipelineStats {
            frames_produced: 300,
            duration: Duration::from_secs(10),
            ..Default::default()
        };
        assert!((stats.fps() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_duration_fps() {
        let stats = PipelineStats::default();
        assert_eq!(stats.fps(), 0.0);
        assert_eq!(stats.alignment_rate(), 0.0);
    }

    #[test]
    fn test_alignment_rate() {
        let stats = PipelineStats {
            frames_produced: 200,
            frames_aligned: 150,
            ..Default::default()
        };
        assert!((stats.alignment_rate() - 75.0).abs() < 1e-9);
    }
}
