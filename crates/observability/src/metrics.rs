//! Buffer metrics collection
//!
//! Record helpers for the streaming and alignment buffers, plus an
//! in-memory aggregator for end-of-run summaries.

use metrics::counter;

/// Record a frame served to a streaming reader
pub fn record_frame_served(resolution: &str) {
    counter!(
        "framesync_frames_served_total",
        "resolution" => resolution.to_string()
    )
    .increment(1);
}

/// Record one completed alignment drain
///
/// The buffers emit their own gauges and histograms inline; this counts
/// drain events at the pipeline level.
pub fn record_drain() {
    counter!("framesync_align_drains_total").increment(1);
}

/// Drain metrics aggregator
///
/// Aggregates metrics in memory for statistics and summary output.
#[derive(Debug, Clone, Default)]
pub struct DrainMetricsAggregator {
    /// Total drain operations
    pub total_drains: u64,

    /// Total frames released by drains
    pub total_drained_frames: u64,

    /// Drains that hit the empty-buffer fallback
    pub fallback_drains: u64,

    /// Capacity growth events
    pub capacity_growths: u64,

    /// Drain size statistics
    pub drain_stats: RunningStats,

    /// Rate estimate statistics
    pub rate_stats: RunningStats,
}

impl DrainMetricsAggregator {
    /// Create a new aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a drain that released `drained` frames
    pub fn record_drain(&mut self, drained: usize) {
        self.total_drains += 1;
        self.total_drained_frames += drained as u64;
        self.drain_stats.push(drained as f64);
    }

    /// Record a drain that fell back to the cached default pair
    pub fn record_fallback(&mut self) {
        self.total_drains += 1;
        self.fallback_drains += 1;
    }

    /// Record a capacity growth event
    pub fn record_growth(&mut self) {
        self.capacity_growths += 1;
    }

    /// Record an observed rate estimate
    pub fn record_rate(&mut self, fps: f64) {
        self.rate_stats.push(fps);
    }

    /// Produce a summary report
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_drains: self.total_drains,
            total_drained_frames: self.total_drained_frames,
            fallback_drains: self.fallback_drains,
            capacity_growths: self.capacity_growths,
            mean_drain_size: self.drain_stats.mean(),
            drain_size: StatsSummary::from(&self.drain_stats),
            rate_fps: StatsSummary::from(&self.rate_stats),
        }
    }
}

/// Metrics summary
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_drains: u64,
    pub total_drained_frames: u64,
    pub fallback_drains: u64,
    pub capacity_growths: u64,
    pub mean_drain_size: f64,
    pub drain_size: StatsSummary,
    pub rate_fps: StatsSummary,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Buffer Metrics Summary ===")?;
        writeln!(f, "Total drains: {}", self.total_drains)?;
        writeln!(f, "Frames released: {}", self.total_drained_frames)?;
        writeln!(f, "Fallback drains: {}", self.fallback_drains)?;
        writeln!(f, "Capacity growths: {}", self.capacity_growths)?;
        writeln!(f, "Drain size: {}", self.drain_size)?;
        writeln!(f, "Rate estimate (fps): {}", self.rate_fps)?;
        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics calculator (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a new value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Sample count
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Minimum
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Maximum
    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();

        stats.push(1.0);
        stats.push(2.0);
        stats.push(3.0);
        stats.push(4.0);
        stats.push(5.0);

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_update() {
        let mut aggregator = DrainMetricsAggregator::new();

        aggregator.record_drain(3);
        aggregator.record_drain(1);
        aggregator.record_fallback();
        aggregator.record_growth();

        assert_eq!(aggregator.total_drains, 3);
        assert_eq!(aggregator.total_drained_frames, 4);
        assert_eq!(aggregator.fallback_drains, 1);
        assert_eq!(aggregator.capacity_growths, 1);
        assert!((aggregator.drain_stats.mean() - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = DrainMetricsAggregator::new();
        aggregator.record_drain(2);
        aggregator.record_rate(30.0);

        let output = format!("{}", aggregator.summary());
        assert!(output.contains("Total drains: 1"));
        assert!(output.contains("Frames released: 2"));
    }
}
