//! Producer rate estimation from a sliding timestamp window.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use contracts::{TimestampNs, NANOS_PER_DAY};

/// Number of put-timestamps retained for rate estimation
pub(crate) const WINDOW_LEN: usize = 10;

/// Atomically shared frames-per-second estimate
///
/// Written by the producer on `put`, read by the refresh task to derive
/// its pacing interval. Stored as raw f64 bits in an `AtomicU64`; readers
/// may observe a slightly stale value, which is acceptable. The value is
/// never zero: the initial estimate comes from validated config and
/// updates that would yield a non-positive or non-finite rate are
/// rejected upstream.
#[derive(Debug)]
pub(crate) struct AtomicRate(AtomicU64);

impl AtomicRate {
    pub(crate) fn new(fps: f64) -> Self {
        debug_assert!(fps > 0.0 && fps.is_finite());
        Self(AtomicU64::new(fps.to_bits()))
    }

    pub(crate) fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    pub(crate) fn set(&self, fps: f64) {
        self.0.store(fps.to_bits(), Ordering::Relaxed);
    }
}

/// Outcome of folding one timestamp into the window
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum RateUpdate {
    /// A new estimate was computed
    Estimate(f64),
    /// Fewer than two samples in the window
    Pending,
    /// Newest timestamp is older than the window start (clock went backward)
    ClockSkew {
        first: TimestampNs,
        last: TimestampNs,
    },
    /// Oldest and newest timestamps coincide; the rate divisor would be zero
    ZeroSpan,
    /// Window spans more than a day, at least one timestamp is bogus
    BogusGap { span_ns: i64 },
}

/// Sliding window over the last `WINDOW_LEN` put-timestamps
#[derive(Debug, Default)]
pub(crate) struct RateWindow {
    timestamps: VecDeque<TimestampNs>,
}

impl RateWindow {
    /// Append a timestamp (dropping the oldest past `WINDOW_LEN`) and
    /// recompute the rate as `(len - 1) / (t_last - t_first)` seconds.
    ///
    /// Anomalous windows report what went wrong instead of an estimate;
    /// the caller keeps the previous rate in those cases.
    pub(crate) fn push(&mut self, timestamp_ns: TimestampNs) -> RateUpdate {
        self.timestamps.push_back(timestamp_ns);
        if self.timestamps.len() > WINDOW_LEN {
            self.timestamps.pop_front();
        }

        if self.timestamps.len() < 2 {
            return RateUpdate::Pending;
        }

        // Window is non-empty here, front/back always exist
        let first = *self.timestamps.front().expect("window has >= 2 entries");
        let last = *self.timestamps.back().expect("window has >= 2 entries");

        if last < first {
            return RateUpdate::ClockSkew { first, last };
        }

        let span_ns = last - first;
        if span_ns == 0 {
            return RateUpdate::ZeroSpan;
        }
        if span_ns > NANOS_PER_DAY {
            return RateUpdate::BogusGap { span_ns };
        }

        let span_s = span_ns as f64 / 1e9;
        RateUpdate::Estimate((self.timestamps.len() - 1) as f64 / span_s)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.timestamps.len()
    }
}
