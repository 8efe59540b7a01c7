//! Ring storage and best-match draining.
//!
//! Uses index-based separation: a `Vec` ring stores lightweight metadata
//! (timestamp + slab key) in arrival order while the frame payloads live
//! in a `Slab`, so ring bookkeeping never moves pixel data.

use contracts::{AlignBufferConfig, Frame, TimestampNs, TimestampedFrame};
use metrics::{counter, gauge, histogram};
use slab::Slab;
use tracing::{debug, trace};

/// Lightweight slot metadata stored in the ring
#[derive(Debug, Clone, Copy)]
struct SlotMeta {
    /// Capture timestamp used for matching
    timestamp_ns: TimestampNs,
    /// Key into the payload slab
    key: usize,
}

/// Timestamp-aligned frame ring
///
/// Entries are written in arrival order through a wrapping cursor, so
/// "overwrite oldest" falls out of the write path without any explicit
/// oldest-tracking. Once the cursor has wrapped, slot order no longer
/// matches arrival order, so drains select by timestamp rather than by
/// position.
pub struct TimeAlignedBuffer {
    /// Arrival-order ring of slot metadata
    slots: Vec<SlotMeta>,
    /// Frame payload arena
    storage: Slab<Frame>,
    /// Next write position, wraps at `capacity`
    cursor: usize,
    /// Logical capacity; doubles under backpressure, never shrinks
    capacity: usize,
    /// Served when the ring is empty; tracks the newest drained frame
    fallback: TimestampedFrame,
}

impl TimeAlignedBuffer {
    /// Create a buffer that serves `fallback` until real frames arrive
    pub fn new(config: AlignBufferConfig, fallback: TimestampedFrame) -> Self {
        let capacity = config.initial_capacity.max(1);
        Self {
            slots: Vec::with_capacity(capacity),
            storage: Slab::with_capacity(capacity),
            cursor: 0,
            capacity,
            fallback,
        }
    }

    /// Copy a frame and its timestamp into the ring
    ///
    /// Appends while the ring is still growing toward its logical
    /// capacity, otherwise overwrites the slot under the cursor (the
    /// oldest retained entry) and frees its payload.
    pub fn put(&mut self, frame: Frame, timestamp_ns: TimestampNs) {
        let key = self.storage.insert(frame);
        let meta = SlotMeta { timestamp_ns, key };

        if self.cursor >= self.slots.len() {
            self.slots.push(meta);
        } else {
            let old = std::mem::replace(&mut self.slots[self.cursor], meta);
            self.storage.remove(old.key);
            trace!(
                overwritten_ns = old.timestamp_ns,
                timestamp_ns,
                "ring full, overwrote oldest slot"
            );
        }

        self.cursor += 1;
        if self.cursor >= self.capacity {
            self.cursor = 0;
        }

        gauge!("framesync_align_depth").set(self.slots.len() as f64);
    }

    /// Current number of stored entries
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if the ring holds no entries
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Current logical capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Remove and return the best-matching frame and everything older
    ///
    /// The best match is the entry whose timestamp has the smallest
    /// absolute difference to `timestamp_ns` (first found wins ties).
    /// Results come back oldest-first by timestamp.
    ///
    /// Two degenerate cases return a single entry without draining:
    /// - empty ring: the stored fallback pair (nothing produced yet, or
    ///   a previous drain emptied the ring);
    /// - every retained entry is newer than the query: the ring's time
    ///   span no longer reaches back far enough, so the logical capacity
    ///   doubles for future writes and the oldest entry is served but
    ///   kept.
    pub fn get_best_match_and_older(&mut self, timestamp_ns: TimestampNs) -> Vec<TimestampedFrame> {
        if self.slots.is_empty() {
            trace!(timestamp_ns, "no frames buffered, serving fallback");
            return vec![self.fallback.clone()];
        }

        let (oldest_idx, best_match_ns) = self.find_oldest_and_best_match(timestamp_ns);
        let oldest = self.slots[oldest_idx];

        if oldest.timestamp_ns > timestamp_ns {
            // Inference outlived the ring's retention window: frames are
            // being overwritten before a single result lands. Trade
            // memory for coverage and serve the oldest frame unconsumed.
            self.capacity *= 2;
            debug!(
                timestamp_ns,
                oldest_ns = oldest.timestamp_ns,
                capacity = self.capacity,
                "oldest frame is newer than the query, growing ring"
            );
            counter!("framesync_align_capacity_growth_total").increment(1);
            gauge!("framesync_align_capacity").set(self.capacity as f64);

            // Every entry is newer than the query here, so the smallest
            // absolute difference belongs to the smallest timestamp
            debug_assert_eq!(best_match_ns, oldest.timestamp_ns);

            return vec![TimestampedFrame::new(
                self.storage[oldest.key].clone(),
                oldest.timestamp_ns,
            )];
        }

        self.remove_best_match_and_older(best_match_ns)
    }

    /// One scan for the oldest entry and the best-matching timestamp
    ///
    /// Strict-less comparisons make the first-found entry win ties.
    fn find_oldest_and_best_match(&self, timestamp_ns: TimestampNs) -> (usize, TimestampNs) {
        assert!(
            !self.slots.is_empty(),
            "matching scan reached with an empty ring"
        );

        let mut oldest_idx = 0;
        let mut best_match_ns = self.slots[0].timestamp_ns;
        let mut smallest_delta = u64::MAX;

        for (i, slot) in self.slots.iter().enumerate() {
            if slot.timestamp_ns < self.slots[oldest_idx].timestamp_ns {
                oldest_idx = i;
            }

            let delta = slot.timestamp_ns.abs_diff(timestamp_ns);
            if delta < smallest_delta {
                best_match_ns = slot.timestamp_ns;
                smallest_delta = delta;
            }
        }

        (oldest_idx, best_match_ns)
    }

    /// Drain the best match and every older entry
    ///
    /// In a wrapped ring the matched slots need not be adjacent, so they
    /// are removed back to front and the result is sorted by timestamp.
    fn remove_best_match_and_older(&mut self, best_match_ns: TimestampNs) -> Vec<TimestampedFrame> {
        let indices: Vec<usize> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.timestamp_ns <= best_match_ns)
            .map(|(i, _)| i)
            .collect();
        assert!(!indices.is_empty(), "drain selected no slots");

        let mut drained: Vec<TimestampedFrame> = Vec::with_capacity(indices.len());
        for &i in indices.iter().rev() {
            let meta = self.slots.remove(i);
            drained.push(TimestampedFrame::new(
                self.storage.remove(meta.key),
                meta.timestamp_ns,
            ));
        }
        drained.sort_by_key(|pair| pair.timestamp_ns);

        // Any later empty-ring query serves the newest frame just handed out
        self.fallback = drained
            .last()
            .expect("drained at least one slot")
            .clone();

        // Future writes keep targeting the same logical wraparound point
        let removed_before_cursor = indices.iter().filter(|&&i| i < self.cursor).count();
        assert!(removed_before_cursor <= self.cursor, "cursor underflow");
        self.cursor -= removed_before_cursor;

        histogram!("framesync_align_drained_frames").record(drained.len() as f64);
        debug!(
            best_match_ns,
            drained = drained.len(),
            remaining = self.slots.len(),
            "drained best match and older"
        );

        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged_frame(tag: u8) -> Frame {
        Frame::solid(2, 2, [tag, 0, 0])
    }

    fn buffer_with_capacity(capacity: usize) -> TimeAlignedBuffer {
        TimeAlignedBuffer::new(
            AlignBufferConfig {
                initial_capacity: capacity,
            },
            TimestampedFrame::new(Frame::default(), 0),
        )
    }

    fn timestamps(drained: &[TimestampedFrame]) -> Vec<TimestampNs> {
        drained.iter().map(|t| t.timestamp_ns).collect()
    }

    #[test]
    fn test_best_match_drains_match_and_older() {
        let mut buffer = buffer_with_capacity(10);
        for ts in [5, 10, 15, 20] {
            buffer.put(tagged_frame(ts as u8), ts);
        }

        // |10 - 12| = 2 beats |15 - 12| = 3
        let drained = buffer.get_best_match_and_older(12);
        assert_eq!(timestamps(&drained), vec![5, 10]);
        assert_eq!(buffer.len(), 2);

        // The newer half is still there
        let rest = buffer.get_best_match_and_older(20);
        assert_eq!(timestamps(&rest), vec![15, 20]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_empty_buffer_serves_fallback_without_mutation() {
        let mut buffer = buffer_with_capacity(10);

        let result = buffer.get_best_match_and_older(1_000);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].timestamp_ns, 0);
        assert_eq!(result[0].frame, Frame::default());
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 10);

        // Still the same answer on repeat queries
        let again = buffer.get_best_match_and_older(2_000);
        assert_eq!(again[0].timestamp_ns, 0);
    }

    #[test]
    fn test_query_older_than_window_grows_capacity_without_draining() {
        let mut buffer = buffer_with_capacity(10);
        buffer.put(tagged_frame(1), 100);
        buffer.put(tagged_frame(2), 200);

        let result = buffer.get_best_match_and_older(50);
        assert_eq!(timestamps(&result), vec![100]);
        // The oldest entry stays buffered and the ring doubles
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.capacity(), 20);

        // A reachable query still drains normally afterwards
        let drained = buffer.get_best_match_and_older(150);
        assert_eq!(timestamps(&drained), vec![100]);
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_fallback_tracks_newest_drained_entry() {
        let mut buffer = buffer_with_capacity(10);
        buffer.put(tagged_frame(1), 10);
        buffer.put(tagged_frame(2), 20);

        let drained = buffer.get_best_match_and_older(25);
        assert_eq!(timestamps(&drained), vec![10, 20]);
        assert!(buffer.is_empty());

        // Empty-ring queries now serve the newest drained frame, not the
        // original default
        let fallback = buffer.get_best_match_and_older(30);
        assert_eq!(fallback[0].timestamp_ns, 20);
        assert_eq!(fallback[0].frame, tagged_frame(2));
    }

    #[test]
    fn test_exact_timestamp_round_trip() {
        let mut buffer = buffer_with_capacity(10);
        buffer.put(tagged_frame(7), 42);

        let drained = buffer.get_best_match_and_older(42);
        assert_eq!(timestamps(&drained), vec![42]);
        assert_eq!(drained[0].frame, tagged_frame(7));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_tie_resolves_to_first_found() {
        let mut buffer = buffer_with_capacity(10);
        buffer.put(tagged_frame(1), 5);
        buffer.put(tagged_frame(2), 9);

        // |5 - 7| == |9 - 7|: scan order keeps 5
        let drained = buffer.get_best_match_and_older(7);
        assert_eq!(timestamps(&drained), vec![5]);
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_wraparound_overwrites_oldest() {
        let mut buffer = buffer_with_capacity(4);
        for ts in 1..=6 {
            buffer.put(tagged_frame(ts as u8), ts);
        }

        // Two oldest entries were overwritten in place
        assert_eq!(buffer.len(), 4);

        let drained = buffer.get_best_match_and_older(4);
        assert_eq!(timestamps(&drained), vec![3, 4]);
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_wrapped_drain_handles_noncontiguous_slots() {
        let mut buffer = buffer_with_capacity(4);
        for ts in 1..=6 {
            buffer.put(tagged_frame(ts as u8), ts);
        }

        // Slot order is now [5, 6, 3, 4]: the entries at or below the
        // match sit on both sides of the wrap point
        let drained = buffer.get_best_match_and_older(5);
        assert_eq!(timestamps(&drained), vec![3, 4, 5]);
        assert_eq!(buffer.len(), 1);

        // The cursor stayed consistent: appends resume and drain cleanly
        buffer.put(tagged_frame(7), 7);
        buffer.put(tagged_frame(8), 8);
        buffer.put(tagged_frame(9), 9);
        let rest = buffer.get_best_match_and_older(9);
        assert_eq!(timestamps(&rest), vec![6, 7, 8, 9]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_wrapped_drain_fallback_is_newest_by_timestamp() {
        let mut buffer = buffer_with_capacity(4);
        for ts in 1..=6 {
            buffer.put(tagged_frame(ts as u8), ts);
        }

        // Full drain of the wrapped ring [5, 6, 3, 4]
        let drained = buffer.get_best_match_and_older(6);
        assert_eq!(timestamps(&drained), vec![3, 4, 5, 6]);
        assert!(buffer.is_empty());

        // The fallback tracks the newest timestamp, not the last slot
        let fallback = buffer.get_best_match_and_older(10);
        assert_eq!(fallback[0].timestamp_ns, 6);
        assert_eq!(fallback[0].frame, tagged_frame(6));
    }

    #[test]
    fn test_cursor_survives_drain_and_keeps_wrapping() {
        let mut buffer = buffer_with_capacity(4);
        for ts in 1..=6 {
            buffer.put(tagged_frame(ts as u8), ts);
        }

        // Drains [3, 4]; cursor stays on the slot after 6
        buffer.get_best_match_and_older(4);
        assert_eq!(buffer.len(), 2);

        // Refill: appends resume where the ring left off
        buffer.put(tagged_frame(7), 7);
        buffer.put(tagged_frame(8), 8);
        assert_eq!(buffer.len(), 4);

        let drained = buffer.get_best_match_and_older(8);
        assert_eq!(timestamps(&drained), vec![5, 6, 7, 8]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_growth_never_shrinks() {
        let mut buffer = buffer_with_capacity(2);
        buffer.put(tagged_frame(1), 100);

        buffer.get_best_match_and_older(10);
        assert_eq!(buffer.capacity(), 4);
        buffer.get_best_match_and_older(10);
        assert_eq!(buffer.capacity(), 8);

        // Draining everything leaves the grown capacity in place
        buffer.get_best_match_and_older(100);
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 8);
    }

    #[test]
    fn test_growth_extends_physical_ring_before_wrapping() {
        let mut buffer = buffer_with_capacity(2);
        buffer.put(tagged_frame(1), 100);
        buffer.put(tagged_frame(2), 200);

        // Query below the window: capacity 2 -> 4, nothing drained
        buffer.get_best_match_and_older(10);
        assert_eq!(buffer.capacity(), 4);

        // Growth affects future wraparound only: the cursor finishes its
        // overwrite pass over the old ring, then appends into the grown
        // portion
        buffer.put(tagged_frame(3), 300);
        buffer.put(tagged_frame(4), 400);
        assert_eq!(buffer.len(), 2);

        buffer.put(tagged_frame(5), 500);
        buffer.put(tagged_frame(6), 600);
        assert_eq!(buffer.len(), 4);

        let drained = buffer.get_best_match_and_older(600);
        assert_eq!(timestamps(&drained), vec![300, 400, 500, 600]);
    }
}
