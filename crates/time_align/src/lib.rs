//! # Time Align
//!
//! Timestamp-indexed frame ring for aligning buffered frames with
//! asynchronously-arriving inference results.
//!
//! The producer `put`s every captured frame with its timestamp; when an
//! inference completes, the coordinator asks for the buffered frame whose
//! timestamp best matches the inference's capture timestamp, and receives
//! that frame together with everything older, removed from the buffer in
//! a single call. Intermediate frames can then be annotated with the same
//! result and forwarded, so the stream "catches up" after a slow
//! inference.
//!
//! When inference latency exceeds the ring's retained time span, the ring
//! doubles its logical capacity instead of failing (backpressure growth);
//! it never shrinks back.
//!
//! ## Usage
//!
//! ```ignore
//! use contracts::{AlignBufferConfig, TimestampedFrame};
//! use time_align::TimeAlignedBuffer;
//!
//! let mut buffer = TimeAlignedBuffer::new(
//!     AlignBufferConfig::default(),
//!     TimestampedFrame::new(placeholder, 0),
//! );
//!
//! buffer.put(frame, timestamp_ns);
//!
//! // Later, when an inference stamped `ts` completes:
//! for aligned in buffer.get_best_match_and_older(ts) {
//!     // annotate and forward
//! }
//! ```
//!
//! The buffer performs no internal synchronization: it is designed for
//! exclusive ownership by a single coordinating task. Wrap it in external
//! mutual exclusion if that ever changes.

mod buffer;

pub use buffer::TimeAlignedBuffer;
