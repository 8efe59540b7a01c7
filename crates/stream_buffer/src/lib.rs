//! # Stream Buffer
//!
//! Rate-adaptive single-slot frame cache feeding a streaming sink from a
//! frame producer.
//!
//! The producer `put`s frames into a bounded queue together with their
//! capture timestamps; a private refresh task drains the queue at the
//! producer's self-measured rate and republishes the most recent frame as
//! the cached "current frame". Readers call `get` and only ever touch the
//! cache, so they never stall behind a slow or bursty producer.
//!
//! ## Usage
//!
//! ```ignore
//! use contracts::{Resolution, StreamBufferConfig};
//! use stream_buffer::StreamBuffer;
//!
//! let buffer = StreamBuffer::new(StreamBufferConfig::default());
//!
//! buffer.put(frame, timestamp_ns).await?;
//! let current = buffer.get(Resolution::Hd);
//!
//! buffer.shutdown().await;
//! ```

mod buffer;
mod rate;
mod scale;

pub use buffer::StreamBuffer;
