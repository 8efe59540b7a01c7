//! # Contracts
//!
//! Frozen interface contracts, defining inter-crate data structures.
//! All business crates can only depend on this crate, reverse dependencies
//! are prohibited.
//!
//! ## Time Model
//! - Timestamps are signed 64-bit nanosecond counts (`TimestampNs`)
//! - A single producer is assumed to stamp frames non-decreasingly;
//!   momentary violations are detected by consumers, never fatal

mod config;
mod error;
mod frame;
mod resolution;

pub use config::*;
pub use error::PipelineError;
pub use frame::{Frame, TimestampedFrame, TimestampNs, BYTES_PER_PIXEL, NANOS_PER_DAY};
pub use resolution::Resolution;
