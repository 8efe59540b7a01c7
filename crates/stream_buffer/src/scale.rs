//! Frame resizing via the `image` crate.

use bytes::Bytes;
use contracts::{Frame, Resolution};
use image::imageops::{self, FilterType};
use image::RgbImage;
use tracing::error;

/// Resize `frame` to the dimensions implied by `resolution`
///
/// Returns the frame untouched when the dimensions already match. A
/// payload that cannot be reinterpreted as RGB8 (impossible for frames
/// built through `Frame` constructors, which enforce the length) degrades
/// to a black frame of the requested size rather than panicking, so `get`
/// always hands readers a frame of the resolution they asked for.
pub(crate) fn resize_to(frame: Frame, resolution: Resolution) -> Frame {
    let (height, width) = resolution.dimensions();
    if frame.dimensions() == (height, width) {
        return frame;
    }

    let Some(img) = RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
    else {
        error!(
            width = frame.width(),
            height = frame.height(),
            len = frame.data().len(),
            "frame payload does not match its dimensions, serving black frame"
        );
        return Frame::solid(width, height, [0, 0, 0]);
    };

    let resized = imageops::resize(&img, width, height, FilterType::Triangle);
    Frame::from_raw(width, height, Bytes::from(resized.into_raw()))
        .unwrap_or_else(|_| Frame::solid(width, height, [0, 0, 0]))
}
