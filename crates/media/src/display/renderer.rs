//! Contains [render], which converts captured frames into something the
//! display surface can draw.

use std::num::NonZeroU32;

use image::imageops::FilterType;

use crate::frame::{Dimensions, Frame};

/// A frame converted to the display's native layout (RGBA, 8 bits per
/// channel, unmultiplied alpha) and ready to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayableImage {
    dimensions: Dimensions,
    rgba: Vec<u8>,
}

impl DisplayableImage {
    /// The image's width and height.
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// `[width, height]`, the shape most image upload APIs ask for.
    pub fn size(&self) -> [usize; 2] {
        [self.dimensions.width(), self.dimensions.height()]
    }

    /// The image's RGBA pixels.
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }
}

/// Convert `frame` for display, shrinking it by `scale` first if `scale` is
/// greater than `1` (with a smooth filter, never below 1x1 pixels).
pub fn render(frame: &Frame, scale: NonZeroU32) -> DisplayableImage {
    let scaled;
    let frame = if scale.get() > 1 {
        scaled = frame.resized(frame.dimensions().shrink_by(scale), FilterType::CatmullRom);
        &scaled
    } else {
        frame
    };

    DisplayableImage {
        dimensions: frame.dimensions(),
        rgba: frame.layout().to_rgba(frame.data()),
    }
}
