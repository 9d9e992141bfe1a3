//! This module declares the [Frame] type (one captured image) along with the
//! [Dimensions] and [PixelLayout] types that describe it.

mod dimensions;
mod layout;

use std::fmt::{self, Debug, Formatter};

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Pixel, Rgb, Rgba};
use thiserror::Error;

pub use dimensions::*;
pub use layout::*;

/// An owned buffer of pixel data along with its [Dimensions] and
/// [PixelLayout]. Frames are immutable once they're produced.
///
/// The buffer's length always matches its dimensions and layout (see
/// [Self::new]).
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    dimensions: Dimensions,
    layout: PixelLayout,
    data: Box<[u8]>,
}

impl Frame {
    /// Create a frame from raw pixel `data`.
    ///
    /// An error is returned if `data` isn't exactly as long as a frame with
    /// these `dimensions` and this `layout` should be.
    pub fn new(
        dimensions: Dimensions,
        layout: PixelLayout,
        data: impl Into<Box<[u8]>>,
    ) -> Result<Self, FrameError> {
        let data = data.into();
        let expected = dimensions.area() * layout.bytes_per_pixel();

        if data.len() != expected {
            return Err(FrameError::UnexpectedLength {
                dimensions,
                layout,
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            dimensions,
            layout,
            data,
        })
    }

    /// Create a frame where every pixel is `pixel`.
    ///
    /// If `pixel` isn't [PixelLayout::bytes_per_pixel] bytes long, this
    /// function will panic.
    pub fn from_fill(dimensions: Dimensions, layout: PixelLayout, pixel: &[u8]) -> Self {
        assert_eq!(
            pixel.len(),
            layout.bytes_per_pixel(),
            "The fill pixel must match the layout."
        );

        Self {
            dimensions,
            layout,
            data: pixel.repeat(dimensions.area()).into_boxed_slice(),
        }
    }

    /// The frame's width and height.
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// How the frame's bytes are ordered.
    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    /// The frame's raw pixel data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Shrink the frame so it's exactly `target_height` pixels tall, keeping
    /// the aspect ratio (the width is rounded).
    ///
    /// Frames that are already `target_height` pixels tall or shorter are
    /// returned unchanged. Frames are never scaled up.
    pub fn downscale_to_height(self, target_height: usize) -> Self {
        if target_height == 0 || target_height >= self.dimensions.height() {
            return self;
        }

        match self.dimensions.rescale_height_rounded(target_height) {
            Some(dimensions) => self.resized(dimensions, FilterType::Triangle),
            None => self,
        }
    }

    /// A copy of this frame resized to `dimensions` using `filter`.
    pub(crate) fn resized(&self, dimensions: Dimensions, filter: FilterType) -> Self {
        if dimensions == self.dimensions {
            return self.clone();
        }

        let data = match self.layout {
            // The resize filters treat every channel the same way, so the
            // channel order doesn't matter here.
            PixelLayout::Bgr24 | PixelLayout::Rgb24 => {
                resize_pixels::<Rgb<u8>>(&self.data, self.dimensions, dimensions, filter)
            }
            PixelLayout::Rgba32 => {
                resize_pixels::<Rgba<u8>>(&self.data, self.dimensions, dimensions, filter)
            }
        };

        Self {
            dimensions,
            layout: self.layout,
            data: data.into_boxed_slice(),
        }
    }
}

/// Frames hold a lot of data, so the pixels are left out.
impl Debug for Frame {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("dimensions", &self.dimensions)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

/// Something was wrong with the data a [Frame] was created from.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameError {
    #[error("Expected {expected} bytes for a {dimensions} {layout} frame but got {actual}.")]
    UnexpectedLength {
        dimensions: Dimensions,
        layout: PixelLayout,
        expected: usize,
        actual: usize,
    },
}

fn resize_pixels<P>(data: &[u8], from: Dimensions, to: Dimensions, filter: FilterType) -> Vec<u8>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let source = ImageBuffer::<P, &[u8]>::from_raw(from.width() as u32, from.height() as u32, data)
        .expect("A frame's data length always matches its dimensions.");

    imageops::resize(&source, to.width() as u32, to.height() as u32, filter).into_raw()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_length_is_rejected() {
        let dimensions: Dimensions = (4, 2).into();

        assert!(Frame::new(dimensions, PixelLayout::Bgr24, vec![0; 24]).is_ok());
        assert_eq!(
            Frame::new(dimensions, PixelLayout::Bgr24, vec![0; 23]),
            Err(FrameError::UnexpectedLength {
                dimensions,
                layout: PixelLayout::Bgr24,
                expected: 24,
                actual: 23,
            })
        );
    }

    #[test]
    fn downscale_hits_target_height_and_keeps_aspect() {
        let frame = Frame::from_fill((1280, 960).into(), PixelLayout::Bgr24, &[10, 20, 30]);
        let scaled = frame.downscale_to_height(540);

        assert_eq!(scaled.dimensions(), (720, 540).into());
        assert_eq!(scaled.data().len(), 720 * 540 * 3);
        assert_eq!(scaled.layout(), PixelLayout::Bgr24);
    }

    #[test]
    fn downscale_rounds_odd_aspect_ratios() {
        let frame = Frame::from_fill((641, 481).into(), PixelLayout::Rgb24, &[0, 0, 0]);
        let scaled = frame.downscale_to_height(240);

        assert_eq!(scaled.dimensions().height(), 240);
        let expected_width = 641.0 * 240.0 / 481.0;
        assert!((scaled.dimensions().width() as f64 - expected_width).abs() <= 0.5);
    }

    #[test]
    fn short_frames_are_not_upscaled() {
        let frame = Frame::from_fill((320, 240).into(), PixelLayout::Bgr24, &[1, 2, 3]);
        let same = frame.clone().downscale_to_height(540);

        assert_eq!(same, frame);
    }

    #[test]
    fn solid_colors_survive_resizing() {
        let frame = Frame::from_fill((8, 8).into(), PixelLayout::Rgba32, &[9, 8, 7, 255]);
        let scaled = frame.resized((4, 4).into(), FilterType::CatmullRom);

        assert!(scaled.data().chunks_exact(4).all(|p| p == [9, 8, 7, 255]));
    }
}
