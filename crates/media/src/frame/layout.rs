//! Declares [PixelLayout], how the bytes of a [super::Frame] are ordered.

use std::fmt::{self, Display, Formatter};

/// The order and number of the channels in a frame's pixels. Every layout is 8
/// bits per channel, interleaved, with rows packed tightly (no padding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelLayout {
    /// Blue, green, red. What most capture drivers hand out natively.
    Bgr24,
    /// Red, green, blue.
    Rgb24,
    /// Red, green, blue, alpha. What the display surface expects.
    Rgba32,
}

impl PixelLayout {
    /// The number of bytes a single pixel takes up.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Bgr24 | Self::Rgb24 => 3,
            Self::Rgba32 => 4,
        }
    }

    /// Convert pixel `data` in this layout to [PixelLayout::Rgba32]. Alpha is
    /// always fully opaque for layouts without an alpha channel.
    ///
    /// Trailing bytes that don't make up a whole pixel are ignored.
    pub fn to_rgba(self, data: &[u8]) -> Vec<u8> {
        let pixels = data.chunks_exact(self.bytes_per_pixel());
        let mut rgba = Vec::with_capacity(pixels.len() * 4);

        match self {
            Self::Bgr24 => pixels.for_each(|p| rgba.extend_from_slice(&[p[2], p[1], p[0], 0xFF])),
            Self::Rgb24 => pixels.for_each(|p| rgba.extend_from_slice(&[p[0], p[1], p[2], 0xFF])),
            Self::Rgba32 => pixels.for_each(|p| rgba.extend_from_slice(p)),
        }

        rgba
    }
}

impl Display for PixelLayout {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bgr24 => "BGR24",
            Self::Rgb24 => "RGB24",
            Self::Rgba32 => "RGBA32",
        })
    }
}
