//! Declares the [Dimensions] type, a type that [super::Frame] depends on.

use std::fmt::{self, Display, Formatter};
use std::num::{NonZeroU32, NonZeroUsize};

/// A width and a height, both guaranteed to be non-zero.
///
/// # Example
///
/// [From<(usize, usize)>] is implemented for [Dimensions]. If either side is
/// `0`, the thread will panic. [Into::into] should really only be used if
/// you're providing the side lengths as literals (e.g. `(720, 540).into()`).
///
/// ```
/// use media::frame::Dimensions;
///
/// let d: Dimensions = (720, 540).into();
/// assert_eq!(d.width(), 720);
/// assert_eq!(d.height(), 540);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    width: NonZeroUsize,
    height: NonZeroUsize,
}

impl Dimensions {
    /// Construct from a width and a height.
    ///
    /// This function will return [None] if the width or height are 0.
    pub const fn new(width: usize, height: usize) -> Option<Self> {
        let Some(width) = NonZeroUsize::new(width) else {
            return None;
        };
        let Some(height) = NonZeroUsize::new(height) else {
            return None;
        };

        Some(Self { width, height })
    }

    /// The dimensions' width. This will never be `0`.
    pub const fn width(&self) -> usize {
        self.width.get()
    }

    /// The dimensions' height. This will never be `0`.
    pub const fn height(&self) -> usize {
        self.height.get()
    }

    /// The number of pixels in a frame with these dimensions.
    pub const fn area(&self) -> usize {
        self.width.get() * self.height.get()
    }

    /// Rescale to match a new height, rounding the width to keep the aspect
    /// ratio as close as possible. *Aspect ratio may not be exactly preserved!*
    ///
    /// [None] is returned if `new_height` is `0`. The width never rounds down
    /// to `0`.
    ///
    /// # Example
    ///
    /// ```
    /// use media::frame::Dimensions;
    ///
    /// let d: Dimensions = (1920, 1080).into();
    /// assert_eq!(d.rescale_height_rounded(540), Some((960, 540).into()));
    /// assert_eq!(d.rescale_height_rounded(721), Some((1282, 721).into()));
    /// ```
    pub fn rescale_height_rounded(&self, new_height: usize) -> Option<Self> {
        let new_width =
            (((self.width.get() * new_height) as f64 / self.height.get() as f64).round() as usize)
                .max(1);
        Self::new(new_width, new_height)
    }

    /// Shrink both sides by an integer `factor`. Neither side ever shrinks
    /// below `1`.
    ///
    /// # Example
    ///
    /// ```
    /// use std::num::NonZeroU32;
    /// use media::frame::Dimensions;
    ///
    /// let d: Dimensions = (720, 540).into();
    /// let factor = NonZeroU32::new(2).unwrap();
    /// assert_eq!(d.shrink_by(factor), (360, 270).into());
    /// ```
    pub fn shrink_by(&self, factor: NonZeroU32) -> Self {
        let factor = factor.get() as usize;
        Self {
            width: NonZeroUsize::new(self.width.get() / factor).unwrap_or(NonZeroUsize::MIN),
            height: NonZeroUsize::new(self.height.get() / factor).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

/// When displayed, [Dimensions] will look like `W x H` (e.g. `720 x 540`).
impl Display for Dimensions {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {}", self.width, self.height)
    }
}

/// If either side is `0`, the thread will panic. [Into::into] should really
/// only be used if you're providing the side lengths as literals (e.g.
/// `(720, 540).into()`).
impl From<(usize, usize)> for Dimensions {
    fn from(dimensions: (usize, usize)) -> Self {
        Self::new(dimensions.0, dimensions.1).expect("Both sides must be non-zero.")
    }
}

impl From<Dimensions> for (usize, usize) {
    fn from(dimensions: Dimensions) -> Self {
        (dimensions.width(), dimensions.height())
    }
}
