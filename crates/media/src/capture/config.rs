//! Contains [CaptureConfig], the settings a [super::FrameSource] is opened
//! with.

use std::time::Duration;

use crate::frame::Dimensions;

/// The capture resolution requested when nothing else is asked for.
pub const DEFAULT_RESOLUTION: Dimensions = match Dimensions::new(720, 540) {
    Some(dimensions) => dimensions,
    None => panic!("The default resolution is non-zero."),
};

/// How often the display polls for new frames by default (~60 Hz).
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(16);

/// The settings a capture device is opened and driven with. Built once at
/// startup and never changed after the [super::CaptureWorker] starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Which camera to open (`0` is the first one).
    pub device_index: u32,
    /// The resolution to ask the device for. The device may pick the closest
    /// one it supports.
    pub resolution: Dimensions,
    pub exposure: ExposureMode,
    pub api: CaptureApi,
    /// Frames taller than this are shrunk (keeping their aspect ratio) before
    /// they're handed to the display.
    pub target_height: usize,
    /// How long the worker sleeps after a frame is dropped because the display
    /// hasn't caught up. One display tick is a good value.
    pub admission_backoff: Duration,
    pub frame_rate_source: FrameRateSource,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            resolution: DEFAULT_RESOLUTION,
            exposure: ExposureMode::Auto,
            api: CaptureApi::Any,
            target_height: DEFAULT_RESOLUTION.height(),
            admission_backoff: DEFAULT_TICK_INTERVAL,
            frame_rate_source: FrameRateSource::Measured,
        }
    }
}

/// How the device should pick its exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExposureMode {
    /// Let the device decide.
    #[default]
    Auto,
    /// Turn auto exposure off and use this (device specific) value.
    Fixed(i64),
}

impl ExposureMode {
    /// `0` means automatic exposure, anything else is a fixed value.
    pub fn from_value(value: i64) -> Self {
        if value == 0 {
            Self::Auto
        } else {
            Self::Fixed(value)
        }
    }
}

/// Which capture API the backend should prefer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaptureApi {
    /// Whatever the platform defaults to.
    #[default]
    Any,
    V4l2,
    MediaFoundation,
    AvFoundation,
}

/// Where the frame rate shown on the overlay comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrameRateSource {
    /// Measured from how often frames actually arrive.
    #[default]
    Measured,
    /// Whatever rate the device says it's running at.
    Nominal,
}
