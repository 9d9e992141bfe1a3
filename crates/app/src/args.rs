//! Contains [Args], which are parsed command-line flags, and the conversions
//! from them into the pipeline's configuration.

use std::num::NonZeroU32;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use thiserror::Error;

use media::capture::{CaptureApi, CaptureConfig, ExposureMode, FrameRateSource};
use media::display::DisplayConfig;
use media::frame::Dimensions;

/// Parsed command line arguments.
#[derive(Parser, Debug, Clone, PartialEq, Eq, Hash)]
#[command(about = "Shows a live camera feed in a full-screen window.")]
pub struct Args {
    // Kept as text (and allowed to start with `-`) so a bad value gets the
    // same error no matter what it looks like (see `Args::camera_number`).
    /// Which camera to show, starting from 1.
    #[arg(allow_hyphen_values = true)]
    pub camera: Option<String>,

    /// The capture width to ask the camera for.
    #[arg(long, default_value_t = 720, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: u32,

    /// The capture height to ask the camera for. Taller frames are shrunk to
    /// this height before they're shown.
    #[arg(long, default_value_t = 540, value_parser = clap::value_parser!(u32).range(1..))]
    pub height: u32,

    /// Shrink the image by this factor before it's shown.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub scale: u32,

    /// How often the display checks for new frames, in milliseconds.
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,

    /// Which capture API to prefer.
    #[arg(long, value_enum, default_value_t = Backend::Any)]
    pub backend: Backend,

    /// The camera's exposure. `0` lets the camera decide, anything else is
    /// passed to the camera as a fixed value.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub exposure: i64,

    /// Where the frame rate on the overlay comes from.
    #[arg(long, value_enum, default_value_t = FpsSource::Measured)]
    pub fps_source: FpsSource,

    #[cfg(debug_assertions)]
    /// Disable debug logging. This option only exists if `debug_assertions` are
    /// enabled.
    #[arg(long)]
    pub no_debug_logging: bool,

    #[cfg(debug_assertions)]
    /// Enable debug error log panics. This option only exists if
    /// `debug_assertions` are enabled.
    #[arg(long, conflicts_with = "no_debug_logging")]
    pub debug_error_log_panics: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self::parse()
    }
}

impl Args {
    /// The camera number the user asked for (`1` if they didn't ask).
    ///
    /// Only positive whole numbers are valid.
    pub fn camera_number(&self) -> Result<u32, ArgsError> {
        let Some(camera) = &self.camera else {
            return Ok(1);
        };

        match camera.trim().parse::<u32>() {
            Ok(number) if number > 0 => Ok(number),
            _ => Err(ArgsError::InvalidCameraNumber(camera.clone())),
        }
    }

    /// The capture settings these arguments describe.
    pub fn capture_config(&self) -> Result<CaptureConfig, ArgsError> {
        let resolution = Dimensions::new(self.width as usize, self.height as usize)
            .ok_or(ArgsError::EmptyResolution)?;

        Ok(CaptureConfig {
            device_index: self.camera_number()? - 1,
            resolution,
            exposure: ExposureMode::from_value(self.exposure),
            api: self.backend.into(),
            target_height: resolution.height(),
            admission_backoff: self.tick_interval(),
            frame_rate_source: self.fps_source.into(),
        })
    }

    /// The display settings these arguments describe.
    pub fn display_config(&self) -> Result<DisplayConfig, ArgsError> {
        Ok(DisplayConfig {
            scale: NonZeroU32::new(self.scale).ok_or(ArgsError::ZeroScale)?,
            tick_interval: self.tick_interval(),
        })
    }

    fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

/// A capture API to prefer.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Whatever the platform defaults to.
    Any,
    /// Video4Linux2 (Linux).
    V4l2,
    /// Media Foundation (Windows).
    MediaFoundation,
    /// AVFoundation (macOS).
    AvFoundation,
}

impl From<Backend> for CaptureApi {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Any => Self::Any,
            Backend::V4l2 => Self::V4l2,
            Backend::MediaFoundation => Self::MediaFoundation,
            Backend::AvFoundation => Self::AvFoundation,
        }
    }
}

/// Where the overlay's frame rate comes from.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FpsSource {
    /// Measured from how often frames actually arrive.
    Measured,
    /// What the camera says it's running at.
    Nominal,
}

impl From<FpsSource> for FrameRateSource {
    fn from(source: FpsSource) -> Self {
        match source {
            FpsSource::Measured => Self::Measured,
            FpsSource::Nominal => Self::Nominal,
        }
    }
}

/// Arguments that parsed but don't make sense.
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArgsError {
    #[error("Invalid camera number '{0}'")]
    InvalidCameraNumber(String),
    #[error("The capture resolution can't be empty.")]
    EmptyResolution,
    #[error("The display scale must be at least 1.")]
    ZeroScale,
}
