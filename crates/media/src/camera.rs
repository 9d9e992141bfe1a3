//! The real camera backend. [open_camera] opens the [Camera] a
//! [CaptureConfig] asks for.
//!
//! Cameras are only available when the `camera` feature is enabled. Without
//! it, [Camera] has no values and [open_camera] always fails with
//! [OpenError::NoBackend].

#[cfg(feature = "camera")]
mod native;

use crate::capture::{CaptureConfig, OpenError};

#[cfg(feature = "camera")]
pub use native::NativeCamera as Camera;

/// Stands in for a camera when no backend was built in. It can never be
/// constructed.
#[cfg(not(feature = "camera"))]
#[derive(Debug)]
pub enum Camera {}

#[cfg(not(feature = "camera"))]
impl crate::capture::FrameSource for Camera {
    fn grab(&mut self) -> Result<(), crate::capture::CaptureError> {
        match *self {}
    }

    fn retrieve(&mut self) -> Result<crate::frame::Frame, crate::capture::CaptureError> {
        match *self {}
    }

    fn nominal_frame_rate(&self) -> f64 {
        match *self {}
    }
}

/// Open, configure, and start streaming from the camera `config` describes.
///
/// Has to be called on the thread that will read from the camera (some
/// platforms' camera handles can't be moved between threads).
pub fn open_camera(config: &CaptureConfig) -> Result<Camera, OpenError> {
    #[cfg(feature = "camera")]
    {
        Camera::open(config)
    }

    #[cfg(not(feature = "camera"))]
    {
        util::debug_log_warning!(
            "Camera {} requested but this build has no camera backend.",
            config.device_index
        );
        _ = config;
        Err(OpenError::NoBackend)
    }
}

#[cfg(all(test, not(feature = "camera")))]
mod tests {
    use super::*;

    #[test]
    fn missing_backend_is_an_open_error() {
        assert!(matches!(
            open_camera(&CaptureConfig::default()),
            Err(OpenError::NoBackend)
        ));
    }
}
