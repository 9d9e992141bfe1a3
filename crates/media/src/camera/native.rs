//! [NativeCamera], a [FrameSource] backed by `nokhwa`.

use nokhwa::Camera;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    ApiBackend, CameraFormat, CameraIndex, ControlValueSetter, FrameFormat, KnownCameraControl,
    RequestedFormat, RequestedFormatType, Resolution,
};
use nokhwa::{Buffer, NokhwaError};

use crate::capture::{
    CaptureApi, CaptureConfig, CaptureError, ExposureControl, FrameSource, OpenError,
    apply_exposure,
};
use crate::frame::{Dimensions, Frame, PixelLayout};

/// The frame rate asked for when opening a camera. The closest supported rate
/// is used.
const REQUESTED_FRAME_RATE: u32 = 30;

/// V4L2's `V4L2_CID_EXPOSURE_AUTO` control. `nokhwa` has no named control for
/// it.
const V4L2_EXPOSURE_AUTO: u128 = 0x009a_0901;
const V4L2_EXPOSURE_MANUAL: i64 = 1;
const V4L2_EXPOSURE_APERTURE_PRIORITY: i64 = 3;

/// A camera opened through `nokhwa`, decoding every frame to
/// [PixelLayout::Rgb24].
pub struct NativeCamera {
    camera: Camera,
    index: u32,
    grabbed: Option<Buffer>,
}

impl NativeCamera {
    /// Open the camera, apply the requested resolution and exposure, then
    /// start streaming.
    pub fn open(config: &CaptureConfig) -> Result<Self, OpenError> {
        let index = config.device_index;
        let unavailable = |e: NokhwaError| OpenError::DeviceUnavailable {
            index,
            reason: e.to_string(),
        };

        let resolution = Resolution::new(
            config.resolution.width() as u32,
            config.resolution.height() as u32,
        );
        let format = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            CameraFormat::new(resolution, FrameFormat::MJPEG, REQUESTED_FRAME_RATE),
        ));

        let camera = Camera::with_backend(CameraIndex::Index(index), format, backend(config.api))
            .map_err(unavailable)?;

        let mut this = Self {
            camera,
            index,
            grabbed: None,
        };
        apply_exposure(&mut this, config.exposure)?;
        this.camera.open_stream().map_err(unavailable)?;

        util::debug_log_info!(
            "Opened camera {index} ({}) at {} ({} FPS).",
            this.camera.info().human_name(),
            this.camera.resolution(),
            this.camera.frame_rate(),
        );

        Ok(this)
    }
}

impl FrameSource for NativeCamera {
    fn grab(&mut self) -> Result<(), CaptureError> {
        match self.camera.frame() {
            Ok(buffer) => {
                self.grabbed = Some(buffer);
                Ok(())
            }
            Err(e) => {
                util::debug_log_warning!("Camera {} didn't produce a frame: {e}", self.index);
                Err(CaptureError::GrabFailed)
            }
        }
    }

    fn retrieve(&mut self) -> Result<Frame, CaptureError> {
        let buffer = self
            .grabbed
            .take()
            .ok_or_else(|| CaptureError::RetrieveFailed("No frame was grabbed.".into()))?;

        let image = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CaptureError::RetrieveFailed(e.to_string()))?;

        let dimensions = Dimensions::new(image.width() as usize, image.height() as usize)
            .ok_or_else(|| CaptureError::RetrieveFailed("The frame was empty.".into()))?;

        Ok(Frame::new(dimensions, PixelLayout::Rgb24, image.into_raw())?)
    }

    fn nominal_frame_rate(&self) -> f64 {
        self.camera.frame_rate() as f64
    }

    fn close(&mut self) {
        if let Err(e) = self.camera.stop_stream() {
            util::debug_log_warning!("Failed to stop camera {} (ignoring): {e}", self.index);
        }
    }
}

impl ExposureControl for NativeCamera {
    fn set_auto_exposure(&mut self, enabled: bool) -> Result<(), OpenError> {
        let mode = if enabled {
            V4L2_EXPOSURE_APERTURE_PRIORITY
        } else {
            V4L2_EXPOSURE_MANUAL
        };

        match self.camera.set_camera_control(
            KnownCameraControl::Other(V4L2_EXPOSURE_AUTO),
            ControlValueSetter::Integer(mode),
        ) {
            Ok(()) => Ok(()),
            // Not every driver has the control. Those that don't are already
            // picking their own exposure.
            Err(e) if enabled => {
                util::debug_log_warning!("Couldn't enable auto exposure (ignoring): {e}");
                Ok(())
            }
            Err(e) => Err(OpenError::Configure(format!(
                "auto exposure couldn't be disabled ({e})"
            ))),
        }
    }

    fn set_exposure(&mut self, value: i64) -> Result<(), OpenError> {
        self.camera
            .set_camera_control(KnownCameraControl::Exposure, ControlValueSetter::Integer(value))
            .map_err(|e| OpenError::Configure(format!("exposure couldn't be set to {value} ({e})")))
    }
}

fn backend(api: CaptureApi) -> ApiBackend {
    match api {
        CaptureApi::Any => ApiBackend::Auto,
        CaptureApi::V4l2 => ApiBackend::Video4Linux,
        CaptureApi::MediaFoundation => ApiBackend::MediaFoundation,
        CaptureApi::AvFoundation => ApiBackend::AVFoundation,
    }
}
