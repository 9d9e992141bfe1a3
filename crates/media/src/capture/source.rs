//! Defines the [FrameSource] trait that capture backends implement, along with
//! the errors that opening and reading from one can produce.

use std::io;

use thiserror::Error;

use super::ExposureMode;
use crate::frame::{Frame, FrameError};

/// An open capture device that produces [Frame]s.
///
/// Sources are opened and used on the capture thread, so they don't need to
/// be [Send]. A source is owned by exactly one [super::CaptureWorker] for its
/// whole life.
pub trait FrameSource {
    /// Signal the device to capture a frame, blocking until it has one.
    ///
    /// A [CaptureError::GrabFailed] error means the device stopped producing
    /// frames (e.g. it was unplugged).
    fn grab(&mut self) -> Result<(), CaptureError>;

    /// Decode the frame from the last successful [Self::grab].
    fn retrieve(&mut self) -> Result<Frame, CaptureError>;

    /// [Self::grab] then [Self::retrieve]. The two phases are kept apart so a
    /// failed trigger can be told apart from a failed decode.
    fn grab_and_retrieve(&mut self) -> Result<Frame, CaptureError> {
        self.grab()?;
        self.retrieve()
    }

    /// The frame rate the device says it's running at.
    fn nominal_frame_rate(&self) -> f64;

    /// Release the device. Called once, after the last frame is read.
    fn close(&mut self) {}
}

/// The exposure controls a device exposes while it's being opened.
pub trait ExposureControl {
    fn set_auto_exposure(&mut self, enabled: bool) -> Result<(), OpenError>;

    fn set_exposure(&mut self, value: i64) -> Result<(), OpenError>;
}

/// Apply `mode` to a device.
///
/// A fixed exposure turns auto exposure off *before* the value is set (many
/// drivers ignore the value while auto exposure is on). Automatic exposure is
/// explicitly turned back on since devices remember the last setting.
pub fn apply_exposure<C>(control: &mut C, mode: ExposureMode) -> Result<(), OpenError>
where
    C: ExposureControl + ?Sized,
{
    match mode {
        ExposureMode::Auto => control.set_auto_exposure(true),
        ExposureMode::Fixed(value) => {
            control.set_auto_exposure(false)?;
            control.set_exposure(value)
        }
    }
}

/// The capture device couldn't be opened or configured. This is fatal, the
/// worker never starts capturing.
#[derive(Error, Debug)]
pub enum OpenError {
    #[error("Camera {index} couldn't be opened: {reason}")]
    DeviceUnavailable { index: u32, reason: String },
    #[error("The camera couldn't be configured: {0}")]
    Configure(String),
    #[error("No camera backend was built into this executable.")]
    NoBackend,
    #[error("The capture thread couldn't be started: {0}")]
    Spawn(#[from] io::Error),
    #[error("The capture thread exited before opening the camera.")]
    WorkerGone,
}

/// The capture device failed while frames were being read. This ends the
/// capture loop, there is no retrying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("The camera didn't produce a frame.")]
    GrabFailed,
    #[error("The camera's frame couldn't be decoded: {0}")]
    RetrieveFailed(String),
    #[error(transparent)]
    InvalidFrame(#[from] FrameError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingControl {
        calls: Vec<String>,
        refuse_manual: bool,
    }

    impl ExposureControl for RecordingControl {
        fn set_auto_exposure(&mut self, enabled: bool) -> Result<(), OpenError> {
            self.calls.push(format!("auto={enabled}"));
            if !enabled && self.refuse_manual {
                return Err(OpenError::Configure("manual exposure".into()));
            }
            Ok(())
        }

        fn set_exposure(&mut self, value: i64) -> Result<(), OpenError> {
            self.calls.push(format!("exposure={value}"));
            Ok(())
        }
    }

    #[test]
    fn fixed_exposure_disables_auto_first() {
        let mut control = RecordingControl::default();
        apply_exposure(&mut control, ExposureMode::Fixed(-6)).unwrap();

        assert_eq!(control.calls, ["auto=false", "exposure=-6"]);
    }

    #[test]
    fn auto_exposure_is_explicitly_enabled() {
        let mut control = RecordingControl::default();
        apply_exposure(&mut control, ExposureMode::Auto).unwrap();

        assert_eq!(control.calls, ["auto=true"]);
    }

    #[test]
    fn value_is_not_set_if_auto_cant_be_disabled() {
        let mut control = RecordingControl {
            refuse_manual: true,
            ..Default::default()
        };

        assert!(matches!(
            apply_exposure(&mut control, ExposureMode::Fixed(100)),
            Err(OpenError::Configure(_))
        ));
        assert_eq!(control.calls, ["auto=false"]);
    }
}
