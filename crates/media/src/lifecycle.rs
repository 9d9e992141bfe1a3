//! Contains [LifecycleController], which ties the capture thread's life to the
//! application's.

use util::channels::bounded_channel::Putter;
use util::channels::latest_channel::LatestWriter;

use crate::capture::{
    CaptureConfig, CaptureWorker, FrameSource, MetricSample, OpenError, RunFlag, WorkerReport,
    WorkerState,
};
use crate::frame::Frame;

/// Starts the [CaptureWorker] and makes sure it has fully exited (releasing
/// the device) before the application does.
///
/// The controller is the only writer of the [RunFlag]. The flag is cleared
/// once and never set again. Dropping the controller stops and joins the
/// worker too, so the device can't outlive it.
#[derive(Debug)]
pub struct LifecycleController {
    run_flag: RunFlag,
    worker: Option<CaptureWorker>,
}

impl LifecycleController {
    /// Create the [RunFlag] and start capturing. Blocks until the source has
    /// been opened, failing with the source's [OpenError] if it can't be.
    pub fn start<S, F>(
        config: CaptureConfig,
        open: F,
        frames: Putter<Frame>,
        metrics: LatestWriter<MetricSample>,
    ) -> Result<Self, OpenError>
    where
        S: FrameSource,
        F: FnOnce(&CaptureConfig) -> Result<S, OpenError> + Send + 'static,
    {
        let run_flag = RunFlag::new();
        let worker = CaptureWorker::start(config, run_flag.clone(), open, frames, metrics)?;

        Ok(Self {
            run_flag,
            worker: Some(worker),
        })
    }

    /// Ask the worker to stop without waiting for it. The worker notices
    /// within one capture iteration.
    pub fn request_stop(&self) {
        if self.run_flag.is_set() {
            util::debug_log_info!("Stopping capture...");
        }
        self.run_flag.clear();
    }

    /// Whether [Self::request_stop] (or [Self::shutdown]) has been called.
    pub fn stop_requested(&self) -> bool {
        !self.run_flag.is_set()
    }

    /// Where the worker currently is in its life.
    pub fn worker_state(&self) -> WorkerState {
        self.worker
            .as_ref()
            .map_or(WorkerState::Stopped, CaptureWorker::state)
    }

    /// Stop the worker and wait for it to exit. Once this returns the device
    /// has been released.
    ///
    /// A capture call that's in progress is never interrupted, so this can
    /// take up to one device round trip.
    pub fn shutdown(mut self) -> WorkerReport {
        self.request_stop();
        self.worker
            .take()
            .expect("The worker is only taken on shutdown.")
            .join()
    }
}

impl Drop for LifecycleController {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.run_flag.clear();
            worker.join();
        }
    }
}
