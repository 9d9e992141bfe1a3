//! Contains [CaptureWorker], which drives a [FrameSource] on a dedicated thread
//! so the blocking capture call never stalls the UI.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::thread;
use std::time::Instant;

use util::channels::bounded_channel::Putter;
use util::channels::latest_channel::{self, LatestWriter};
use util::drop_join_thread::{self, DropJoinHandle};

use super::*;
use crate::frame::Frame;

/// A shared "capturing is active" flag. It starts set and is cleared exactly
/// once to ask the [CaptureWorker] to stop. It's never set again.
///
/// Only the [LifecycleController](crate::lifecycle::LifecycleController)
/// clears the flag. The worker only reads it, once per capture iteration.
#[derive(Debug, Clone)]
pub struct RunFlag(Arc<AtomicBool>);

impl RunFlag {
    /// Create a flag that is set.
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    /// Whether capturing should continue.
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Ask the worker to stop. Clearing an already cleared flag does nothing.
    pub fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for RunFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a [CaptureWorker] is in its life: `Idle → Running → Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WorkerState {
    /// The source hasn't been opened yet (or failed to open).
    Idle,
    /// The source is open and frames are being captured.
    Running,
    /// The loop exited and the source was released.
    Stopped,
}

impl WorkerState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Running,
            _ => Self::Stopped,
        }
    }
}

/// Why a [CaptureWorker]'s loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerExit {
    /// The [RunFlag] was cleared.
    StopRequested,
    /// The device failed. There is no reconnecting, the display just keeps
    /// showing the last frame.
    DeviceError(CaptureError),
    /// The display side dropped its end of a channel.
    PeerDisconnected,
}

impl Display for WorkerExit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::StopRequested => write!(f, "stop requested"),
            Self::DeviceError(e) => write!(f, "device error: {e}"),
            Self::PeerDisconnected => write!(f, "display disconnected"),
        }
    }
}

/// What a [CaptureWorker] did before it stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    pub exit: WorkerExit,
    /// Frames read from the device.
    pub captured: usize,
    /// Frames thrown away because the display hadn't caught up.
    pub dropped: usize,
}

/// Owns the capture thread. The thread owns the [FrameSource] for its whole
/// life, so the device is released before [Self::join] returns.
///
/// Dropping the worker without clearing its [RunFlag] first will block
/// forever (the thread is joined on drop).
#[derive(Debug)]
pub struct CaptureWorker {
    state: Arc<AtomicU8>,
    thread: DropJoinHandle<Option<WorkerReport>>,
}

impl CaptureWorker {
    /// Start a capture thread that opens a source with `open` and then
    /// captures frames into `frames` until `run_flag` is cleared.
    ///
    /// This blocks until the source has been opened. If `open` fails, its
    /// error is returned here and nothing is captured.
    pub fn start<S, F>(
        config: CaptureConfig,
        run_flag: RunFlag,
        open: F,
        frames: Putter<Frame>,
        metrics: LatestWriter<MetricSample>,
    ) -> Result<Self, OpenError>
    where
        S: FrameSource,
        F: FnOnce(&CaptureConfig) -> Result<S, OpenError> + Send + 'static,
    {
        let state = Arc::new(AtomicU8::new(WorkerState::Idle as u8));
        let (opened, opened_writer) = latest_channel::new::<Result<(), OpenError>>();

        let thread = drop_join_thread::spawn_named("capture", {
            let state = state.clone();
            move || {
                let source = match open(&config) {
                    Ok(source) => source,
                    Err(e) => {
                        _ = opened_writer.put(Err(e));
                        return None;
                    }
                };

                state.store(WorkerState::Running as u8, Ordering::Release);
                _ = opened_writer.put(Ok(()));
                drop(opened_writer);

                let report = capture_loop(source, &config, &run_flag, &frames, &metrics);
                state.store(WorkerState::Stopped as u8, Ordering::Release);
                Some(report)
            }
        })?;

        match opened.wait() {
            Ok(Ok(())) => Ok(Self { state, thread }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(OpenError::WorkerGone),
        }
    }

    /// Where the worker currently is in its life.
    pub fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Whether the capture thread has exited.
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the capture thread to exit. Clear the worker's [RunFlag]
    /// first, otherwise this only returns once the device fails.
    pub fn join(self) -> WorkerReport {
        self.thread
            .join()
            .expect(THREAD_PANIC_MSG)
            .expect("A started worker always has an open source.")
    }
}

const THREAD_PANIC_MSG: &str = "The capture thread shouldn't panic.";

fn capture_loop<S: FrameSource>(
    mut source: S,
    config: &CaptureConfig,
    run_flag: &RunFlag,
    frames: &Putter<Frame>,
    metrics: &LatestWriter<MetricSample>,
) -> WorkerReport {
    let mut meter = FpsMeter::default();
    let mut captured = 0;
    let mut dropped = 0;

    util::debug_log_info!("Capturing from camera {}.", config.device_index);

    let exit = loop {
        if !run_flag.is_set() {
            break WorkerExit::StopRequested;
        }

        let frame = match source.grab_and_retrieve() {
            Ok(frame) => frame,
            Err(e) => {
                util::debug_log_error!("Capture failed (stopping): {e}");
                break WorkerExit::DeviceError(e);
            }
        };

        let arrived = Instant::now();
        meter.record(arrived);
        captured += 1;

        if captured == 1 {
            util::debug_log_info!("First frame is {} ({}).", frame.dimensions(), frame.layout());
        }

        // Checking for room first means frames that would be dropped anyway
        // aren't downscaled.
        if frames.has_room() {
            if !frames.try_put(frame.downscale_to_height(config.target_height)) {
                break WorkerExit::PeerDisconnected;
            }
        } else {
            dropped += 1;
            drop(frame);
            thread::sleep(config.admission_backoff);
        }

        let fps = match config.frame_rate_source {
            FrameRateSource::Measured => meter.rate().unwrap_or_else(|| source.nominal_frame_rate()),
            FrameRateSource::Nominal => source.nominal_frame_rate(),
        };

        if metrics.put(MetricSample::new(fps, Some(arrived))).is_err() || frames.connection_closed()
        {
            break WorkerExit::PeerDisconnected;
        }
    };

    source.close();
    drop(source);

    util::debug_log_info!("Capture stopped ({exit}): {captured} captured, {dropped} dropped.");

    WorkerReport {
        exit,
        captured,
        dropped,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::time::Duration;

    use util::channels::bounded_channel;

    use super::*;
    use crate::frame::PixelLayout;
    use crate::testing::ScriptedSource;

    fn test_config() -> CaptureConfig {
        CaptureConfig {
            admission_backoff: Duration::from_millis(1),
            frame_rate_source: FrameRateSource::Nominal,
            ..Default::default()
        }
    }

    #[test]
    fn unpolled_channel_keeps_two_frames_and_latest_metric() {
        let (taker, putter) = bounded_channel::new(FRAME_CHANNEL_CAPACITY);
        let (reader, writer) = latest_channel::new();
        let source = ScriptedSource::new(5);

        let worker =
            CaptureWorker::start(test_config(), RunFlag::new(), |_| Ok(source), putter, writer)
                .unwrap();
        let report = worker.join();

        assert_eq!(report.exit, WorkerExit::DeviceError(CaptureError::GrabFailed));
        assert_eq!(report.captured, 5);
        assert_eq!(report.dropped, 3);
        assert_eq!(taker.pending(), 2);
        // The scripted source reports how many frames it served as its rate.
        assert_eq!(reader.try_take().map(|s| s.fps()), Some(5.0));
        assert_eq!(reader.try_take(), None);
    }

    #[test]
    fn tall_frames_are_shrunk_before_they_are_queued() {
        let (taker, putter) = bounded_channel::new(FRAME_CHANNEL_CAPACITY);
        let (_reader, writer) = latest_channel::new();
        let tall = Frame::from_fill((20, 12).into(), PixelLayout::Bgr24, &[10, 20, 30]);
        let source = ScriptedSource::serving(tall, 1);
        let config = CaptureConfig {
            target_height: 5,
            ..test_config()
        };

        let worker = CaptureWorker::start(config, RunFlag::new(), |_| Ok(source), putter, writer)
            .unwrap();
        worker.join();

        let queued = taker.try_take().unwrap();
        // 20 * 5 / 12 = 8.33, rounded to 8.
        assert_eq!(queued.dimensions(), (8, 5).into());
        assert_eq!(queued.layout(), PixelLayout::Bgr24);
        assert_eq!(queued.data().len(), 8 * 5 * 3);
        assert!(queued.data().chunks_exact(3).all(|p| p == [10, 20, 30]));
    }

    #[test]
    fn short_frames_are_queued_unchanged() {
        let (taker, putter) = bounded_channel::new(FRAME_CHANNEL_CAPACITY);
        let (_reader, writer) = latest_channel::new();
        let frame = Frame::from_fill((8, 6).into(), PixelLayout::Rgb24, &[1, 2, 3]);
        let source = ScriptedSource::serving(frame.clone(), 1);
        let config = CaptureConfig {
            target_height: 6,
            ..test_config()
        };

        CaptureWorker::start(config, RunFlag::new(), |_| Ok(source), putter, writer)
            .unwrap()
            .join();

        assert_eq!(taker.try_take(), Some(frame));
    }

    #[test]
    fn grab_failure_stops_worker_and_releases_source() {
        let (taker, putter) = bounded_channel::new(FRAME_CHANNEL_CAPACITY);
        let (_reader, writer) = latest_channel::new();
        let source = ScriptedSource::new(2);
        let closed = source.closed_flag();

        let worker =
            CaptureWorker::start(test_config(), RunFlag::new(), |_| Ok(source), putter, writer)
                .unwrap();

        while !worker.is_finished() {
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(worker.state(), WorkerState::Stopped);
        assert!(closed.load(Ordering::SeqCst));

        let report = worker.join();
        assert_eq!(report.exit, WorkerExit::DeviceError(CaptureError::GrabFailed));
        assert_eq!(report.captured, 2);
        assert_eq!(taker.pending(), 2);
    }

    #[test]
    fn open_failure_is_returned_from_start() {
        let (taker, putter) = bounded_channel::new(FRAME_CHANNEL_CAPACITY);
        let (reader, writer) = latest_channel::new();

        let result = CaptureWorker::start(
            test_config(),
            RunFlag::new(),
            |config| {
                Err::<ScriptedSource, _>(OpenError::DeviceUnavailable {
                    index: config.device_index,
                    reason: "unplugged".into(),
                })
            },
            putter,
            writer,
        );

        assert!(matches!(
            result,
            Err(OpenError::DeviceUnavailable { index: 0, .. })
        ));
        assert_eq!(taker.pending(), 0);
        assert_eq!(reader.try_take(), None);
    }

    #[test]
    fn cleared_flag_stops_the_loop() {
        let (taker, putter) = bounded_channel::new(FRAME_CHANNEL_CAPACITY);
        let (_reader, writer) = latest_channel::new();
        let source = ScriptedSource::endless();
        let closed = source.closed_flag();
        let run_flag = RunFlag::new();

        let worker =
            CaptureWorker::start(test_config(), run_flag.clone(), |_| Ok(source), putter, writer)
                .unwrap();
        assert_ne!(worker.state(), WorkerState::Idle);

        while taker.try_take().is_none() {
            thread::sleep(Duration::from_millis(1));
        }
        run_flag.clear();

        let report = worker.join();
        assert_eq!(report.exit, WorkerExit::StopRequested);
        assert!(report.captured >= 1);
        assert!(closed.load(Ordering::SeqCst));
    }

    #[test]
    fn dropped_display_side_stops_the_loop() {
        let (taker, putter) = bounded_channel::new(FRAME_CHANNEL_CAPACITY);
        let (reader, writer) = latest_channel::new();

        let worker = CaptureWorker::start(
            test_config(),
            RunFlag::new(),
            |_| Ok(ScriptedSource::endless()),
            putter,
            writer,
        )
        .unwrap();
        drop(taker);
        drop(reader);

        assert_eq!(worker.join().exit, WorkerExit::PeerDisconnected);
    }

    /// Blocks inside `grab` until the test lets it return.
    struct GatedSource {
        entered: mpsc::Sender<()>,
        release: mpsc::Receiver<()>,
        returned: Arc<AtomicBool>,
        inner: ScriptedSource,
    }

    impl FrameSource for GatedSource {
        fn grab(&mut self) -> Result<(), CaptureError> {
            _ = self.entered.send(());
            _ = self.release.recv();
            self.returned.store(true, Ordering::SeqCst);
            self.inner.grab()
        }

        fn retrieve(&mut self) -> Result<Frame, CaptureError> {
            self.inner.retrieve()
        }

        fn nominal_frame_rate(&self) -> f64 {
            self.inner.nominal_frame_rate()
        }
    }

    #[test]
    fn join_waits_for_in_flight_grab() {
        let (_taker, putter) = bounded_channel::new(FRAME_CHANNEL_CAPACITY);
        let (_reader, writer) = latest_channel::new();
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let returned = Arc::new(AtomicBool::new(false));
        let run_flag = RunFlag::new();

        let source = GatedSource {
            entered: entered_tx,
            release: release_rx,
            returned: returned.clone(),
            inner: ScriptedSource::endless(),
        };
        let worker =
            CaptureWorker::start(test_config(), run_flag.clone(), |_| Ok(source), putter, writer)
                .unwrap();

        entered_rx.recv().unwrap();
        run_flag.clear();
        let joiner = thread::spawn(move || worker.join());

        thread::sleep(Duration::from_millis(50));
        assert!(!joiner.is_finished());
        assert!(!returned.load(Ordering::SeqCst));

        release_tx.send(()).unwrap();
        let report = joiner.join().unwrap();

        assert!(returned.load(Ordering::SeqCst));
        assert_eq!(report.exit, WorkerExit::StopRequested);
        assert_eq!(report.captured, 1);
    }
}
